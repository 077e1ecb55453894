//! Mask identities and the per-actor mask stack.
//!
//! An actor wears an ordered stack of masks. The last element is the active
//! mask that gates doors; the stack never becomes empty once built.
mod table;
mod visual;

pub use table::MaskCompatibility;
pub use visual::{MaskVisual, MaskVisualLayout};

use crate::events::{SubscriptionId, Subscribers};

/// Mask identity. Acts as a capability token when passing gates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaskType {
    Wolf,
    Sheep,
    Pig,
    Cow,
    Chicken,
}

/// Change notification delivered to mask stack observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaskChange {
    Added(MaskType),
    Removed(MaskType),
}

/// Insertion-ordered, duplicate-free stack of masks with at least one entry.
pub struct MaskStack {
    masks: Vec<MaskType>,
    subscribers: Subscribers<MaskChange>,
}

impl MaskStack {
    /// Builds a stack from the configured starting list.
    ///
    /// Duplicates are dropped (first occurrence wins). An empty list yields a
    /// stack holding only `fallback`.
    pub fn new(initial: impl IntoIterator<Item = MaskType>, fallback: MaskType) -> Self {
        let mut masks = Vec::new();
        for mask in initial {
            if !masks.contains(&mask) {
                masks.push(mask);
            }
        }
        if masks.is_empty() {
            masks.push(fallback);
        }

        Self {
            masks,
            subscribers: Subscribers::new(),
        }
    }

    /// Appends `mask` as the new active mask.
    ///
    /// Returns false without mutating anything when the mask is already worn.
    pub fn push(&mut self, mask: MaskType) -> bool {
        if self.masks.contains(&mask) {
            tracing::warn!("cannot add {}: mask already equipped", mask);
            return false;
        }

        self.masks.push(mask);
        tracing::debug!("added mask {} (total {})", mask, self.masks.len());
        self.subscribers.notify(&MaskChange::Added(mask));
        true
    }

    /// Removes and returns the active mask.
    ///
    /// Returns `None` without mutating anything when only one mask remains.
    pub fn pop(&mut self) -> Option<MaskType> {
        if self.masks.len() <= 1 {
            tracing::warn!("cannot remove mask: at least one mask must remain");
            return None;
        }

        let removed = self.masks.pop()?;
        tracing::debug!("removed mask {} (remaining {})", removed, self.masks.len());
        self.subscribers.notify(&MaskChange::Removed(removed));
        Some(removed)
    }

    /// Active (outermost) mask.
    pub fn top(&self) -> MaskType {
        // Construction guarantees at least one element and pop never removes the last.
        self.masks[self.masks.len() - 1]
    }

    pub fn contains(&self, mask: MaskType) -> bool {
        self.masks.contains(&mask)
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Masks from innermost to outermost.
    pub fn as_slice(&self) -> &[MaskType] {
        &self.masks
    }

    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&MaskChange) + Send + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

impl std::fmt::Debug for MaskStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskStack")
            .field("masks", &self.masks)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
