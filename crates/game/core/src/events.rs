//! Gameplay notifications and the explicit observer registry.
//!
//! Components never call back into hosts implicitly. Hosts register an
//! observer, keep the returned [`SubscriptionId`], and unsubscribe when they
//! are torn down.
use std::fmt;

use crate::grid::{Cell, Direction};
use crate::mask::MaskType;
use crate::world::EntityId;

/// Notification emitted by the world during a tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameEvent {
    MoveCommitted {
        actor: EntityId,
        from: Cell,
        to: Cell,
    },
    MoveRejected {
        actor: EntityId,
        direction: Direction,
    },
    MoveCompleted {
        actor: EntityId,
        cell: Cell,
    },
    BlockPushed {
        block: EntityId,
        to: Cell,
    },
    DoorUnlocked {
        door: EntityId,
        by: EntityId,
    },
    MaskPushed {
        actor: EntityId,
        mask: MaskType,
    },
    MaskPopped {
        actor: EntityId,
        mask: MaskType,
    },
    MaskDropped {
        item: EntityId,
        mask: MaskType,
        cell: Cell,
    },
    MaskReequipped {
        actor: EntityId,
        mask: MaskType,
    },
    TriggerActivated {
        trigger: EntityId,
    },
    TriggerDeactivated {
        trigger: EntityId,
    },
    TargetEliminated {
        target: EntityId,
        by: EntityId,
    },
    AllTargetsEliminated,
    ActorDefeated {
        actor: EntityId,
        hazard: EntityId,
    },
    BehaviorDisabled {
        actor: EntityId,
        reason: String,
    },
}

impl GameEvent {
    /// Coarse category used by hosts for routing.
    pub fn kind(&self) -> EventKind {
        use GameEvent::*;
        match self {
            MoveCommitted { .. } | MoveRejected { .. } | MoveCompleted { .. } | BlockPushed { .. } => {
                EventKind::Motion
            }
            MaskPushed { .. } | MaskPopped { .. } | MaskDropped { .. } | MaskReequipped { .. } => {
                EventKind::Masks
            }
            DoorUnlocked { .. }
            | TriggerActivated { .. }
            | TriggerDeactivated { .. }
            | TargetEliminated { .. }
            | AllTargetsEliminated
            | ActorDefeated { .. }
            | BehaviorDisabled { .. } => EventKind::Gameplay,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    Motion,
    Masks,
    Gameplay,
}

/// Handle returned by [`Subscribers::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Observer<E> = Box<dyn FnMut(&E) + Send>;

/// Ordered observer list. Observers run in registration order.
pub struct Subscribers<E> {
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer<E>)>,
}

impl<E> Subscribers<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&E) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    pub fn notify(&mut self, event: &E) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("observers", &self.observers.len())
            .finish()
    }
}
