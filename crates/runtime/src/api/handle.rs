//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! stepping the simulation or streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use maskgrid_core::{EntityId, InputFrame, MaskType};

use super::errors::{Result, RuntimeError};
use super::snapshot::WorldSnapshot;
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, TickReport};

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Advance the world by one fixed step with the given input.
    pub async fn tick(&self, input: InputFrame) -> Result<TickReport> {
        self.request(|reply| Command::Tick { input, reply }).await
    }

    /// Query the current world state (read-only snapshot)
    pub async fn query_state(&self) -> Result<WorldSnapshot> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Push a mask onto an actor's stack. Returns `false` if the actor
    /// already wears it.
    pub async fn push_mask(&self, actor: EntityId, mask: MaskType) -> Result<bool> {
        self.request(|reply| Command::PushMask { actor, mask, reply })
            .await?
    }

    /// Press (`true`) or release (`false`) a trigger from outside the world.
    pub async fn set_trigger(&self, trigger: EntityId, pressed: bool) -> Result<bool> {
        self.request(|reply| Command::SetTrigger {
            trigger,
            pressed,
            reply,
        })
        .await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Motion` - Step commits, rejections, completions
    /// - `Topic::Masks` - Mask stack changes
    /// - `Topic::Gameplay` - Doors, triggers, targets, hazards
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use maskgrid_runtime::Topic;
    ///
    /// let mut gameplay = handle.subscribe(Topic::Gameplay);
    /// while let Ok(event) = gameplay.recv().await {
    ///     // Handle gameplay events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
