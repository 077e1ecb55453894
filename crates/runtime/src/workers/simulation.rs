//! Simulation worker that owns the authoritative [`maskgrid_core::World`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), advances
//! the world with a fixed timestep, and publishes tick events to the
//! [`EventBus`].

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use maskgrid_core::{EntityId, GameEvent, InputFrame, MaskType, World};

use crate::api::{Result, WorldSnapshot};
use crate::events::{Event, EventBus};

/// Outcome of one simulated tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<GameEvent>,
}

impl TickReport {
    pub fn completed_level(&self) -> bool {
        self.events.contains(&GameEvent::AllTargetsEliminated)
    }
}

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Advance the world by one fixed step.
    Tick {
        input: InputFrame,
        reply: oneshot::Sender<TickReport>,
    },
    /// Capture a read-only snapshot.
    QueryState {
        reply: oneshot::Sender<WorldSnapshot>,
    },
    /// Push a mask onto an actor's stack outside of the tick.
    PushMask {
        actor: EntityId,
        mask: MaskType,
        reply: oneshot::Sender<Result<bool>>,
    },
    /// Press or release a trigger on behalf of an external source.
    SetTrigger {
        trigger: EntityId,
        pressed: bool,
        reply: oneshot::Sender<Result<bool>>,
    },
}

/// Background task that processes simulation commands.
///
/// The worker is a pure executor: it does not own input providers or pace
/// itself. Provider orchestration and pacing live in the runtime.
pub struct SimulationWorker {
    world: World,
    dt: f32,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SimulationWorker {
    pub fn new(
        world: World,
        dt: f32,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        tracing::info!(
            "SimulationWorker initialized with {} entities, {} controlled, dt {:.4}s",
            world.entities().count(),
            world.controlled().len(),
            dt
        );

        Self {
            world,
            dt,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Ends when every handle is dropped.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }
        debug!("SimulationWorker stopped at tick {}", self.world.tick_count());
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Tick { input, reply } => {
                let report = self.tick(&input);
                if reply.send(report).is_err() {
                    debug!("Tick reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                if reply.send(WorldSnapshot::capture(&self.world)).is_err() {
                    debug!("QueryState reply channel closed (caller dropped)");
                }
            }
            Command::PushMask { actor, mask, reply } => {
                let result = self.world.push_mask(actor, mask).map_err(Into::into);
                self.flush_events();
                if reply.send(result).is_err() {
                    debug!("PushMask reply channel closed (caller dropped)");
                }
            }
            Command::SetTrigger {
                trigger,
                pressed,
                reply,
            } => {
                let result = if pressed {
                    self.world.activate_trigger(trigger)
                } else {
                    self.world.deactivate_trigger(trigger)
                };
                self.flush_events();
                if reply.send(result.map_err(Into::into)).is_err() {
                    debug!("SetTrigger reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn tick(&mut self, input: &InputFrame) -> TickReport {
        let events = self.world.tick(self.dt, input);
        let tick = self.world.tick_count();
        for event in &events {
            self.event_bus.publish(Event {
                tick,
                event: event.clone(),
            });
        }
        TickReport { tick, events }
    }

    /// Publishes events queued by commands issued between ticks.
    fn flush_events(&mut self) {
        let tick = self.world.tick_count();
        for event in self.world.drain_events() {
            self.event_bus.publish(Event { tick, event });
        }
    }
}
