//! Runtime orchestration for the grid-puzzle simulation.
//!
//! This crate wires together the input provider abstraction, a simulation
//! worker that owns the [`maskgrid_core::World`], and a topic-based event bus
//! into a cohesive runtime API. Consumers embed [`Runtime`] to drive ticks,
//! subscribe to events, and interact with the world through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{
    EntityView, IdleInput, InputProvider, Result, RuntimeError, RuntimeHandle, ScriptStep,
    ScriptedInput, WorldSnapshot,
};
pub use events::{Event, EventBus, Topic};
pub use runtime::{RunSummary, Runtime, RuntimeBuilder, RuntimeConfig};
pub use workers::TickReport;
