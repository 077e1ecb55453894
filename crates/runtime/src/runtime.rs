//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive the fixed-step loop.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use maskgrid_core::World;

use crate::api::{InputProvider, Result, RuntimeError, RuntimeHandle, WorldSnapshot};
use crate::events::EventBus;
use crate::workers::{Command, SimulationWorker, TickReport};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Fixed simulation rate; each tick advances `1 / tick_hz` seconds.
    pub tick_hz: u32,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Pace ticks against the wall clock instead of running flat out.
    pub realtime: bool,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_HZ: u32 = 60;

    pub fn dt(&self) -> f32 {
        1.0 / self.tick_hz as f32
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_hz: Self::DEFAULT_TICK_HZ,
            event_buffer_size: 100,
            command_buffer_size: 32,
            realtime: false,
        }
    }
}

/// Totals for a multi-tick run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub events: usize,
    /// Every registered target was eliminated during the run.
    pub completed: bool,
}

/// Main runtime that orchestrates the simulation.
///
/// Runtime owns the worker and coordinates input with ticking.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    config: RuntimeConfig,
    handle: RuntimeHandle,
    input_provider: Option<Box<dyn InputProvider>>,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub async fn snapshot(&self) -> Result<WorldSnapshot> {
        self.handle.query_state().await
    }

    /// Gather input for the next tick and execute it.
    pub async fn step(&mut self) -> Result<TickReport> {
        let provider = self
            .input_provider
            .as_ref()
            .ok_or(RuntimeError::ProviderNotSet)?;

        let snapshot = self.handle.query_state().await?;
        let input = provider.provide(&snapshot).await?;
        self.handle.tick(input).await
    }

    /// Run exactly `ticks` steps.
    pub async fn run_for(&mut self, ticks: u64) -> Result<RunSummary> {
        self.run(ticks, false).await
    }

    /// Run until every target is eliminated or `max_ticks` steps pass.
    pub async fn run_until_complete(&mut self, max_ticks: u64) -> Result<RunSummary> {
        self.run(max_ticks, true).await
    }

    async fn run(&mut self, max_ticks: u64, stop_on_complete: bool) -> Result<RunSummary> {
        let mut pacer = self.config.realtime.then(|| {
            let mut interval = time::interval(Duration::from_secs_f32(self.config.dt()));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        let mut summary = RunSummary::default();
        while summary.ticks < max_ticks {
            if let Some(pacer) = pacer.as_mut() {
                pacer.tick().await;
            }

            let report = self.step().await?;
            summary.ticks += 1;
            summary.events += report.events.len();

            if report.completed_level() {
                summary.completed = true;
                tracing::info!("level complete at tick {}", report.tick);
                if stop_on_complete {
                    break;
                }
            }
        }

        tracing::debug!(
            "run finished after {} ticks with {} events",
            summary.ticks,
            summary.events
        );
        Ok(summary)
    }

    /// Set the input provider
    pub fn set_input_provider(&mut self, provider: impl InputProvider + 'static) {
        self.input_provider = Some(Box::new(provider));
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<World>,
    input_provider: Option<Box<dyn InputProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
            input_provider: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the world to simulate (required)
    pub fn world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    /// Set the input provider (optional until the first step)
    pub fn input_provider(mut self, provider: impl InputProvider + 'static) -> Self {
        self.input_provider = Some(Box::new(provider));
        self
    }

    /// Build the runtime and spawn its worker. Must run inside a tokio runtime.
    pub async fn build(self) -> Result<Runtime> {
        let world = self.world.ok_or(RuntimeError::MissingWorld)?;
        if self.config.tick_hz == 0 {
            return Err(RuntimeError::InvalidTickRate(self.config.tick_hz));
        }

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let sim_worker = SimulationWorker::new(world, self.config.dt(), command_rx, event_bus);
        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            config: self.config,
            handle,
            input_provider: self.input_provider,
            sim_worker_handle,
        })
    }
}
