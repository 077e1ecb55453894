//! Simulate a level headlessly and log its events.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast::{self, error::RecvError};

use maskgrid_runtime::{Event, IdleInput, Runtime, RuntimeConfig, ScriptedInput, Topic};

use super::LevelArgs;
use crate::config::CliConfig;

/// Simulate a level
#[derive(Parser)]
pub struct Play {
    #[command(flatten)]
    level: LevelArgs,

    /// RON input script; the level idles without one
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Maximum number of ticks to simulate
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Simulation rate (defaults to $MASKGRID_TICK_HZ or 60)
    #[arg(long, value_name = "HZ")]
    tick_hz: Option<u32>,

    /// Pace ticks against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Keep running after every target is eliminated
    #[arg(long)]
    no_stop: bool,
}

impl Play {
    pub async fn execute(self) -> Result<()> {
        let env = CliConfig::from_env();
        let level = self.level.load(&env)?;

        let config = RuntimeConfig {
            tick_hz: self.tick_hz.unwrap_or(env.tick_hz),
            realtime: self.realtime,
            ..RuntimeConfig::default()
        };
        let builder = Runtime::builder().config(config).world(level.world);
        let mut runtime = match &self.script {
            Some(path) => {
                let script = ScriptedInput::load(path)
                    .with_context(|| format!("Failed to load script {}", path.display()))?;
                tracing::info!("replaying {} scripted ticks", script.len_ticks());
                builder.input_provider(script).build().await?
            }
            None => builder.input_provider(IdleInput).build().await?,
        };

        let loggers: Vec<_> = runtime
            .handle()
            .subscribe_multiple(&Topic::ALL)
            .into_iter()
            .map(|(topic, rx)| tokio::spawn(log_events(topic, rx)))
            .collect();

        let summary = if self.no_stop {
            runtime.run_for(self.ticks).await?
        } else {
            runtime.run_until_complete(self.ticks).await?
        };
        let snapshot = runtime.snapshot().await?;
        runtime.shutdown().await?;
        for logger in loggers {
            logger.await.context("event logger panicked")?;
        }

        println!(
            "ran {} ticks, {} events, targets {}/{} eliminated{}",
            summary.ticks,
            summary.events,
            snapshot.targets_total - snapshot.targets_remaining,
            snapshot.targets_total,
            if summary.completed { ", level complete" } else { "" }
        );
        Ok(())
    }
}

async fn log_events(topic: Topic, mut rx: broadcast::Receiver<Event>) {
    loop {
        match rx.recv().await {
            Ok(event) => println!("[{:>5}] {:?}: {:?}", event.tick, topic, event.event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("{:?} log skipped {} events", topic, skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
