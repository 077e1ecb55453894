//! Asynchronous abstraction for sourcing per-tick actor input.
//!
//! Runtime users plug in [`InputProvider`] implementations so the simulation
//! can run with live devices, scripted fixtures, or bots.
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use maskgrid_core::{ActorInput, Direction, InputFrame, MoveInput};

use super::errors::{Result, RuntimeError};
use super::snapshot::WorldSnapshot;

/// Trait for providing input for every controlled actor before a tick.
///
/// Different implementations can handle:
/// - Keyboard or gamepad input
/// - Scripted/replayed input
/// - Testing fixtures
#[async_trait]
pub trait InputProvider: Send + Sync {
    /// Input for the tick that follows `snapshot`. Actors missing from the
    /// returned frame receive no input.
    async fn provide(&self, snapshot: &WorldSnapshot) -> Result<InputFrame>;
}

/// Provider that never moves anything.
pub struct IdleInput;

#[async_trait]
impl InputProvider for IdleInput {
    async fn provide(&self, _snapshot: &WorldSnapshot) -> Result<InputFrame> {
        Ok(InputFrame::new())
    }
}

/// One segment of a scripted run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptStep {
    /// Direction held for the whole segment.
    pub direction: Option<Direction>,
    /// Drop the active mask on the first tick of the segment.
    pub drop_mask: bool,
    pub ticks: u64,
}

impl Default for ScriptStep {
    fn default() -> Self {
        Self {
            direction: None,
            drop_mask: false,
            ticks: 1,
        }
    }
}

impl ScriptStep {
    pub fn hold(direction: Direction, ticks: u64) -> Self {
        Self {
            direction: Some(direction),
            ticks,
            ..Self::default()
        }
    }

    pub fn wait(ticks: u64) -> Self {
        Self {
            ticks,
            ..Self::default()
        }
    }

    pub fn drop_mask() -> Self {
        Self {
            drop_mask: true,
            ..Self::default()
        }
    }
}

/// Replays a fixed list of steps for every controlled actor, keyed on the
/// tick counter. Idle once the script runs out.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    steps: Vec<ScriptStep>,
}

impl ScriptedInput {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self { steps }
    }

    /// Parses a RON list of [`ScriptStep`]s.
    pub fn parse(content: &str) -> Result<Self> {
        let steps: Vec<ScriptStep> = ron::from_str(content)?;
        Ok(Self::new(steps))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(RuntimeError::ScriptIo)?;
        Self::parse(&content)
    }

    /// Total ticks covered by the script.
    pub fn len_ticks(&self) -> u64 {
        self.steps.iter().map(|step| step.ticks).sum()
    }

    /// Input for tick number `tick` (0-based).
    pub fn input_at(&self, tick: u64) -> ActorInput {
        let mut start = 0;
        for step in &self.steps {
            if tick < start + step.ticks {
                return ActorInput {
                    movement: step.direction.map(MoveInput::from).unwrap_or(MoveInput::NONE),
                    drop_mask: step.drop_mask && tick == start,
                };
            }
            start += step.ticks;
        }
        ActorInput::default()
    }
}

#[async_trait]
impl InputProvider for ScriptedInput {
    async fn provide(&self, snapshot: &WorldSnapshot) -> Result<InputFrame> {
        let input = self.input_at(snapshot.tick);
        if input == ActorInput::default() {
            return Ok(InputFrame::new());
        }
        Ok(snapshot
            .controlled()
            .map(|view| (view.id, input))
            .collect())
    }
}
