//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, world setup, and input providers
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use maskgrid_core::SetupError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("input provider not set")]
    ProviderNotSet,

    #[error("input provider failed: {0}")]
    Provider(String),

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a world before building")]
    MissingWorld,

    #[error("tick rate must be positive, got {0}")]
    InvalidTickRate(u32),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("failed to parse input script: {0}")]
    Script(#[from] ron::error::SpannedError),

    #[error("failed to read input script")]
    ScriptIo(#[source] std::io::Error),
}
