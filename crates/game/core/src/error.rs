//! Common error infrastructure for maskgrid-core.
//!
//! Gameplay outcomes such as a rejected move, a duplicate mask push, or a pop
//! on a single-mask stack are *not* errors: they are reported as `bool` or
//! `Option` values by the operations themselves. The types in this module
//! cover setup and bookkeeping failures only.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each failure domain has its own error enum
//! - **Rich Context**: Errors can carry the actor, cell, and tick involved
//! - **Severity Classification**: Errors are categorized for recovery strategies

use crate::grid::Cell;
use crate::world::EntityId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: Temporary conditions that may succeed on a later tick
/// - **Validation**: Invalid configuration or input that should be rejected
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Unrecoverable errors indicating corrupted simulation state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the caller may retry on a later tick.
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: patrol without waypoints, unknown entity reference
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: occupancy index out of sync with an entity's position
    Internal,

    /// Fatal error - simulation state corrupted, cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Entity that triggered the error (if applicable).
    pub actor: Option<EntityId>,

    /// Lattice cell where the error occurred (if applicable).
    pub cell: Option<Cell>,

    /// Simulation tick at the time of error.
    pub tick: u64,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    /// Creates a new error context for the given tick.
    #[must_use]
    pub const fn new(tick: u64) -> Self {
        Self {
            actor: None,
            cell: None,
            tick,
            message: None,
        }
    }

    /// Attaches an actor to this context (builder pattern).
    #[must_use]
    pub const fn with_actor(mut self, actor: EntityId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Attaches a cell to this context (builder pattern).
    #[must_use]
    pub const fn with_cell(mut self, cell: Cell) -> Self {
        self.cell = Some(cell);
        self
    }

    /// Attaches a static message to this context (builder pattern).
    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all maskgrid-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised while configuring actors and world content.
///
/// A setup error never aborts the simulation: the affected behavior disables
/// itself and the world keeps ticking.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SetupError {
    #[error("entity {0} has no waypoints")]
    NoWaypoints(EntityId),

    #[error("entity {0} not found")]
    UnknownEntity(EntityId),

    #[error("entity name `{0}` is used more than once")]
    DuplicateName(String),

    #[error("no entity is named `{0}`")]
    UnknownName(String),

    #[error("entity {entity} is missing its {component} component")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },

    #[error("grid unit must be positive and finite, got {0}")]
    InvalidGridUnit(f32),

    #[error("cell {0} already holds {1} occupants")]
    CellFull(Cell, usize),

    #[error("occupancy index lost track of entity {0}")]
    IndexDesync(EntityId),
}

impl GameError for SetupError {
    fn severity(&self) -> ErrorSeverity {
        use SetupError::*;
        match self {
            NoWaypoints(_)
            | UnknownEntity(_)
            | DuplicateName(_)
            | UnknownName(_)
            | MissingComponent { .. }
            | InvalidGridUnit(_) => ErrorSeverity::Validation,
            CellFull(..) => ErrorSeverity::Recoverable,
            IndexDesync(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use SetupError::*;
        match self {
            NoWaypoints(_) => "SETUP_NO_WAYPOINTS",
            UnknownEntity(_) => "SETUP_UNKNOWN_ENTITY",
            DuplicateName(_) => "SETUP_DUPLICATE_NAME",
            UnknownName(_) => "SETUP_UNKNOWN_NAME",
            MissingComponent { .. } => "SETUP_MISSING_COMPONENT",
            InvalidGridUnit(_) => "SETUP_INVALID_GRID_UNIT",
            CellFull(..) => "SETUP_CELL_FULL",
            IndexDesync(_) => "SETUP_INDEX_DESYNC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_errors_are_classified() {
        let err = SetupError::NoWaypoints(EntityId(3));
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.error_code(), "SETUP_NO_WAYPOINTS");
        assert!(!err.severity().is_internal());

        let desync = SetupError::IndexDesync(EntityId(1));
        assert!(desync.severity().is_internal());
    }

    #[test]
    fn context_builder_attaches_fields() {
        let ctx = ErrorContext::new(7)
            .with_actor(EntityId(2))
            .with_cell(Cell::new(1, -1))
            .with_message("probe");
        assert_eq!(ctx.tick, 7);
        assert_eq!(ctx.actor, Some(EntityId(2)));
        assert_eq!(ctx.cell, Some(Cell::new(1, -1)));
        assert_eq!(ctx.message, Some("probe"));
    }
}
