//! Error types for round execution.
//!
//! Every variant is fatal for the current round on the local device: the
//! round aborts, the previously committed state is kept, and the device tries
//! again next round. Nothing here is silently swallowed; self-stabilization
//! assumes a round either fully succeeds or never happened.

use crate::path::Path;
use fieldcast_core::FieldError;
use thiserror::Error;

/// Round execution error types
#[derive(Debug, Error)]
pub enum RoundError {
    /// The same path was exported twice in one round with incompatible
    /// payload shapes, usually a loop missing an `aligned_on` pivot
    #[error("alignment clash at {path}: exported as {first}, then as {second}")]
    AlignmentClash {
        /// The colliding path
        path: Path,
        /// Shape of the first export
        first: String,
        /// Shape of the conflicting export
        second: String,
    },

    /// A stored or received value at this path no longer matches the shape
    /// the program expects, meaning the program changed shape between rounds
    #[error("uninitialized state at {path}: expected {expected}, found {found}")]
    UninitializedState {
        /// The path being read
        path: Path,
        /// The shape the program asked for
        expected: String,
        /// The shape actually recorded
        found: String,
    },

    /// A field operation failed (unknown id, alignment mismatch, self-neighbor)
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Value encoding or pivot rendering failed
    #[error("codec failure: {0}")]
    Codec(String),

    /// A round was started while one was already in progress on this device
    #[error("a round is already in progress on this device")]
    RoundInProgress,
}

/// Result type for round execution
pub type Result<T> = std::result::Result<T, RoundError>;

impl RoundError {
    /// Create an alignment clash error
    pub fn alignment_clash(
        path: Path,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::AlignmentClash {
            path,
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create an uninitialized-state error
    pub fn uninitialized_state(
        path: &Path,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UninitializedState {
            path: path.clone(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a codec error
    pub fn codec(err: impl std::fmt::Display) -> Self {
        Self::Codec(err.to_string())
    }
}
