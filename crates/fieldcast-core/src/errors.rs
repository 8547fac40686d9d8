//! Error types for field operations.
//!
//! Every variant here signals a programming defect in the aggregate program,
//! not a recoverable runtime condition: callers propagate these, they never
//! default their way past them.

use std::fmt::Debug;
use thiserror::Error;

/// Field error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Lookup for an id not present in the field (local and neighbor ids
    /// share one namespace)
    #[error("unknown id in field lookup: {id}")]
    UnknownId {
        /// The id that was queried
        id: String,
    },

    /// Two fields with differing neighbor sets were combined
    #[error("fields are not aligned: left-only {left_only:?}, right-only {right_only:?}")]
    AlignmentMismatch {
        /// Neighbor ids present only in the left field
        left_only: Vec<String>,
        /// Neighbor ids present only in the right field
        right_only: Vec<String>,
    },

    /// The local id appeared among the neighbor keys at construction
    #[error("device {id} cannot be its own neighbor")]
    SelfNeighbor {
        /// The offending id
        id: String,
    },
}

/// Result type for field operations
pub type Result<T> = std::result::Result<T, FieldError>;

impl FieldError {
    /// Create an unknown-id error
    pub fn unknown_id(id: &impl Debug) -> Self {
        Self::UnknownId {
            id: format!("{id:?}"),
        }
    }

    /// Create an alignment mismatch error from the symmetric difference of
    /// two neighbor sets
    pub fn alignment_mismatch(
        left_only: impl IntoIterator<Item = impl Debug>,
        right_only: impl IntoIterator<Item = impl Debug>,
    ) -> Self {
        Self::AlignmentMismatch {
            left_only: left_only.into_iter().map(|id| format!("{id:?}")).collect(),
            right_only: right_only.into_iter().map(|id| format!("{id:?}")).collect(),
        }
    }

    /// Create a self-neighbor error
    pub fn self_neighbor(id: &impl Debug) -> Self {
        Self::SelfNeighbor {
            id: format!("{id:?}"),
        }
    }
}
