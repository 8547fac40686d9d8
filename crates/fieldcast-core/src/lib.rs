//! Fieldcast Core - Field Data Type Foundation
//!
//! This crate provides the foundational data type of the fieldcast runtime:
//! the [`Field`], an immutable mapping from a finite set of device ids (the
//! local device plus its current neighbors) to values. Fields are the unit of
//! distributed data exchange in aggregate computing: every neighbor-aware
//! operator consumes and produces them.
//!
//! The crate contains only pure data types with no round or network logic;
//! the execution engine lives in `fieldcast-engine`.

#![forbid(unsafe_code)]

/// Field data type with its internal representations
pub mod field;

/// Device identifier newtype
pub mod identifiers;

/// Field error taxonomy
pub mod errors;

pub use errors::{FieldError, Result};
pub use field::Field;
pub use identifiers::DeviceId;
