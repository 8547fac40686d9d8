//! Fieldcast Engine - Alignment/Path Execution Substrate
//!
//! The per-device runtime that makes aggregate programs composable and
//! self-stabilizing. Every operator invocation is addressed by the [`Path`]
//! of its position in the round's call structure; the engine persists each
//! device's own exports between rounds, rebuilds [`fieldcast_core::Field`]s
//! from the most recent neighbor messages, and freezes each round's exports
//! into one broadcast [`Message`].
//!
//! The public surface client algorithms use is the [`RoundContext`] with its
//! four operators (`neighboring`, `share`, `exchange`, `evolve`) plus
//! `aligned_on`; everything else is plumbing the [`Engine`] drives once per
//! round.

#![forbid(unsafe_code)]

/// Round context and the operator surface
pub mod context;

/// Round runner state machine
pub mod engine;

/// Outbound/inbound envelopes and field reconstruction
pub mod envelope;

/// Round error taxonomy
pub mod errors;

/// Paths, tokens, and the alignment scope
pub mod path;

/// Per-device previous-round state
pub mod state;

/// Broadcast message wire types
pub mod wire;

pub use context::RoundContext;
pub use engine::{Engine, RoundStatus};
pub use envelope::{InboundEnvelopes, OutboundEnvelope};
pub use errors::{Result, RoundError};
pub use path::{AlignmentScope, Path, PathToken};
pub use state::StateStore;
pub use wire::{ExchangeExport, Message, SerializedValue, WIRE_SCHEMA_VERSION};
