//! Fieldcast Simulator - Deterministic In-Memory Network
//!
//! Runs the same aggregate program on every device of a topology, one round
//! per tick, delivering each device's frozen message to its current
//! neighbors at the end of the tick. Devices never share mutable state; the
//! only cross-device interaction is message delivery, exactly as in a real
//! deployment.
//!
//! Scheduling is reproducible: the per-tick device order is either the id
//! order or a seeded shuffle (`rand_chacha`), configured through
//! [`SimulatorConfig`].

#![forbid(unsafe_code)]

/// Simulator configuration (TOML-loadable)
pub mod config;

/// The network: engines, mailboxes, tick loop
pub mod network;

/// Undirected neighbor relation
pub mod topology;

/// Simulator error types
pub mod errors;

pub use config::{ScheduleOrder, SimulatorConfig};
pub use errors::{Result, SimulatorError};
pub use network::{Network, TickReport};
pub use topology::Topology;
