//! Device identifier used across the fieldcast runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one device in the network.
///
/// Device ids are ordinal, not random: the canonical ordering is what gives
/// fields a representation-independent hash and the simulator a deterministic
/// scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(pub u64);

impl DeviceId {
    /// Create a device id from its raw ordinal.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ordinal.
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device-{}", self.0)
    }
}

impl From<u64> for DeviceId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<DeviceId> for u64 {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}
