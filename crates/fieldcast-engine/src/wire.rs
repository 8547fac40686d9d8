//! Wire format for the per-round broadcast message.
//!
//! A device's frozen outbound envelope becomes one [`Message`] per round: a
//! map from [`Path`] to an opaque [`SerializedValue`]. The engine is agnostic
//! to how the transport moves messages around; the only contract is that
//! values round-trip through equality.

use crate::errors::{Result, RoundError};
use crate::path::Path;
use fieldcast_core::{DeviceId, Field};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::type_name;

pub const WIRE_SCHEMA_VERSION: u16 = 1;

/// An encoded export value.
///
/// `shape` records the exporting type's name and is used only for diagnosing
/// alignment clashes and shape mismatches, never for dispatch. `bytes` is the
/// bincode encoding. Equality covers both, so equal values compare equal
/// across the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedValue {
    shape: String,
    bytes: Vec<u8>,
}

impl SerializedValue {
    /// Encode a value for export.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            shape: type_name::<T>().to_owned(),
            bytes: bincode::serialize(value).map_err(RoundError::codec)?,
        })
    }

    /// Decode back into `T`.
    ///
    /// A recorded shape that differs from `T`, or bytes that no longer
    /// decode, mean the program changed shape since this value was produced;
    /// both are fatal [`RoundError::UninitializedState`], never defaulted.
    pub fn decode<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let expected = type_name::<T>();
        if self.shape != expected {
            return Err(RoundError::uninitialized_state(path, expected, &self.shape));
        }
        bincode::deserialize(&self.bytes).map_err(|err| {
            RoundError::uninitialized_state(path, expected, format!("{} (undecodable: {err})", self.shape))
        })
    }

    /// The recorded payload shape.
    pub fn shape(&self) -> &str {
        &self.shape
    }
}

/// One device's broadcast for one round: the frozen outbound envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub schema_version: u16,
    /// The broadcasting device
    pub sender: DeviceId,
    /// Everything the sender exported this round, in program order
    pub exports: IndexMap<Path, SerializedValue>,
}

impl Message {
    /// Create a message for the current schema version.
    pub fn new(sender: DeviceId, exports: IndexMap<Path, SerializedValue>) -> Self {
        Self {
            schema_version: WIRE_SCHEMA_VERSION,
            sender,
            exports,
        }
    }

    /// The export recorded at `path`, if the sender's program reached it.
    pub fn export_at(&self, path: &Path) -> Option<&SerializedValue> {
        self.exports.get(path)
    }

    /// Number of exported paths.
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// Whether the sender exported nothing this round.
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

/// Export payload of the `exchange` operator: a send field.
///
/// The outbound envelope is a broadcast, but `exchange` addresses neighbors
/// individually. The whole returned field travels as one payload: a receiver
/// projects its own entry and falls back to `local`; the sender seeds next
/// round's local slot from `local`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeExport<T> {
    /// The sender's own next value, also the fallback for unlisted receivers
    pub local: T,
    /// Per-neighbor values, addressed by receiver id
    pub per_neighbor: Vec<(DeviceId, T)>,
}

impl<T> ExchangeExport<T> {
    /// Capture a send field.
    pub fn from_field(field: &Field<DeviceId, T>) -> Self
    where
        T: Clone,
    {
        Self {
            local: field.local().clone(),
            per_neighbor: field
                .neighbor_entries()
                .map(|(id, v)| (*id, v.clone()))
                .collect(),
        }
    }

    /// The value addressed to `receiver`, falling back to `local`.
    pub fn into_value_for(mut self, receiver: DeviceId) -> T {
        match self
            .per_neighbor
            .iter()
            .position(|(id, _)| *id == receiver)
        {
            Some(index) => self.per_neighbor.swap_remove(index).1,
            None => self.local,
        }
    }
}
