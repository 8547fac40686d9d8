//! Outbound and inbound envelopes.
//!
//! The outbound envelope collects everything the current round wants to
//! export, in program order, and freezes into the round's [`Message`]. The
//! inbound envelopes hold the most recent message per neighbor and rebuild,
//! for any path, the field of neighbor values recorded there.

use crate::errors::{Result, RoundError};
use crate::path::Path;
use crate::wire::{ExchangeExport, Message, SerializedValue};
use fieldcast_core::{DeviceId, Field};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// The current round's exports, built incrementally by operator invocations.
#[derive(Debug, Default)]
pub struct OutboundEnvelope {
    exports: IndexMap<Path, SerializedValue>,
}

impl OutboundEnvelope {
    /// Create an empty envelope for a fresh round.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value to export at `path`.
    ///
    /// Exporting twice at one path with a different payload shape is an
    /// [`RoundError::AlignmentClash`], the signature of an operator call
    /// inside a loop missing its `aligned_on` pivot. A same-shape re-export
    /// overwrites silently; it is still semantically wrong for loops (N
    /// logical instances collapse into one path), which is why the clash
    /// check exists at all.
    pub fn export<T: Serialize>(&mut self, path: Path, value: &T) -> Result<()> {
        let encoded = SerializedValue::encode(value)?;
        if let Some(existing) = self.exports.get(&path) {
            if existing.shape() != encoded.shape() {
                return Err(RoundError::alignment_clash(
                    path,
                    existing.shape(),
                    encoded.shape(),
                ));
            }
            tracing::trace!(path = %path, "overwriting same-shape export");
        }
        self.exports.insert(path, encoded);
        Ok(())
    }

    /// Whether anything was exported at `path` this round.
    pub fn contains(&self, path: &Path) -> bool {
        self.exports.contains_key(path)
    }

    /// Number of exported paths so far.
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// Whether nothing has been exported yet.
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    /// Freeze into the round's broadcast message.
    pub fn freeze(self, sender: DeviceId) -> Message {
        Message::new(sender, self.exports)
    }
}

/// The most recent message received from each neighbor.
#[derive(Debug, Default)]
pub struct InboundEnvelopes {
    latest: BTreeMap<DeviceId, Message>,
}

impl InboundEnvelopes {
    /// Create an empty set of envelopes (a device that has heard nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a neighbor's message, superseding any earlier one from the
    /// same sender. Only the most recent message per neighbor is ever used.
    pub fn accept(&mut self, message: Message) {
        tracing::trace!(
            sender = %message.sender,
            exports = message.len(),
            "installing latest neighbor message"
        );
        self.latest.insert(message.sender, message);
    }

    /// Drop a departed neighbor's message, if any.
    pub fn forget(&mut self, neighbor: DeviceId) -> bool {
        self.latest.remove(&neighbor).is_some()
    }

    /// Neighbors we currently hold a message from.
    pub fn senders(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.latest.keys().copied()
    }

    /// Number of neighbors with an installed message.
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    /// Whether no neighbor message is installed.
    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    /// Reconstruct the field at `path`: the given local entry plus, for each
    /// neighbor whose latest message carries `path`, the value recorded
    /// there.
    ///
    /// Neighbors whose latest message lacks `path` are simply absent from the
    /// neighbor set; that is how fields shrink and grow as neighbors take
    /// different branches. A present entry with the wrong shape is fatal.
    pub fn field_at<T>(&self, path: &Path, local_id: DeviceId, local: T) -> Result<Field<DeviceId, T>>
    where
        T: DeserializeOwned + PartialEq,
    {
        let mut entries = BTreeMap::new();
        for (sender, message) in &self.latest {
            if *sender == local_id {
                continue;
            }
            if let Some(value) = message.export_at(path) {
                entries.insert(*sender, value.decode::<T>(path)?);
            }
        }
        Field::new(local_id, local, entries).map_err(RoundError::from)
    }

    /// Like [`field_at`](Self::field_at), but for `exchange` payloads: each
    /// neighbor's send field is projected onto the local device.
    pub fn exchange_field_at<T>(
        &self,
        path: &Path,
        local_id: DeviceId,
        local: T,
    ) -> Result<Field<DeviceId, T>>
    where
        T: DeserializeOwned + PartialEq,
    {
        let mut entries = BTreeMap::new();
        for (sender, message) in &self.latest {
            if *sender == local_id {
                continue;
            }
            if let Some(value) = message.export_at(path) {
                let export: ExchangeExport<T> = value.decode(path)?;
                entries.insert(*sender, export.into_value_for(local_id));
            }
        }
        Field::new(local_id, local, entries).map_err(RoundError::from)
    }
}
