//! Per-device state store.
//!
//! The store maps each path to the value this device exported there in the
//! previous round. It is owned exclusively by one device's engine, read
//! during a round and replaced wholesale at commit: paths not re-exported in
//! the new round are forgotten, which keeps the store bounded and lets a
//! program retire stale state by simply not revisiting a code path.

use crate::errors::Result;
use crate::path::Path;
use crate::wire::SerializedValue;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Previous-round exports, keyed by path.
#[derive(Debug, Default)]
pub struct StateStore {
    entries: HashMap<Path, SerializedValue>,
}

impl StateStore {
    /// Create an empty store (a device before its first committed round).
    pub fn new() -> Self {
        Self::default()
    }

    /// The previous round's export at `path`.
    ///
    /// `None` means the path was not exported last round (first round, or a
    /// newly reached code path). A value whose shape no longer matches `T` is
    /// a fatal [`crate::RoundError::UninitializedState`].
    pub fn get<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match self.entries.get(path) {
            None => Ok(None),
            Some(value) => value.decode::<T>(path).map(Some),
        }
    }

    /// Replace the contents with exactly the just-finished round's exports.
    pub fn commit(&mut self, exports: IndexMap<Path, SerializedValue>) {
        self.entries = exports.into_iter().collect();
        tracing::trace!(paths = self.entries.len(), "state store committed");
    }

    /// Whether a previous-round value exists at `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of retained paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the retained paths.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys()
    }
}
