//! Proptest strategies for fieldcast core types.

use fieldcast_core::{DeviceId, Field};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Any device id from a small ordinal range.
pub fn arb_device_id() -> impl Strategy<Value = DeviceId> {
    (0u64..64).prop_map(DeviceId::new)
}

/// A neighbor map over non-zero device ids (so `DeviceId(0)` is always free
/// to act as the local device).
pub fn arb_neighbor_map() -> impl Strategy<Value = BTreeMap<DeviceId, i64>> {
    prop::collection::btree_map(1u64..64, any::<i64>(), 0..10)
        .prop_map(|m| m.into_iter().map(|(k, v)| (DeviceId::new(k), v)).collect())
}

/// A well-formed field with `DeviceId(0)` as the local device.
pub fn arb_field() -> impl Strategy<Value = Field<DeviceId, i64>> {
    (any::<i64>(), arb_neighbor_map()).prop_map(|(local, neighbors)| {
        Field::new(DeviceId::new(0), local, neighbors)
            .expect("strategy never emits a self-neighbor")
    })
}
