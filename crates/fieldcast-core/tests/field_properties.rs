//! Property-based tests for the field alignment laws.
//!
//! Verified properties:
//! - combining fields with equal neighbor sets always succeeds and preserves
//!   the neighbor set;
//! - combining fields with any non-empty symmetric difference always fails
//!   with `AlignmentMismatch`;
//! - `map` never changes the neighbor set.

use fieldcast_core::{DeviceId, Field, FieldError};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeMap;

fn arb_neighbors() -> impl Strategy<Value = BTreeMap<DeviceId, i64>> {
    prop::collection::btree_map(1u64..40, any::<i64>(), 0..8)
        .prop_map(|m| m.into_iter().map(|(k, v)| (DeviceId::new(k), v)).collect())
}

proptest! {
    /// Property: alignment symmetry. Equal neighbor sets always combine,
    /// and the result covers exactly the left field's neighbors.
    #[test]
    fn combine_succeeds_on_equal_neighbor_sets(
        neighbors in arb_neighbors(),
        local_a in any::<i64>(),
        local_b in any::<i64>()
    ) {
        let a = Field::new(DeviceId::new(0), local_a, neighbors.clone()).unwrap();
        let shifted: BTreeMap<DeviceId, i64> =
            neighbors.iter().map(|(k, v)| (*k, v.wrapping_mul(3))).collect();
        let b = Field::new(DeviceId::new(0), local_b, shifted).unwrap();

        let combined = a
            .aligned_combine(&b, |_, x, y| x.wrapping_add(*y))
            .expect("aligned fields must combine");
        prop_assert_eq!(combined.neighbor_set(), a.neighbor_set());
        prop_assert_eq!(combined.neighbor_count(), a.neighbor_count());
    }

    /// Property: alignment failure. Any non-empty symmetric difference of
    /// the neighbor sets is rejected.
    #[test]
    fn combine_fails_on_different_neighbor_sets(
        left in arb_neighbors(),
        right in arb_neighbors(),
        local in any::<i64>()
    ) {
        let a = Field::new(DeviceId::new(0), local, left).unwrap();
        let b = Field::new(DeviceId::new(0), local, right).unwrap();
        prop_assume!(a.neighbor_set() != b.neighbor_set());

        let err = a.aligned_combine(&b, |_, x, y| x.wrapping_add(*y)).unwrap_err();
        match err {
            FieldError::AlignmentMismatch { left_only, right_only } => {
                prop_assert!(!left_only.is_empty() || !right_only.is_empty());
            }
            other => return Err(TestCaseError::fail(format!("unexpected error: {other}"))),
        }
    }

    /// Property: `map` applies to every entry but never changes the id set.
    #[test]
    fn map_preserves_neighbor_set(neighbors in arb_neighbors(), local in any::<i64>()) {
        let field = Field::new(DeviceId::new(0), local, neighbors).unwrap();
        let mapped = field.map(|_, v| v.wrapping_sub(1));
        prop_assert_eq!(mapped.neighbor_set(), field.neighbor_set());
        prop_assert_eq!(*mapped.local(), field.local().wrapping_sub(1));
    }
}
