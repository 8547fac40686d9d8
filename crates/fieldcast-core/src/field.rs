//! The Field data type.
//!
//! A `Field<ID, T>` is a total mapping from a finite id set (the local
//! device plus its current neighbors) to values of type `T`. The local entry
//! is always present and distinguished from the neighbor entries.
//!
//! Internally a field is stored in one of three representations, chosen at
//! construction time from the content:
//!
//! - `Pointwise`: no neighbors at all;
//! - `Constant`: every neighbor carries the same value as the local entry;
//! - `General`: an ordered map of per-neighbor values.
//!
//! The representations are semantically interchangeable and never appear in
//! the public contract: equality and hashing are defined over the full
//! id→value mapping only.

use crate::errors::{FieldError, Result};
use std::collections::{btree_map, btree_set, BTreeMap, BTreeSet};
use std::fmt;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

/// One value per neighbor device, plus exactly one local entry.
#[derive(Clone)]
pub struct Field<ID, T> {
    local_id: ID,
    local: T,
    repr: Repr<ID, T>,
}

#[derive(Clone)]
enum Repr<ID, T> {
    Pointwise,
    Constant { ids: BTreeSet<ID> },
    General { entries: BTreeMap<ID, T> },
}

impl<ID: Ord, T> Field<ID, T> {
    /// Build a field from a local entry and a neighbor map.
    ///
    /// Fails with [`FieldError::SelfNeighbor`] if the local id appears among
    /// the neighbor keys: a device cannot be its own neighbor.
    pub fn new(local_id: ID, local: T, neighbors: BTreeMap<ID, T>) -> Result<Self>
    where
        ID: Debug,
        T: PartialEq,
    {
        if neighbors.contains_key(&local_id) {
            return Err(FieldError::self_neighbor(&local_id));
        }
        Ok(Self::normalized(local_id, local, neighbors))
    }

    /// Build a field with no neighbors at all.
    pub fn pointwise(local_id: ID, local: T) -> Self {
        Self {
            local_id,
            local,
            repr: Repr::Pointwise,
        }
    }

    // Picks the representation from the content. Callers guarantee the local
    // id is absent from `entries`.
    fn normalized(local_id: ID, local: T, entries: BTreeMap<ID, T>) -> Self
    where
        T: PartialEq,
    {
        let repr = if entries.is_empty() {
            Repr::Pointwise
        } else if entries.values().all(|v| *v == local) {
            Repr::Constant {
                ids: entries.into_keys().collect(),
            }
        } else {
            Repr::General { entries }
        };
        Self {
            local_id,
            local,
            repr,
        }
    }

    /// The id of the local device.
    pub fn local_id(&self) -> &ID {
        &self.local_id
    }

    /// The local entry's value; always defined.
    pub fn local(&self) -> &T {
        &self.local
    }

    /// Consume the field, keeping only the local value.
    pub fn into_local(self) -> T {
        self.local
    }

    /// Number of neighbor entries (local excluded).
    pub fn neighbor_count(&self) -> usize {
        match &self.repr {
            Repr::Pointwise => 0,
            Repr::Constant { ids } => ids.len(),
            Repr::General { entries } => entries.len(),
        }
    }

    /// Iterate over neighbor ids in ascending order.
    pub fn neighbor_ids(&self) -> NeighborIds<'_, ID, T> {
        NeighborIds {
            inner: self.neighbor_entries(),
        }
    }

    /// Iterate over `(id, value)` neighbor entries in ascending id order.
    pub fn neighbor_entries(&self) -> NeighborEntries<'_, ID, T> {
        let inner = match &self.repr {
            Repr::Pointwise => EntriesInner::Empty,
            Repr::Constant { ids } => EntriesInner::Constant {
                ids: ids.iter(),
                value: &self.local,
            },
            Repr::General { entries } => EntriesInner::General {
                entries: entries.iter(),
            },
        };
        NeighborEntries { inner }
    }

    /// The neighbor id set, cloned out.
    pub fn neighbor_set(&self) -> BTreeSet<ID>
    where
        ID: Clone,
    {
        self.neighbor_ids().cloned().collect()
    }

    /// Look up a neighbor value, `None` if `id` is not a neighbor.
    pub fn neighbor_lookup(&self, id: &ID) -> Option<&T> {
        match &self.repr {
            Repr::Pointwise => None,
            Repr::Constant { ids } => ids.contains(id).then_some(&self.local),
            Repr::General { entries } => entries.get(id),
        }
    }

    /// Look up any id in the field, the local one included.
    ///
    /// Local and neighbor lookups share one namespace; an absent id fails
    /// with [`FieldError::UnknownId`].
    pub fn get(&self, id: &ID) -> Result<&T>
    where
        ID: Debug,
    {
        if *id == self.local_id {
            return Ok(&self.local);
        }
        self.neighbor_lookup(id)
            .ok_or_else(|| FieldError::unknown_id(id))
    }

    /// Whether `other` covers exactly the same neighbor set.
    pub fn is_aligned_with<U>(&self, other: &Field<ID, U>) -> bool {
        self.neighbor_count() == other.neighbor_count()
            && self.neighbor_ids().eq(other.neighbor_ids())
    }

    /// Apply `f` to every entry, the local one included.
    ///
    /// The result is re-normalized, so a closure that is constant over a
    /// constant field keeps the constant representation.
    pub fn map<R>(&self, f: impl Fn(&ID, &T) -> R) -> Field<ID, R>
    where
        ID: Clone,
        R: PartialEq,
    {
        let local = f(&self.local_id, &self.local);
        let entries: BTreeMap<ID, R> = self
            .neighbor_entries()
            .map(|(id, v)| (id.clone(), f(id, v)))
            .collect();
        Field::normalized(self.local_id.clone(), local, entries)
    }

    /// Combine two fields entry-wise.
    ///
    /// Requires alignment: the neighbor sets must be identical. On mismatch
    /// fails with [`FieldError::AlignmentMismatch`] carrying the symmetric
    /// difference of the two id sets, which is always a programming defect in
    /// the aggregate program, never a recoverable condition.
    pub fn aligned_combine<U, R>(
        &self,
        other: &Field<ID, U>,
        f: impl Fn(&ID, &T, &U) -> R,
    ) -> Result<Field<ID, R>>
    where
        ID: Clone + Debug,
        R: PartialEq,
    {
        debug_assert!(
            self.local_id == other.local_id,
            "fields from different devices combined"
        );
        if !self.is_aligned_with(other) {
            let left: BTreeSet<&ID> = self.neighbor_ids().collect();
            let right: BTreeSet<&ID> = other.neighbor_ids().collect();
            return Err(FieldError::alignment_mismatch(
                left.difference(&right),
                right.difference(&left),
            ));
        }
        let local = f(&self.local_id, &self.local, &other.local);
        // Both entry iterators walk the same ascending id sequence.
        let entries: BTreeMap<ID, R> = self
            .neighbor_entries()
            .zip(other.neighbor_entries())
            .map(|((id, v), (_, u))| (id.clone(), f(id, v, u)))
            .collect();
        Ok(Field::normalized(self.local_id.clone(), local, entries))
    }

    /// Fold over neighbor values only; the local entry is excluded.
    pub fn fold<R>(&self, init: R, mut f: impl FnMut(R, &T) -> R) -> R {
        self.neighbor_entries().fold(init, |acc, (_, v)| f(acc, v))
    }

    /// Fold over the local value first, then every neighbor value.
    pub fn fold_with_local<R>(&self, init: R, mut f: impl FnMut(R, &T) -> R) -> R {
        let acc = f(init, &self.local);
        self.fold(acc, f)
    }

    #[cfg(test)]
    fn repr_class(&self) -> &'static str {
        match &self.repr {
            Repr::Pointwise => "pointwise",
            Repr::Constant { .. } => "constant",
            Repr::General { .. } => "general",
        }
    }

    // Test-only constructors that bypass normalization, used to verify that
    // the representations are observationally interchangeable.
    #[cfg(test)]
    fn forced_constant(local_id: ID, local: T, ids: BTreeSet<ID>) -> Self {
        Self {
            local_id,
            local,
            repr: Repr::Constant { ids },
        }
    }

    #[cfg(test)]
    fn forced_general(local_id: ID, local: T, entries: BTreeMap<ID, T>) -> Self {
        Self {
            local_id,
            local,
            repr: Repr::General { entries },
        }
    }
}

impl<ID: Ord, T: PartialEq> PartialEq for Field<ID, T> {
    fn eq(&self, other: &Self) -> bool {
        self.local_id == other.local_id
            && self.local == other.local
            && self.neighbor_count() == other.neighbor_count()
            && self
                .neighbor_entries()
                .zip(other.neighbor_entries())
                .all(|((ia, va), (ib, vb))| ia == ib && va == vb)
    }
}

impl<ID: Ord, T: Eq> Eq for Field<ID, T> {}

impl<ID: Ord + Hash, T: Hash> Hash for Field<ID, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.local_id.hash(state);
        self.local.hash(state);
        state.write_usize(self.neighbor_count());
        for (id, value) in self.neighbor_entries() {
            id.hash(state);
            value.hash(state);
        }
    }
}

impl<ID: Ord + Debug, T: Debug> fmt::Debug for Field<ID, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("local_id", &self.local_id)
            .field("local", &self.local)
            .field("neighbors", &DebugEntries { field: self })
            .finish()
    }
}

struct DebugEntries<'a, ID, T> {
    field: &'a Field<ID, T>,
}

impl<ID: Ord + Debug, T: Debug> fmt::Debug for DebugEntries<'_, ID, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.field.neighbor_entries()).finish()
    }
}

/// Iterator over `(id, value)` neighbor entries in ascending id order.
pub struct NeighborEntries<'a, ID, T> {
    inner: EntriesInner<'a, ID, T>,
}

enum EntriesInner<'a, ID, T> {
    Empty,
    Constant {
        ids: btree_set::Iter<'a, ID>,
        value: &'a T,
    },
    General {
        entries: btree_map::Iter<'a, ID, T>,
    },
}

impl<'a, ID, T> Iterator for NeighborEntries<'a, ID, T> {
    type Item = (&'a ID, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            EntriesInner::Empty => None,
            EntriesInner::Constant { ids, value } => ids.next().map(|id| (id, *value)),
            EntriesInner::General { entries } => entries.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            EntriesInner::Empty => (0, Some(0)),
            EntriesInner::Constant { ids, .. } => ids.size_hint(),
            EntriesInner::General { entries } => entries.size_hint(),
        }
    }
}

impl<ID, T> ExactSizeIterator for NeighborEntries<'_, ID, T> {}

/// Iterator over neighbor ids in ascending order.
pub struct NeighborIds<'a, ID, T> {
    inner: NeighborEntries<'a, ID, T>,
}

impl<'a, ID, T> Iterator for NeighborIds<'a, ID, T> {
    type Item = &'a ID;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(id, _)| id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::DeviceId;
    use std::collections::hash_map::DefaultHasher;

    fn id(raw: u64) -> DeviceId {
        DeviceId::new(raw)
    }

    fn hash_of<H: Hash>(value: &H) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn neighbors(pairs: &[(u64, i32)]) -> BTreeMap<DeviceId, i32> {
        pairs.iter().map(|&(raw, v)| (id(raw), v)).collect()
    }

    #[test]
    fn construction_picks_representation_from_content() {
        let empty = Field::new(id(0), 7, BTreeMap::new()).unwrap();
        assert_eq!(empty.repr_class(), "pointwise");

        let constant = Field::new(id(0), 7, neighbors(&[(1, 7), (2, 7)])).unwrap();
        assert_eq!(constant.repr_class(), "constant");

        let general = Field::new(id(0), 7, neighbors(&[(1, 7), (2, 9)])).unwrap();
        assert_eq!(general.repr_class(), "general");
    }

    #[test]
    fn construction_rejects_self_neighbor() {
        let err = Field::new(id(3), 0, neighbors(&[(3, 1)])).unwrap_err();
        assert!(matches!(err, FieldError::SelfNeighbor { .. }));
    }

    #[test]
    fn get_shares_one_namespace() {
        let field = Field::new(id(0), 10, neighbors(&[(1, 20)])).unwrap();
        assert_eq!(field.get(&id(0)).unwrap(), &10);
        assert_eq!(field.get(&id(1)).unwrap(), &20);
        assert!(matches!(
            field.get(&id(9)),
            Err(FieldError::UnknownId { .. })
        ));
    }

    #[test]
    fn representations_are_observationally_equal() {
        let ids: BTreeSet<DeviceId> = [id(1), id(2)].into_iter().collect();
        let forced_constant = Field::forced_constant(id(0), 7, ids);
        let forced_general = Field::forced_general(id(0), 7, neighbors(&[(1, 7), (2, 7)]));
        let normalized = Field::new(id(0), 7, neighbors(&[(1, 7), (2, 7)])).unwrap();

        assert_eq!(forced_constant, forced_general);
        assert_eq!(forced_general, normalized);
        assert_eq!(hash_of(&forced_constant), hash_of(&forced_general));
        assert_eq!(hash_of(&forced_general), hash_of(&normalized));

        for field in [&forced_constant, &forced_general, &normalized] {
            assert_eq!(field.get(&id(1)).unwrap(), &7);
            assert_eq!(field.fold(0, |acc, v| acc + v), 14);
            assert_eq!(
                field.map(|_, v| v * 2),
                normalized.map(|_, v| v * 2),
            );
        }
    }

    #[test]
    fn map_keeps_constant_class_for_constant_closures() {
        let constant = Field::new(id(0), 3, neighbors(&[(1, 3), (2, 3)])).unwrap();
        let doubled = constant.map(|_, v| v * 2);
        assert_eq!(doubled.repr_class(), "constant");
        assert_eq!(doubled.local(), &6);

        let keyed = constant.map(|device, v| v + device.raw() as i32);
        assert_eq!(keyed.repr_class(), "general");
    }

    #[test]
    fn aligned_combine_requires_equal_neighbor_sets() {
        let a = Field::new(id(0), 1, neighbors(&[(1, 2), (2, 3)])).unwrap();
        let b = Field::new(id(0), 10, neighbors(&[(1, 20), (2, 30)])).unwrap();
        let sum = a.aligned_combine(&b, |_, x, y| x + y).unwrap();
        assert_eq!(sum.local(), &11);
        assert_eq!(sum.get(&id(2)).unwrap(), &33);
        assert_eq!(sum.neighbor_set(), a.neighbor_set());

        let c = Field::new(id(0), 10, neighbors(&[(1, 20), (3, 30)])).unwrap();
        match a.aligned_combine(&c, |_, x, y| x + y).unwrap_err() {
            FieldError::AlignmentMismatch {
                left_only,
                right_only,
            } => {
                assert_eq!(left_only, vec![format!("{:?}", id(2))]);
                assert_eq!(right_only, vec![format!("{:?}", id(3))]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fold_excludes_local_unless_asked() {
        let field = Field::new(id(0), 100, neighbors(&[(1, 1), (2, 2)])).unwrap();
        assert_eq!(field.fold(0, |acc, v| acc + v), 3);
        assert_eq!(field.fold_with_local(0, |acc, v| acc + v), 103);

        let lonely = Field::pointwise(id(0), 100);
        assert_eq!(lonely.fold(0, |acc, v| acc + v), 0);
        assert_eq!(lonely.fold_with_local(0, |acc, v| acc + v), 100);
    }
}
