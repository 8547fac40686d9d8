//! Undirected neighbor relation between devices.

use fieldcast_core::DeviceId;
use std::collections::{BTreeMap, BTreeSet};

/// Which devices can hear which.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    links: BTreeMap<DeviceId, BTreeSet<DeviceId>>,
}

impl Topology {
    /// An empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// `n` devices in a line: `0 -- 1 -- ... -- n-1`.
    pub fn line(n: u64) -> Self {
        let mut topology = Self::new();
        for i in 0..n {
            topology.add_device(DeviceId::new(i));
        }
        for i in 1..n {
            topology.connect(DeviceId::new(i - 1), DeviceId::new(i));
        }
        topology
    }

    /// `n` devices in a ring.
    pub fn ring(n: u64) -> Self {
        let mut topology = Self::line(n);
        if n > 2 {
            topology.connect(DeviceId::new(0), DeviceId::new(n - 1));
        }
        topology
    }

    /// `n` fully connected devices.
    pub fn full(n: u64) -> Self {
        let mut topology = Self::new();
        for i in 0..n {
            topology.add_device(DeviceId::new(i));
        }
        for i in 0..n {
            for j in (i + 1)..n {
                topology.connect(DeviceId::new(i), DeviceId::new(j));
            }
        }
        topology
    }

    /// Add a device with no links yet.
    pub fn add_device(&mut self, id: DeviceId) {
        self.links.entry(id).or_default();
    }

    /// Link two devices both ways. Self-links are ignored: a device is never
    /// its own neighbor.
    pub fn connect(&mut self, a: DeviceId, b: DeviceId) {
        if a == b {
            return;
        }
        self.links.entry(a).or_default().insert(b);
        self.links.entry(b).or_default().insert(a);
    }

    /// Remove the link between two devices, if present.
    pub fn disconnect(&mut self, a: DeviceId, b: DeviceId) {
        if let Some(peers) = self.links.get_mut(&a) {
            peers.remove(&b);
        }
        if let Some(peers) = self.links.get_mut(&b) {
            peers.remove(&a);
        }
    }

    /// Whether the topology knows this device.
    pub fn contains(&self, id: DeviceId) -> bool {
        self.links.contains_key(&id)
    }

    /// Whether `a` and `b` are linked.
    pub fn linked(&self, a: DeviceId, b: DeviceId) -> bool {
        self.links
            .get(&a)
            .is_some_and(|peers| peers.contains(&b))
    }

    /// The neighbors of `id`, in ascending order.
    pub fn neighbors_of(&self, id: DeviceId) -> impl Iterator<Item = DeviceId> + '_ {
        self.links
            .get(&id)
            .into_iter()
            .flat_map(|peers| peers.iter().copied())
    }

    /// All devices, in ascending order.
    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.links.keys().copied()
    }

    /// Number of devices.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the topology is empty.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
