//! The in-memory network.
//!
//! One [`Engine`] per device of the topology. A tick runs one round on every
//! device and delivers each frozen message to the sender's current neighbors
//! at the end of the tick, so round K's broadcasts are what round K+1
//! observes. This is the synchronous-network execution of an aggregate
//! program.
//!
//! A device whose round fails keeps its previously committed state, sends
//! nothing this tick, and simply runs again next tick.

use crate::config::{ScheduleOrder, SimulatorConfig};
use crate::errors::{Result, SimulatorError};
use crate::topology::Topology;
use fieldcast_core::DeviceId;
use fieldcast_engine::{Engine, Message, RoundContext, RoundError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// What one tick produced.
#[derive(Debug)]
pub struct TickReport<R> {
    /// 1-based tick number
    pub round: u32,
    /// Program results of the devices whose round committed
    pub results: BTreeMap<DeviceId, R>,
    /// Errors of the devices whose round aborted
    pub failures: BTreeMap<DeviceId, RoundError>,
}

impl<R> TickReport<R> {
    /// Whether every device committed its round.
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// The committed result of one device, if its round succeeded.
    pub fn result_of(&self, id: DeviceId) -> Option<&R> {
        self.results.get(&id)
    }
}

/// A set of devices wired by a [`Topology`], each running its own engine.
#[derive(Debug)]
pub struct Network {
    topology: Topology,
    engines: BTreeMap<DeviceId, Engine>,
    config: SimulatorConfig,
    rng: ChaCha8Rng,
    round: u32,
}

impl Network {
    /// Build a network with one engine per topology device.
    pub fn new(topology: Topology, config: SimulatorConfig) -> Self {
        let engines = topology
            .devices()
            .map(|id| (id, Engine::new(id)))
            .collect();
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            topology,
            engines,
            config,
            rng,
            round: 0,
        }
    }

    /// Build a network with the default configuration.
    pub fn with_default_config(topology: Topology) -> Self {
        Self::new(topology, SimulatorConfig::default())
    }

    /// The wiring.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Number of ticks executed so far.
    pub fn rounds_run(&self) -> u32 {
        self.round
    }

    /// A device's engine.
    pub fn engine(&self, id: DeviceId) -> Result<&Engine> {
        self.engines.get(&id).ok_or(SimulatorError::UnknownDevice(id))
    }

    /// Link two devices from the next tick on.
    pub fn connect(&mut self, a: DeviceId, b: DeviceId) {
        self.topology.connect(a, b);
    }

    /// Unlink two devices and drop whatever messages they hold from each
    /// other, so their values stop appearing in fields immediately.
    pub fn disconnect(&mut self, a: DeviceId, b: DeviceId) {
        self.topology.disconnect(a, b);
        if let Some(engine) = self.engines.get_mut(&a) {
            engine.forget_neighbor(b);
        }
        if let Some(engine) = self.engines.get_mut(&b) {
            engine.forget_neighbor(a);
        }
    }

    fn schedule(&mut self) -> Vec<DeviceId> {
        let mut order: Vec<DeviceId> = self.engines.keys().copied().collect();
        if self.config.order == ScheduleOrder::Shuffled {
            order.shuffle(&mut self.rng);
        }
        order
    }

    /// Run one round on every device, then deliver all frozen messages.
    pub fn tick<R>(
        &mut self,
        program: impl Fn(&mut RoundContext<'_>) -> fieldcast_engine::Result<R>,
    ) -> TickReport<R> {
        self.round += 1;
        let mut results = BTreeMap::new();
        let mut failures = BTreeMap::new();
        let mut outbox: Vec<(DeviceId, Message)> = Vec::new();

        for id in self.schedule() {
            let Some(engine) = self.engines.get_mut(&id) else {
                continue;
            };
            match engine.run_round(&program) {
                Ok((result, message)) => {
                    results.insert(id, result);
                    outbox.push((id, message));
                }
                Err(err) => {
                    tracing::warn!(device = %id, error = %err, "device round aborted");
                    failures.insert(id, err);
                }
            }
        }

        for (sender, message) in outbox {
            for neighbor in self.topology.neighbors_of(sender) {
                if let Some(engine) = self.engines.get_mut(&neighbor) {
                    let accepted = engine.receive(message.clone());
                    debug_assert!(accepted.is_ok(), "idle engines accept messages");
                }
            }
        }

        tracing::info!(
            round = self.round,
            committed = results.len(),
            failed = failures.len(),
            "tick complete"
        );
        TickReport {
            round: self.round,
            results,
            failures,
        }
    }

    /// Run the configured number of rounds, returning the last tick's report.
    pub fn run<R>(
        &mut self,
        program: impl Fn(&mut RoundContext<'_>) -> fieldcast_engine::Result<R>,
    ) -> Option<TickReport<R>> {
        let mut last = None;
        for _ in 0..self.config.rounds {
            last = Some(self.tick(&program));
        }
        last
    }
}
