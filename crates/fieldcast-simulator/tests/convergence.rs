//! Multi-device scenarios: hop-by-hop propagation on a line, convergence of
//! a gossip maximum on rings, schedule-order independence, and neighborhood
//! shrink on disconnect.

use fieldcast_core::DeviceId;
use fieldcast_engine::{Result, RoundContext};
use fieldcast_simulator::{Network, ScheduleOrder, SimulatorConfig, Topology};
use fieldcast_testkit::init_test_tracing;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn id(raw: u64) -> DeviceId {
    DeviceId::new(raw)
}

/// `share` a running maximum; device 0 is seeded, everyone else is not.
fn gossip_max(ctx: &mut RoundContext<'_>) -> Result<u64> {
    let seed = if ctx.device() == DeviceId::new(0) { 5 } else { 0 };
    ctx.share(0u64, move |field| {
        field.fold_with_local(seed, |acc, v| acc.max(*v))
    })
}

#[test]
fn seeded_value_walks_the_line_one_hop_per_round() {
    init_test_tracing();
    // 0 -- 1 -- 2: devices 0 and 2 are not directly connected.
    let mut network = Network::with_default_config(Topology::line(3));

    let report = network.tick(gossip_max);
    assert_eq!(report.result_of(id(0)), Some(&5));
    assert_eq!(report.result_of(id(1)), Some(&0));
    assert_eq!(report.result_of(id(2)), Some(&0));

    // One hop: the middle device hears the seed.
    let report = network.tick(gossip_max);
    assert_eq!(report.result_of(id(1)), Some(&5));
    assert_eq!(report.result_of(id(2)), Some(&0), "two hops away, not yet");

    // Two hops: the far end stabilizes too.
    let report = network.tick(gossip_max);
    assert_eq!(report.result_of(id(0)), Some(&5));
    assert_eq!(report.result_of(id(1)), Some(&5));
    assert_eq!(report.result_of(id(2)), Some(&5));
}

#[test]
fn schedule_order_is_not_observable() {
    init_test_tracing();
    let sequential = SimulatorConfig {
        rounds: 4,
        order: ScheduleOrder::Sequential,
        ..SimulatorConfig::default()
    };
    let shuffled = SimulatorConfig {
        rounds: 4,
        seed: 42,
        order: ScheduleOrder::Shuffled,
    };

    let mut a = Network::new(Topology::ring(5), sequential);
    let mut b = Network::new(Topology::ring(5), shuffled);
    for _ in 0..4 {
        let report_a = a.tick(gossip_max);
        let report_b = b.tick(gossip_max);
        assert!(report_a.all_succeeded() && report_b.all_succeeded());
        assert_eq!(
            report_a.results, report_b.results,
            "delivery at tick end makes device order invisible"
        );
    }
}

#[test]
fn disconnect_shrinks_the_neighborhood() {
    init_test_tracing();
    let observe = |ctx: &mut RoundContext<'_>| ctx.neighboring(ctx.device().raw());

    let mut network = Network::with_default_config(Topology::full(3));
    network.tick(observe);
    let report = network.tick(observe);
    assert_eq!(report.result_of(id(1)).unwrap().neighbor_count(), 2);

    network.disconnect(id(0), id(1));
    let report = network.tick(observe);
    let field = report.result_of(id(1)).unwrap();
    assert_eq!(field.neighbor_count(), 1);
    assert!(field.neighbor_lookup(&id(0)).is_none());

    network.connect(id(0), id(1));
    network.tick(observe);
    let report = network.tick(observe);
    assert_eq!(
        report.result_of(id(1)).unwrap().neighbor_count(),
        2,
        "reconnecting grows the field back"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Property: on any connected ring, gossiping the maximum seed converges
    /// everywhere within one full trip around the ring.
    #[test]
    fn ring_gossip_converges_to_the_global_max(
        seeds in prop::collection::vec(0u64..1_000, 3..8),
        shuffle_seed in any::<u64>()
    ) {
        let n = seeds.len() as u64;
        let by_device: BTreeMap<DeviceId, u64> = seeds
            .iter()
            .enumerate()
            .map(|(i, &s)| (DeviceId::new(i as u64), s))
            .collect();
        let global_max = *seeds.iter().max().expect("non-empty");

        let config = SimulatorConfig {
            rounds: n as u32 + 1,
            seed: shuffle_seed,
            order: ScheduleOrder::Shuffled,
        };
        let mut network = Network::new(Topology::ring(n), config);
        let program = |ctx: &mut RoundContext<'_>| -> Result<u64> {
            let seed = by_device[&ctx.device()];
            ctx.share(0u64, move |field| {
                field.fold_with_local(seed, |acc, v| acc.max(*v))
            })
        };

        let report = network.run(program).expect("at least one round ran");
        prop_assert!(report.all_succeeded());
        for device in network.topology().devices() {
            prop_assert_eq!(report.result_of(device), Some(&global_max));
        }
    }
}
