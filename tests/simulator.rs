//! Integration tests for simulation runs and sweeps.

use std::sync::Arc;

use microcloud_sim::{
    DownloadEventKind, NodeOutcome, NoopObserver, RecordingObserver, SimulationParams, Simulator,
    TraceSample,
};

/// Vehicles driving east along parallel lanes at different speeds, entering
/// the trace at staggered times.
fn highway_trace(vehicles: usize, ticks: usize) -> Vec<TraceSample> {
    let mut rows = Vec::new();
    for v in 0..vehicles {
        let speed = 4.0 + (v % 5) as f64;
        let lane = (v % 3) as f64 * 4.0;
        let start = (v % 7) as f64;
        for t in 0..ticks {
            rows.push(TraceSample::new(
                format!("veh{}", v),
                start + t as f64,
                speed * t as f64,
                lane,
            ));
        }
    }
    rows
}

fn corridor(n: usize) -> Vec<(f64, f64)> {
    (0..n).map(|i| (30.0 + 60.0 * i as f64, 0.0)).collect()
}

fn params(workers: usize) -> SimulationParams {
    SimulationParams {
        range: 25.0,
        bandwidth: 1.0,
        block_size: 3.0,
        total_blocks: 6,
        blocks_per_microcloud: 2,
        workers,
        step: 1,
        ..SimulationParams::default()
    }
}

fn sorted(mut outcomes: Vec<NodeOutcome>) -> Vec<NodeOutcome> {
    outcomes.sort_by(|a, b| a.vehicle_id.cmp(&b.vehicle_id));
    outcomes
}

#[test]
fn test_one_outcome_per_vehicle() {
    let sim = Simulator::new(&highway_trace(12, 60), params(4)).unwrap();
    assert_eq!(sim.vehicle_count(), 12);

    let outcomes = sim.simulate(&corridor(4));
    assert_eq!(outcomes.len(), 12);
    for outcome in &outcomes {
        assert!(outcome.blocks_downloaded <= 6);
        assert_eq!(outcome.latency.is_some(), outcome.blocks_downloaded == 6);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let trace = highway_trace(20, 80);
    let coords = corridor(5);
    let sim = Simulator::new(&trace, params(8)).unwrap();

    let parallel = sorted(sim.simulate(&coords));

    let topology = sim.topology(&coords);
    let sequential: Vec<NodeOutcome> = sim
        .build_nodes(&topology)
        .into_iter()
        .map(|mut node| node.simulate(topology.microclouds(), &NoopObserver))
        .collect();

    assert_eq!(parallel, sorted(sequential));
}

#[test]
fn test_worker_count_does_not_change_outcomes() {
    let trace = highway_trace(15, 70);
    let coords = corridor(4);

    let one = Simulator::new(&trace, params(1)).unwrap();
    let many = Simulator::new(&trace, params(8)).unwrap();

    assert_eq!(sorted(one.simulate(&coords)), sorted(many.simulate(&coords)));
}

#[test]
fn test_repeated_runs_are_isolated() {
    let sim = Simulator::new(&highway_trace(10, 60), params(4)).unwrap();
    let coords = corridor(3);

    let first = sorted(sim.simulate(&coords));
    let second = sorted(sim.simulate(&coords));
    assert_eq!(first, second);
}

#[test]
fn test_sweep_rows_in_increasing_cloud_order() {
    let sim = Simulator::new(&highway_trace(8, 50), params(4)).unwrap();
    let report = sim.sweep(&corridor(3));

    let counts: Vec<usize> = report.rows.iter().map(|r| r.num_clouds).collect();
    assert_eq!(counts, vec![1, 2, 3]);
    assert_eq!(report.vehicles, 8);
    assert_eq!(report.total_blocks, 6);
}

#[test]
fn test_sweep_with_step() {
    let p = SimulationParams {
        step: 2,
        ..params(2)
    };
    let sim = Simulator::new(&highway_trace(4, 40), p).unwrap();
    let report = sim.sweep(&corridor(6));

    let counts: Vec<usize> = report.rows.iter().map(|r| r.num_clouds).collect();
    assert_eq!(counts, vec![1, 3, 5]);
}

#[test]
fn test_more_clouds_never_hurt_a_corridor() {
    // Every vehicle passes every microcloud once, in order; adding clouds
    // further down the road can only add completed blocks.
    let sim = Simulator::new(&highway_trace(10, 120), params(4)).unwrap();
    let report = sim.sweep(&corridor(6));

    for pair in report.rows.windows(2) {
        assert!(pair[1].block_completion_fraction >= pair[0].block_completion_fraction);
    }
    assert!(report.rows[0].block_completion_fraction > 0.0);
}

#[test]
fn test_latency_undefined_when_no_vehicle_completes() {
    // One microcloud serves only 2 of 6 blocks.
    let sim = Simulator::new(&highway_trace(5, 40), params(2)).unwrap();
    let report = sim.sweep(&corridor(1));

    let row = &report.rows[0];
    assert_eq!(row.fully_downloaded, 0);
    assert_eq!(row.average_latency, None);
    assert!(row.block_completion_fraction <= 2.0 / 6.0);
}

#[test]
fn test_parked_vehicles_complete_everything() {
    // Every vehicle sits next to a cloud serving the whole catalog.
    let p = SimulationParams {
        range: 10.0,
        block_size: 2.0,
        total_blocks: 3,
        blocks_per_microcloud: 3,
        ..params(4)
    };
    let rows: Vec<TraceSample> = (0..4)
        .flat_map(|v| (0..20).map(move |t| TraceSample::new(format!("p{}", v), t as f64, 0.0, 0.0)))
        .collect();
    let sim = Simulator::new(&rows, p).unwrap();
    let report = sim.sweep(&[(0.0, 0.0)]);

    let row = &report.rows[0];
    assert_eq!(row.fully_downloaded, 4);
    assert_eq!(row.block_completion_fraction, 1.0);
    assert_eq!(row.p5_blocks_received, 3.0);
    // (bind + 2 ticks) * 3 blocks, minus the first sample
    assert_eq!(row.average_latency, Some(8.0));
}

#[test]
fn test_observer_sees_every_vehicle() {
    let recorder = Arc::new(RecordingObserver::new());
    let sim = Simulator::new(&highway_trace(6, 60), params(3))
        .unwrap()
        .with_observer(recorder.clone());

    let outcomes = sim.simulate(&corridor(4));

    for outcome in &outcomes {
        let events = recorder.events_for(&outcome.vehicle_id);
        let completed = events
            .iter()
            .filter(|e| e.kind == DownloadEventKind::Completed)
            .count();
        assert_eq!(completed, outcome.blocks_downloaded);
    }
}

#[test]
fn test_empty_trace_yields_no_outcomes() {
    let sim = Simulator::new(&[], params(2)).unwrap();
    assert!(sim.simulate(&corridor(2)).is_empty());
}
