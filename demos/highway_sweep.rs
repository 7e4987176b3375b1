//! Highway Sweep Example
//!
//! Deploys microclouds along a synthetic four-lane highway and measures how
//! block completion and download latency improve as more of them are
//! switched on.
//!
//! Run with: `cargo run --example highway_sweep`
//! Pass a YAML/JSON configuration path as the first argument to override the
//! built-in deployment.

use microcloud_sim::{SimConfig, SimConfigBuilder, SimResult, Simulator, TraceSample};

// ============================================================================
// Scenario Configuration
// ============================================================================

const VEHICLES: usize = 300;
const TRACE_SECONDS: usize = 400;
const ROAD_LENGTH: f64 = 4000.0;
const NUM_MICROCLOUDS: usize = 20;

/// Vehicles enter at staggered times, drive at lane-dependent speeds and
/// leave the trace once they reach the end of the road.
fn synthetic_trace() -> Vec<TraceSample> {
    let mut rows = Vec::new();
    for v in 0..VEHICLES {
        let lane = v % 4;
        let speed = 18.0 + lane as f64 * 4.0 + (v % 7) as f64;
        let entry = (v * 3 % TRACE_SECONDS / 2) as f64;

        for t in 0..TRACE_SECONDS {
            let x = speed * t as f64;
            if x > ROAD_LENGTH {
                break;
            }
            rows.push(TraceSample::new(
                format!("veh{}", v),
                entry + t as f64,
                x,
                lane as f64 * 3.5,
            ));
        }
    }
    rows
}

fn default_config() -> SimResult<SimConfig> {
    let spacing = ROAD_LENGTH / NUM_MICROCLOUDS as f64;
    let coords = (0..NUM_MICROCLOUDS).map(|i| (spacing * (i as f64 + 0.5), 0.0));

    Ok(SimConfigBuilder::new()
        .range(80.0)
        .bandwidth(1.0)
        .block_size(5.0)
        .total_blocks(12)
        .blocks_per_microcloud(3)
        .workers(8)
        .step(2)
        .microclouds(coords)
        .build()?)
}

fn main() -> SimResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::from_file(path)?,
        None => default_config()?,
    };

    microcloud_sim::init_logging(&config.simulation.log_level);

    let trace = synthetic_trace();
    let simulator = Simulator::from_config(&trace, &config)?;
    let report = simulator.sweep(&config.microclouds);

    println!("{}", report.summary());
    Ok(())
}
