//! # Microcloud Simulator
//!
//! Simulates block-based content delivery from fixed, short-range roadside
//! "microclouds" to moving vehicles, to measure how download completion and
//! latency scale with the number of microclouds deployed.
//!
//! ## Model
//!
//! - A file is split into equally sized [`Block`]s.
//! - Each [`Microcloud`] has a position, a radio range, a per-tick bandwidth
//!   and a fixed subset of the blocks, assigned round-robin.
//! - Each vehicle ([`VehicleNode`]) replays its recorded movement trace. On
//!   every sample it binds idle microclouds in range to blocks it still
//!   needs, accumulates bandwidth on bound ones, and loses all partial
//!   progress on a block when it leaves the serving microcloud's range.
//! - The [`Simulator`] runs every vehicle in parallel against a deployment
//!   and sweeps over growing prefixes of the microcloud list, reducing each
//!   run to a [`SweepRow`].
//!
//! ## Features
//!
//! - `parallel` (default) - Run vehicles on a rayon worker pool
//!
//! ## Quick Start
//!
//! ```rust
//! use microcloud_sim::{SimulationParams, Simulator, TraceSample};
//!
//! let trace: Vec<TraceSample> = (0..20)
//!     .map(|t| TraceSample::new("veh0", t as f64, t as f64 * 10.0, 0.0))
//!     .collect();
//!
//! let params = SimulationParams { range: 50.0, workers: 2, ..Default::default() };
//! let simulator = Simulator::new(&trace, params).unwrap();
//!
//! let report = simulator.sweep(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0)]);
//! assert_eq!(report.rows.len(), 3);
//! println!("{}", report.summary());
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use microcloud_sim::{run_config, SimConfig};
//!
//! let config = SimConfig::from_yaml_file("deployment.yaml")?;
//! let report = run_config(&trace, &config)?;
//! report.to_csv_file("results.csv")?;
//! ```

pub mod types;
pub mod block;
pub mod microcloud;
pub mod trace;
pub mod event;
pub mod node;
pub mod topology;
pub mod config;
pub mod stats;
pub mod simulator;

// Re-export commonly used types
pub use types::{BlockId, Coordinate, MicrocloudId, SimTime, VehicleId};
pub use block::Block;
pub use microcloud::Microcloud;
pub use trace::{partition_by_vehicle, TracePoint, TraceSample, VehicleTrack};
pub use event::{
    DownloadEvent, DownloadEventKind, DownloadObserver, NoopObserver, RecordedEvent,
    RecordingObserver, TracingObserver,
};
pub use node::{Binding, BlockStatus, NodeOutcome, VehicleNode, UNBOUND};
pub use topology::Topology;
pub use config::{ConfigError, SimConfig, SimConfigBuilder, SimulationParams};
pub use stats::{mean, percentile, summarize, SweepReport, SweepRow, Timer};
pub use simulator::{run_config, SimError, SimResult, Simulator};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging. `RUST_LOG`
/// takes precedence over `level` when set.
///
/// # Example
///
/// ```rust,ignore
/// microcloud_sim::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
