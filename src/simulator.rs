//! Simulation orchestration.
//!
//! The [`Simulator`] owns the partitioned movement trace. For each
//! configuration it builds a [`Topology`], creates fresh vehicle state,
//! runs one task per vehicle on a fixed-size worker pool and returns once
//! every task has finished. [`Simulator::sweep`] repeats this for growing
//! prefixes of the microcloud list and reduces each run to a [`SweepRow`].
//!
//! # Feature Flag
//!
//! Vehicles run on a rayon pool when the `parallel` feature is enabled (the
//! default) and sequentially otherwise. Outcomes are identical either way;
//! only their order differs.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, SimConfig, SimulationParams};
use crate::event::{DownloadObserver, NoopObserver};
use crate::node::{NodeOutcome, VehicleNode};
use crate::stats::{summarize, SweepReport, SweepRow, Timer};
use crate::topology::Topology;
use crate::trace::{partition_by_vehicle, TraceSample, VehicleTrack};
use crate::types::Coordinate;

/// Errors returned by the simulator.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[cfg(feature = "parallel")]
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Requested {requested} microclouds but only {available} positions were supplied")]
    NotEnoughMicroclouds { requested: usize, available: usize },
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;

/// Runs vehicle traces against microcloud deployments.
pub struct Simulator {
    tracks: Vec<VehicleTrack>,
    params: SimulationParams,
    observer: Arc<dyn DownloadObserver>,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl Simulator {
    /// Creates a simulator from raw trace rows.
    ///
    /// Rows are grouped by vehicle and each vehicle's samples sorted by
    /// timestamp. `params` is validated and a worker pool of
    /// `params.workers` threads is created.
    pub fn new(samples: &[TraceSample], params: SimulationParams) -> SimResult<Self> {
        params.validate()?;

        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.workers)
            .thread_name(|i| format!("microcloud-worker-{}", i))
            .build()?;

        Ok(Self {
            tracks: partition_by_vehicle(samples),
            params,
            observer: Arc::new(NoopObserver),
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    /// Creates a simulator using the parameters of a loaded configuration.
    pub fn from_config(samples: &[TraceSample], config: &SimConfig) -> SimResult<Self> {
        Self::new(samples, config.simulation.clone())
    }

    /// Routes download transitions of every vehicle to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn DownloadObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn tracks(&self) -> &[VehicleTrack] {
        &self.tracks
    }

    /// Returns the number of vehicles in the trace.
    pub fn vehicle_count(&self) -> usize {
        self.tracks.len()
    }

    /// Builds the topology for the given microcloud positions.
    pub fn topology(&self, coords: &[Coordinate]) -> Topology {
        Topology::build(coords, &self.params)
    }

    /// Creates fresh vehicle state for every track, all sharing the
    /// topology's block list.
    pub fn build_nodes(&self, topology: &Topology) -> Vec<VehicleNode> {
        self.tracks
            .iter()
            .map(|track| VehicleNode::from_track(track, Arc::clone(topology.blocks())))
            .collect()
    }

    /// Runs every vehicle against a deployment at `coords`.
    ///
    /// Blocks until all vehicles finish. The outcomes come back in no
    /// particular order.
    pub fn simulate(&self, coords: &[Coordinate]) -> Vec<NodeOutcome> {
        let topology = self.topology(coords);
        info!(
            vehicles = self.tracks.len(),
            microclouds = topology.len(),
            "finished setup, starting simulation"
        );
        let timer = Timer::start();
        let outcomes = self.run_topology(&topology);
        debug!(
            microclouds = topology.len(),
            wall_time_ms = timer.elapsed_ms(),
            "simulation finished"
        );
        outcomes
    }

    /// Runs every vehicle against an already built topology.
    #[cfg(feature = "parallel")]
    pub fn run_topology(&self, topology: &Topology) -> Vec<NodeOutcome> {
        let clouds = topology.microclouds();
        let blocks = topology.blocks();
        let observer: &dyn DownloadObserver = self.observer.as_ref();

        self.pool.install(|| {
            self.tracks
                .par_iter()
                .map(|track| VehicleNode::from_track(track, Arc::clone(blocks)).simulate(clouds, observer))
                .collect()
        })
    }

    /// Runs every vehicle against an already built topology.
    #[cfg(not(feature = "parallel"))]
    pub fn run_topology(&self, topology: &Topology) -> Vec<NodeOutcome> {
        let clouds = topology.microclouds();
        let blocks = topology.blocks();
        let observer: &dyn DownloadObserver = self.observer.as_ref();

        self.tracks
            .iter()
            .map(|track| VehicleNode::from_track(track, Arc::clone(blocks)).simulate(clouds, observer))
            .collect()
    }

    /// Microcloud counts visited by a sweep: `1, 1 + step, ...` up to `max`.
    pub fn sweep_counts(max: usize, step: usize) -> impl Iterator<Item = usize> {
        (1..=max).step_by(step.max(1))
    }

    /// Sweeps over every prefix size of `coords` using the configured step.
    pub fn sweep(&self, coords: &[Coordinate]) -> SweepReport {
        self.sweep_prefixes(coords, coords.len())
    }

    /// Sweeps up to `max_clouds` microclouds, failing if fewer positions
    /// were supplied.
    pub fn sweep_up_to(&self, coords: &[Coordinate], max_clouds: usize) -> SimResult<SweepReport> {
        if max_clouds > coords.len() {
            return Err(SimError::NotEnoughMicroclouds {
                requested: max_clouds,
                available: coords.len(),
            });
        }
        Ok(self.sweep_prefixes(coords, max_clouds))
    }

    fn sweep_prefixes(&self, coords: &[Coordinate], max_clouds: usize) -> SweepReport {
        let timer = Timer::start();
        let mut report = SweepReport::new(self.tracks.len(), self.params.total_blocks);

        for num_clouds in Self::sweep_counts(max_clouds, self.params.step) {
            info!(num_clouds, "starting simulation");
            report.rows.push(self.sweep_row(&coords[..num_clouds]));
        }

        report.total_wall_time_ms = timer.elapsed_ms();
        report
    }

    /// Runs one configuration and reduces it to a summary row.
    pub fn sweep_row(&self, coords: &[Coordinate]) -> SweepRow {
        let outcomes = self.simulate(coords);
        summarize(coords.len(), &outcomes, self.params.total_blocks)
    }
}

/// Runs a full sweep over the microclouds of `config`.
pub fn run_config(samples: &[TraceSample], config: &SimConfig) -> SimResult<SweepReport> {
    config.validate()?;
    let simulator = Simulator::from_config(samples, config)?;
    Ok(simulator.sweep(&config.microclouds))
}
