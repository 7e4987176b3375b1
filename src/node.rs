//! Vehicle nodes and the per-block download state machine.
//!
//! Each vehicle owns private download state for every block in the catalog
//! and is driven one trace sample at a time against every microcloud of the
//! topology, in topology order. Per (vehicle, microcloud) pair exactly one of
//! three rules fires on each sample:
//!
//! 1. **Out of range while bound**: the download is aborted and its progress
//!    is discarded; a later encounter starts the block from zero.
//! 2. **In range and unbound**: the first catalog block the microcloud
//!    serves, that is unfinished and not already being fetched from another
//!    microcloud, becomes bound to it.
//! 3. **In range and bound**: one tick of bandwidth is added to the bound
//!    block; on reaching its size the block completes and the binding is
//!    released.
//!
//! Out of range and unbound is a no-op.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::block::Block;
use crate::event::{DownloadEvent, DownloadEventKind, DownloadObserver};
use crate::microcloud::Microcloud;
use crate::trace::{TracePoint, VehicleTrack};
use crate::types::{MicrocloudId, SimTime, VehicleId};

/// Download status of one block on one vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockStatus {
    #[default]
    Idle,
    Downloading,
}

/// What a microcloud is currently serving to a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Binding {
    /// Not serving anything to this vehicle.
    Unbound,
    /// Serving the block at this catalog index.
    Bound(usize),
}

/// Binding of every microcloud a vehicle has not been bound to yet.
pub const UNBOUND: Binding = Binding::Unbound;

/// Terminal result of one vehicle's simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeOutcome {
    pub vehicle_id: VehicleId,
    /// Number of blocks fully downloaded
    pub blocks_downloaded: usize,
    /// Time from the first trace sample until the last block completed;
    /// `None` if the vehicle never completed the whole catalog
    pub latency: Option<SimTime>,
}

/// One vehicle and its download state.
#[derive(Clone, Debug)]
pub struct VehicleNode {
    id: VehicleId,
    trace: Arc<[TracePoint]>,
    blocks: Arc<[Block]>,
    progress: Vec<f64>,
    status: Vec<BlockStatus>,
    bindings: HashMap<MicrocloudId, Binding>,
    downloaded: usize,
    start_time: Option<SimTime>,
    latency: Option<SimTime>,
}

impl VehicleNode {
    /// Creates a vehicle with a time-ordered trace and the global catalog.
    pub fn new(id: impl Into<VehicleId>, trace: Arc<[TracePoint]>, blocks: Arc<[Block]>) -> Self {
        let n = blocks.len();
        let start_time = trace.first().map(|p| p.time);
        Self {
            id: id.into(),
            trace,
            blocks,
            progress: vec![0.0; n],
            status: vec![BlockStatus::Idle; n],
            bindings: HashMap::new(),
            downloaded: 0,
            start_time,
            latency: None,
        }
    }

    /// Creates a vehicle from a partitioned trace track.
    pub fn from_track(track: &VehicleTrack, blocks: Arc<[Block]>) -> Self {
        Self::new(track.vehicle_id.clone(), Arc::clone(&track.points), blocks)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn trace(&self) -> &[TracePoint] {
        &self.trace
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Accumulated progress of the block at `index`.
    pub fn progress(&self, index: usize) -> f64 {
        self.progress[index]
    }

    pub fn status(&self, index: usize) -> BlockStatus {
        self.status[index]
    }

    /// Current binding of microcloud `cloud`; [`UNBOUND`] if it never bound.
    pub fn binding(&self, cloud: MicrocloudId) -> Binding {
        self.bindings.get(&cloud).copied().unwrap_or(UNBOUND)
    }

    /// Number of blocks fully downloaded so far.
    pub fn downloaded(&self) -> usize {
        self.downloaded
    }

    pub fn latency(&self) -> Option<SimTime> {
        self.latency
    }

    pub fn is_complete(&self) -> bool {
        self.downloaded == self.blocks.len()
    }

    /// Snapshot of the current state as a terminal outcome.
    pub fn outcome(&self) -> NodeOutcome {
        NodeOutcome {
            vehicle_id: self.id.clone(),
            blocks_downloaded: self.downloaded,
            latency: self.latency,
        }
    }

    /// Finds the first block, in catalog order, that `cloud` can start
    /// serving to this vehicle.
    pub fn find_block(&self, cloud: &Microcloud) -> Option<usize> {
        self.blocks
            .iter()
            .enumerate()
            .find(|&(i, block)| {
                cloud.has_block(block)
                    && self.progress[i] < block.size()
                    && self.status[i] != BlockStatus::Downloading
            })
            .map(|(i, _)| i)
    }

    /// Runs the whole trace against `clouds` and returns the outcome.
    ///
    /// A vehicle with an empty trace returns zero blocks and no latency.
    pub fn simulate(&mut self, clouds: &[Microcloud], observer: &dyn DownloadObserver) -> NodeOutcome {
        let trace = Arc::clone(&self.trace);
        for point in trace.iter() {
            self.on_tick(point, clouds, observer);
        }
        self.outcome()
    }

    /// Evaluates one trace sample against every microcloud in order.
    pub fn on_tick(&mut self, point: &TracePoint, clouds: &[Microcloud], observer: &dyn DownloadObserver) {
        if self.start_time.is_none() {
            self.start_time = Some(point.time);
        }
        for cloud in clouds {
            self.step(point, cloud, observer);
        }
    }

    /// Applies exactly one rule for the pair (this vehicle, `cloud`).
    pub fn step(&mut self, point: &TracePoint, cloud: &Microcloud, observer: &dyn DownloadObserver) {
        let in_range = cloud.in_range(point.x, point.y);
        match (self.binding(cloud.id()), in_range) {
            (Binding::Bound(index), false) => self.abort(index, point.time, cloud, observer),
            (Binding::Unbound, true) => self.start(point.time, cloud, observer),
            (Binding::Bound(index), true) => self.advance(index, point.time, cloud, observer),
            (Binding::Unbound, false) => {}
        }
    }

    fn abort(&mut self, index: usize, time: SimTime, cloud: &Microcloud, observer: &dyn DownloadObserver) {
        let discarded = self.progress[index];
        self.progress[index] = 0.0;
        self.status[index] = BlockStatus::Idle;
        self.bindings.insert(cloud.id(), Binding::Unbound);
        self.emit(observer, DownloadEventKind::Aborted, time, cloud, index, discarded);
    }

    fn start(&mut self, time: SimTime, cloud: &Microcloud, observer: &dyn DownloadObserver) {
        let Some(index) = self.find_block(cloud) else {
            return;
        };
        self.status[index] = BlockStatus::Downloading;
        self.bindings.insert(cloud.id(), Binding::Bound(index));
        self.emit(observer, DownloadEventKind::Started, time, cloud, index, self.progress[index]);
    }

    fn advance(&mut self, index: usize, time: SimTime, cloud: &Microcloud, observer: &dyn DownloadObserver) {
        self.progress[index] += cloud.bandwidth_per_tick();
        let progress = self.progress[index];
        self.emit(observer, DownloadEventKind::Progressed, time, cloud, index, progress);

        if progress < self.blocks[index].size() {
            return;
        }

        self.status[index] = BlockStatus::Idle;
        self.bindings.insert(cloud.id(), Binding::Unbound);
        self.downloaded += 1;
        self.emit(observer, DownloadEventKind::Completed, time, cloud, index, progress);

        if self.is_complete() && self.latency.is_none() {
            let start = self.start_time.unwrap_or(time);
            self.latency = Some(time - start);
        }
    }

    fn emit(
        &self,
        observer: &dyn DownloadObserver,
        kind: DownloadEventKind,
        time: SimTime,
        cloud: &Microcloud,
        index: usize,
        progress: f64,
    ) {
        observer.on_event(&DownloadEvent {
            time,
            vehicle: &self.id,
            cloud: cloud.id(),
            block: self.blocks[index].id(),
            progress,
            kind,
        });
    }
}
