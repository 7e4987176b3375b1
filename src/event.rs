//! Download events and observers.
//!
//! The vehicle state machine does not log. Every state transition is handed
//! to a [`DownloadObserver`] instead, so callers decide whether transitions
//! are dropped, logged through `tracing`, or recorded for inspection.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::types::{BlockId, MicrocloudId, SimTime, VehicleId};

/// The kind of transition a download went through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadEventKind {
    /// A microcloud was bound to a block.
    Started,
    /// A bound microcloud delivered one tick of data.
    Progressed,
    /// The block reached its size and the binding was released.
    Completed,
    /// The vehicle left range; partial progress was discarded.
    Aborted,
}

/// A single download transition on one vehicle.
///
/// Borrowed from the emitting vehicle so that a no-op observer costs nothing.
#[derive(Clone, Copy, Debug)]
pub struct DownloadEvent<'a> {
    /// Trace timestamp of the tick that caused the transition
    pub time: SimTime,
    /// Vehicle whose state changed
    pub vehicle: &'a str,
    /// Microcloud involved
    pub cloud: MicrocloudId,
    /// Block involved
    pub block: BlockId,
    /// Block progress after the transition (for `Aborted`, the value discarded)
    pub progress: f64,
    /// What happened
    pub kind: DownloadEventKind,
}

/// Receives download transitions from vehicle tasks.
///
/// Observers are shared by every worker thread, so implementations must be
/// safe to call concurrently.
pub trait DownloadObserver: Send + Sync {
    fn on_event(&self, event: &DownloadEvent<'_>);
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl DownloadObserver for NoopObserver {
    fn on_event(&self, _event: &DownloadEvent<'_>) {}
}

/// Emits every event as a `tracing` debug record.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl DownloadObserver for TracingObserver {
    fn on_event(&self, event: &DownloadEvent<'_>) {
        let DownloadEvent {
            time,
            vehicle,
            cloud,
            block,
            progress,
            kind,
        } = *event;
        match kind {
            DownloadEventKind::Started => {
                tracing::debug!(vehicle, block, cloud, time, "initiated block download");
            }
            DownloadEventKind::Progressed => {
                tracing::debug!(vehicle, block, cloud, time, progress, "continuing block download");
            }
            DownloadEventKind::Completed => {
                tracing::debug!(vehicle, block, cloud, time, "block download finished");
            }
            DownloadEventKind::Aborted => {
                tracing::debug!(
                    vehicle,
                    block,
                    cloud,
                    time,
                    last_progress = progress,
                    "stopping block download, vehicle out of range"
                );
            }
        }
    }
}

/// An owned copy of a [`DownloadEvent`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub time: SimTime,
    pub vehicle: VehicleId,
    pub cloud: MicrocloudId,
    pub block: BlockId,
    pub progress: f64,
    pub kind: DownloadEventKind,
}

impl From<&DownloadEvent<'_>> for RecordedEvent {
    fn from(event: &DownloadEvent<'_>) -> Self {
        Self {
            time: event.time,
            vehicle: event.vehicle.to_string(),
            cloud: event.cloud,
            block: event.block,
            progress: event.progress,
            kind: event.kind,
        }
    }
}

/// Thread-safe buffer of every event it receives.
///
/// Events from different vehicles interleave in whatever order the worker
/// pool ran them; events of one vehicle stay in tick order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RwLock<Vec<RecordedEvent>>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.read().clone()
    }

    /// Returns the recorded events of one vehicle, in tick order.
    pub fn events_for(&self, vehicle: &str) -> Vec<RecordedEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.vehicle == vehicle)
            .cloned()
            .collect()
    }

    /// Takes all recorded events, leaving the buffer empty.
    pub fn take_all(&self) -> Vec<RecordedEvent> {
        std::mem::take(&mut *self.events.write())
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl DownloadObserver for RecordingObserver {
    fn on_event(&self, event: &DownloadEvent<'_>) {
        self.events.write().push(event.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: DownloadEventKind) -> DownloadEvent<'static> {
        DownloadEvent {
            time: 3.0,
            vehicle: "veh7",
            cloud: 2,
            block: 5,
            progress: 1.0,
            kind,
        }
    }

    #[test]
    fn test_recording_observer() {
        let recorder = RecordingObserver::new();
        assert!(recorder.is_empty());

        recorder.on_event(&sample(DownloadEventKind::Started));
        recorder.on_event(&sample(DownloadEventKind::Progressed));
        assert_eq!(recorder.len(), 2);

        let events = recorder.events_for("veh7");
        assert_eq!(events[0].kind, DownloadEventKind::Started);
        assert_eq!(events[1].cloud, 2);
        assert!(recorder.events_for("veh8").is_empty());

        let taken = recorder.take_all();
        assert_eq!(taken.len(), 2);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_noop_and_tracing_observers_accept_events() {
        NoopObserver.on_event(&sample(DownloadEventKind::Completed));
        TracingObserver.on_event(&sample(DownloadEventKind::Aborted));
    }
}
