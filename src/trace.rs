//! Vehicle movement traces.
//!
//! A trace arrives as a flat list of rows, one per vehicle per timestep.
//! [`partition_by_vehicle`] groups them into one time-ordered track per
//! vehicle.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{SimTime, VehicleId};

/// One row of a recorded movement trace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    pub vehicle_id: VehicleId,
    pub time: SimTime,
    pub x: f64,
    pub y: f64,
}

impl TraceSample {
    pub fn new(vehicle_id: impl Into<VehicleId>, time: SimTime, x: f64, y: f64) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            time,
            x,
            y,
        }
    }

    fn point(&self) -> TracePoint {
        TracePoint {
            x: self.x,
            y: self.y,
            time: self.time,
        }
    }
}

/// A position of one vehicle at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub x: f64,
    pub y: f64,
    pub time: SimTime,
}

impl TracePoint {
    pub fn new(x: f64, y: f64, time: SimTime) -> Self {
        Self { x, y, time }
    }
}

/// The time-ordered track of a single vehicle.
///
/// Points are shared behind an `Arc` so that every simulation run can build
/// fresh vehicle state without copying the trace.
#[derive(Clone, Debug)]
pub struct VehicleTrack {
    pub vehicle_id: VehicleId,
    pub points: Arc<[TracePoint]>,
}

impl VehicleTrack {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Groups trace rows by vehicle and sorts each group by timestamp.
///
/// Vehicles appear in the order they are first seen in `samples`. The sort is
/// stable, so rows sharing a timestamp keep their input order.
pub fn partition_by_vehicle(samples: &[TraceSample]) -> Vec<VehicleTrack> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(VehicleId, Vec<TracePoint>)> = Vec::new();

    for sample in samples {
        let slot = *index.entry(sample.vehicle_id.as_str()).or_insert_with(|| {
            groups.push((sample.vehicle_id.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(sample.point());
    }

    groups
        .into_iter()
        .map(|(vehicle_id, mut points)| {
            points.sort_by(|a, b| a.time.total_cmp(&b.time));
            VehicleTrack {
                vehicle_id,
                points: points.into(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_groups_and_sorts() {
        let rows = vec![
            TraceSample::new("b", 2.0, 0.0, 0.0),
            TraceSample::new("a", 1.0, 1.0, 1.0),
            TraceSample::new("b", 0.0, 5.0, 5.0),
            TraceSample::new("a", 0.0, 2.0, 2.0),
        ];

        let tracks = partition_by_vehicle(&rows);
        assert_eq!(tracks.len(), 2);

        assert_eq!(tracks[0].vehicle_id, "b");
        assert_eq!(tracks[0].points[0].time, 0.0);
        assert_eq!(tracks[0].points[0].x, 5.0);
        assert_eq!(tracks[0].points[1].time, 2.0);

        assert_eq!(tracks[1].vehicle_id, "a");
        assert_eq!(tracks[1].len(), 2);
        assert_eq!(tracks[1].points[0].x, 2.0);
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition_by_vehicle(&[]).is_empty());
    }
}
