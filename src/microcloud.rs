//! Stationary access points.

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::types::{Coordinate, MicrocloudId};

/// A fixed short-range access point serving a subset of the block catalog.
///
/// Microclouds never change once a topology is built, so any number of
/// vehicle tasks may read them concurrently.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Microcloud {
    id: MicrocloudId,
    position: Coordinate,
    range: f64,
    bandwidth: f64,
    catalog: Vec<Block>,
}

impl Microcloud {
    /// Creates a microcloud.
    ///
    /// # Arguments
    /// * `id` - Position of the microcloud in the deployment list
    /// * `position` - `(x, y)` location
    /// * `range` - Radio range; the boundary is inclusive
    /// * `bandwidth` - Progress delivered per tick of active download
    /// * `catalog` - Blocks this microcloud can serve
    pub fn new(
        id: MicrocloudId,
        position: Coordinate,
        range: f64,
        bandwidth: f64,
        catalog: Vec<Block>,
    ) -> Self {
        Self {
            id,
            position,
            range,
            bandwidth,
            catalog,
        }
    }

    pub fn id(&self) -> MicrocloudId {
        self.id
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    /// Blocks served by this microcloud, in assignment order.
    pub fn catalog(&self) -> &[Block] {
        &self.catalog
    }

    /// Returns true if `(x, y)` lies within range (inclusive).
    pub fn in_range(&self, x: f64, y: f64) -> bool {
        let (cx, cy) = self.position;
        (x - cx).hypot(y - cy) <= self.range
    }

    /// Returns true if this microcloud serves `block`.
    pub fn has_block(&self, block: &Block) -> bool {
        self.catalog.contains(block)
    }

    /// Progress one tick of active download contributes.
    pub fn bandwidth_per_tick(&self) -> f64 {
        self.bandwidth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud() -> Microcloud {
        Microcloud::new(0, (0.0, 0.0), 5.0, 2.0, vec![Block::new(1, 5.0), Block::new(3, 5.0)])
    }

    #[test]
    fn test_in_range_boundary_inclusive() {
        let mc = cloud();
        assert!(mc.in_range(3.0, 4.0));
        assert!(mc.in_range(0.0, 0.0));
        assert!(!mc.in_range(3.0, 4.01));
    }

    #[test]
    fn test_has_block_by_identity() {
        let mc = cloud();
        assert!(mc.has_block(&Block::new(3, 42.0)));
        assert!(!mc.has_block(&Block::new(2, 5.0)));
    }

    #[test]
    fn test_bandwidth_per_tick() {
        assert_eq!(cloud().bandwidth_per_tick(), 2.0);
    }
}
