//! Deployment topology: the microclouds of one configuration and the block
//! catalog they serve.

use std::sync::Arc;

use crate::block::Block;
use crate::config::SimulationParams;
use crate::microcloud::Microcloud;
use crate::types::Coordinate;

/// Microclouds plus the global block list, fixed for one simulation run.
///
/// Both are read concurrently by every vehicle task and never mutated.
#[derive(Clone, Debug)]
pub struct Topology {
    blocks: Arc<[Block]>,
    microclouds: Vec<Microcloud>,
}

impl Topology {
    /// Builds a topology from microcloud positions.
    ///
    /// `params.total_blocks` equal-size blocks are created. Microclouds are
    /// created in `coords` order and each takes the next
    /// `params.blocks_per_microcloud` blocks from a single cursor that wraps
    /// around the catalog, so the assignment depends only on the number of
    /// microclouds and the two catalog sizes.
    ///
    /// `params.total_blocks` must be non-zero.
    pub fn build(coords: &[Coordinate], params: &SimulationParams) -> Self {
        let blocks: Arc<[Block]> = Block::catalog(params.total_blocks, params.block_size).into();

        let mut cursor = 0;
        let microclouds = coords
            .iter()
            .enumerate()
            .map(|(id, &position)| {
                let catalog = (0..params.blocks_per_microcloud)
                    .map(|_| {
                        let block = blocks[cursor];
                        cursor = (cursor + 1) % blocks.len();
                        block
                    })
                    .collect();
                Microcloud::new(id, position, params.range, params.bandwidth, catalog)
            })
            .collect();

        Self { blocks, microclouds }
    }

    /// The global catalog, shared with every vehicle.
    pub fn blocks(&self) -> &Arc<[Block]> {
        &self.blocks
    }

    pub fn microclouds(&self) -> &[Microcloud] {
        &self.microclouds
    }

    pub fn len(&self) -> usize {
        self.microclouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.microclouds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockId;

    fn params(total: usize, per_cloud: usize) -> SimulationParams {
        SimulationParams {
            total_blocks: total,
            blocks_per_microcloud: per_cloud,
            ..SimulationParams::default()
        }
    }

    fn catalog_ids(cloud: &Microcloud) -> Vec<BlockId> {
        cloud.catalog().iter().map(|b| b.id()).collect()
    }

    #[test]
    fn test_round_robin_wraps() {
        let coords = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        let topo = Topology::build(&coords, &params(5, 2));

        assert_eq!(topo.len(), 3);
        assert_eq!(topo.blocks().len(), 5);
        assert_eq!(catalog_ids(&topo.microclouds()[0]), vec![0, 1]);
        assert_eq!(catalog_ids(&topo.microclouds()[1]), vec![2, 3]);
        assert_eq!(catalog_ids(&topo.microclouds()[2]), vec![4, 0]);
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let coords: Vec<_> = (0..7).map(|i| (i as f64 * 10.0, 0.0)).collect();
        let a = Topology::build(&coords, &params(12, 3));
        let b = Topology::build(&coords, &params(12, 3));

        for (x, y) in a.microclouds().iter().zip(b.microclouds()) {
            assert_eq!(catalog_ids(x), catalog_ids(y));
        }
    }

    #[test]
    fn test_microcloud_attributes() {
        let p = SimulationParams {
            range: 42.0,
            bandwidth: 3.0,
            block_size: 9.0,
            ..params(4, 1)
        };
        let topo = Topology::build(&[(5.0, 6.0)], &p);
        let mc = &topo.microclouds()[0];

        assert_eq!(mc.id(), 0);
        assert_eq!(mc.position(), (5.0, 6.0));
        assert_eq!(mc.range(), 42.0);
        assert_eq!(mc.bandwidth_per_tick(), 3.0);
        assert_eq!(topo.blocks()[0].size(), 9.0);
    }

    #[test]
    fn test_empty_topology() {
        let topo = Topology::build(&[], &params(3, 1));
        assert!(topo.is_empty());
        assert_eq!(topo.blocks().len(), 3);
    }
}
