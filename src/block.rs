//! Content blocks.
//!
//! A file is split into fixed-size blocks; each microcloud serves a subset of
//! them and every vehicle tries to collect all of them.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::types::BlockId;

/// An immutable unit of content.
///
/// Two blocks are the same block when their ids match; `size` does not take
/// part in equality or hashing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Block {
    id: BlockId,
    size: f64,
}

impl Block {
    /// Creates a block with the given id and size.
    pub fn new(id: BlockId, size: f64) -> Self {
        Self { id, size }
    }

    /// Returns the block identifier.
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Returns the amount of progress needed to finish this block.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Builds `count` equally sized blocks with ids `0..count`.
    pub fn catalog(count: usize, size: f64) -> Vec<Block> {
        (0..count as BlockId).map(|id| Block::new(id, size)).collect()
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Block {}

impl Hash for Block {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
