//! Shallowest-first frontier of vertices awaiting expansion.
//!
//! Ties at equal depth are broken by creation order, so vertices from both
//! sides interleave in discovery order and runs are reproducible.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use crate::state::VertexId;

/// Ordering key: lower depth first, then earlier creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierKey {
    pub depth: u32,
    pub creation_order: u64,
}

impl PartialOrd for FrontierKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.depth
            .cmp(&other.depth)
            .then(self.creation_order.cmp(&other.creation_order))
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    key: Reverse<FrontierKey>,
    vertex: VertexId,
}

/// Min-heap over [`FrontierKey`] with a queued set.
#[derive(Debug, Default)]
pub struct DepthFrontier {
    heap: BinaryHeap<FrontierEntry>,
    queued: BTreeSet<VertexId>,
    high_water: u64,
}

impl DepthFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a vertex. Returns `false` if it was ever queued before.
    pub fn push(&mut self, vertex: VertexId, depth: u32) -> bool {
        if !self.queued.insert(vertex) {
            return false;
        }
        self.heap.push(FrontierEntry {
            key: Reverse(FrontierKey {
                depth,
                creation_order: u64::try_from(vertex.0).unwrap_or(u64::MAX),
            }),
            vertex,
        });
        let len = u64::try_from(self.heap.len()).unwrap_or(u64::MAX);
        self.high_water = self.high_water.max(len);
        true
    }

    /// Pop the shallowest, earliest vertex.
    pub fn pop(&mut self) -> Option<VertexId> {
        self.heap.pop().map(|e| e.vertex)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Largest size the frontier has reached.
    #[must_use]
    pub fn high_water(&self) -> u64 {
        self.high_water
    }

    /// Drop all but the `max_size` best entries. Returns the dropped vertices.
    pub fn prune_to(&mut self, max_size: usize) -> Vec<VertexId> {
        if self.heap.len() <= max_size {
            return Vec::new();
        }
        let mut entries: Vec<FrontierEntry> = self.heap.drain().collect();
        entries.sort_by(|a, b| a.key.0.cmp(&b.key.0));
        let pruned = entries[max_size..].iter().map(|e| e.vertex).collect();
        entries.truncate(max_size);
        self.heap = entries.into_iter().collect();
        pruned
    }
}
