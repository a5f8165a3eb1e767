use serde::{Deserialize, Serialize};

/// One filled result slot: a stored row and its squared L2 distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// A search hit mapped back to its document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    pub position: usize,
    pub id: String,
    pub distance: f32,
}

/// k-NN output for a batch of queries.
///
/// Every query has `k` logical slots. Only the first `width()` of them are
/// stored (`min(k, ntotal)`), row-major; slots past the number of stored
/// vectors read as no position with an infinite distance.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnResult {
    k: usize,
    width: usize,
    queries: usize,
    positions: Vec<Option<usize>>,
    distances: Vec<f32>,
}

impl KnnResult {
    /// `None` when `queries * width` does not fit in memory addressing
    pub(crate) fn with_capacity(queries: usize, k: usize, ntotal: usize) -> Option<Self> {
        let width = k.min(ntotal);
        let slots = queries.checked_mul(width)?;
        Some(Self {
            k,
            width,
            queries: 0,
            positions: Vec::with_capacity(slots),
            distances: Vec::with_capacity(slots),
        })
    }

    pub(crate) fn push_row(&mut self, neighbors: &[Neighbor]) {
        debug_assert!(neighbors.len() <= self.width);
        for neighbor in neighbors {
            self.positions.push(Some(neighbor.position));
            self.distances.push(neighbor.distance);
        }
        for _ in neighbors.len()..self.width {
            self.positions.push(None);
            self.distances.push(f32::INFINITY);
        }
        self.queries += 1;
    }

    /// Requested neighbors per query
    pub fn k(&self) -> usize {
        self.k
    }

    /// Stored slots per query
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of queries
    pub fn len(&self) -> usize {
        self.queries
    }

    pub fn is_empty(&self) -> bool {
        self.queries == 0
    }

    /// Stored positions, `width()` per query
    pub fn positions(&self) -> &[Option<usize>] {
        &self.positions
    }

    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// Slot `slot` of query `query`, or `None` when either is out of range.
    pub fn slot(&self, query: usize, slot: usize) -> Option<(Option<usize>, f32)> {
        if query >= self.queries || slot >= self.k {
            return None;
        }
        if slot >= self.width {
            return Some((None, f32::INFINITY));
        }
        let i = query * self.width + slot;
        Some((self.positions[i], self.distances[i]))
    }

    /// Filled slots of query `query`, nearest first; empty when out of range.
    pub fn neighbors(&self, query: usize) -> Vec<Neighbor> {
        if query >= self.queries {
            return Vec::new();
        }
        let start = query * self.width;
        let end = start + self.width;
        self.positions[start..end]
            .iter()
            .zip(&self.distances[start..end])
            .filter_map(|(position, distance)| {
                position.map(|position| Neighbor {
                    position,
                    distance: *distance,
                })
            })
            .collect()
    }
}
