use crate::error::{Result, VectorStoreError};
use crate::types::{KnnResult, Neighbor};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Exact nearest-neighbor index over squared L2 distance.
///
/// Vectors are kept as one row-major matrix; row `i` is position `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Array2<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Array2::zeros((0, dimension)),
        }
    }

    /// Take ownership of `matrix` as the stored vector set.
    pub fn build(matrix: Array2<f32>) -> Self {
        Self {
            dimension: matrix.ncols(),
            vectors: matrix,
        }
    }

    /// Append rows in bulk
    pub fn add(&mut self, vectors: ArrayView2<'_, f32>) -> Result<()> {
        if vectors.nrows() == 0 {
            return Ok(());
        }
        if self.vectors.nrows() == 0 && self.dimension == 0 {
            self.dimension = vectors.ncols();
            self.vectors = vectors.to_owned();
            return Ok(());
        }
        if vectors.ncols() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: vectors.ncols(),
            });
        }
        self.vectors
            .append(Axis(0), vectors)
            .map_err(|e| VectorStoreError::IndexError(e.to_string()))
    }

    /// Number of stored vectors
    pub fn ntotal(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.nrows() == 0
    }

    pub fn vectors(&self) -> ArrayView2<'_, f32> {
        self.vectors.view()
    }

    pub fn into_vectors(self) -> Array2<f32> {
        self.vectors
    }

    pub fn clear(&mut self) {
        self.vectors = Array2::zeros((0, self.dimension));
    }

    /// k nearest stored vectors for every query row.
    ///
    /// Neighbors are sorted by ascending squared distance, ties by position.
    pub fn search(&self, queries: ArrayView2<'_, f32>, k: usize) -> Result<KnnResult> {
        if !self.is_empty() && queries.ncols() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: queries.ncols(),
            });
        }

        let mut result = KnnResult::with_capacity(queries.nrows(), k, self.ntotal())
            .ok_or_else(|| {
                VectorStoreError::IndexError(format!(
                    "{} queries x {} neighbors overflows the result size",
                    queries.nrows(),
                    k.min(self.ntotal())
                ))
            })?;
        for query in queries.rows() {
            result.push_row(&self.top_k(query, k));
        }
        Ok(result)
    }

    /// Single-query search returning only filled slots
    pub fn search_one(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if !self.is_empty() && query.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        Ok(self.top_k(ArrayView1::from(query), k))
    }

    fn top_k(&self, query: ArrayView1<'_, f32>, k: usize) -> Vec<Neighbor> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        // Max-heap holding the k best seen so far; the worst sits on top
        let mut heap = BinaryHeap::with_capacity(k.min(self.ntotal()) + 1);
        for (position, row) in self.vectors.rows().into_iter().enumerate() {
            let candidate = Candidate {
                distance: squared_l2(query, row),
                position,
            };
            if heap.len() < k {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                heap.pop();
                heap.push(candidate);
            }
        }

        heap.into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor {
                position: c.position,
                distance: c.distance,
            })
            .collect()
    }
}

fn squared_l2(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f32,
    position: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.position.cmp(&other.position))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}
