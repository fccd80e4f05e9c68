//! Proximity checks against previously accepted sample points.
//!
//! Two interchangeable strategies answer "how close is the nearest accepted
//! point?": a 2D k-d tree (Bentley, 1975) and a linear scan. Both compare
//! squared distances computed by [`Coordinate::distance_sq`], so for the same
//! point set they return bit-identical answers and the sampler makes the same
//! accept/reject decisions whichever one is selected.

use serde::{Deserialize, Serialize};
use crate::core::types::Coordinate;

/// Nearest-neighbour distance queries over a fixed point set
pub trait ProximityIndex {
    /// Index `points`.
    fn build(points: &[Coordinate]) -> Self
    where
        Self: Sized;

    /// Number of indexed points.
    fn len(&self) -> usize;

    /// Whether nothing is indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Squared distance from `query` to the nearest indexed point.
    fn nearest_distance_sq(&self, query: &Coordinate) -> Option<f64>;

    /// Whether some indexed point lies strictly closer than `sqrt(min_distance_sq)`.
    fn has_point_within(&self, query: &Coordinate, min_distance_sq: f64) -> bool {
        self.nearest_distance_sq(query)
            .map_or(false, |d| d < min_distance_sq)
    }
}

/// Which [`ProximityIndex`] the sampler uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceStrategy {
    /// 2D k-d tree, `O(log m)` per query
    KdTree,
    /// Linear scan, `O(m)` per query
    BruteForce,
}

impl Default for DistanceStrategy {
    #[cfg(feature = "spatial-index")]
    fn default() -> Self {
        DistanceStrategy::KdTree
    }

    #[cfg(not(feature = "spatial-index"))]
    fn default() -> Self {
        DistanceStrategy::BruteForce
    }
}

/// Linear scan over all points
#[derive(Debug, Clone, Default)]
pub struct BruteForceIndex {
    points: Vec<Coordinate>,
}

impl ProximityIndex for BruteForceIndex {
    fn build(points: &[Coordinate]) -> Self {
        BruteForceIndex {
            points: points.to_vec(),
        }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn nearest_distance_sq(&self, query: &Coordinate) -> Option<f64> {
        self.points
            .iter()
            .map(|p| query.distance_sq(p))
            .min_by(f64::total_cmp)
    }

    fn has_point_within(&self, query: &Coordinate, min_distance_sq: f64) -> bool {
        self.points
            .iter()
            .any(|p| query.distance_sq(p) < min_distance_sq)
    }
}

/// 2D k-d tree built by median splits on alternating axes
#[derive(Debug, Clone, Default)]
pub struct KdTreeIndex {
    nodes: Vec<KdNode>,
    points: Vec<Coordinate>,
}

#[derive(Debug, Clone)]
struct KdNode {
    point_idx: usize,
    /// 0 = x, 1 = y
    split_dim: u8,
    left: Option<usize>,
    right: Option<usize>,
}

fn axis_value(point: &Coordinate, dim: u8) -> f64 {
    if dim == 0 {
        point.x
    } else {
        point.y
    }
}

impl KdTreeIndex {
    fn build_recursive(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let split_dim = (depth % 2) as u8;
        let points = &self.points;
        indices.sort_by(|&a, &b| {
            axis_value(&points[a], split_dim).total_cmp(&axis_value(&points[b], split_dim))
        });

        let median = indices.len() / 2;
        let node_idx = self.nodes.len();
        self.nodes.push(KdNode {
            point_idx: indices[median],
            split_dim,
            left: None,
            right: None,
        });

        let (left, rest) = indices.split_at_mut(median);
        let right = &mut rest[1..];

        if !left.is_empty() {
            let child = self.build_recursive(left, depth + 1);
            self.nodes[node_idx].left = Some(child);
        }
        if !right.is_empty() {
            let child = self.build_recursive(right, depth + 1);
            self.nodes[node_idx].right = Some(child);
        }

        node_idx
    }

    fn nearest_recursive(&self, node_idx: usize, query: &Coordinate, best: &mut f64) {
        let node = &self.nodes[node_idx];
        let point = &self.points[node.point_idx];

        let dist_sq = query.distance_sq(point);
        if dist_sq < *best {
            *best = dist_sq;
        }

        let diff = axis_value(query, node.split_dim) - axis_value(point, node.split_dim);
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.nearest_recursive(child, query, best);
        }
        if diff * diff < *best {
            if let Some(child) = second {
                self.nearest_recursive(child, query, best);
            }
        }
    }
}

impl ProximityIndex for KdTreeIndex {
    fn build(points: &[Coordinate]) -> Self {
        let mut tree = KdTreeIndex {
            nodes: Vec::with_capacity(points.len()),
            points: points.to_vec(),
        };
        if !points.is_empty() {
            let mut indices: Vec<usize> = (0..points.len()).collect();
            tree.build_recursive(&mut indices, 0);
        }
        tree
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn nearest_distance_sq(&self, query: &Coordinate) -> Option<f64> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best = f64::INFINITY;
        self.nearest_recursive(0, query, &mut best);
        Some(best)
    }
}
