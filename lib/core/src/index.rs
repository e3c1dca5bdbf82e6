//! Static spatial index over point geometry.
//!
//! A bulk-loaded kd-tree: entries are median-partitioned in place at build
//! time (alternating x/y), so the tree is implicit in the array layout and
//! needs no per-node allocation. Nearest-neighbor search is a standard
//! branch-and-bound descent.
//!
//! Determinism: every entry carries the rank it was inserted with, and ties
//! on distance resolve to the smaller rank. Callers that need a semantic
//! tie-break (nearest-neighbor enrichment breaks ties on poi_id) sort their
//! entries accordingly before building.

use crate::geometry::GeoPoint;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
struct Entry {
    point: GeoPoint,
    rank: u32,
}

/// Bulk-loaded kd-tree over `(point, rank)` entries.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    entries: Vec<Entry>,
}

impl SpatialIndex {
    /// Build an index over `points`; each point's rank is its position.
    pub fn build(points: Vec<GeoPoint>) -> Self {
        let mut entries: Vec<Entry> = points
            .into_iter()
            .enumerate()
            .map(|(rank, point)| Entry {
                point,
                rank: rank as u32,
            })
            .collect();
        build_recursive(&mut entries, 0);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry nearest to `query`, as `(rank, distance)`.
    ///
    /// Equidistant entries resolve to the smaller rank; an empty index has
    /// no answer.
    pub fn nearest(&self, query: GeoPoint) -> Option<(usize, f64)> {
        if self.entries.is_empty() {
            return None;
        }
        let mut best = Best {
            rank: u32::MAX,
            dist: f64::INFINITY,
        };
        self.nearest_recursive(0, self.entries.len(), 0, query, &mut best);
        Some((best.rank as usize, best.dist))
    }

    fn nearest_recursive(&self, lo: usize, hi: usize, depth: usize, query: GeoPoint, best: &mut Best) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let node = &self.entries[mid];

        let dist = query.distance(&node.point);
        if dist < best.dist || (dist == best.dist && node.rank < best.rank) {
            *best = Best {
                rank: node.rank,
                dist,
            };
        }

        let axis = depth % 2;
        let diff = query.coord(axis) - node.point.coord(axis);
        let (near, far) = if diff < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.nearest_recursive(near.0, near.1, depth + 1, query, best);
        // The far side can still hold the answer - or an equidistant entry
        // with a smaller rank - whenever the splitting plane is within reach.
        if diff.abs() <= best.dist {
            self.nearest_recursive(far.0, far.1, depth + 1, query, best);
        }
    }
}

struct Best {
    rank: u32,
    dist: f64,
}

fn build_recursive(entries: &mut [Entry], depth: usize) {
    if entries.len() <= 1 {
        return;
    }
    let mid = entries.len() / 2;
    let axis = depth % 2;
    entries.select_nth_unstable_by(mid, |a, b| axis_order(a, b, axis));
    let (left, rest) = entries.split_at_mut(mid);
    build_recursive(left, depth + 1);
    build_recursive(&mut rest[1..], depth + 1);
}

fn axis_order(a: &Entry, b: &Entry, axis: usize) -> Ordering {
    OrderedFloat(a.point.coord(axis))
        .cmp(&OrderedFloat(b.point.coord(axis)))
        .then_with(|| a.rank.cmp(&b.rank))
}
