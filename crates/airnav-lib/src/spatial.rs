//! KD-tree spatial index for nearest-neighbour queries over positioned
//! entities.
//!
//! # Overview
//!
//! Entities are keyed by earth-centred cartesian coordinates (see
//! [`GeoPos::to_cartesian`]), so the KD-tree's Euclidean metric measures chord
//! length. Chord length is monotonic in great-circle distance, which lets a
//! great-circle search radius be converted once with
//! [`chord_for_arc_nm`] and the tree's sorted results be used directly.
//!
//! The router consumes the index through the [`SpatialIndex`] trait; hosts with
//! their own spatial service can implement it instead of using
//! [`KdSpatialIndex`].

use std::collections::HashMap;
use std::fmt;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::{debug, info};

use crate::geo::{chord_for_arc_nm, GeoPos};
use crate::positioned::{Positioned, PositionedRef};
use crate::store::MemoryNavCache;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// First batch size for filtered nearest queries; doubled while every
/// candidate inside the radius is rejected.
const NEAREST_BATCH: usize = 16;

/// Predicate applied to candidate entities.
pub type PositionedFilter<'a> = dyn Fn(&Positioned) -> bool + 'a;

/// Nearest-neighbour service consumed by the router.
pub trait SpatialIndex: Send + Sync {
    /// Closest entity passing `filter` within `max_distance_nm` of `point`.
    fn find_closest(
        &self,
        point: &GeoPos,
        max_distance_nm: f64,
        filter: &PositionedFilter<'_>,
    ) -> Option<PositionedRef>;

    /// Closest entity named `ident` passing `filter`, at any distance.
    fn find_closest_with_ident(
        &self,
        ident: &str,
        point: &GeoPos,
        filter: &PositionedFilter<'_>,
    ) -> Option<PositionedRef>;
}

/// Static KD-tree over a snapshot of positioned entities.
pub struct KdSpatialIndex {
    /// Item type is an index into `nodes`.
    tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32>,
    nodes: Vec<PositionedRef>,
    by_ident: HashMap<String, Vec<usize>>,
}

impl fmt::Debug for KdSpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KdSpatialIndex")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl KdSpatialIndex {
    pub fn build(entities: impl IntoIterator<Item = PositionedRef>) -> Self {
        let nodes: Vec<PositionedRef> = entities.into_iter().collect();

        let mut tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32> = KdTree::new();
        let mut by_ident: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            tree.add(&node.position.to_cartesian(), index);
            by_ident
                .entry(node.ident.to_ascii_uppercase())
                .or_default()
                .push(index);
        }

        info!(node_count = nodes.len(), "built spatial index");

        Self {
            tree,
            nodes,
            by_ident,
        }
    }

    /// Index every entity currently held by `cache`.
    pub fn from_cache(cache: &MemoryNavCache) -> Self {
        Self::build(cache.positioned())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All entities within `radius_nm` of `point`, nearest first, with their
    /// great-circle distance.
    pub fn within_radius(&self, point: &GeoPos, radius_nm: f64) -> Vec<(PositionedRef, f64)> {
        if radius_nm <= 0.0 || self.nodes.is_empty() {
            return Vec::new();
        }

        let chord = chord_for_arc_nm(radius_nm);
        self.tree
            .within::<SquaredEuclidean>(&point.to_cartesian(), chord * chord)
            .into_iter()
            .filter_map(|neighbour| {
                let node = &self.nodes[neighbour.item];
                let distance = point.distance_nm(&node.position);
                (distance <= radius_nm).then(|| (node.clone(), distance))
            })
            .collect()
    }
}

impl SpatialIndex for KdSpatialIndex {
    fn find_closest(
        &self,
        point: &GeoPos,
        max_distance_nm: f64,
        filter: &PositionedFilter<'_>,
    ) -> Option<PositionedRef> {
        if max_distance_nm <= 0.0 || self.nodes.is_empty() {
            return None;
        }

        let query = point.to_cartesian();
        let chord = chord_for_arc_nm(max_distance_nm);
        let squared_limit = chord * chord;

        // Candidates arrive nearest first, so the scan stops at the first
        // accepted one or at the first one outside the radius.
        let mut fetch_count = NEAREST_BATCH.min(self.nodes.len());
        loop {
            let candidates = self
                .tree
                .nearest_n::<SquaredEuclidean>(&query, fetch_count);
            for candidate in &candidates {
                if candidate.distance > squared_limit {
                    return None;
                }
                let node = &self.nodes[candidate.item];
                if filter(node) {
                    return Some(node.clone());
                }
            }
            if fetch_count == self.nodes.len() {
                return None;
            }
            debug!(fetch_count, "widening nearest-node query");
            fetch_count = fetch_count.saturating_mul(2).min(self.nodes.len());
        }
    }

    fn find_closest_with_ident(
        &self,
        ident: &str,
        point: &GeoPos,
        filter: &PositionedFilter<'_>,
    ) -> Option<PositionedRef> {
        self.by_ident
            .get(&ident.to_ascii_uppercase())?
            .iter()
            .map(|&index| &self.nodes[index])
            .filter(|node| filter(node))
            .min_by(|a, b| {
                point
                    .distance_nm(&a.position)
                    .total_cmp(&point.distance_nm(&b.position))
            })
            .cloned()
    }
}
