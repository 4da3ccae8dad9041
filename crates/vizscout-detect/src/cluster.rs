//! Density-based spatial clustering of candidate regions.
//!
//! The same visual element is typically found by several detectors at once,
//! so the concatenated candidate list is heavily redundant. Candidates are
//! mapped to a normalized `(cx, cy, area)` feature vector against fixed
//! reference constants (not the actual page size, so the clustering radius
//! means the same thing across documents of varying resolution), the
//! features are standardized across the candidate set, and clusters are the
//! connected components of the radius-neighbor graph. `min_samples` is 1:
//! an isolated, unrepeated detection forms its own singleton cluster rather
//! than being discarded.

#![allow(clippy::cast_precision_loss)]

use crate::score::{region_score, tie_break};
use tracing::debug;
use vizscout_core::{Cluster, DetectionConfig, Region};

/// Union-Find over dense indices with path halving and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }
}

/// Normalized, standardized feature vectors for the candidate set.
///
/// Standardization is per-set (zero mean, unit population variance); a
/// zero-variance dimension maps to 0 so a degenerate candidate set still
/// clusters instead of dividing by zero.
fn standardized_features(regions: &[Region], config: &DetectionConfig) -> Vec<[f64; 3]> {
    let raw: Vec<[f64; 3]> = regions
        .iter()
        .map(|r| {
            let (cx, cy) = r.center();
            [
                cx / config.reference_width,
                cy / config.reference_height,
                r.area() as f64 / config.reference_area,
            ]
        })
        .collect();

    let n = raw.len() as f64;
    let mut features = raw.clone();
    for dim in 0..3 {
        let mean = raw.iter().map(|f| f[dim]).sum::<f64>() / n;
        let var = raw.iter().map(|f| (f[dim] - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        for (out, src) in features.iter_mut().zip(&raw) {
            out[dim] = if std > 0.0 { (src[dim] - mean) / std } else { 0.0 };
        }
    }
    features
}

fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

/// Group candidates into clusters of radius-neighbors.
///
/// Clusters come out ordered by the discovery index of their first member,
/// and members keep their discovery order, so the grouping is deterministic
/// for a fixed candidate list. Zero candidates produce zero clusters.
#[must_use = "returns the candidate clusters"]
pub fn cluster_candidates(candidates: Vec<Region>, config: &DetectionConfig) -> Vec<Cluster> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let features = standardized_features(&candidates, config);
    let mut uf = UnionFind::new(candidates.len());
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            if distance(&features[i], &features[j]) <= config.cluster_radius {
                uf.union(i, j);
            }
        }
    }

    let mut clusters: Vec<Cluster> = Vec::new();
    let mut root_to_cluster: Vec<Option<usize>> = vec![None; candidates.len()];
    for (idx, region) in candidates.into_iter().enumerate() {
        let root = uf.find(idx);
        let slot = match root_to_cluster[root] {
            Some(slot) => slot,
            None => {
                clusters.push(Cluster::default());
                root_to_cluster[root] = Some(clusters.len() - 1);
                clusters.len() - 1
            }
        };
        clusters[slot].members.push(region);
    }

    debug!(clusters = clusters.len(), "clustered candidates");
    clusters
}

/// Collapse a cluster into its representative region.
///
/// The representative carries the method and metadata of the best member by
/// the lightweight pre-score; its bbox is the coordinate-wise union of all
/// members, its confidence the member maximum, and its support the member
/// total. Singleton clusters pass their single member through unchanged.
#[must_use = "returns the representative region"]
pub fn merge_cluster(cluster: Cluster, config: &DetectionConfig) -> Option<Region> {
    let union_bbox = cluster.union_bbox()?;
    let members = cluster.members;
    if members.len() == 1 {
        return members.into_iter().next();
    }

    let best = members
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            region_score(a, config)
                .total_cmp(&region_score(b, config))
                .then_with(|| tie_break(b, a))
        })
        .map(|(idx, _)| idx)?;

    let max_confidence = members
        .iter()
        .map(|m| m.confidence)
        .fold(0.0f64, f64::max)
        .min(1.0);
    let support = members.iter().map(|m| m.support).sum();

    let mut representative = members.into_iter().nth(best)?;
    representative.bbox = union_bbox;
    representative.confidence = max_confidence;
    representative.support = support;
    Some(representative)
}

/// Deduplicate a candidate list into representative regions.
#[must_use = "returns the deduplicated regions"]
pub fn cluster_regions(candidates: Vec<Region>, config: &DetectionConfig) -> Vec<Region> {
    cluster_candidates(candidates, config)
        .into_iter()
        .filter_map(|cluster| merge_cluster(cluster, config))
        .collect()
}
