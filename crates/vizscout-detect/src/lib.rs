//! # vizscout-detect
//!
//! Heuristic candidate detection for the vizscout pipeline: six independent
//! detector strategies, density-based deduplication, composite scoring and
//! crop extraction.
//!
//! ## Stages
//!
//! 1. [`run_detectors`] - fan the six strategies out over one page raster
//!    (color, edge, contour, texture, position, brightness) and concatenate
//!    their candidates deterministically
//! 2. [`cluster_regions`] - merge overlapping detections of the same
//!    element into representative regions
//! 3. [`score_regions`] - assign the composite confidence and sort by the
//!    deterministic rank ordering
//! 4. [`crop_region`] - cut PNG crops of the top-ranked regions for the
//!    classification stage
//!
//! Every stage is a pure function over its inputs; the raster is shared
//! read-only. A failing detector strategy is contained inside
//! [`run_detectors`] and contributes zero candidates.

pub mod cluster;
pub mod crop;
pub mod detectors;
pub mod raster;
pub mod score;

pub use cluster::{cluster_candidates, cluster_regions, merge_cluster};
pub use crop::{crop_region, encode_png, extract_crop};
pub use detectors::{all_detectors, run_detectors, CandidateDetector};
pub use score::{rank_cmp, region_score, score_regions, tie_break};
