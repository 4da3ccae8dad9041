//! # vizscout-core
//!
//! Shared data model for the vizscout visual-element detection pipeline.
//!
//! This crate defines the types that flow between the pipeline stages:
//!
//! - [`Region`] - A candidate bounding box believed to contain a visual
//!   element of interest (logo, illustration, icon, diagram)
//! - [`Cluster`] - A set of regions merged because they refer to the same
//!   underlying element
//! - [`Classification`] - The semantic judgment an external vision model
//!   produced for one cropped region
//! - [`Recommendation`] - The final ranked output unit combining a region
//!   and its classification
//! - [`DetectionConfig`] / [`ClassifyConfig`] - The explicit configuration
//!   surface; no thresholds live in globals
//!
//! ## Pipeline Overview
//!
//! ```text
//! page raster -> {six detectors} -> clusterer -> scorer -> crops
//!             -> classification adapter -> recommendation engine
//! ```
//!
//! Regions and clusters are pipeline-internal; only [`DocumentAnalysis`]
//! (regions, crops, classifications, recommendations, summary) crosses the
//! pipeline boundary.

pub mod classification;
pub mod config;
pub mod error;
pub mod output;
pub mod region;

pub use classification::{Classification, GraphicType, Quality};
pub use config::{ClassifyConfig, DetectionConfig};
pub use error::{Result, VizscoutError};
pub use output::{AnalysisSummary, CropRef, DocumentAnalysis, PageFailure, Recommendation};
pub use region::{Cluster, DetectionMethod, PixelBox, Region};
