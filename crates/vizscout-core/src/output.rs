//! Pipeline output types.
//!
//! [`DocumentAnalysis`] is the single structure returned by a full analysis
//! run: the deduplicated scored regions, the crops sent to classification,
//! the classifications themselves (failures included), the ranked
//! recommendations, and an aggregate summary. Regions and clusters internal
//! to the pipeline are discarded once this structure is built.

use crate::classification::Classification;
use crate::region::{PixelBox, Region};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A rendered crop of one candidate region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRef {
    /// 0-based page index
    pub page_index: usize,
    /// Crop bounds in page raster coordinates, after clamping
    pub bbox: PixelBox,
    /// PNG image data
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub png_data: Vec<u8>,
}

impl CropRef {
    /// Size of the encoded crop in bytes.
    #[inline]
    #[must_use = "returns PNG data size in bytes"]
    pub const fn size(&self) -> usize {
        self.png_data.len()
    }
}

/// Final ranked output unit combining a region and its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The detected region
    pub region: Region,
    /// The semantic judgment for its crop
    pub classification: Classification,
    /// Blended heuristic + semantic score
    pub overall_score: f64,
    /// Human-readable reasons from the fixed rule table
    pub justification: Vec<String>,
}

/// A page that could not be analyzed. Other pages continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    /// 0-based page index
    pub page_index: usize,
    /// Human-readable failure reason
    pub reason: String,
}

/// Aggregate counts over one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Total deduplicated regions across all pages
    pub total_regions: usize,
    /// Regions with confidence > 0.7
    pub high_confidence: usize,
    /// Regions with confidence in (0.4, 0.7]
    pub medium_confidence: usize,
    /// Regions with confidence <= 0.4
    pub low_confidence: usize,
    /// Region counts by detection method
    pub by_method: BTreeMap<String, usize>,
    /// Classification counts by graphic type (successful calls only)
    pub by_graphic_type: BTreeMap<String, usize>,
    /// Distinct brand/company names found, sorted
    pub brands: Vec<String>,
    /// Classification calls that failed (timeouts, errors); never dropped
    pub failed_classifications: usize,
}

/// Full result of analyzing one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// All deduplicated, scored candidate regions
    pub graphic_regions: Vec<Region>,
    /// Crops of the top-ranked regions, in rank order
    pub screenshots: Vec<CropRef>,
    /// Classification per crop, aligned with `screenshots`
    pub ai_analysis: Vec<Classification>,
    /// Ranked recommendations, best first
    pub recommended_graphics: Vec<Recommendation>,
    /// Aggregate counts
    pub analysis_summary: AnalysisSummary,
    /// Pages that failed structurally; empty on a clean run
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub page_failures: Vec<PageFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::DetectionMethod;

    #[test]
    fn test_document_analysis_serializes_without_crop_bytes() {
        let analysis = DocumentAnalysis {
            graphic_regions: vec![Region::new(
                0,
                PixelBox::new(0, 0, 10, 10),
                DetectionMethod::Edge,
            )],
            screenshots: vec![CropRef {
                page_index: 0,
                bbox: PixelBox::new(0, 0, 10, 10),
                png_data: Vec::new(),
            }],
            ..DocumentAnalysis::default()
        };
        let json = serde_json::to_string(&analysis).unwrap();
        assert!(json.contains("graphic_regions"));
        assert!(!json.contains("png_data"));
        let back: DocumentAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(back.graphic_regions.len(), 1);
    }

    #[test]
    fn test_summary_default_is_empty() {
        let summary = AnalysisSummary::default();
        assert_eq!(summary.total_regions, 0);
        assert!(summary.by_method.is_empty());
        assert!(summary.brands.is_empty());
    }
}
