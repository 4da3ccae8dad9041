//! Aggregate analysis summary.

use std::collections::BTreeSet;
use vizscout_core::{AnalysisSummary, Classification, Region};

/// Confidence above which a region counts as a high-confidence detection.
const HIGH_BUCKET: f64 = 0.7;
/// Lower bound (exclusive) of the medium-confidence bucket.
const MEDIUM_BUCKET: f64 = 0.4;

/// Fold regions and classifications into the run summary.
#[must_use = "returns the analysis summary"]
pub fn summarize(regions: &[Region], classifications: &[Classification]) -> AnalysisSummary {
    let mut summary = AnalysisSummary {
        total_regions: regions.len(),
        ..AnalysisSummary::default()
    };

    for region in regions {
        if region.confidence > HIGH_BUCKET {
            summary.high_confidence += 1;
        } else if region.confidence > MEDIUM_BUCKET {
            summary.medium_confidence += 1;
        } else {
            summary.low_confidence += 1;
        }
        *summary
            .by_method
            .entry(region.method.to_string())
            .or_default() += 1;
    }

    let mut brands = BTreeSet::new();
    for classification in classifications {
        if classification.success {
            *summary
                .by_graphic_type
                .entry(classification.graphic_type.to_string())
                .or_default() += 1;
            if let Some(brand) = &classification.brand_or_company {
                brands.insert(brand.clone());
            }
        } else {
            summary.failed_classifications += 1;
        }
    }
    summary.brands = brands.into_iter().collect();

    summary
}
