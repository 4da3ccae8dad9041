//! Recommendation engine: blend heuristic and semantic confidence.
//!
//! `overall_score` averages the region confidence with the model confidence
//! when classification succeeded; a failed classification demotes the
//! candidate to half its heuristic confidence but never discards it.
//! Justification strings come from a fixed rule table, not free text, so
//! two runs over the same input produce identical wording.

use vizscout_core::{Classification, DetectionMethod, GraphicType, Quality, Recommendation, Region};
use vizscout_detect::tie_break;

/// Weight applied to heuristic-only candidates after a failed
/// classification.
const FAILURE_DEMOTION: f64 = 0.5;

/// Region confidence above which the detection itself is called strong.
const HIGH_CONFIDENCE: f64 = 0.6;

/// Build one recommendation per classified candidate, in input order.
///
/// `regions` and `classifications` are aligned by index; both come from the
/// top-ranked slice of the scored region list.
#[must_use = "returns the built recommendations"]
pub fn build_recommendations(
    regions: &[Region],
    classifications: &[Classification],
) -> Vec<Recommendation> {
    regions
        .iter()
        .zip(classifications)
        .map(|(region, classification)| {
            let overall_score = if classification.success {
                (region.confidence + classification.ai_confidence) / 2.0
            } else {
                region.confidence * FAILURE_DEMOTION
            };
            Recommendation {
                region: region.clone(),
                classification: classification.clone(),
                overall_score,
                justification: justify(region, classification),
            }
        })
        .collect()
}

/// Sort recommendations best-first with the same deterministic tie-break
/// the region scorer uses.
pub fn sort_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| {
        b.overall_score
            .total_cmp(&a.overall_score)
            .then_with(|| tie_break(&a.region, &b.region))
    });
}

/// The fixed justification rule table.
fn justify(region: &Region, classification: &Classification) -> Vec<String> {
    let mut reasons = Vec::new();

    if region.confidence > HIGH_CONFIDENCE {
        reasons.push("High detection confidence".to_string());
    }
    if region.support > 1 {
        reasons.push(format!(
            "Confirmed by {} independent detections",
            region.support
        ));
    }

    reasons.push(match region.method {
        DetectionMethod::Color => "Detected through color analysis".to_string(),
        DetectionMethod::Edge => "Detected through edge analysis".to_string(),
        DetectionMethod::Contour => "Detected through shape contour analysis".to_string(),
        DetectionMethod::Texture => "Detected through texture analysis".to_string(),
        DetectionMethod::Position => "Located in a typical graphic position".to_string(),
        DetectionMethod::Brightness => "Detected through contrast analysis".to_string(),
    });

    if classification.success {
        if !matches!(
            classification.graphic_type,
            GraphicType::Unknown | GraphicType::Error
        ) {
            reasons.push(format!("AI identified as {}", classification.graphic_type));
        }
        if let Some(brand) = &classification.brand_or_company {
            reasons.push(format!("Recognized brand: {brand}"));
        }
        if classification.quality == Quality::High {
            reasons.push("High rendering quality".to_string());
        }
    } else {
        reasons.push("AI analysis unavailable, heuristic signals only".to_string());
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizscout_core::PixelBox;

    fn region_with_confidence(confidence: f64) -> Region {
        let mut region = Region::new(0, PixelBox::new(10, 10, 70, 70), DetectionMethod::Edge);
        region.confidence = confidence;
        region
    }

    fn successful_classification(ai_confidence: f64) -> Classification {
        Classification {
            graphic_type: GraphicType::Logo,
            content_description: "Circular mark".to_string(),
            ai_confidence,
            success: true,
            ..Classification::default()
        }
    }

    #[test]
    fn test_overall_score_blends_on_success() {
        let recs = build_recommendations(
            &[region_with_confidence(0.6)],
            &[successful_classification(0.8)],
        );
        assert!((recs[0].overall_score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_overall_score_demotes_on_failure() {
        let recs = build_recommendations(
            &[region_with_confidence(0.6)],
            &[Classification::failed("timeout")],
        );
        assert!((recs[0].overall_score - 0.3).abs() < 1e-9);
        assert!(recs[0]
            .justification
            .iter()
            .any(|j| j.contains("heuristic signals only")));
    }

    #[test]
    fn test_justification_rule_table() {
        let mut region = region_with_confidence(0.7);
        region.support = 3;
        let classification = Classification {
            brand_or_company: Some("Acme".to_string()),
            quality: Quality::High,
            ..successful_classification(0.9)
        };
        let recs = build_recommendations(&[region], &[classification]);
        let justification = &recs[0].justification;
        assert!(justification.contains(&"High detection confidence".to_string()));
        assert!(justification.contains(&"Confirmed by 3 independent detections".to_string()));
        assert!(justification.contains(&"Detected through edge analysis".to_string()));
        assert!(justification.contains(&"AI identified as logo".to_string()));
        assert!(justification.contains(&"Recognized brand: Acme".to_string()));
        assert!(justification.contains(&"High rendering quality".to_string()));
    }

    #[test]
    fn test_unknown_type_earns_no_ai_reason() {
        let classification = Classification::degraded("some prose");
        let recs = build_recommendations(&[region_with_confidence(0.5)], &[classification]);
        assert!(!recs[0]
            .justification
            .iter()
            .any(|j| j.starts_with("AI identified")));
    }

    #[test]
    fn test_sort_is_deterministic_under_ties() {
        let mut a = region_with_confidence(0.5);
        a.bbox = PixelBox::new(10, 100, 70, 160);
        let mut b = region_with_confidence(0.5);
        b.bbox = PixelBox::new(10, 10, 70, 70);
        let mut recs = build_recommendations(
            &[a, b],
            &[Classification::failed("x"), Classification::failed("x")],
        );
        sort_recommendations(&mut recs);
        // Equal scores: the top-most region ranks first.
        assert_eq!(recs[0].region.bbox.y0, 10);
        assert_eq!(recs[1].region.bbox.y0, 100);
    }
}
