//! Composite region scoring and the shared rank ordering.
//!
//! The score is built additively from independent bonus terms and capped to
//! [0, 1]. Additive composition keeps every term explainable on its own:
//! a region's score is the sum of the bonuses it earned, nothing more.
//! Metadata reads are defensive; a missing key is a neutral bonus, never an
//! error.

#![allow(clippy::cast_precision_loss)]

use std::cmp::Ordering;
use vizscout_core::{DetectionConfig, DetectionMethod, Region};

/// Bonus for areas inside the plausible-graphic band.
const SIZE_BONUS_FULL: f64 = 0.30;
/// Reduced bonus for the wider secondary area band.
const SIZE_BONUS_HALF: f64 = 0.15;
/// Bonus for the center and top-right layout slots.
const SLOT_BONUS_PRIMARY: f64 = 0.25;
/// Bonus for the top-left layout slot.
const SLOT_BONUS_SECONDARY: f64 = 0.15;
/// Flat bonus for aspect ratios inside the configured band.
const ASPECT_BONUS: f64 = 0.10;

/// Fixed per-detector weight. Edge and texture signals are the most
/// specific; a bare position prior carries the least.
const fn method_bonus(method: DetectionMethod) -> f64 {
    match method {
        DetectionMethod::Edge | DetectionMethod::Texture => 0.25,
        DetectionMethod::Contour | DetectionMethod::Color => 0.20,
        DetectionMethod::Brightness => 0.15,
        DetectionMethod::Position => 0.10,
    }
}

/// Compute the composite confidence for one region.
#[must_use = "returns the composite score"]
pub fn region_score(region: &Region, config: &DetectionConfig) -> f64 {
    let mut score = 0.0;

    let area = region.area() as f64;
    let (full_lo, full_hi) = config.size_band_full;
    let (half_lo, half_hi) = config.size_band_half;
    if area >= full_lo && area <= full_hi {
        score += SIZE_BONUS_FULL;
    } else if area > half_lo && area <= half_hi {
        score += SIZE_BONUS_HALF;
    }

    if region.method == DetectionMethod::Position {
        match region.metadata_str("slot") {
            Some("center" | "top_right") => score += SLOT_BONUS_PRIMARY,
            Some("top_left") => score += SLOT_BONUS_SECONDARY,
            _ => {}
        }
    }

    score += method_bonus(region.method);

    let aspect = region.aspect_ratio();
    let (aspect_lo, aspect_hi) = config.aspect_band;
    if aspect >= aspect_lo && aspect <= aspect_hi {
        score += ASPECT_BONUS;
    }

    score.clamp(0.0, 1.0)
}

/// Score every region in place and sort by descending rank.
pub fn score_regions(regions: &mut [Region], config: &DetectionConfig) {
    for region in regions.iter_mut() {
        region.confidence = region_score(region, config);
    }
    regions.sort_by(rank_cmp);
}

/// Tie-break for regions of equal score: more supporting detections first,
/// then smaller page index, then top-left-most center (smaller y, then
/// smaller x). Gives the ranking a deterministic total order.
#[must_use = "returns the tie-break ordering"]
pub fn tie_break(a: &Region, b: &Region) -> Ordering {
    b.support
        .cmp(&a.support)
        .then_with(|| a.page_index.cmp(&b.page_index))
        .then_with(|| {
            let (ax, ay) = a.center();
            let (bx, by) = b.center();
            ay.total_cmp(&by).then_with(|| ax.total_cmp(&bx))
        })
}

/// Full rank ordering: descending confidence, then [`tie_break`].
#[must_use = "returns the rank ordering"]
pub fn rank_cmp(a: &Region, b: &Region) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| tie_break(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vizscout_core::PixelBox;

    fn region(method: DetectionMethod, bbox: PixelBox) -> Region {
        Region::new(0, bbox, method)
    }

    #[test]
    fn test_scores_stay_in_bounds() {
        let config = DetectionConfig::default();
        let samples = [
            region(DetectionMethod::Edge, PixelBox::new(0, 0, 50, 50)),
            region(DetectionMethod::Position, PixelBox::new(0, 0, 1, 1)),
            region(DetectionMethod::Texture, PixelBox::new(0, 0, 4000, 4000)),
        ];
        for sample in &samples {
            let score = region_score(sample, &config);
            assert!((0.0..=1.0).contains(&score), "score {score} out of bounds");
        }
    }

    #[test]
    fn test_size_bands() {
        let config = DetectionConfig::default();
        // 60x60 = 3600 px^2: full bonus band.
        let full = region(DetectionMethod::Edge, PixelBox::new(0, 0, 60, 60));
        // 100x100 = 10000 px^2: reduced band.
        let half = region(DetectionMethod::Edge, PixelBox::new(0, 0, 100, 100));
        // 300x300 = 90000 px^2: no size bonus.
        let none = region(DetectionMethod::Edge, PixelBox::new(0, 0, 300, 300));
        let s_full = region_score(&full, &config);
        let s_half = region_score(&half, &config);
        let s_none = region_score(&none, &config);
        assert!(s_full > s_half && s_half > s_none);
        assert!((s_full - s_half - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_method_weights_order() {
        let config = DetectionConfig::default();
        let bbox = PixelBox::new(0, 0, 60, 60);
        let edge = region_score(&region(DetectionMethod::Edge, bbox), &config);
        let color = region_score(&region(DetectionMethod::Color, bbox), &config);
        let brightness = region_score(&region(DetectionMethod::Brightness, bbox), &config);
        let position = region_score(&region(DetectionMethod::Position, bbox), &config);
        assert!(edge > color);
        assert!(color > brightness);
        assert!(brightness > position);
    }

    #[test]
    fn test_slot_bonus_reads_metadata_defensively() {
        let config = DetectionConfig::default();
        let bbox = PixelBox::new(0, 0, 60, 60);
        let center = region(DetectionMethod::Position, bbox)
            .with_metadata("slot", json!("center"));
        let bottom = region(DetectionMethod::Position, bbox)
            .with_metadata("slot", json!("bottom"));
        // Missing slot metadata is a neutral bonus, not an error.
        let missing = region(DetectionMethod::Position, bbox);
        assert!(region_score(&center, &config) > region_score(&bottom, &config));
        assert_eq!(
            region_score(&bottom, &config),
            region_score(&missing, &config)
        );
        // A non-position region never earns the slot bonus.
        let edge = region(DetectionMethod::Edge, bbox).with_metadata("slot", json!("center"));
        let plain_edge = region(DetectionMethod::Edge, bbox);
        assert_eq!(
            region_score(&edge, &config),
            region_score(&plain_edge, &config)
        );
    }

    #[test]
    fn test_rank_ordering_is_total_and_deterministic() {
        let config = DetectionConfig::default();
        let mut a = region(DetectionMethod::Edge, PixelBox::new(100, 100, 160, 160));
        let mut b = region(DetectionMethod::Edge, PixelBox::new(100, 50, 160, 110));
        a.confidence = region_score(&a, &config);
        b.confidence = region_score(&b, &config);
        assert_eq!(a.confidence, b.confidence);
        // Equal score and support: the top-most region wins.
        assert_eq!(rank_cmp(&b, &a), Ordering::Less);

        // Higher support beats position.
        b.support = 3;
        assert_eq!(rank_cmp(&b, &a), Ordering::Less);
        a.support = 5;
        assert_eq!(rank_cmp(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_score_regions_sorts_descending() {
        let config = DetectionConfig::default();
        let mut regions = vec![
            region(DetectionMethod::Position, PixelBox::new(0, 0, 300, 300)),
            region(DetectionMethod::Edge, PixelBox::new(0, 0, 60, 60)),
        ];
        score_regions(&mut regions, &config);
        assert!(regions[0].confidence >= regions[1].confidence);
        assert_eq!(regions[0].method, DetectionMethod::Edge);
    }
}
