//! # vizscout-pipeline
//!
//! Orchestration of the full vizscout analysis pipeline:
//!
//! ```text
//! page raster -> {six detectors} -> clusterer -> scorer -> (top-N)
//!             -> crop extractor -> classification adapter
//!             -> recommendation engine -> DocumentAnalysis
//! ```
//!
//! ## Concurrency model
//!
//! Within a page the six detectors fan out over the shared read-only raster
//! (rayon, order-preserving). Clustering and scoring are cheap synchronous
//! CPU work. Classification calls are the only suspending operations and
//! run with bounded concurrency (`ClassifyConfig::max_concurrent`); results
//! are re-keyed by candidate rank afterwards so completion order never
//! leaks into the output.
//!
//! ## Failure containment
//!
//! A failing detector contributes zero candidates. A failing classification
//! becomes a `Classification { success: false, .. }` with a demoted score.
//! A structurally broken page becomes a [`PageFailure`] entry and other
//! pages continue. Nothing is silently dropped.
//!
//! ## Cancellation
//!
//! A [`CancelToken`] stops new classification calls from being issued;
//! in-flight calls complete or time out normally so the client's connection
//! pool is never poisoned. Crops skipped by cancellation still yield
//! failure classifications.

pub mod recommend;
pub mod summary;

use futures::stream::{self, StreamExt};
use image::RgbImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use vizscout_classify::{classify_crop, RetryPolicy, VisionClient};
use vizscout_core::{
    Classification, ClassifyConfig, CropRef, DetectionConfig, DocumentAnalysis, PageFailure,
    Recommendation, Region, Result, VizscoutError,
};
use vizscout_detect::{cluster_regions, crop_region, run_detectors, score_regions};

pub use recommend::{build_recommendations, sort_recommendations};
pub use summary::summarize;

/// One rendered page handed to the pipeline by the external renderer.
#[derive(Debug, Clone)]
pub struct PageRaster {
    /// 0-based page index
    pub page_index: usize,
    /// Page raster at the detection zoom level; shared read-only
    pub image: RgbImage,
}

/// Page-level cancellation flag.
///
/// Once cancelled, no new classification calls are issued; in-flight calls
/// are allowed to complete or time out rather than being forcibly killed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Fresh, uncancelled token.
    #[must_use = "returns a new cancellation token"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use = "returns the cancellation state"]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of analyzing a single page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageAnalysis {
    /// All deduplicated, scored regions on the page, best first
    pub regions: Vec<Region>,
    /// Crops of the top-ranked regions, in rank order
    pub screenshots: Vec<CropRef>,
    /// Classification per crop, aligned with `screenshots`
    pub classifications: Vec<Classification>,
    /// Recommendations for the classified candidates, best first
    pub recommendations: Vec<Recommendation>,
}

/// Analyze one page raster.
///
/// # Errors
///
/// Returns a [`VizscoutError::PageError`] when the raster is structurally
/// unusable (zero dimensions). Detector and classification failures are
/// contained and never surface here.
pub async fn analyze_page<C: VisionClient>(
    page: &PageRaster,
    detection: &DetectionConfig,
    classify: &ClassifyConfig,
    client: &C,
    cancel: &CancelToken,
) -> Result<PageAnalysis> {
    let (width, height) = page.image.dimensions();
    if width == 0 || height == 0 {
        return Err(VizscoutError::PageError {
            page_index: page.page_index,
            reason: "empty raster".to_string(),
        });
    }

    let candidates = run_detectors(&page.image, page.page_index, detection);
    let mut regions = cluster_regions(candidates, detection);
    score_regions(&mut regions, detection);
    info!(
        page_index = page.page_index,
        regions = regions.len(),
        "page candidates scored"
    );

    let top: Vec<Region> = regions
        .iter()
        .take(detection.top_candidates)
        .cloned()
        .collect();

    // Crop the page raster; a crop failure keeps its slot with an empty
    // payload so the candidate still surfaces with a failure record.
    let mut screenshots = Vec::with_capacity(top.len());
    let mut crop_errors: Vec<Option<String>> = Vec::with_capacity(top.len());
    for region in &top {
        match crop_region(&page.image, region) {
            Ok(crop) => {
                screenshots.push(crop);
                crop_errors.push(None);
            }
            Err(e) => {
                warn!(page_index = page.page_index, "crop extraction failed: {e}");
                screenshots.push(CropRef {
                    page_index: region.page_index,
                    bbox: region.bbox.clamp_to(width, height),
                    png_data: Vec::new(),
                });
                crop_errors.push(Some(e.to_string()));
            }
        }
    }

    let retry = RetryPolicy::from_config(classify);
    let mut keyed: Vec<(usize, Classification)> = stream::iter(
        screenshots
            .iter()
            .zip(&crop_errors)
            .enumerate()
            .map(|(idx, (crop, crop_error))| async move {
                if let Some(reason) = crop_error {
                    return (idx, Classification::failed(format!("crop failed: {reason}")));
                }
                if cancel.is_cancelled() {
                    return (idx, Classification::failed("cancelled before send"));
                }
                (idx, classify_crop(client, crop, classify, &retry).await)
            }),
    )
    .buffer_unordered(classify.max_concurrent.max(1))
    .collect()
    .await;

    // Completion order is nondeterministic; restore candidate rank order.
    keyed.sort_by_key(|(idx, _)| *idx);
    let classifications: Vec<Classification> =
        keyed.into_iter().map(|(_, classification)| classification).collect();

    let mut recommendations = build_recommendations(&top, &classifications);
    sort_recommendations(&mut recommendations);

    Ok(PageAnalysis {
        regions,
        screenshots,
        classifications,
        recommendations,
    })
}

/// Analyze a whole document.
///
/// Pages are independent; a page-level failure is surfaced as a
/// [`PageFailure`] entry while the remaining pages continue. The returned
/// recommendation list is re-ranked globally across pages.
pub async fn analyze_document<C: VisionClient>(
    pages: &[PageRaster],
    detection: &DetectionConfig,
    classify: &ClassifyConfig,
    client: &C,
    cancel: &CancelToken,
) -> DocumentAnalysis {
    let mut analysis = DocumentAnalysis::default();

    for page in pages {
        match analyze_page(page, detection, classify, client, cancel).await {
            Ok(page_analysis) => {
                analysis.graphic_regions.extend(page_analysis.regions);
                analysis.screenshots.extend(page_analysis.screenshots);
                analysis.ai_analysis.extend(page_analysis.classifications);
                analysis
                    .recommended_graphics
                    .extend(page_analysis.recommendations);
            }
            Err(e) => {
                warn!(page_index = page.page_index, "page analysis failed: {e}");
                analysis.page_failures.push(PageFailure {
                    page_index: page.page_index,
                    reason: e.to_string(),
                });
            }
        }
    }

    sort_recommendations(&mut analysis.recommended_graphics);
    analysis.analysis_summary = summarize(&analysis.graphic_regions, &analysis.ai_analysis);
    info!(
        regions = analysis.analysis_summary.total_regions,
        recommendations = analysis.recommended_graphics.len(),
        failed_pages = analysis.page_failures.len(),
        "document analysis complete"
    );
    analysis
}
