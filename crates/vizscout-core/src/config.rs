//! Pipeline configuration.
//!
//! All thresholds live in explicit config structs passed through the
//! pipeline call, never in module-level globals, so one process can run
//! several configurations concurrently. Defaults are manually tuned starting
//! points, not claims of optimality.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thresholds for candidate detection, clustering and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Color-blob pixel area band (min, max)
    pub color_area: (u64, u64),
    /// Edge-contour pixel area band (min, max)
    pub edge_area: (u64, u64),
    /// Minimum local edge-pixel density inside a candidate box
    pub edge_min_density: f64,
    /// Canny (low, high) pairs; the two edge maps are unioned
    pub edge_thresholds: [(f32, f32); 2],
    /// Contour pixel area band (min, max)
    pub contour_area: (u64, u64),
    /// Contour aspect-ratio band (min, max)
    pub contour_aspect: (f64, f64),
    /// Binarization thresholds for the contour detector
    pub contour_thresholds: [u8; 3],
    /// Texture-region pixel area band (min, max)
    pub texture_area: (u64, u64),
    /// Sliding-window size in pixels for local variance
    pub texture_window: u32,
    /// Variance percentile above which a window counts as textured
    pub texture_percentile: f64,
    /// Brightness-region pixel area band (min, max)
    pub brightness_area: (u64, u64),
    /// Sliding-window size in pixels for local contrast
    pub brightness_window: u32,
    /// Contrast percentile above which a window counts as high-contrast
    pub brightness_percentile: f64,
    /// Neighborhood radius for density clustering over standardized features
    pub cluster_radius: f64,
    /// Fixed reference width for feature normalization (not the page width)
    pub reference_width: f64,
    /// Fixed reference height for feature normalization
    pub reference_height: f64,
    /// Fixed reference area for feature normalization
    pub reference_area: f64,
    /// Number of top-ranked regions sent to classification
    pub top_candidates: usize,
    /// Area band receiving the full size bonus when scoring
    pub size_band_full: (f64, f64),
    /// Area band receiving the reduced size bonus when scoring
    pub size_band_half: (f64, f64),
    /// Aspect-ratio band receiving the flat aspect bonus when scoring
    pub aspect_band: (f64, f64),
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            color_area: (50, 50_000),
            edge_area: (100, 30_000),
            edge_min_density: 0.02,
            edge_thresholds: [(10.0, 40.0), (50.0, 120.0)],
            contour_area: (200, 40_000),
            contour_aspect: (0.1, 10.0),
            contour_thresholds: [85, 127, 170],
            texture_area: (300, 20_000),
            texture_window: 16,
            texture_percentile: 0.90,
            brightness_area: (200, 15_000),
            brightness_window: 16,
            brightness_percentile: 0.85,
            cluster_radius: 0.5,
            reference_width: 1000.0,
            reference_height: 1000.0,
            reference_area: 1_000_000.0,
            top_candidates: 10,
            size_band_full: (200.0, 5_000.0),
            size_band_half: (5_000.0, 20_000.0),
            aspect_band: (0.3, 5.0),
        }
    }
}

/// Configuration for the external vision-classification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyConfig {
    /// Base URL of the chat-completions style endpoint
    pub endpoint: String,
    /// Vision model name (e.g. "gpt-4o-mini")
    pub model: String,
    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per crop; 1 means no retry
    pub max_attempts: u32,
    /// Maximum concurrent in-flight classification requests
    pub max_concurrent: usize,
    /// Maximum tokens in the model response
    pub max_tokens: usize,
    /// Image detail level requested from the vision model
    pub detail: String,
}

impl ClassifyConfig {
    /// Per-attempt timeout as a [`Duration`].
    #[inline]
    #[must_use = "returns the configured timeout"]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Create configuration from environment variables.
    ///
    /// - `VIZSCOUT_ENDPOINT`: API base URL (default: `OpenAI` v1)
    /// - `VIZSCOUT_MODEL`: model name (default: "gpt-4o-mini")
    /// - `VIZSCOUT_TIMEOUT_SECS`: per-attempt timeout (default: 30)
    /// - `VIZSCOUT_MAX_ATTEMPTS`: attempts per crop (default: 1)
    /// - `VIZSCOUT_MAX_CONCURRENT`: in-flight request cap (default: 3)
    #[must_use = "creates config from environment variables"]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var("VIZSCOUT_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("VIZSCOUT_MODEL") {
            config.model = model;
        }
        if let Some(timeout_secs) = env_parse("VIZSCOUT_TIMEOUT_SECS") {
            config.timeout_secs = timeout_secs;
        }
        if let Some(max_attempts) = env_parse("VIZSCOUT_MAX_ATTEMPTS") {
            config.max_attempts = max_attempts;
        }
        if let Some(max_concurrent) = env_parse("VIZSCOUT_MAX_CONCURRENT") {
            config.max_concurrent = max_concurrent;
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl Default for ClassifyConfig {
    #[inline]
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
            max_attempts: 1,
            max_concurrent: 3,
            max_tokens: 1024,
            detail: "high".to_string(),
        }
    }
}
