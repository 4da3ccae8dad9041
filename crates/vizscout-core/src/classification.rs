//! Semantic classification of cropped regions.
//!
//! A [`Classification`] is the vision model's judgment of one crop. It is
//! immutable once created. Failed classifications are materialized with
//! `success = false` rather than dropped, so failures stay visible and
//! countable in the final output.

use serde::{Deserialize, Serialize};

/// Semantic type of a classified graphic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphicType {
    /// Company or product logo
    Logo,
    /// Illustration or artwork
    Illustration,
    /// Diagram or schematic
    Diagram,
    /// Data chart or graph
    Chart,
    /// Small pictogram or UI icon
    Icon,
    /// Recognizable graphic of another kind
    Other,
    /// The model answered but the type could not be determined
    #[default]
    Unknown,
    /// The classification call itself failed
    Error,
}

impl GraphicType {
    /// Lenient mapping from a model-supplied label. Unknown strings degrade
    /// to [`GraphicType::Unknown`], never error.
    #[must_use = "returns the parsed graphic type"]
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "logo" | "logotype" | "brand_mark" | "brandmark" | "wordmark" => Self::Logo,
            "illustration" | "artwork" | "drawing" | "graphic" => Self::Illustration,
            "diagram" | "schematic" | "flowchart" | "flow_chart" => Self::Diagram,
            "chart" | "graph" | "plot" | "infographic" => Self::Chart,
            "icon" | "pictogram" | "symbol" => Self::Icon,
            "other" => Self::Other,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for GraphicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logo => write!(f, "logo"),
            Self::Illustration => write!(f, "illustration"),
            Self::Diagram => write!(f, "diagram"),
            Self::Chart => write!(f, "chart"),
            Self::Icon => write!(f, "icon"),
            Self::Other => write!(f, "other"),
            Self::Unknown => write!(f, "unknown"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Perceived rendering quality of a classified graphic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Crisp, well rendered
    High,
    /// Usable with minor artifacts
    Medium,
    /// Blurry, clipped or heavily compressed
    Low,
    /// Not assessed
    #[default]
    Unknown,
}

impl Quality {
    /// Lenient mapping from a model-supplied label.
    #[must_use = "returns the parsed quality"]
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" | "good" | "excellent" => Self::High,
            "medium" | "moderate" | "ok" | "fair" => Self::Medium,
            "low" | "poor" | "bad" => Self::Low,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Semantic judgment of a cropped region, as returned by the external
/// vision service and normalized by the classification adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Classified graphic type
    pub graphic_type: GraphicType,
    /// Free-form description of the crop content
    pub content_description: String,
    /// Free-form color names, deduplicated in order of first appearance
    pub colors: Vec<String>,
    /// Brand or company name, when the model recognized one
    pub brand_or_company: Option<String>,
    /// Perceived rendering quality
    pub quality: Quality,
    /// Model confidence in [0, 1]
    pub ai_confidence: f64,
    /// Whether the classification call and parse succeeded
    pub success: bool,
    /// Failure reason when `success` is false
    pub error_reason: Option<String>,
}

impl Classification {
    /// Fabricate the failure record for a crop whose classification call
    /// failed (timeout, transport error, non-2xx). The owning region still
    /// appears in the output with a demoted score.
    #[must_use = "returns the fabricated failure classification"]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            graphic_type: GraphicType::Error,
            success: false,
            error_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Degraded-but-successful record for a response whose structured
    /// parsing failed entirely: the raw text is kept as the description
    /// because partial information is better than dropping the candidate.
    #[must_use = "returns the degraded classification"]
    pub fn degraded(raw_text: impl Into<String>) -> Self {
        Self {
            graphic_type: GraphicType::Unknown,
            content_description: raw_text.into(),
            success: true,
            ..Self::default()
        }
    }
}
