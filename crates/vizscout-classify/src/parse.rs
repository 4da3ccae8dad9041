//! Parse-or-degrade handling of vision-service responses.
//!
//! The service contract says responses *should* be JSON-shaped, but models
//! routinely wrap the JSON in markdown fences or prose. All of that
//! tolerance is isolated here: [`parse_classification`] either produces a
//! structured [`Classification`] or degrades to `graphic_type = unknown`
//! with the raw text preserved as the description. It never returns an
//! error, because partial information is better than dropping a candidate.

use serde::Deserialize;
use vizscout_core::{Classification, GraphicType, Quality};

/// Loose wire shape of a classification response. Every field is optional
/// and common alternate key names are accepted.
#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(alias = "type", alias = "category")]
    graphic_type: Option<String>,
    #[serde(alias = "description", alias = "content")]
    content_description: Option<String>,
    #[serde(default)]
    colors: Vec<String>,
    #[serde(alias = "brand", alias = "company")]
    brand_or_company: Option<String>,
    quality: Option<String>,
    #[serde(alias = "ai_confidence", alias = "score")]
    confidence: Option<f64>,
}

/// Extract the JSON payload from a response that may wrap it in a markdown
/// code fence or surrounding prose.
#[must_use = "returns the extracted JSON payload"]
pub fn extract_json(text: &str) -> String {
    let text = text.trim();

    // Handle ```json ... ``` wrapper
    if text.starts_with("```") {
        if let Some(start) = text.find('\n') {
            let after_first_line = &text[start + 1..];
            if let Some(end) = after_first_line.rfind("```") {
                return after_first_line[..end].trim().to_string();
            }
        }
    }

    // Fall back to the outermost brace pair
    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            if end > start {
                return text[start..=end].to_string();
            }
        }
    }

    text.to_string()
}

/// Normalize a raw service response into a [`Classification`].
///
/// Structured parsing failures degrade rather than error: the result is a
/// successful classification of type `unknown` carrying the raw text.
#[must_use = "returns the normalized classification"]
pub fn parse_classification(raw_text: &str) -> Classification {
    let json_payload = extract_json(raw_text);
    let Ok(raw) = serde_json::from_str::<RawClassification>(&json_payload) else {
        return Classification::degraded(raw_text.trim());
    };

    let graphic_type = raw
        .graphic_type
        .as_deref()
        .map_or(GraphicType::Unknown, GraphicType::from_label);
    let quality = raw
        .quality
        .as_deref()
        .map_or(Quality::Unknown, Quality::from_label);

    // Deduplicate color names, keeping the order of first appearance.
    let mut colors: Vec<String> = Vec::new();
    for color in raw.colors {
        let color = color.trim().to_lowercase();
        if !color.is_empty() && !colors.contains(&color) {
            colors.push(color);
        }
    }

    let brand_or_company = raw
        .brand_or_company
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty() && !b.eq_ignore_ascii_case("none"));

    Classification {
        graphic_type,
        content_description: raw.content_description.unwrap_or_default(),
        colors,
        brand_or_company,
        quality,
        ai_confidence: raw.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
        success: true,
        error_reason: None,
    }
}
