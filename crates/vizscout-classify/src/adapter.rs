//! Classification adapter: bounded, fault-tolerant calls per crop.
//!
//! Each crop walks a `Pending -> Sent -> (Succeeded | Failed)` state
//! machine. A send enforces the configured timeout; timeouts, transport
//! errors and non-2xx responses all end in a fabricated failure
//! [`Classification`] instead of an error, so a misbehaving service can
//! never abort the pipeline or drop a candidate. Retries default to a
//! single attempt; callers may supply a different [`RetryPolicy`].

use crate::client::VisionClient;
use crate::parse::parse_classification;
use tracing::{debug, warn};
use vizscout_core::{Classification, ClassifyConfig, CropRef};

/// Prompt sent alongside every crop.
pub const CLASSIFY_PROMPT: &str = r#"You are an expert brand-asset analyst. Classify the visual element in this image crop.

OUTPUT JSON SCHEMA:
{
  "graphic_type": "<logo|illustration|diagram|chart|icon|other|unknown>",
  "content_description": "<one or two sentences describing the element>",
  "colors": ["<dominant color names>"],
  "brand_or_company": "<brand name if recognizable, else null>",
  "quality": "<high|medium|low>",
  "confidence": <0.0-1.0>
}

RULES:
1. Judge only what is visible in the crop; do not guess beyond it
2. "logo" means a brand mark or wordmark, "icon" a small pictogram
3. colors: broad names (red, navy blue, gold), most dominant first
4. brand_or_company: only when you actually recognize the mark
5. confidence: 1.0 = certain, 0.5 = plausible, below 0.3 = guessing

Return ONLY valid JSON. No markdown, no explanation."#;

/// Lifecycle of one classification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropState {
    /// Created, not yet sent
    Pending,
    /// Request in flight, timeout armed
    Sent,
    /// Response received and normalized
    Succeeded,
    /// Timed out or errored; a failure record was fabricated
    Failed,
}

/// Caller-supplied retry policy. The default makes a single attempt;
/// retries beyond that belong to the external service contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per crop, including the first
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Policy from the classification config.
    #[inline]
    #[must_use = "returns the configured retry policy"]
    pub const fn from_config(config: &ClassifyConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
        }
    }
}

impl Default for RetryPolicy {
    #[inline]
    fn default() -> Self {
        Self { max_attempts: 1 }
    }
}

/// Classify one crop, never failing.
///
/// Every attempt transitions `Pending -> Sent`; the first successful
/// response wins. When all attempts are exhausted the final state is
/// `Failed` and the returned record carries `success = false` with the last
/// error as its reason.
pub async fn classify_crop<C: VisionClient>(
    client: &C,
    crop: &CropRef,
    config: &ClassifyConfig,
    retry: &RetryPolicy,
) -> Classification {
    let mut state = CropState::Pending;
    debug!(page_index = crop.page_index, state = ?state, "crop queued for classification");
    let attempts = retry.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        state = CropState::Sent;
        debug!(
            page_index = crop.page_index,
            attempt,
            "sending crop to classification service"
        );

        match tokio::time::timeout(config.timeout(), client.classify(&crop.png_data, CLASSIFY_PROMPT))
            .await
        {
            Ok(Ok(raw)) => {
                state = CropState::Succeeded;
                debug!(page_index = crop.page_index, state = ?state, "crop classified");
                return parse_classification(&raw);
            }
            Ok(Err(e)) => {
                last_error = format!("classification request failed: {e:#}");
            }
            Err(_) => {
                last_error = format!(
                    "classification timed out after {}s",
                    config.timeout_secs
                );
            }
        }

        warn!(
            page_index = crop.page_index,
            attempt, attempts, state = ?state, "{last_error}"
        );
    }

    state = CropState::Failed;
    debug!(page_index = crop.page_index, state = ?state, "crop classification gave up");
    Classification::failed(last_error)
}
