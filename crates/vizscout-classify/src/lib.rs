//! # vizscout-classify
//!
//! Classification adapter between the vizscout pipeline and an external
//! vision-capable service.
//!
//! ## Overview
//!
//! The detection side of the pipeline produces crops with purely geometric
//! confidence; this crate obtains their semantic labels. Per crop:
//!
//! 1. [`classify_crop`] sends the PNG crop and a fixed prompt through a
//!    [`VisionClient`] with a per-attempt timeout
//! 2. The raw response is normalized by a parse-or-degrade step that
//!    tolerates markdown-fenced and prose-wrapped JSON
//! 3. Any failure (timeout, non-2xx, transport) becomes a fabricated
//!    `Classification { success: false, .. }` - failures never abort the
//!    pipeline and candidates are never dropped
//!
//! ## Clients
//!
//! - [`HttpVisionClient`] - OpenAI-style chat-completions vision endpoint
//! - [`NullVisionClient`] - always fails; for classification-disabled runs
//!
//! Test code supplies its own [`VisionClient`] stubs instead of live HTTP.

pub mod adapter;
pub mod client;
pub mod parse;

pub use adapter::{classify_crop, CropState, RetryPolicy, CLASSIFY_PROMPT};
pub use client::{HttpVisionClient, NullVisionClient, VisionClient};
pub use parse::{extract_json, parse_classification};
