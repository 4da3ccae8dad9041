//! Error types for the detection pipeline.
//!
//! Errors here cover page-level and document-level structural failures only.
//! Per-detector failures and per-classification failures are contained at
//! their own boundary (a failing detector contributes zero candidates, a
//! failing classification is materialized as `Classification { success:
//! false, .. }`) and never surface through this enum.

use thiserror::Error;

/// Error types that can occur while analyzing a document.
#[derive(Error, Debug)]
pub enum VizscoutError {
    /// The external renderer could not produce a raster for a page.
    #[error("Render error: {0}")]
    RenderError(String),

    /// A page raster was structurally unusable (e.g. zero dimensions).
    #[error("Page {page_index} error: {reason}")]
    PageError {
        /// 0-based page index
        page_index: usize,
        /// Human-readable failure reason
        reason: String,
    },

    /// Image decoding or encoding failed.
    #[error("Image error: {0}")]
    ImageError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    ConfigError(String),
}

/// Type alias for [`Result<T, VizscoutError>`].
pub type Result<T> = std::result::Result<T, VizscoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_error_display() {
        let error = VizscoutError::PageError {
            page_index: 3,
            reason: "empty raster".to_string(),
        };
        assert_eq!(format!("{error}"), "Page 3 error: empty raster");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VizscoutError = io_err.into();
        match err {
            VizscoutError::IoError(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected IoError variant"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ bad").unwrap_err();
        let err: VizscoutError = json_err.into();
        assert!(matches!(err, VizscoutError::JsonError(_)));
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(VizscoutError::RenderError("pdfium unavailable".to_string()))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        assert!(matches!(outer(), Err(VizscoutError::RenderError(_))));
    }
}
