//! PDF page rendering using pdfium.
//!
//! This is the external-renderer side of the pipeline boundary: pages in,
//! RGB rasters out. Rendering is deterministic for identical
//! `(document, page, dpi)` inputs. A page that fails to render becomes a
//! [`PageFailure`] entry; the remaining pages still render.

// DPI and dimension calculations involve various cast types
#![allow(clippy::cast_possible_truncation)]

use anyhow::{Context, Result};
use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::warn;
use vizscout_core::PageFailure;

/// PDF points per inch - standard PostScript/PDF unit conversion factor.
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// One rendered page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 0-based page index
    pub page_index: usize,
    /// RGB raster at the requested DPI
    pub image: RgbImage,
    /// Page width in PDF points (1/72 inch)
    pub width_pts: f32,
    /// Page height in PDF points (1/72 inch)
    pub height_pts: f32,
}

/// Renders PDF pages to RGB rasters at a given DPI.
pub struct PdfPageRenderer {
    pdfium: Pdfium,
}

impl PdfPageRenderer {
    /// Create a new renderer.
    ///
    /// # Errors
    ///
    /// This function currently never returns an error.
    pub fn new() -> Result<Self> {
        let pdfium = Pdfium::default();
        Ok(Self { pdfium })
    }

    /// Render all pages of a PDF.
    ///
    /// Returns the successfully rendered pages plus a failure entry for
    /// every page that could not be rendered.
    ///
    /// # Errors
    ///
    /// Returns an error if the PDF itself cannot be loaded.
    pub fn render_pages(
        &self,
        pdf_path: &Path,
        dpi: u32,
    ) -> Result<(Vec<RenderedPage>, Vec<PageFailure>)> {
        let document = self
            .pdfium
            .load_pdf_from_file(pdf_path, None)
            .context("Failed to load PDF")?;

        let mut pages = Vec::new();
        let mut failures = Vec::new();

        for (page_index, page) in document.pages().iter().enumerate() {
            let width_pts = page.width().value;
            let height_pts = page.height().value;

            let render_config = PdfRenderConfig::new()
                .set_target_width((width_pts * dpi as f32 / PDF_POINTS_PER_INCH) as i32)
                .set_target_height((height_pts * dpi as f32 / PDF_POINTS_PER_INCH) as i32);

            match page.render_with_config(&render_config) {
                Ok(bitmap) => pages.push(RenderedPage {
                    page_index,
                    image: bitmap.as_image().to_rgb8(),
                    width_pts,
                    height_pts,
                }),
                Err(e) => {
                    warn!(page_index, "failed to render page: {e}");
                    failures.push(PageFailure {
                        page_index,
                        reason: format!("render failed: {e}"),
                    });
                }
            }
        }

        Ok((pages, failures))
    }

    /// Number of pages in a PDF.
    ///
    /// # Errors
    ///
    /// Returns an error if the PDF cannot be loaded.
    pub fn page_count(&self, pdf_path: &Path) -> Result<usize> {
        let document = self
            .pdfium
            .load_pdf_from_file(pdf_path, None)
            .context("Failed to load PDF")?;
        Ok(document.pages().len() as usize)
    }
}
