//! Crop extraction for top-ranked regions.
//!
//! Crops are cut from the already-rendered page raster; the document is
//! never re-rendered. Bboxes are clamped to the image bounds with a
//! guaranteed minimum 1x1 pixel extent, so a degenerate bbox yields the
//! smallest valid rectangle instead of an error.

use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use vizscout_core::{CropRef, PixelBox, Region, Result, VizscoutError};

/// Cut a clamped crop out of a page raster.
#[must_use = "returns the cropped image"]
pub fn extract_crop(image: &RgbImage, bbox: &PixelBox) -> RgbImage {
    let (width, height) = image.dimensions();
    let clamped = bbox.clamp_to(width.max(1), height.max(1));
    image::imageops::crop_imm(image, clamped.x0, clamped.y0, clamped.width(), clamped.height())
        .to_image()
}

/// Encode an image as PNG bytes.
///
/// # Errors
///
/// Returns an error if PNG encoding fails.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| VizscoutError::ImageError(e.to_string()))?;
    Ok(png_bytes)
}

/// Render the crop for one region as a [`CropRef`].
///
/// # Errors
///
/// Returns an error if PNG encoding fails.
pub fn crop_region(image: &RgbImage, region: &Region) -> Result<CropRef> {
    let (width, height) = image.dimensions();
    let clamped = region.bbox.clamp_to(width.max(1), height.max(1));
    let crop = extract_crop(image, &region.bbox);
    Ok(CropRef {
        page_index: region.page_index,
        bbox: clamped,
        png_data: encode_png(&crop)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use vizscout_core::DetectionMethod;

    #[test]
    fn test_crop_matches_bbox() {
        let mut image = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        image.put_pixel(30, 40, Rgb([10, 20, 30]));
        let crop = extract_crop(&image, &PixelBox::new(30, 40, 50, 60));
        assert_eq!(crop.dimensions(), (20, 20));
        assert_eq!(crop.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_degenerate_bbox_yields_one_pixel() {
        let image = RgbImage::from_pixel(50, 50, Rgb([9, 9, 9]));
        let degenerate = PixelBox {
            x0: 20,
            y0: 20,
            x1: 20,
            y1: 20,
        };
        let crop = extract_crop(&image, &degenerate);
        assert_eq!(crop.dimensions(), (1, 1));
    }

    #[test]
    fn test_out_of_bounds_bbox_is_clamped() {
        let image = RgbImage::from_pixel(50, 50, Rgb([9, 9, 9]));
        let crop = extract_crop(&image, &PixelBox::new(40, 45, 200, 300));
        assert_eq!(crop.dimensions(), (10, 5));
    }

    #[test]
    fn test_crop_region_produces_png() {
        let image = RgbImage::from_pixel(80, 80, Rgb([120, 130, 140]));
        let region = Region::new(3, PixelBox::new(10, 10, 40, 40), DetectionMethod::Edge);
        let crop = crop_region(&image, &region).unwrap();
        assert_eq!(crop.page_index, 3);
        assert_eq!(crop.bbox, PixelBox::new(10, 10, 40, 40));
        // PNG magic bytes.
        assert_eq!(&crop.png_data[..4], &[0x89, b'P', b'N', b'G']);
        let decoded = image::load_from_memory(&crop.png_data).unwrap();
        assert_eq!(decoded.width(), 30);
    }
}
