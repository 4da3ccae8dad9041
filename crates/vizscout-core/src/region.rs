//! Candidate regions and their geometry.
//!
//! A [`Region`] is a bounding box on one rendered page believed to contain a
//! visual element of interest, tagged with the detection strategy that
//! produced it. Regions are created by detectors with `confidence = 0`,
//! merged by the clusterer (union bbox, max confidence, summed support) and
//! scored by the region scorer; downstream stages treat them as read-only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned bounding box in raster pixel coordinates (origin top-left).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PixelBox {
    /// Left edge x-coordinate
    pub x0: u32,
    /// Top edge y-coordinate
    pub y0: u32,
    /// Right edge x-coordinate (exclusive)
    pub x1: u32,
    /// Bottom edge y-coordinate (exclusive)
    pub y1: u32,
}

impl PixelBox {
    /// Create a bounding box from corner coordinates, normalizing order.
    #[must_use = "returns a new bounding box"]
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Width in pixels.
    #[inline]
    #[must_use = "returns the box width"]
    pub const fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    /// Height in pixels.
    #[inline]
    #[must_use = "returns the box height"]
    pub const fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Area in square pixels. Always equals `width() * height()`.
    #[inline]
    #[must_use = "returns the box area"]
    pub const fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Width over height, or 0 when the height is 0.
    #[inline]
    #[must_use = "returns the aspect ratio"]
    pub fn aspect_ratio(&self) -> f64 {
        if self.height() == 0 {
            0.0
        } else {
            f64::from(self.width()) / f64::from(self.height())
        }
    }

    /// Midpoint of the box as `(cx, cy)`.
    #[inline]
    #[must_use = "returns the box center"]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.x0 + self.x1) / 2.0,
            f64::from(self.y0 + self.y1) / 2.0,
        )
    }

    /// Coordinate-wise union with another box.
    #[inline]
    #[must_use = "returns the union box"]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Intersection over union with another box.
    #[must_use = "computes intersection over union"]
    pub fn iou(&self, other: &Self) -> f64 {
        let x_left = self.x0.max(other.x0);
        let y_top = self.y0.max(other.y0);
        let x_right = self.x1.min(other.x1);
        let y_bottom = self.y1.min(other.y1);

        if x_right <= x_left || y_bottom <= y_top {
            return 0.0;
        }

        let intersection = u64::from(x_right - x_left) * u64::from(y_bottom - y_top);
        let union = self.area() + other.area() - intersection;

        if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }

    /// Clamp the box to an image of the given dimensions, guaranteeing a
    /// minimum 1x1 pixel extent even for degenerate inputs.
    #[must_use = "returns the clamped box"]
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let max_x = width.max(1);
        let max_y = height.max(1);
        let x0 = self.x0.min(max_x - 1);
        let y0 = self.y0.min(max_y - 1);
        let x1 = self.x1.clamp(x0 + 1, max_x);
        let y1 = self.y1.clamp(y0 + 1, max_y);
        Self { x0, y0, x1, y1 }
    }
}

/// The detection strategy that produced a candidate region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Hue/saturation/value color-band thresholding
    Color,
    /// Dual-threshold edge map contours
    Edge,
    /// Multi-threshold binarization contours
    Contour,
    /// Local variance (sliding window)
    Texture,
    /// Fixed layout-slot prior, not a measured detection
    Position,
    /// Local contrast (standard deviation of luminance)
    Brightness,
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Color => write!(f, "color"),
            Self::Edge => write!(f, "edge"),
            Self::Contour => write!(f, "contour"),
            Self::Texture => write!(f, "texture"),
            Self::Position => write!(f, "position"),
            Self::Brightness => write!(f, "brightness"),
        }
    }
}

impl std::str::FromStr for DetectionMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "color" => Ok(Self::Color),
            "edge" => Ok(Self::Edge),
            "contour" => Ok(Self::Contour),
            "texture" => Ok(Self::Texture),
            "position" => Ok(Self::Position),
            "brightness" => Ok(Self::Brightness),
            _ => Err(format!("unknown detection method '{s}'")),
        }
    }
}

/// A candidate visual element on one page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Region {
    /// 0-based page index
    pub page_index: usize,
    /// Bounding box in raster pixel coordinates at the detection zoom level
    pub bbox: PixelBox,
    /// The detection strategy that produced this region
    pub method: DetectionMethod,
    /// Detector-specific extras (dominant color name, edge density, ...).
    /// Opaque to downstream stages except the scorer, which reads known keys
    /// defensively. Ordered map so serialized output is deterministic.
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Heuristic confidence in [0, 1]; 0 at creation, written by the scorer
    pub confidence: f64,
    /// Number of raw detections merged into this region; 1 at creation,
    /// raised by the clusterer
    pub support: u32,
}

impl Region {
    /// Create a fresh candidate with zero confidence and support 1.
    #[must_use = "returns a new candidate region"]
    pub fn new(page_index: usize, bbox: PixelBox, method: DetectionMethod) -> Self {
        Self {
            page_index,
            bbox,
            method,
            metadata: BTreeMap::new(),
            confidence: 0.0,
            support: 1,
        }
    }

    /// Attach a detector-specific metadata entry.
    #[must_use = "builder method returns the modified region"]
    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Read a metadata entry as a string, if present and string-shaped.
    #[must_use = "returns the metadata value if present"]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(serde_json::Value::as_str)
    }

    /// Read a metadata entry as a float, if present and numeric.
    #[must_use = "returns the metadata value if present"]
    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Area of the bounding box in square pixels.
    #[inline]
    #[must_use = "returns the region area"]
    pub const fn area(&self) -> u64 {
        self.bbox.area()
    }

    /// Aspect ratio of the bounding box.
    #[inline]
    #[must_use = "returns the region aspect ratio"]
    pub fn aspect_ratio(&self) -> f64 {
        self.bbox.aspect_ratio()
    }

    /// Center of the bounding box.
    #[inline]
    #[must_use = "returns the region center"]
    pub fn center(&self) -> (f64, f64) {
        self.bbox.center()
    }
}

/// An equivalence set of regions believed to refer to the same element.
///
/// Clusters are connected components of the neighbor graph over normalized
/// geometric features, not necessarily globally compact sets. Member order
/// is discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cluster {
    /// Member regions in discovery order
    pub members: Vec<Region>,
}

impl Cluster {
    /// Number of member regions.
    #[inline]
    #[must_use = "returns the cluster size"]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the cluster has no members.
    #[inline]
    #[must_use = "returns whether the cluster is empty"]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Coordinate-wise union of all member bounding boxes.
    #[must_use = "returns the union of member boxes"]
    pub fn union_bbox(&self) -> Option<PixelBox> {
        let mut iter = self.members.iter();
        let first = iter.next()?.bbox;
        Some(iter.fold(first, |acc, r| acc.union(&r.bbox)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_geometry() {
        let bbox = PixelBox::new(10, 20, 110, 70);
        assert_eq!(bbox.width(), 100);
        assert_eq!(bbox.height(), 50);
        assert_eq!(bbox.area(), 5000);
        assert_eq!(bbox.area(), u64::from(bbox.width()) * u64::from(bbox.height()));
        assert!((bbox.aspect_ratio() - 2.0).abs() < f64::EPSILON);
        assert_eq!(bbox.center(), (60.0, 45.0));
    }

    #[test]
    fn test_new_normalizes_corner_order() {
        let bbox = PixelBox::new(110, 70, 10, 20);
        assert_eq!(bbox, PixelBox::new(10, 20, 110, 70));
    }

    #[test]
    fn test_zero_height_aspect_ratio() {
        let bbox = PixelBox::new(0, 5, 10, 5);
        assert_eq!(bbox.height(), 0);
        assert_eq!(bbox.aspect_ratio(), 0.0);
    }

    #[test]
    fn test_union_is_coordinate_wise() {
        let a = PixelBox::new(10, 10, 50, 50);
        let b = PixelBox::new(40, 40, 80, 80);
        assert_eq!(a.union(&b), PixelBox::new(10, 10, 80, 80));
    }

    #[test]
    fn test_iou_disjoint_and_identical() {
        let a = PixelBox::new(0, 0, 10, 10);
        let b = PixelBox::new(20, 20, 30, 30);
        assert_eq!(a.iou(&b), 0.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_to_degenerate_box() {
        // A zero-area box still yields a 1x1 crop window.
        let degenerate = PixelBox {
            x0: 5,
            y0: 5,
            x1: 5,
            y1: 5,
        };
        let clamped = degenerate.clamp_to(100, 100);
        assert_eq!(clamped.width(), 1);
        assert_eq!(clamped.height(), 1);
    }

    #[test]
    fn test_clamp_to_out_of_bounds() {
        let bbox = PixelBox::new(90, 90, 300, 400);
        let clamped = bbox.clamp_to(100, 100);
        assert_eq!(clamped, PixelBox::new(90, 90, 100, 100));
    }

    #[test]
    fn test_region_starts_unscored() {
        let region = Region::new(0, PixelBox::new(0, 0, 10, 10), DetectionMethod::Edge);
        assert_eq!(region.confidence, 0.0);
        assert_eq!(region.support, 1);
    }

    #[test]
    fn test_metadata_defensive_reads() {
        let region = Region::new(0, PixelBox::new(0, 0, 10, 10), DetectionMethod::Color)
            .with_metadata("color", serde_json::json!("blue"))
            .with_metadata("edge_density", serde_json::json!(0.05));
        assert_eq!(region.metadata_str("color"), Some("blue"));
        assert_eq!(region.metadata_f64("edge_density"), Some(0.05));
        // Missing or mistyped keys read as None, never panic.
        assert_eq!(region.metadata_str("missing"), None);
        assert_eq!(region.metadata_f64("color"), None);
    }

    #[test]
    fn test_method_round_trip() {
        for method in [
            DetectionMethod::Color,
            DetectionMethod::Edge,
            DetectionMethod::Contour,
            DetectionMethod::Texture,
            DetectionMethod::Position,
            DetectionMethod::Brightness,
        ] {
            let parsed: DetectionMethod = method.to_string().parse().unwrap();
            assert_eq!(parsed, method);
        }
        assert!("sonar".parse::<DetectionMethod>().is_err());
    }

    #[test]
    fn test_cluster_union_bbox() {
        let cluster = Cluster {
            members: vec![
                Region::new(0, PixelBox::new(10, 10, 50, 50), DetectionMethod::Edge),
                Region::new(0, PixelBox::new(40, 40, 80, 80), DetectionMethod::Color),
            ],
        };
        assert_eq!(cluster.union_bbox(), Some(PixelBox::new(10, 10, 80, 80)));
        assert_eq!(Cluster::default().union_bbox(), None);
    }
}
