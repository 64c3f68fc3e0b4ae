pub mod contours;
pub mod geometry;
pub mod preprocessing;
pub mod raster;

use image::GrayImage;
use tracing::debug;

use crate::models::Segment;

/// Turns a binary ink mask into candidate segments
#[derive(Debug, Clone)]
pub struct SegmentExtractor {
    pub min_area: u32,
}

impl SegmentExtractor {
    pub fn new(min_area: u32) -> Self {
        Self { min_area }
    }

    /// Extract candidate segments from `mask` (non-zero = ink).
    ///
    /// Only outer boundaries are kept, speckles below `min_area` are dropped,
    /// and the survivors are ordered by area, largest first. Equal areas keep
    /// their detection order.
    pub fn extract(&self, mask: &GrayImage) -> Vec<Segment> {
        let contours = contours::find_outer_contours(mask);
        let detected = contours.len();

        let mut segments: Vec<Segment> = contours
            .into_iter()
            .map(Segment::from_contour)
            .filter(|s| s.area() >= self.min_area)
            .collect();
        segments.sort_by(|a, b| b.area().cmp(&a.area()));

        debug!(
            detected,
            kept = segments.len(),
            min_area = self.min_area,
            "Extracted segments"
        );
        segments
    }
}

impl Default for SegmentExtractor {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MIN_AREA)
    }
}
