use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD: u8 = 192;
pub const DEFAULT_MIN_AREA: u32 = 20;
pub const DEFAULT_OUTLINE_THICKNESS: u32 = 4;
pub const DEFAULT_SURROUNDINGS_SIZE: f32 = 10.0;
pub const DEFAULT_OUTPUT_DIR: &str = "output";
/// Padding around exported crops, in pixels
pub const DEFAULT_CROP_MARGIN: u32 = 2;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Settings for one segmentation session. Stored verbatim in progress files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    pub image_path: PathBuf,
    /// Luminosity cutoff; brighter pixels are page, the rest is ink
    pub threshold: u8,
    /// Segments with a smaller polygon area are dropped as speckles
    pub min_area: u32,
    pub outline_thickness: u32,
    /// Preview crop size relative to the segment size
    pub surroundings_size: f32,
    pub output_dir: PathBuf,
    pub crop_margin: u32,
    /// Seed for preview outline colours
    pub preview_seed: u64,
    pub poll_interval_ms: u64,
}

impl SegmenterConfig {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_min_area(mut self, min_area: u32) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn with_outline_thickness(mut self, thickness: u32) -> Self {
        self.outline_thickness = thickness;
        self
    }

    pub fn with_surroundings_size(mut self, size: f32) -> Self {
        self.surroundings_size = size;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_crop_margin(mut self, margin: u32) -> Self {
        self.crop_margin = margin;
        self
    }

    pub fn with_preview_seed(mut self, seed: u64) -> Self {
        self.preview_seed = seed;
        self
    }

    pub fn with_poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval_ms = millis;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            image_path: PathBuf::new(),
            threshold: DEFAULT_THRESHOLD,
            min_area: DEFAULT_MIN_AREA,
            outline_thickness: DEFAULT_OUTLINE_THICKNESS,
            surroundings_size: DEFAULT_SURROUNDINGS_SIZE,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            crop_margin: DEFAULT_CROP_MARGIN,
            preview_seed: 0,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
