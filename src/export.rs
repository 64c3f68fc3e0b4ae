use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{info, warn};

use crate::detection::{geometry, raster};
use crate::error::{ExportFailure, Result, SegmenterError};
use crate::models::{Rect, Segment, SegmentCollections};

/// Output category of an exported crop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportCategory {
    Correct,
    Merged,
    PartialSets,
}

impl ExportCategory {
    pub fn directory(self) -> &'static str {
        match self {
            ExportCategory::Correct => "correct",
            ExportCategory::Merged => "merged",
            ExportCategory::PartialSets => "partial_sets",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            ExportCategory::Correct => "c_",
            ExportCategory::Merged => "m_",
            ExportCategory::PartialSets => "p_",
        }
    }

    /// File name of the `index`-th export in this category.
    pub fn file_name(self, index: usize) -> String {
        format!("{}{:08}.png", self.prefix(), index)
    }
}

/// Files written by one export run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSummary {
    pub correct: Vec<PathBuf>,
    pub merged: Vec<PathBuf>,
    pub partial_sets: Vec<PathBuf>,
}

impl ExportSummary {
    pub fn total(&self) -> usize {
        self.correct.len() + self.merged.len() + self.partial_sets.len()
    }

    fn files_mut(&mut self, category: ExportCategory) -> &mut Vec<PathBuf> {
        match category {
            ExportCategory::Correct => &mut self.correct,
            ExportCategory::Merged => &mut self.merged,
            ExportCategory::PartialSets => &mut self.partial_sets,
        }
    }
}

/// Writes masked crops of the final segments
pub struct Exporter<'a> {
    image: &'a RgbImage,
    output_dir: PathBuf,
    crop_margin: u32,
}

impl<'a> Exporter<'a> {
    pub fn new(image: &'a RgbImage, output_dir: impl Into<PathBuf>, crop_margin: u32) -> Self {
        Self {
            image,
            output_dir: output_dir.into(),
            crop_margin,
        }
    }

    pub fn category_dir(&self, category: ExportCategory) -> PathBuf {
        self.output_dir.join(category.directory())
    }

    /// Crop box of a group of segments: union rectangle, padded, clipped to
    /// the image.
    pub fn crop_region<'s, I>(&self, segments: I) -> Rect
    where
        I: IntoIterator<Item = &'s Segment>,
    {
        geometry::bounding_rect_of(segments)
            .expand(self.crop_margin)
            .clip(self.image.width(), self.image.height())
    }

    /// Masked crop of a group of segments on a white canvas.
    pub fn render(&self, segments: &[Segment]) -> RgbImage {
        let region = self.crop_region(segments);
        let mask = raster::segment_mask(region, segments);
        raster::composite_masked(self.image, region, &mask)
    }

    /// Export every collection. All files are attempted; failures are
    /// reported together afterwards.
    pub fn export(&self, collections: &SegmentCollections) -> Result<ExportSummary> {
        let mut summary = ExportSummary::default();
        let mut failures = Vec::new();

        let groups: [(ExportCategory, Vec<&[Segment]>); 3] = [
            (
                ExportCategory::Correct,
                collections.correct.iter().map(std::slice::from_ref).collect(),
            ),
            (
                ExportCategory::Merged,
                collections.merged.iter().map(std::slice::from_ref).collect(),
            ),
            (
                ExportCategory::PartialSets,
                collections.partial_sets.iter().map(Vec::as_slice).collect(),
            ),
        ];

        for (category, items) in groups {
            info!(
                category = category.directory(),
                count = items.len(),
                "Exporting segments"
            );
            if items.is_empty() {
                continue;
            }

            let dir = self.category_dir(category);
            if let Err(e) = fs::create_dir_all(&dir) {
                warn!(dir = %dir.display(), error = %e, "Cannot create export directory");
                failures.extend((0..items.len()).map(|i| ExportFailure {
                    path: dir.join(category.file_name(i)),
                    reason: e.to_string(),
                }));
                continue;
            }

            for (index, segments) in items.into_iter().enumerate() {
                let path = dir.join(category.file_name(index));
                match self.write_crop(segments, &path) {
                    Ok(()) => summary.files_mut(category).push(path),
                    Err(reason) => {
                        warn!(path = %path.display(), %reason, "Export failed");
                        failures.push(ExportFailure { path, reason });
                    }
                }
            }
        }

        if failures.is_empty() {
            info!(files = summary.total(), "Export complete");
            Ok(summary)
        } else {
            Err(SegmenterError::Export { failures })
        }
    }

    fn write_crop(&self, segments: &[Segment], path: &Path) -> std::result::Result<(), String> {
        let crop = self.render(segments);
        if crop.width() == 0 || crop.height() == 0 {
            return Err("crop is empty after clipping to the image".to_string());
        }
        crop.save(path).map_err(|e| e.to_string())
    }
}
