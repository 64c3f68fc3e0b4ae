use std::fs;
use std::path::{Path, PathBuf};

use glyphseg::SegmenterConfig;
use image::{Rgb, RgbImage};
use tempfile::TempDir;

pub const INK: Rgb<u8> = Rgb([0, 0, 0]);
pub const PAGE: Rgb<u8> = Rgb([255, 255, 255]);

const MARGIN: u32 = 10;

/// Renders solid ink squares on a white page, left to right, one per entry
/// of `sides`. Pass the sides in decreasing order and the detected segments
/// come out in the same order.
pub fn glyph_sheet(sides: &[u32]) -> RgbImage {
    let width = MARGIN + sides.iter().map(|s| s + MARGIN).sum::<u32>();
    let height = 2 * MARGIN + sides.iter().copied().max().unwrap_or(0);
    let mut img = RgbImage::from_pixel(width, height, PAGE);

    let mut left = MARGIN;
    for &side in sides {
        for y in MARGIN..MARGIN + side {
            for x in left..left + side {
                img.put_pixel(x, y, INK);
            }
        }
        left += side + MARGIN;
    }
    img
}

/// Top-left corner of the `index`-th square of a [`glyph_sheet`].
pub fn square_origin(sides: &[u32], index: usize) -> (u32, u32) {
    let left = MARGIN + sides[..index].iter().map(|s| s + MARGIN).sum::<u32>();
    (left, MARGIN)
}

/// A temporary working directory holding a rendered glyph sheet.
/// Keep the returned `TempDir` alive for as long as the files are used.
pub struct Workspace {
    pub dir: TempDir,
    pub image_path: PathBuf,
}

impl Workspace {
    pub fn new(sides: &[u32]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let image_path = dir.path().join("sheet.png");
        glyph_sheet(sides)
            .save_with_format(&image_path, image::ImageFormat::Png)
            .expect("Failed to save test image");
        Self { dir, image_path }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn progress_path(&self) -> PathBuf {
        self.dir.path().join("session.progress")
    }

    pub fn config(&self) -> SegmenterConfig {
        SegmenterConfig::new(&self.image_path)
            .with_output_dir(self.output_dir())
            .with_poll_interval_ms(0)
    }
}

/// Sorted file names in `dir`; empty if the directory does not exist.
pub fn file_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Keys that confirm the thresholding and detection previews.
pub const CONFIRM_PREVIEWS: [char; 2] = [' ', ' '];

/// Confirm both previews, then play `keys`.
pub fn session_keys(keys: &str) -> Vec<char> {
    CONFIRM_PREVIEWS.into_iter().chain(keys.chars()).collect()
}
