use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::detection::{geometry, raster};
use crate::models::{Rect, Segment};

/// Highlight of the segment being tagged and of accepted set members
pub const SELECTED: Rgb<u8> = Rgb([0, 0, 255]);
/// Highlight of the fragment proposed for merging
pub const PROPOSED: Rgb<u8> = Rgb([0, 255, 0]);

/// Seeded source of outline colours. Only preview frames use it.
pub struct Palette {
    rng: StdRng,
}

impl Palette {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_color(&mut self) -> Rgb<u8> {
        Rgb([
            self.rng.random_range(0..255),
            self.rng.random_range(0..255),
            self.rng.random_range(0..255),
        ])
    }
}

pub fn mask_frame(mask: &GrayImage) -> RgbImage {
    DynamicImage::ImageLuma8(mask.clone()).to_rgb8()
}

/// The whole image with every segment outlined in its own colour.
pub fn segmentation_frame(
    image: &RgbImage,
    segments: &[Segment],
    thickness: u32,
    palette: &mut Palette,
) -> RgbImage {
    let mut frame = image.clone();
    for segment in segments {
        raster::outline_contour(&mut frame, segment.contour(), thickness, palette.next_color());
    }
    frame
}

/// Region shown around a group of segments: a square of half-size
/// `surroundings * max(width, height)` centred on the group, clipped to the
/// image.
pub fn surroundings_region(image: &RgbImage, segments: &[&Segment], surroundings: f32) -> Rect {
    let bounds = geometry::bounding_rect_of(segments.iter().copied());
    let size = bounds.width.max(bounds.height) as f32;
    // float-to-int casts saturate; NaN becomes 0
    let half = (size * surroundings) as u32;
    let (cx, cy) = bounds.center();
    Rect::centered(cx, cy, half).clip(image.width(), image.height())
}

/// Plain and highlighted crops around `highlights`, each segment filled with
/// its colour in the second frame.
pub fn segment_frames(
    image: &RgbImage,
    highlights: &[(&Segment, Rgb<u8>)],
    surroundings: f32,
) -> (RgbImage, RgbImage) {
    let segments: Vec<&Segment> = highlights.iter().map(|(s, _)| *s).collect();
    let region = surroundings_region(image, &segments, surroundings);
    let plain = image::imageops::crop_imm(image, region.x as u32, region.y as u32, region.width, region.height)
        .to_image();

    let mut highlighted = plain.clone();
    for (segment, color) in highlights {
        raster::fill_contour(&mut highlighted, segment.contour(), (region.x, region.y), *color);
    }
    (plain, highlighted)
}
