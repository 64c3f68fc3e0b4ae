use image::GrayImage;
use imageproc::contrast::{ThresholdType, threshold};

/// Separate ink from page. Pixels brighter than `cutoff` are page and become
/// background (0); everything else becomes foreground (255).
pub fn ink_mask(gray: &GrayImage, cutoff: u8) -> GrayImage {
    threshold(gray, cutoff, ThresholdType::BinaryInverted)
}
