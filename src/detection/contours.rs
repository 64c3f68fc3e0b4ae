use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};

use crate::models::Point;

/// Find the outer boundaries of connected foreground regions, in detection
/// order. Hole boundaries and regions nested inside holes are skipped.
pub fn find_outer_contours(mask: &GrayImage) -> Vec<Vec<Point>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points.iter().map(|p| Point::new(p.x, p.y)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    #[test]
    fn test_ring_yields_single_outer_contour() {
        let mut mask = GrayImage::new(40, 40);
        draw_filled_rect_mut(&mut mask, Rect::at(5, 5).of_size(30, 30), Luma([255u8]));
        draw_filled_rect_mut(&mut mask, Rect::at(10, 10).of_size(20, 20), Luma([0u8]));
        // island inside the hole
        draw_filled_rect_mut(&mut mask, Rect::at(17, 17).of_size(6, 6), Luma([255u8]));

        let contours = find_outer_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].contains(&Point::new(5, 5)));
    }

    #[test]
    fn test_empty_mask() {
        assert!(find_outer_contours(&GrayImage::new(16, 16)).is_empty());
    }
}
