use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{
    Canvas, draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::point::Point as PolygonPoint;

use crate::models::{Point, Rect, Segment};

/// Fill a closed contour, boundary included, onto `canvas`. `origin` is the
/// image coordinate of the canvas' top-left pixel.
pub fn fill_contour<C>(canvas: &mut C, contour: &[Point], origin: (i32, i32), color: C::Pixel)
where
    C: Canvas,
{
    let mut poly: Vec<PolygonPoint<i32>> = contour
        .iter()
        .map(|p| PolygonPoint::new(p.x - origin.0, p.y - origin.1))
        .collect();
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }

    match poly.len() {
        0 => {}
        1 => {
            let p = poly[0];
            let (width, height) = canvas.dimensions();
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < width && (p.y as u32) < height {
                canvas.draw_pixel(p.x as u32, p.y as u32, color);
            }
        }
        2 => stroke(canvas, &poly, color),
        _ => {
            draw_polygon_mut(canvas, &poly, color);
            stroke(canvas, &poly, color);
        }
    }
}

fn stroke<C: Canvas>(canvas: &mut C, poly: &[PolygonPoint<i32>], color: C::Pixel) {
    for (i, a) in poly.iter().enumerate() {
        let b = poly[(i + 1) % poly.len()];
        draw_line_segment_mut(
            canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            color,
        );
    }
}

/// Outline a contour with round pens of the given thickness.
pub fn outline_contour(canvas: &mut RgbImage, contour: &[Point], thickness: u32, color: Rgb<u8>) {
    let radius = (thickness / 2) as i32;
    for p in contour {
        draw_filled_circle_mut(canvas, (p.x, p.y), radius, color);
    }
}

/// Binary mask of the given segments in the local frame of `region`.
pub fn segment_mask<'a, I>(region: Rect, segments: I) -> GrayImage
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut mask = GrayImage::new(region.width, region.height);
    for segment in segments {
        fill_contour(&mut mask, segment.contour(), (region.x, region.y), Luma([255u8]));
    }
    mask
}

/// Copy the pixels of `source` inside `region` through `mask` onto a white
/// canvas the size of `region`.
pub fn composite_masked(source: &RgbImage, region: Rect, mask: &GrayImage) -> RgbImage {
    let mut out = RgbImage::from_pixel(region.width, region.height, Rgb([255, 255, 255]));
    for (x, y, m) in mask.enumerate_pixels() {
        if m[0] == 0 {
            continue;
        }
        let sx = region.x + x as i32;
        let sy = region.y + y as i32;
        if sx < 0 || sy < 0 || sx as u32 >= source.width() || sy as u32 >= source.height() {
            continue;
        }
        out.put_pixel(x, y, *source.get_pixel(sx as u32, sy as u32));
    }
    out
}
