use crate::models::{Point, Rect, Segment};

/// Enclosed area of a closed polygon (shoelace formula), truncated to whole
/// pixels. Fewer than three points enclose nothing.
pub fn polygon_area(points: &[Point]) -> u32 {
    let n = points.len();
    if n < 3 {
        return 0;
    }
    let twice_area: i64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
        })
        .sum();
    (twice_area.unsigned_abs() / 2) as u32
}

/// Smallest rectangle containing every point. An empty contour yields a
/// zero-origin, zero-size rectangle.
pub fn bounding_rect(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::default();
    };

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Rect {
        x: min_x,
        y: min_y,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    }
}

/// Union of the bounding rectangles of `segments`.
pub fn bounding_rect_of<'a, I>(segments: I) -> Rect
where
    I: IntoIterator<Item = &'a Segment>,
{
    segments
        .into_iter()
        .map(Segment::bounding_rectangle)
        .reduce(|acc, r| acc.union(&r))
        .unwrap_or_default()
}
