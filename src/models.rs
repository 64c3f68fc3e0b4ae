use serde::{Deserialize, Serialize};

use crate::detection::geometry;

/// Pixel coordinate in the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. Width and height count pixels inclusively, so a
/// single point has a 1x1 rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

fn narrow_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn narrow_u32(v: i64) -> u32 {
    v.clamp(0, u32::MAX as i64) as u32
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Square of side `2 * half` centred on `(cx, cy)`. The half-size is
    /// capped so the edges stay representable.
    pub fn centered(cx: i32, cy: i32, half: u32) -> Rect {
        let half = half.min(i32::MAX as u32) as i64;
        Rect {
            x: narrow_i32(cx as i64 - half),
            y: narrow_i32(cy as i64 - half),
            width: narrow_u32(2 * half),
            height: narrow_u32(2 * half),
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn center(&self) -> (i32, i32) {
        (
            narrow_i32(self.x as i64 + self.width as i64 / 2),
            narrow_i32(self.y as i64 + self.height as i64 / 2),
        )
    }

    /// Grow the rectangle by `margin` pixels on every side, saturating at the
    /// coordinate limits.
    pub fn expand(&self, margin: u32) -> Rect {
        let margin = margin as i64;
        Rect {
            x: narrow_i32(self.x as i64 - margin),
            y: narrow_i32(self.y as i64 - margin),
            width: narrow_u32(self.width as i64 + 2 * margin),
            height: narrow_u32(self.height as i64 + 2 * margin),
        }
    }

    /// Clip the rectangle to `[0, width) x [0, height)`. A rectangle entirely
    /// outside the bounds collapses to zero size.
    pub fn clip(&self, width: u32, height: u32) -> Rect {
        let x1 = (self.x as i64).clamp(0, width as i64);
        let y1 = (self.y as i64).clamp(0, height as i64);
        let x2 = self.right().clamp(0, width as i64);
        let y2 = self.bottom().clamp(0, height as i64);
        Rect {
            x: narrow_i32(x1),
            y: narrow_i32(y1),
            width: narrow_u32(x2 - x1),
            height: narrow_u32(y2 - y1),
        }
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect {
            x: x1,
            y: y1,
            width: narrow_u32(x2 - x1 as i64),
            height: narrow_u32(y2 - y1 as i64),
        }
    }
}

/// Operator classification of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    #[default]
    Undefined,
    /// Speckle or artifact, discarded after tagging
    Noise,
    /// Fragment of a glyph, combined with others during merging
    Partial,
    /// Several glyphs touching each other, exported separately so they can be split
    Merged,
    /// A complete glyph, exported as-is
    Correct,
}

impl Tag {
    pub fn is_terminal(self) -> bool {
        match self {
            Tag::Undefined => false,
            Tag::Noise | Tag::Partial | Tag::Merged | Tag::Correct => true,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tag::Undefined => "UNDEFINED",
            Tag::Noise => "NOISE",
            Tag::Partial => "PARTIAL",
            Tag::Merged => "MERGED",
            Tag::Correct => "CORRECT",
        }
    }
}

/// One detected candidate region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    contour: Vec<Point>,
    bounding_rectangle: Rect,
    tag: Tag,
    area: u32,
}

impl Segment {
    /// Build a segment from its boundary. Area and bounding rectangle are
    /// derived here and never change afterwards.
    pub fn from_contour(contour: Vec<Point>) -> Self {
        let bounding_rectangle = geometry::bounding_rect(&contour);
        let area = geometry::polygon_area(&contour);
        Self {
            contour,
            bounding_rectangle,
            tag: Tag::Undefined,
            area,
        }
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }

    pub fn contour(&self) -> &[Point] {
        &self.contour
    }

    pub fn bounding_rectangle(&self) -> Rect {
        self.bounding_rectangle
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn set_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    pub fn area(&self) -> u32 {
        self.area
    }
}

impl Default for Segment {
    fn default() -> Self {
        Self::from_contour(Vec::new())
    }
}

/// Working state shared by the pipeline stages
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SegmentCollections {
    /// Untagged candidates, then the Partial remainder after tagging
    pub todo: Vec<Segment>,
    pub correct: Vec<Segment>,
    pub merged: Vec<Segment>,
    pub partial_sets: Vec<Vec<Segment>>,
}

impl SegmentCollections {
    pub fn with_candidates(todo: Vec<Segment>) -> Self {
        Self {
            todo,
            ..Self::default()
        }
    }
}
