//! Recorded draw-call variants and their styling snapshots.

use super::color::Color;
use super::font::FontDescriptor;
use serde::{Deserialize, Serialize};

/// Stroke and fill state captured from the engine at call time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Stroke (outline) color
    pub stroke: Color,
    /// Fill color for closed shapes
    pub fill: Color,
    /// Stroke width in user units
    pub width: f64,
}

impl StrokeStyle {
    pub fn new(stroke: Color, fill: Color, width: f64) -> Self {
        Self {
            stroke,
            fill,
            width,
        }
    }
}

/// Typography snapshot recorded with a text call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font the text was recorded with
    pub font: FontDescriptor,
    /// Font size in points
    pub size: f64,
    /// Rotation in degrees, counter-clockwise around the anchor
    pub rot: f64,
    /// Horizontal anchor adjustment (0.0 = left, 0.5 = center, 1.0 = right)
    pub hadj: f64,
    /// Measured string width at record time, used for anchor placement
    pub str_width: f64,
}

/// One recorded primitive instruction with its styling snapshot.
///
/// Each variant is a plain immutable record; a page's content is the ordered
/// sequence of these. Serialization to markup is a total function over the
/// variants (see [`super::svg`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawCall {
    /// Straight line segment
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: StrokeStyle,
    },
    /// Axis-aligned rectangle spanning two corners
    Rect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        style: StrokeStyle,
    },
    /// Circle around a center point
    Circle {
        x: f64,
        y: f64,
        r: f64,
        style: StrokeStyle,
    },
    /// Closed polygon through a point sequence
    Polygon {
        points: Vec<(f64, f64)>,
        style: StrokeStyle,
    },
    /// Open polyline through a point sequence
    Polyline {
        points: Vec<(f64, f64)>,
        style: StrokeStyle,
    },
    /// Multi-subpath outline; `per_poly` gives the point count of each
    /// subpath within `points`
    Path {
        points: Vec<(f64, f64)>,
        per_poly: Vec<usize>,
        winding: bool,
        style: StrokeStyle,
    },
    /// Text anchored at a baseline point
    Text {
        x: f64,
        y: f64,
        text: String,
        style: StrokeStyle,
        typo: TextStyle,
    },
    /// Pixel image placed into the page
    Raster {
        /// Packed 0xAABBGGRR pixels, row-major
        pixels: Vec<u32>,
        w: usize,
        h: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rot: f64,
        interpolate: bool,
        style: StrokeStyle,
    },
}

impl DrawCall {
    /// Short name of the variant, for log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCall::Line { .. } => "line",
            DrawCall::Rect { .. } => "rect",
            DrawCall::Circle { .. } => "circle",
            DrawCall::Polygon { .. } => "polygon",
            DrawCall::Polyline { .. } => "polyline",
            DrawCall::Path { .. } => "path",
            DrawCall::Text { .. } => "text",
            DrawCall::Raster { .. } => "raster",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLACK, WHITE};

    #[test]
    fn kind_names_match_variants() {
        let style = StrokeStyle::new(BLACK, WHITE, 1.0);
        let line = DrawCall::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
            style,
        };
        assert_eq!(line.kind(), "line");

        let text = DrawCall::Text {
            x: 0.0,
            y: 0.0,
            text: "hi".into(),
            style,
            typo: TextStyle {
                font: FontDescriptor::default(),
                size: 12.0,
                rot: 0.0,
                hadj: 0.0,
                str_width: 10.0,
            },
        };
        assert_eq!(text.kind(), "text");
    }
}
