//! Page container: one frame of recorded vector content.

use super::call::DrawCall;
use super::color::{Color, TRANSPARENT};
use serde::{Deserialize, Serialize};

/// Axis-aligned clip rectangle, stored normalized (x0 <= x1, y0 <= y1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl ClipRect {
    /// Builds a normalized clip rectangle from two corner pairs in any order.
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// True when the clip covers the whole page, i.e. clipping is a no-op.
    pub fn covers(&self, width: f64, height: f64) -> bool {
        self.x0 <= 0.0 && self.y0 <= 0.0 && self.x1 >= width && self.y1 >= height
    }
}

/// One frame of recorded vector content.
///
/// Holds the declared size, background fill, active clip rectangle and the
/// ordered draw-call sequence. Owned exclusively by
/// [`PageStore`](super::store::PageStore); identity is the page's index there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Declared width in user units
    pub width: f64,
    /// Declared height in user units
    pub height: f64,
    /// Background fill painted before any draw call
    pub fill: Color,
    /// Active clip rectangle, `None` = unclipped
    pub clip: Option<ClipRect>,
    /// Draw calls in insertion order (first = bottom layer)
    pub calls: Vec<DrawCall>,
    version: u64,
}

impl Page {
    /// Creates a new empty page of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            fill: TRANSPARENT,
            clip: None,
            calls: Vec::new(),
            version: 0,
        }
    }

    /// Monotonic per-page mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Bumps the mutation counter. The store calls this for every recording
    /// mutation; replay reconstruction leaves it alone.
    pub(crate) fn touch(&mut self) {
        self.version += 1;
    }

    /// Appends a draw call on top of the existing sequence.
    pub fn append(&mut self, call: DrawCall) {
        self.calls.push(call);
    }

    /// Empties the recorded sequence and clip state.
    ///
    /// With `keep_size` the declared size survives; otherwise it is zeroed
    /// until the next resize.
    pub fn clear(&mut self, keep_size: bool) {
        self.calls.clear();
        self.clip = None;
        if !keep_size {
            self.width = 0.0;
            self.height = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::call::StrokeStyle;
    use crate::draw::color::{BLACK, WHITE};

    fn line() -> DrawCall {
        DrawCall::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 5.0,
            y2: 5.0,
            style: StrokeStyle::new(BLACK, WHITE, 1.0),
        }
    }

    #[test]
    fn clear_keep_size_preserves_dimensions() {
        let mut page = Page::new(400.0, 300.0);
        page.append(line());
        page.clear(true);
        assert!(page.calls.is_empty());
        assert_eq!((page.width, page.height), (400.0, 300.0));

        page.clear(false);
        assert_eq!((page.width, page.height), (0.0, 0.0));
    }

    #[test]
    fn clip_rect_normalizes_corners() {
        let clip = ClipRect::new(10.0, 0.0, 30.0, 5.0);
        assert_eq!((clip.x0, clip.x1), (0.0, 10.0));
        assert_eq!((clip.y0, clip.y1), (5.0, 30.0));
    }

    #[test]
    fn full_page_clip_is_a_no_op() {
        let clip = ClipRect::new(0.0, 400.0, 0.0, 300.0);
        assert!(clip.covers(400.0, 300.0));
        assert!(!ClipRect::new(10.0, 400.0, 0.0, 300.0).covers(400.0, 300.0));
    }
}
