//! Page store: owns the ordered collection of recorded pages.

use super::call::DrawCall;
use super::color::Color;
use super::page::{ClipRect, Page};
use super::svg;
use log::debug;

/// Sizes closer than this are considered equal when deciding whether a
/// cached render is stale. Viewer clients resize in sub-pixel increments;
/// re-rendering for those is wasted work.
const SIZE_EPSILON: f64 = 0.1;

/// Owns every recorded page and the global update counter.
///
/// Pages are identified by their dense 0-based index, assigned at creation
/// and never reused while the page exists. Recording mutations bump the
/// global update counter (`upid`), the staleness basis for polling clients.
/// In replay mode the same operations reconstruct existing content and move
/// no counters.
#[derive(Debug, Default)]
pub struct PageStore {
    pages: Vec<Page>,
    upid: u64,
    replaying: bool,
}

impl PageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new empty page and returns its index.
    pub fn create_page(&mut self, width: f64, height: f64) -> usize {
        self.pages.push(Page::new(width, height));
        self.bump();
        let index = self.pages.len() - 1;
        debug!("created page {index} ({width}x{height})");
        index
    }

    /// Returns the page at `index`, if it exists.
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Appends a draw call to the page at `index`.
    ///
    /// Silently ignores invalid indices: draw calls arriving while no page
    /// can accept them are defined idle behavior, not an error.
    pub fn append(&mut self, index: usize, call: DrawCall) {
        let Some(page) = self.pages.get_mut(index) else {
            debug!("dropping {} call for missing page {index}", call.kind());
            return;
        };
        page.append(call);
        if !self.replaying {
            page.touch();
        }
        self.bump();
    }

    /// Updates the active clip rectangle of the page at `index`.
    pub fn set_clip(&mut self, index: usize, clip: ClipRect) {
        if let Some(page) = self.pages.get_mut(index) {
            if page.clip != Some(clip) {
                page.clip = Some(clip);
                if !self.replaying {
                    page.touch();
                }
                self.bump();
            }
        }
    }

    /// Updates the background fill of the page at `index`.
    pub fn set_fill(&mut self, index: usize, fill: Color) {
        if let Some(page) = self.pages.get_mut(index) {
            page.fill = fill;
            if !self.replaying {
                page.touch();
            }
            self.bump();
        }
    }

    /// Updates the declared size of the page at `index`.
    ///
    /// Invalidates any cached render (the update counter moves) without
    /// discarding the recorded draw-call sequence. Returns `false` when no
    /// such page exists.
    pub fn resize(&mut self, index: usize, width: f64, height: f64) -> bool {
        let Some(page) = self.pages.get_mut(index) else {
            return false;
        };
        page.width = width;
        page.height = height;
        if !self.replaying {
            page.touch();
        }
        self.bump();
        true
    }

    /// Empties the recorded sequence of the page at `index`.
    pub fn clear(&mut self, index: usize, keep_size: bool) {
        if let Some(page) = self.pages.get_mut(index) {
            page.clear(keep_size);
            if !self.replaying {
                page.touch();
            }
            self.bump();
        }
    }

    /// Removes the page at `index`.
    ///
    /// Only the newest page may be removed; page indices are dense and
    /// load-bearing for clients, so interior removal is rejected by
    /// returning `false`.
    pub fn remove(&mut self, index: usize) -> bool {
        if !self.pages.is_empty() && index == self.pages.len() - 1 {
            self.pages.pop();
            self.bump();
            true
        } else {
            false
        }
    }

    /// Removes every page. Returns `true` when anything was removed.
    pub fn remove_all(&mut self) -> bool {
        if self.pages.is_empty() {
            return false;
        }
        self.pages.clear();
        self.bump();
        true
    }

    /// True iff the requested size differs from the page's current size.
    ///
    /// This is the cache-staleness check: a `false` result means the last
    /// render is still valid for this size. Negative dimensions mean "any
    /// size", and a missing page is never stale.
    pub fn diff_size(&self, index: usize, width: f64, height: f64) -> bool {
        let Some(page) = self.pages.get(index) else {
            return false;
        };
        if width < 0.0 || height < 0.0 {
            return false;
        }
        (page.width - width).abs() > SIZE_EPSILON || (page.height - height).abs() > SIZE_EPSILON
    }

    /// Serializes the page at `index` to SVG markup.
    ///
    /// Pure with respect to store state: two calls without intervening
    /// mutation yield byte-identical output.
    pub fn svg(&self, index: usize) -> Option<String> {
        self.pages.get(index).map(svg::page_to_svg)
    }

    /// Declared size of the page at `index`.
    pub fn size(&self, index: usize) -> Option<(f64, f64)> {
        self.pages.get(index).map(|p| (p.width, p.height))
    }

    /// Global monotonic update counter.
    pub fn upid(&self) -> u64 {
        self.upid
    }

    /// Number of recorded pages.
    pub fn count(&self) -> usize {
        self.pages.len()
    }

    /// Enters or leaves replay mode.
    ///
    /// Replay re-issues recorded content through the normal mutating path;
    /// while the mode is set, neither `upid` nor the per-page versions move,
    /// so polling clients never mistake a render for a content change.
    pub fn set_replaying(&mut self, replaying: bool) {
        self.replaying = replaying;
    }

    /// Whether a replay pass is in progress.
    pub fn replaying(&self) -> bool {
        self.replaying
    }

    fn bump(&mut self) {
        if !self.replaying {
            self.upid += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::call::StrokeStyle;
    use crate::draw::color::{BLACK, WHITE};

    fn style() -> StrokeStyle {
        StrokeStyle::new(BLACK, WHITE, 1.0)
    }

    fn line(n: f64) -> DrawCall {
        DrawCall::Line {
            x1: 0.0,
            y1: 0.0,
            x2: n,
            y2: n,
            style: style(),
        }
    }

    #[test]
    fn pages_get_dense_increasing_indices() {
        let mut store = PageStore::new();
        assert_eq!(store.create_page(400.0, 300.0), 0);
        assert_eq!(store.create_page(400.0, 300.0), 1);
        assert_eq!(store.create_page(400.0, 300.0), 2);
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn append_records_calls_in_insertion_order() {
        let mut store = PageStore::new();
        let idx = store.create_page(400.0, 300.0);
        for n in 0..4 {
            store.append(idx, line(n as f64));
        }
        let page = store.page(idx).unwrap();
        assert_eq!(page.calls.len(), 4);
        for (n, call) in page.calls.iter().enumerate() {
            match call {
                DrawCall::Line { x2, .. } => assert_eq!(*x2, n as f64),
                other => panic!("unexpected call {other:?}"),
            }
        }
    }

    #[test]
    fn append_to_missing_page_is_a_silent_no_op() {
        let mut store = PageStore::new();
        let before = store.upid();
        store.append(7, line(1.0));
        assert_eq!(store.upid(), before);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn upid_strictly_increases_on_mutations() {
        let mut store = PageStore::new();
        let mut last = store.upid();
        let idx = store.create_page(400.0, 300.0);
        for step in 0..5u32 {
            match step {
                0 => store.append(idx, line(1.0)),
                1 => store.set_fill(idx, WHITE),
                2 => store.set_clip(idx, ClipRect::new(0.0, 10.0, 0.0, 10.0)),
                3 => assert!(store.resize(idx, 500.0, 400.0)),
                _ => store.clear(idx, true),
            }
            assert!(store.upid() > last, "step {step} did not bump upid");
            last = store.upid();
        }
    }

    #[test]
    fn page_version_increases_on_recording_mutations() {
        let mut store = PageStore::new();
        let idx = store.create_page(400.0, 300.0);
        let v0 = store.page(idx).unwrap().version();
        store.append(idx, line(1.0));
        let v1 = store.page(idx).unwrap().version();
        store.clear(idx, true);
        let v2 = store.page(idx).unwrap().version();
        assert!(v0 < v1 && v1 < v2);
    }

    #[test]
    fn replay_mode_leaves_counters_untouched() {
        let mut store = PageStore::new();
        let idx = store.create_page(400.0, 300.0);
        store.append(idx, line(1.0));
        let upid = store.upid();
        let version = store.page(idx).unwrap().version();

        store.set_replaying(true);
        store.clear(idx, true);
        store.set_fill(idx, WHITE);
        store.set_clip(idx, ClipRect::new(0.0, 10.0, 0.0, 10.0));
        store.append(idx, line(1.0));
        assert!(store.resize(idx, 400.0, 300.0));
        store.set_replaying(false);

        assert_eq!(store.upid(), upid);
        assert_eq!(store.page(idx).unwrap().version(), version);

        // Leaving the mode re-arms the counters.
        store.append(idx, line(2.0));
        assert!(store.upid() > upid);
    }

    #[test]
    fn resize_keeps_the_recorded_sequence() {
        let mut store = PageStore::new();
        let idx = store.create_page(400.0, 300.0);
        store.append(idx, line(1.0));
        assert!(store.resize(idx, 800.0, 600.0));
        assert_eq!(store.size(idx), Some((800.0, 600.0)));
        assert_eq!(store.page(idx).unwrap().calls.len(), 1);
    }

    #[test]
    fn resize_of_missing_page_reports_failure() {
        let mut store = PageStore::new();
        assert!(!store.resize(0, 100.0, 100.0));
    }

    #[test]
    fn diff_size_tracks_staleness() {
        let mut store = PageStore::new();
        let idx = store.create_page(400.0, 300.0);
        assert!(!store.diff_size(idx, 400.0, 300.0));
        assert!(!store.diff_size(idx, 400.05, 300.0));
        assert!(store.diff_size(idx, 400.0, 200.0));
        assert!(!store.diff_size(idx, -1.0, -1.0));
        assert!(!store.diff_size(9, 400.0, 300.0));
    }

    #[test]
    fn only_the_newest_page_can_be_removed() {
        let mut store = PageStore::new();
        store.create_page(400.0, 300.0);
        store.create_page(400.0, 300.0);
        assert!(!store.remove(0));
        assert_eq!(store.count(), 2);
        assert!(store.remove(1));
        assert_eq!(store.count(), 1);
        assert!(!store.remove(1));
    }

    #[test]
    fn remove_all_reports_whether_anything_was_removed() {
        let mut store = PageStore::new();
        assert!(!store.remove_all());
        store.create_page(400.0, 300.0);
        assert!(store.remove_all());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn svg_is_idempotent_without_mutation() {
        let mut store = PageStore::new();
        let idx = store.create_page(400.0, 300.0);
        store.append(idx, line(10.0));
        let first = store.svg(idx).unwrap();
        let second = store.svg(idx).unwrap();
        assert_eq!(first, second);
    }
}
