//! Target tracker: which page currently accepts new draw calls.

/// Tracks the page eligible to receive draw calls, plus the newest index.
///
/// The two are deliberately independent: the engine can deactivate drawing
/// (e.g. during internal buffering) without changing which page is logically
/// newest, and the render path needs the newest index even while no page is
/// accepting draws.
#[derive(Debug, Default)]
pub struct Target {
    active: Option<usize>,
    newest: Option<usize>,
}

impl Target {
    /// Creates a tracker with no active page and no recorded pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the page currently accepting draw calls, `None` when void.
    pub fn index(&self) -> Option<usize> {
        self.active
    }

    /// True when no page is accepting draw calls.
    pub fn is_void(&self) -> bool {
        self.active.is_none()
    }

    /// Makes `index` the page accepting new draw calls.
    pub fn activate(&mut self, index: usize) {
        self.active = Some(index);
    }

    /// Stops routing draw calls anywhere. The newest index is untouched.
    pub fn deactivate(&mut self) {
        self.active = None;
    }

    /// Index of the most recently created page, independent of void state.
    pub fn newest(&self) -> Option<usize> {
        self.newest
    }

    /// Records `index` as the newest page.
    pub fn bump_newest(&mut self, index: usize) {
        self.newest = Some(index);
    }

    /// Forgets the newest page entirely (store emptied or shutting down).
    pub fn clear_newest(&mut self) {
        self.newest = None;
    }
}
