//! Narrow capability interface to the external drawing engine.

use super::history::EngineSnapshot;
use crate::draw::DrawCall;

/// The operations the device core needs from an external drawing engine.
///
/// The engine holds exactly one page's live visual state at a time; the
/// device drives it through this interface when replaying a page. Bindings
/// to a real engine implement this once; the core depends on nothing else.
pub trait RenderEngine {
    /// Current viewport size (width, height) in user units.
    fn viewport(&self) -> (f64, f64);

    /// Resizes the engine viewport.
    fn set_viewport(&mut self, width: f64, height: f64);

    /// Clears the engine's visual surface.
    fn clear_surface(&mut self);

    /// Draws one primitive onto the current surface.
    fn draw_primitive(&mut self, call: &DrawCall);

    /// Captures the engine's resumable internal state (pen position,
    /// unfinished groups, ...) so drawing can continue later.
    fn snapshot(&mut self) -> EngineSnapshot;

    /// Restores previously captured state after a replay pass.
    fn restore(&mut self, snapshot: &EngineSnapshot);
}

/// Engine stand-in for headless use: tracks the viewport, draws nothing.
///
/// Useful when the device only needs to serve recorded pages as SVG and no
/// real rendering surface exists.
#[derive(Debug)]
pub struct OfflineEngine {
    width: f64,
    height: f64,
}

impl OfflineEngine {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl RenderEngine for OfflineEngine {
    fn viewport(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn set_viewport(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn clear_surface(&mut self) {}

    fn draw_primitive(&mut self, _call: &DrawCall) {}

    fn snapshot(&mut self) -> EngineSnapshot {
        let mut bytes = Vec::with_capacity(16);
        bytes.extend_from_slice(&self.width.to_le_bytes());
        bytes.extend_from_slice(&self.height.to_le_bytes());
        EngineSnapshot(bytes)
    }

    fn restore(&mut self, snapshot: &EngineSnapshot) {
        if snapshot.0.len() == 16 {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&snapshot.0[..8]);
            self.width = f64::from_le_bytes(buf);
            buf.copy_from_slice(&snapshot.0[8..]);
            self.height = f64::from_le_bytes(buf);
        }
    }
}
