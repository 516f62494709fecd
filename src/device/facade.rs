//! Drawing facade: receives engine callbacks, records pages, replays them.

use super::engine::RenderEngine;
use super::history::History;
use super::target::Target;
use super::DeviceError;
use crate::config::ServerConfig;
use crate::draw::font::{FontDescriptor, FontMetrics, MetricSource};
use crate::draw::{ApproxMetrics, ClipRect, Color, DrawCall, PageStore, StrokeStyle, TextStyle};
use crate::server::RequestTransport;
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

/// Snapshot of device state for polling clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceState {
    /// Global update counter
    pub upid: u64,
    /// Number of recorded pages
    pub pages: usize,
    /// Page currently accepting draw calls, if any
    pub active: Option<usize>,
}

/// The drawing facade.
///
/// Receives primitive callbacks from the external rendering engine on the
/// drawing thread, routes them into the [`PageStore`] via the [`Target`]
/// tracker, and serves the render/clear/remove/serialize API consumed by the
/// request layer (through the concurrency bridge, never directly).
///
/// The engine holds only one page's live state, so serving a historical page
/// requires the save/switch/replay/restore dance implemented in
/// [`Device::render`].
pub struct Device<T: RequestTransport> {
    config: Arc<ServerConfig>,
    store: PageStore,
    target: Target,
    history: History,
    transport: T,
    metrics: Box<dyn MetricSource>,
    engine_active: bool,
}

impl<T: RequestTransport> Device<T> {
    /// Creates a device with the default approximate metric source.
    pub fn new(config: Arc<ServerConfig>, transport: T) -> Self {
        Self::with_metrics(config, transport, Box::new(ApproxMetrics))
    }

    /// Creates a device with a custom glyph metric source.
    pub fn with_metrics(
        config: Arc<ServerConfig>,
        transport: T,
        metrics: Box<dyn MetricSource>,
    ) -> Self {
        Self {
            config,
            store: PageStore::new(),
            target: Target::new(),
            history: History::new(),
            transport,
            metrics,
            engine_active: false,
        }
    }

    // ========================================================================
    // Engine callback surface (drawing thread only)
    // ========================================================================

    /// Engine activated drawing on this device.
    pub fn activate(&mut self) {
        self.engine_active = true;
    }

    /// Engine deactivated drawing (e.g. another device took over).
    pub fn deactivate(&mut self) {
        self.engine_active = false;
    }

    /// Whether the engine currently targets this device.
    pub fn is_active(&self) -> bool {
        self.engine_active
    }

    /// Engine entered or left drawing mode. Entering while a page is live
    /// announces the new update counter to polling clients.
    pub fn mode(&mut self, drawing: bool) {
        if self.target.is_void() || !drawing {
            return;
        }
        self.transport.broadcast_update(self.store.upid());
    }

    /// Engine announced a new page.
    ///
    /// Outside a replay pass this finalizes the outgoing newest page's
    /// history snapshot, creates a fresh page at the engine's viewport size
    /// and retargets to it. Inside a replay pass it instead empties the
    /// current target page's buffer (keeping its size) as the first step of
    /// reconstruction.
    pub fn new_page(&mut self, engine: &mut dyn RenderEngine, fill: Color) {
        if !self.store.replaying() {
            if let Some(outgoing) = self.target.newest() {
                self.history.record(outgoing, engine.snapshot());
            }
            let (width, height) = engine.viewport();
            let index = self.store.create_page(width, height);
            self.target.activate(index);
            self.target.bump_newest(index);
        } else if let Some(index) = self.target.index() {
            self.store.clear(index, true);
        }
        if let Some(index) = self.target.index() {
            self.store.set_fill(index, fill);
        }
    }

    /// Engine updated the clip rectangle.
    pub fn clip(&mut self, x0: f64, x1: f64, y0: f64, y1: f64) {
        if let Some(index) = self.target.index() {
            self.store.set_clip(index, ClipRect::new(x0, x1, y0, y1));
        }
    }

    /// Line primitive callback.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: StrokeStyle) {
        self.put(DrawCall::Line {
            x1,
            y1,
            x2,
            y2,
            style,
        });
    }

    /// Rect primitive callback.
    pub fn rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, style: StrokeStyle) {
        self.put(DrawCall::Rect {
            x0,
            y0,
            x1,
            y1,
            style,
        });
    }

    /// Circle primitive callback.
    pub fn circle(&mut self, x: f64, y: f64, r: f64, style: StrokeStyle) {
        self.put(DrawCall::Circle { x, y, r, style });
    }

    /// Polygon primitive callback.
    pub fn polygon(&mut self, points: Vec<(f64, f64)>, style: StrokeStyle) {
        self.put(DrawCall::Polygon { points, style });
    }

    /// Polyline primitive callback.
    pub fn polyline(&mut self, points: Vec<(f64, f64)>, style: StrokeStyle) {
        self.put(DrawCall::Polyline { points, style });
    }

    /// Path primitive callback.
    pub fn path(
        &mut self,
        points: Vec<(f64, f64)>,
        per_poly: Vec<usize>,
        winding: bool,
        style: StrokeStyle,
    ) {
        self.put(DrawCall::Path {
            points,
            per_poly,
            winding,
            style,
        });
    }

    /// Text primitive callback. The styling snapshot (resolved font family,
    /// measured width) is captured here, at call time.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        rot: f64,
        hadj: f64,
        style: StrokeStyle,
        family: &str,
        bold: bool,
        italic: bool,
        size: f64,
    ) {
        let font = FontDescriptor::new(self.resolve_family(family), bold, italic);
        let str_width = self.str_width(text, &font, size);
        self.put(DrawCall::Text {
            x,
            y,
            text: text.to_string(),
            style,
            typo: TextStyle {
                font,
                size,
                rot,
                hadj,
                str_width,
            },
        });
    }

    /// Raster primitive callback.
    #[allow(clippy::too_many_arguments)]
    pub fn raster(
        &mut self,
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
    ) {
        self.put(DrawCall::Raster {
            pixels,
            w,
            h,
            x,
            y,
            width,
            height,
            rot,
            interpolate,
            style,
        });
    }

    /// Character metric query from the engine. Lookup failures degrade to
    /// zeroed metrics; layout is best-effort, never fatal.
    pub fn char_metrics(&self, ch: char, font: &FontDescriptor, size: f64) -> FontMetrics {
        match self.metrics.char_metrics(ch, font, size) {
            Ok(metrics) => metrics,
            Err(err) => {
                debug!("metric lookup failed for {ch:?}: {err}");
                FontMetrics::ZERO
            }
        }
    }

    /// String width query from the engine, zero on lookup failure.
    pub fn str_width(&self, text: &str, font: &FontDescriptor, size: f64) -> f64 {
        match self.metrics.str_width(text, font, size) {
            Ok(width) => width,
            Err(err) => {
                debug!("width lookup failed for {text:?}: {err}");
                0.0
            }
        }
    }

    /// Device is being closed by the engine.
    ///
    /// Order matters: the transport learns about the shutdown before any
    /// state disappears, so in-flight requests fail fast instead of racing
    /// against torn-down pages.
    pub fn close(&mut self) {
        info!("device closing");
        self.transport.notify_closing();
        self.target.deactivate();
        self.target.clear_newest();
        self.transport.stop();
        self.history.discard_all();
    }

    // ========================================================================
    // API surface (request layer, via the concurrency bridge)
    // ========================================================================

    /// Re-renders a page at the requested size. `None` selects the newest.
    ///
    /// The engine holds only one page's live state, so rendering a
    /// historical page saves the live page's resumable state, replays the
    /// requested page, then replays the live page again to restore it. The
    /// restore replay runs with the target voided so it repaints the engine
    /// without re-recording into the store.
    ///
    /// For polling clients a render is a read: the whole pass runs in replay
    /// mode, so the update counter does not move and no refetch is triggered.
    pub fn render(
        &mut self,
        engine: &mut dyn RenderEngine,
        page: Option<usize>,
        width: f64,
        height: f64,
    ) -> Result<(), DeviceError> {
        let newest = self.target.newest().ok_or(DeviceError::Empty)?;
        let index = self.resolve_index(page)?;
        debug!("rendering page {index} at {width}x{height}");

        self.store.set_replaying(true);
        self.store.resize(index, width, height);
        if index == newest {
            // Live page: repaint in place.
            self.target.activate(index);
            self.resize_engine_to_page(engine);
            self.play(engine, index);
        } else {
            // Historical page: save, switch, replay, restore.
            self.history.record(newest, engine.snapshot());
            self.target.activate(index);
            self.resize_engine_to_page(engine);
            self.play(engine, index);
            // Void the target so restoring the live page repaints the
            // engine without appending into the store again.
            self.target.deactivate();
            self.resize_engine_to_page(engine);
            self.play(engine, newest);
            self.target.activate(newest);
        }
        self.store.set_replaying(false);
        Ok(())
    }

    /// Serializes a page at the requested size, re-rendering only when the
    /// cached state is stale.
    pub fn svg(
        &mut self,
        engine: &mut dyn RenderEngine,
        page: Option<usize>,
        width: f64,
        height: f64,
    ) -> Result<String, DeviceError> {
        let index = self.resolve_index(page)?;
        if self.store.diff_size(index, width, height) {
            self.render(engine, Some(index), width, height)?;
        }
        self.store.svg(index).ok_or(DeviceError::NoSuchPage(index))
    }

    /// Removes every page, discards all history, voids the target.
    /// Returns `true` when anything was removed.
    pub fn clear(&mut self) -> bool {
        let removed = self.store.remove_all();
        self.history.discard_all();
        self.target.deactivate();
        self.target.clear_newest();
        removed
    }

    /// Removes a page. `None` selects the newest.
    ///
    /// Only the newest page may be removed; after removal the previous page
    /// is replayed so the engine's live state is as if the removed page had
    /// never been created.
    pub fn remove(
        &mut self,
        engine: &mut dyn RenderEngine,
        page: Option<usize>,
    ) -> Result<(), DeviceError> {
        let newest = self.target.newest().ok_or(DeviceError::Empty)?;
        let index = self.resolve_index(page)?;
        if index != newest {
            return Err(DeviceError::NotNewest {
                index,
                newest: Some(newest),
            });
        }

        self.store.remove(index);
        self.history.discard(index);

        self.store.set_replaying(true);
        if index > 0 {
            let previous = index - 1;
            self.target.activate(previous);
            self.target.bump_newest(previous);
            self.resize_engine_to_page(engine);
            self.play(engine, previous);
        } else {
            self.target.deactivate();
            self.target.clear_newest();
        }
        self.store.set_replaying(false);
        Ok(())
    }

    /// Number of recorded pages.
    pub fn page_count(&self) -> usize {
        self.store.count()
    }

    /// Global monotonic update counter.
    pub fn upid(&self) -> u64 {
        self.store.upid()
    }

    /// Snapshot for polling clients.
    pub fn state(&self) -> DeviceState {
        DeviceState {
            upid: self.store.upid(),
            pages: self.store.count(),
            active: self.target.index(),
        }
    }

    /// Immutable server configuration snapshot.
    pub fn config(&self) -> &Arc<ServerConfig> {
        &self.config
    }

    /// Access to the transport, e.g. for request-layer wiring.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Starts the request transport.
    pub fn server_start(&mut self) -> bool {
        self.transport.start()
    }

    /// Stops the request transport.
    pub fn server_stop(&mut self) {
        self.transport.stop();
    }

    /// Port the request transport is bound to.
    pub fn server_port(&self) -> u16 {
        self.transport.port()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Routes one recorded call to the target page, or drops it while the
    /// target is void. Dropping is defined idle behavior, not an error.
    fn put(&mut self, call: DrawCall) {
        match self.target.index() {
            Some(index) => self.store.append(index, call),
            None => debug!("target is void, dropping {} call", call.kind()),
        }
    }

    /// Maps a requested font family through the configured alias tables.
    /// User aliases win over system aliases; unknown names pass through.
    fn resolve_family(&self, family: &str) -> String {
        let aliases = &self.config.device;
        aliases
            .user_aliases
            .get(family)
            .or_else(|| aliases.system_aliases.get(family))
            .cloned()
            .unwrap_or_else(|| family.to_string())
    }

    /// Resolves an optional page selector against the store.
    fn resolve_index(&self, page: Option<usize>) -> Result<usize, DeviceError> {
        let index = match page {
            Some(index) => index,
            None => self.target.newest().ok_or(DeviceError::Empty)?,
        };
        if self.store.page(index).is_none() {
            return Err(DeviceError::NoSuchPage(index));
        }
        Ok(index)
    }

    /// Sets the engine viewport to the size of the page drawing is directed
    /// at: the target page, or the newest page while the target is void.
    fn resize_engine_to_page(&mut self, engine: &mut dyn RenderEngine) {
        let Some(index) = self.target.index().or(self.target.newest()) else {
            return;
        };
        if let Some((width, height)) = self.store.size(index) {
            engine.set_viewport(width, height);
        }
    }

    /// Replays one page's recorded calls through the engine.
    ///
    /// Runs with replay semantics: the target page's buffer is emptied and
    /// every call re-recorded as it is re-issued, so the buffer ends exactly
    /// as it began. While the target is void the calls repaint the engine
    /// only. Finishes by handing the page's history snapshot back to the
    /// engine so drawing can resume where it left off.
    fn play(&mut self, engine: &mut dyn RenderEngine, index: usize) {
        let Some(page) = self.store.page(index) else {
            return;
        };
        let calls = page.calls.clone();
        let fill = page.fill;
        let clip = page.clip;

        engine.clear_surface();
        self.new_page(engine, fill);
        // Clip state is a page attribute, not a recorded call; carry it
        // across the reconstruction clear.
        if let (Some(clip), Some(target)) = (clip, self.target.index()) {
            self.store.set_clip(target, clip);
        }
        for call in calls {
            engine.draw_primitive(&call);
            self.put(call);
        }
        if let Some(snapshot) = self.history.snapshot(index) {
            engine.restore(snapshot);
        }
    }
}
