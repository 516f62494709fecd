//! Drawing data model and SVG emission.
//!
//! This module defines the recorded-content types the device core consumes
//! and produces:
//! - [`Color`]: RGBA color with packed-u32 conversion
//! - [`DrawCall`]: the closed set of recorded primitives
//! - [`Page`]: one frame of recorded vector content
//! - [`PageStore`]: owner of the ordered page collection
//! - [`svg`]: pure serialization of pages to SVG markup

pub mod call;
pub mod color;
pub mod font;
pub mod page;
pub mod store;
pub mod svg;

// Re-export commonly used types at module level
pub use call::{DrawCall, StrokeStyle, TextStyle};
pub use color::Color;
pub use font::{ApproxMetrics, FontDescriptor, FontMetrics, MetricSource};
pub use page::{ClipRect, Page};
pub use store::PageStore;

// Re-export color constants for public API
#[allow(unused_imports)]
pub use color::{BLACK, TRANSPARENT, WHITE};
