//! Device core: target tracking, history snapshots, and the drawing facade.

pub mod engine;
pub mod facade;
pub mod history;
pub mod target;

// Re-export commonly used types at module level
pub use engine::{OfflineEngine, RenderEngine};
pub use facade::{Device, DeviceState};
pub use history::{EngineSnapshot, History};
pub use target::Target;

use thiserror::Error;

/// Errors surfaced by the device API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// A render/resize/serialize request named a page that does not exist.
    #[error("no page with index {0}")]
    NoSuchPage(usize),

    /// Removal was requested for a page other than the newest one.
    /// Page indices are dense and stable, so only the newest page has
    /// well-defined removal semantics.
    #[error("page {index} is not the newest page ({newest:?}) and cannot be removed")]
    NotNewest { index: usize, newest: Option<usize> },

    /// The operation needs at least one recorded page.
    #[error("no pages have been recorded yet")]
    Empty,
}
