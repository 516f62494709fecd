//! Library exports for embedding the plotboard device core.
//!
//! Exposes the page/history/replay engine together with the supporting
//! modules (configuration, concurrency bridge, transport seam) so an
//! external engine binding and request layer can share one device.

pub mod bridge;
pub mod config;
pub mod device;
pub mod draw;
pub mod server;

pub use config::ServerConfig;
pub use device::{Device, DeviceError};
