//! Transport seam for the external request layer.
//!
//! The crate ships no HTTP server; the request layer is an external
//! collaborator that plugs in through [`RequestTransport`]. The device only
//! drives lifecycle and update notifications through this trait.

use log::debug;

/// Lifecycle and notification surface of the external request transport.
pub trait RequestTransport {
    /// Starts accepting requests. Returns `false` when the transport could
    /// not bind.
    fn start(&mut self) -> bool;

    /// Stops accepting requests.
    fn stop(&mut self);

    /// Bound port, 0 while not running.
    fn port(&self) -> u16;

    /// Tells the transport the device is going away, before any device
    /// state is torn down, so in-flight requests can fail fast.
    fn notify_closing(&mut self);

    /// Announces a new update counter value to polling clients.
    fn broadcast_update(&mut self, upid: u64);
}

/// Transport that accepts nothing: for headless or test use.
#[derive(Debug, Default)]
pub struct NullTransport {
    running: bool,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestTransport for NullTransport {
    fn start(&mut self) -> bool {
        self.running = true;
        true
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn port(&self) -> u16 {
        0
    }

    fn notify_closing(&mut self) {
        debug!("transport closing");
    }

    fn broadcast_update(&mut self, _upid: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_transport_tracks_running_state() {
        let mut transport = NullTransport::new();
        assert!(transport.start());
        assert_eq!(transport.port(), 0);
        transport.stop();
    }
}
