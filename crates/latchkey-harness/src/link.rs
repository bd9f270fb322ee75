//! In-memory byte link.
//!
//! A pair of channel-backed endpoints standing in for the serial line:
//! reliable, ordered, byte-oriented. Bytes sent on one endpoint arrive on
//! the other; dropping an endpoint closes the link for its peer.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::time::Duration;

use latchkey_core::{LinkError, WireLink};

/// One endpoint of an in-memory link.
#[derive(Debug)]
pub struct MemoryLink {
    tx: Sender<u8>,
    rx: Receiver<u8>,
}

impl MemoryLink {
    /// Create a connected endpoint pair.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = channel();
        let (b_tx, b_rx) = channel();
        (Self { tx: a_tx, rx: b_rx }, Self { tx: b_tx, rx: a_rx })
    }
}

impl WireLink for MemoryLink {
    fn send(&mut self, byte: u8) -> Result<(), LinkError> {
        self.tx.send(byte).map_err(|_| LinkError::Closed)
    }

    fn recv(&mut self) -> Result<u8, LinkError> {
        self.rx.recv().map_err(|_| LinkError::Closed)
    }

    fn recv_deadline(&mut self, timeout: Duration) -> Result<u8, LinkError> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => LinkError::TimedOut { timeout },
            RecvTimeoutError::Disconnected => LinkError::Closed,
        })
    }
}
