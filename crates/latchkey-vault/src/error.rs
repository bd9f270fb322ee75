//! Back node error types.

use latchkey_core::{HandshakeError, LinkError, StoreError};
use thiserror::Error;

/// Errors from the latch motor or alarm drivers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// The latch motor driver failed.
    #[error("latch actuator failed: {reason}")]
    Latch {
        /// Description of the failure.
        reason: String,
    },

    /// The alarm driver failed.
    #[error("alarm actuator failed: {reason}")]
    Alarm {
        /// Description of the failure.
        reason: String,
    },
}

/// Errors terminating the vault's serve loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// The handshake discipline was violated or a bounded wait expired.
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    /// The persistent store failed; the node fails closed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An actuator failed mid-sequence.
    #[error(transparent)]
    Actuator(#[from] ActuatorError),
}

impl VaultError {
    /// True if the error just means the panel disconnected.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Handshake(HandshakeError::Link(LinkError::Closed)))
    }
}
