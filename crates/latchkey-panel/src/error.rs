//! Front node error types.

use latchkey_core::{AccessError, HandshakeError};
use latchkey_proto::ProtocolError;
use thiserror::Error;

/// Errors from the keypad/display device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PanelError {
    /// The input device failed or produced no more keys.
    #[error("panel input failed: {reason}")]
    Input {
        /// Description of the input failure.
        reason: String,
    },

    /// The display device failed.
    #[error("panel display failed: {reason}")]
    Render {
        /// Description of the display failure.
        reason: String,
    },
}

/// Errors terminating a front session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The keypad or display failed.
    #[error(transparent)]
    Panel(#[from] PanelError),

    /// A protocol exchange failed (timeout, desynchronization, link loss).
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    /// Locally collected input violated the credential schema.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The retry state machine was driven past a terminal state.
    #[error(transparent)]
    Access(#[from] AccessError),
}
