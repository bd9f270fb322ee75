//! Error types shared by the core state machines and abstractions.

use std::time::Duration;

use latchkey_proto::ProtocolError;
use thiserror::Error;

use crate::access::AccessState;

/// Errors from the byte link.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// No byte arrived within the bounded wait.
    #[error("link receive timed out after {timeout:?}")]
    TimedOut {
        /// The wait that expired.
        timeout: Duration,
    },

    /// The peer end of the link is gone.
    #[error("link closed by peer")]
    Closed,

    /// Transport-level I/O failure.
    #[error("link I/O error: {message}")]
    Io {
        /// Underlying error description.
        message: String,
    },
}

/// Errors from the handshake discipline.
///
/// A missed ready signal would otherwise stall both control loops forever;
/// every wait is bounded and desynchronization surfaces as a distinct
/// error instead of a hang.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// A bounded wait for the peer expired.
    #[error("handshake timed out in {stage} after {waited:?}")]
    Timeout {
        /// State machine stage that was waiting.
        stage: &'static str,
        /// How long the stage waited.
        waited: Duration,
    },

    /// A byte arrived that the current stage cannot accept.
    #[error("unexpected byte {byte:#04x} in {stage}")]
    UnexpectedByte {
        /// State machine stage that received the byte.
        stage: &'static str,
        /// The offending byte.
        byte: u8,
    },

    /// A state machine method was called in a state that does not allow it.
    #[error("invalid handshake state {stage} for {operation}")]
    InvalidState {
        /// Current stage.
        stage: &'static str,
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// The wire bytes violated the shared schema.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The underlying link failed.
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Errors from the persistent credential store.
///
/// A failed byte read/write is surfaced so callers can fail closed rather
/// than acting on credential state they cannot vouch for.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A byte read failed.
    #[error("store read failed at offset {offset:#06x}: {message}")]
    ReadFailed {
        /// Byte offset of the failed read.
        offset: u64,
        /// Underlying error description.
        message: String,
    },

    /// A byte write failed.
    #[error("store write failed at offset {offset:#06x}: {message}")]
    WriteFailed {
        /// Byte offset of the failed write.
        offset: u64,
        /// Underlying error description.
        message: String,
    },
}

/// Errors from the retry/lockout state machine.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// A verdict was recorded after the attempt sequence reached a terminal
    /// state.
    #[error("attempt sequence already finished in {state:?}")]
    Finished {
        /// The terminal state.
        state: AccessState,
    },
}
