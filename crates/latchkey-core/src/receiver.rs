//! Back-side command receiver state machine.
//!
//! The vault's half of the handshake discipline. The receiver only accepts
//! bytes it has invited: it emits a ready byte, accepts exactly one request
//! opcode, and for credential-carrying commands emits a second ready byte
//! and assembles the terminator-delimited field. A byte arriving in any
//! other state is a protocol violation, never silently acted on; this is
//! what keeps the two free-running control loops from drifting out of
//! phase.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐ begin ┌─────────────┐ opcode ┌──────────────┐ '#' ┌───────────┐
//! │ Idle │──────>│ AwaitOpcode │───────>│ AwaitPayload │────>│ Delivered │
//! └──────┘ READY └─────────────┘ READY  └──────────────┘     └───────────┘
//!                       │ (no payload)                             ↑
//!                       └──────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use latchkey_proto::{Command, CredentialAssembler, Opcode, READY};

use crate::error::HandshakeError;

/// Actions returned by the receiver for the driver to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverAction {
    /// Send this byte to the panel.
    SendByte(u8),
    /// A complete command is ready for dispatch.
    Deliver(Command),
}

/// Receiver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    /// No ready byte emitted yet; incoming bytes are unsolicited.
    Idle,
    /// Ready emitted; the next byte must be a request opcode.
    AwaitOpcode,
    /// Second ready emitted; assembling the credential field.
    AwaitPayload,
    /// Command handed to the driver.
    Delivered,
}

impl ReceiverState {
    /// Stage name used in error reporting.
    #[must_use]
    pub fn stage(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitOpcode => "await-opcode",
            Self::AwaitPayload => "await-payload",
            Self::Delivered => "delivered",
        }
    }
}

/// Timeout configuration for the receiver.
#[derive(Debug, Clone, Copy)]
pub struct ReceiverConfig {
    /// Bound on the wait for the opcode after emitting ready. `None` waits
    /// indefinitely; the vault idles between sessions.
    pub opcode_timeout: Option<Duration>,
    /// Bound on the wait for the credential field once invited.
    pub payload_timeout: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self { opcode_timeout: None, payload_timeout: Duration::from_secs(2) }
    }
}

/// Back-side state machine for one command exchange.
#[derive(Debug)]
pub struct CommandReceiver {
    state: ReceiverState,
    config: ReceiverConfig,
    assembler: CredentialAssembler,
    pending: Option<Opcode>,
    entered: Instant,
    deadline: Option<Instant>,
}

impl CommandReceiver {
    /// Create a receiver in the idle state.
    pub fn new(config: ReceiverConfig, now: Instant) -> Self {
        Self {
            state: ReceiverState::Idle,
            config,
            assembler: CredentialAssembler::new(),
            pending: None,
            entered: now,
            deadline: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Stage name of the current state.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        self.state.stage()
    }

    /// Deadline of the current waiting state, if bounded.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Invite the next command: emit the ready byte and start listening.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::InvalidState`] unless the receiver is
    /// idle.
    pub fn begin(&mut self, now: Instant) -> Result<Vec<ReceiverAction>, HandshakeError> {
        if self.state != ReceiverState::Idle {
            return Err(HandshakeError::InvalidState { stage: self.stage(), operation: "begin" });
        }
        self.state = ReceiverState::AwaitOpcode;
        self.entered = now;
        self.deadline = self.config.opcode_timeout.map(|timeout| now + timeout);
        Ok(vec![ReceiverAction::SendByte(READY)])
    }

    /// Check whether the current waiting state has timed out.
    #[must_use]
    pub fn check_timeout(&self, now: Instant) -> Option<HandshakeError> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        Some(HandshakeError::Timeout {
            stage: self.stage(),
            waited: now.duration_since(self.entered),
        })
    }

    /// Process one byte received from the panel.
    ///
    /// # Errors
    ///
    /// - [`HandshakeError::UnexpectedByte`] for a byte the receiver did not
    ///   invite: anything in `Idle` or `Delivered`, or a status opcode in
    ///   `AwaitOpcode`.
    /// - [`HandshakeError::Protocol`] for an unknown opcode or a malformed
    ///   credential field.
    pub fn on_byte(
        &mut self,
        byte: u8,
        now: Instant,
    ) -> Result<Vec<ReceiverAction>, HandshakeError> {
        match self.state {
            ReceiverState::Idle | ReceiverState::Delivered => {
                Err(HandshakeError::UnexpectedByte { stage: self.stage(), byte })
            },
            ReceiverState::AwaitOpcode => {
                let opcode = Opcode::from_byte(byte)?;
                if !opcode.is_request() {
                    return Err(HandshakeError::UnexpectedByte { stage: self.stage(), byte });
                }
                if opcode.carries_credential() {
                    self.pending = Some(opcode);
                    self.state = ReceiverState::AwaitPayload;
                    self.entered = now;
                    self.deadline = Some(now + self.config.payload_timeout);
                    return Ok(vec![ReceiverAction::SendByte(READY)]);
                }
                let command = match opcode {
                    Opcode::OpenDoor => Command::OpenDoor,
                    Opcode::FireBuzzer => Command::FireBuzzer,
                    _ => return Err(HandshakeError::UnexpectedByte { stage: self.stage(), byte }),
                };
                self.state = ReceiverState::Delivered;
                self.deadline = None;
                Ok(vec![ReceiverAction::Deliver(command)])
            },
            ReceiverState::AwaitPayload => {
                let Some(credential) = self.assembler.push(byte)? else {
                    return Ok(Vec::new());
                };
                let command = match self.pending.take() {
                    Some(Opcode::ChangePassword) => Command::ChangePassword(credential),
                    Some(Opcode::CheckPassword) => Command::CheckPassword(credential),
                    _ => {
                        return Err(HandshakeError::InvalidState {
                            stage: self.stage(),
                            operation: "deliver-payload",
                        });
                    },
                };
                self.state = ReceiverState::Delivered;
                self.deadline = None;
                Ok(vec![ReceiverAction::Deliver(command)])
            },
        }
    }
}
