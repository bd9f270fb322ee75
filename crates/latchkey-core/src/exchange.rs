//! Front-side command exchange state machine.
//!
//! Every logical exchange between the nodes follows one discipline: the
//! vault emits a ready byte, the panel answers with exactly one opcode, and
//! if the opcode carries a credential the vault emits a second ready byte
//! before the panel sends the field. A `CheckPassword` exchange ends with a
//! status opcode from the vault.
//!
//! # Architecture: Action-Based State Machine
//!
//! This state machine follows the action pattern:
//! - Methods accept time as a parameter (no stored clock)
//! - Methods return `Result<Vec<ExchangeAction>, HandshakeError>`
//! - Driver code executes actions (send bytes over the link)
//!
//! This keeps the alternation rules pure and testable without any transport.
//!
//! # State Machine
//!
//! ```text
//! ┌────────────┐ READY  ┌────────────────────┐ READY ┌──────────────┐
//! │ AwaitReady │───────>│ AwaitPayloadReady  │──────>│ AwaitVerdict │
//! └────────────┘        └────────────────────┘       └──────────────┘
//!       │ (no payload)            │ (no verdict)            │ status
//!       ↓                         ↓                         ↓
//!   ┌──────────┐            ┌──────────┐             ┌──────────┐
//!   │ Complete │            │ Complete │             │ Complete │
//!   └──────────┘            └──────────┘             └──────────┘
//! ```
//!
//! Each waiting state carries a deadline: an unbounded wait for the ready
//! byte would deadlock the panel on a single lost byte, so expiry is a
//! distinct handshake error the caller can retry or surface.

use std::time::{Duration, Instant};

use latchkey_proto::{Command, Opcode, Verdict};

use crate::error::HandshakeError;

/// Actions returned by the exchange state machine for the driver to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeAction {
    /// Send this byte to the vault.
    SendByte(u8),
    /// Send this run of bytes to the vault.
    SendBytes(Vec<u8>),
}

/// Exchange state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// Waiting for the ready byte that precedes the opcode.
    AwaitReady,
    /// Opcode sent; waiting for the ready byte that precedes the payload.
    AwaitPayloadReady,
    /// Payload sent; waiting for the status opcode.
    AwaitVerdict,
    /// Exchange finished.
    Complete,
}

impl ExchangeState {
    /// Stage name used in error reporting.
    #[must_use]
    pub fn stage(self) -> &'static str {
        match self {
            Self::AwaitReady => "await-ready",
            Self::AwaitPayloadReady => "await-payload-ready",
            Self::AwaitVerdict => "await-verdict",
            Self::Complete => "complete",
        }
    }
}

/// Timeout configuration for one exchange.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeConfig {
    /// Bound on each wait for a ready byte.
    pub ready_timeout: Duration,
    /// Bound on the wait for the status opcode. Must cover the vault's
    /// store reads including settle delays.
    pub verdict_timeout: Duration,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_secs(2),
            verdict_timeout: Duration::from_secs(5),
        }
    }
}

/// Front-side state machine for one command exchange.
///
/// Pure: no I/O, no stored clock. Time is passed to methods that need it.
#[derive(Debug, Clone)]
pub struct Exchange {
    state: ExchangeState,
    command: Command,
    config: ExchangeConfig,
    entered: Instant,
    deadline: Instant,
    opcode_sent: bool,
    verdict: Option<Verdict>,
}

impl Exchange {
    /// Start an exchange for `command`.
    pub fn new(command: Command, now: Instant, config: ExchangeConfig) -> Self {
        Self {
            state: ExchangeState::AwaitReady,
            command,
            config,
            entered: now,
            deadline: now + config.ready_timeout,
            opcode_sent: false,
            verdict: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Stage name of the current state.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        self.state.stage()
    }

    /// True once the exchange has finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == ExchangeState::Complete
    }

    /// True once the opcode byte has been handed to the driver.
    ///
    /// Retry policy hinges on this: an exchange that timed out before the
    /// opcode went out can be restarted safely; afterwards the peer may be
    /// mid-exchange and a restart would desynchronize the link.
    #[must_use]
    pub fn opcode_sent(&self) -> bool {
        self.opcode_sent
    }

    /// The verdict, once a `CheckPassword` exchange completed.
    #[must_use]
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// Deadline of the current waiting state.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Check whether the current waiting state has timed out.
    ///
    /// Returns the handshake error to surface, or `None` if still within
    /// bounds or already complete.
    #[must_use]
    pub fn check_timeout(&self, now: Instant) -> Option<HandshakeError> {
        if self.is_complete() || now < self.deadline {
            return None;
        }
        Some(HandshakeError::Timeout {
            stage: self.stage(),
            waited: now.duration_since(self.entered),
        })
    }

    fn enter(&mut self, state: ExchangeState, now: Instant, wait: Duration) {
        self.state = state;
        self.entered = now;
        self.deadline = now + wait;
    }

    /// Process one byte received from the vault.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::UnexpectedByte`] for any byte the current
    /// stage cannot accept, and [`HandshakeError::InvalidState`] if called
    /// after completion.
    pub fn on_byte(
        &mut self,
        byte: u8,
        now: Instant,
    ) -> Result<Vec<ExchangeAction>, HandshakeError> {
        match self.state {
            ExchangeState::AwaitReady if byte == latchkey_proto::READY => {
                let actions = vec![ExchangeAction::SendByte(self.command.opcode().to_byte())];
                self.opcode_sent = true;
                if self.command.credential().is_some() {
                    self.enter(ExchangeState::AwaitPayloadReady, now, self.config.ready_timeout);
                } else {
                    self.state = ExchangeState::Complete;
                }
                Ok(actions)
            },
            ExchangeState::AwaitPayloadReady if byte == latchkey_proto::READY => {
                let credential = self.command.credential().copied().ok_or(
                    HandshakeError::InvalidState {
                        stage: self.stage(),
                        operation: "send-payload",
                    },
                )?;
                let actions = vec![ExchangeAction::SendBytes(credential.to_wire().to_vec())];
                if self.command.expects_verdict() {
                    self.enter(ExchangeState::AwaitVerdict, now, self.config.verdict_timeout);
                } else {
                    self.state = ExchangeState::Complete;
                }
                Ok(actions)
            },
            ExchangeState::AwaitVerdict => {
                let opcode = Opcode::from_byte(byte)?;
                let verdict = Verdict::from_status(opcode).ok_or(HandshakeError::UnexpectedByte {
                    stage: self.stage(),
                    byte,
                })?;
                self.verdict = Some(verdict);
                self.state = ExchangeState::Complete;
                Ok(Vec::new())
            },
            ExchangeState::Complete => Err(HandshakeError::InvalidState {
                stage: self.stage(),
                operation: "on_byte",
            }),
            _ => Err(HandshakeError::UnexpectedByte { stage: self.stage(), byte }),
        }
    }
}
