//! Exchange driver: runs the front-side state machine against a live link.
//!
//! The state machine in `latchkey-core` decides what is valid; this driver
//! moves the bytes and enforces the bounded waits. A timeout that fires
//! before the opcode went out is retried after a backoff; the vault has
//! seen nothing and the exchange can restart cleanly. Once the opcode is on
//! the wire a timeout is terminal: restarting mid-exchange would
//! desynchronize the peer.

use std::time::Duration;

use latchkey_core::{Clock, Exchange, ExchangeAction, ExchangeConfig, HandshakeError, WireLink};
use latchkey_core::error::LinkError;
use latchkey_proto::{Command, Verdict};

/// Retry policy for exchanges that time out before committing.
#[derive(Debug, Clone, Copy)]
pub struct LinkPolicy {
    /// Total attempts per exchange, including the first.
    pub attempts: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self { attempts: 3, backoff: Duration::from_millis(100) }
    }
}

/// Run one command exchange to completion.
///
/// Returns the verdict for `CheckPassword` commands, `None` otherwise.
///
/// # Errors
///
/// Returns [`HandshakeError::Timeout`] once retries are exhausted or a
/// timeout fires mid-exchange, and propagates link and protocol failures.
pub fn run_exchange<L, C>(
    link: &mut L,
    clock: &C,
    config: ExchangeConfig,
    policy: LinkPolicy,
    command: Command,
) -> Result<Option<Verdict>, HandshakeError>
where
    L: WireLink + ?Sized,
    C: Clock + ?Sized,
{
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        match run_attempt(link, clock, config, command) {
            Ok(verdict) => return Ok(verdict),
            Err((err @ HandshakeError::Timeout { .. }, false)) if attempt < attempts => {
                tracing::debug!(%err, attempt, "exchange timed out before commit, retrying");
                clock.sleep(policy.backoff);
            },
            Err((err, _)) => return Err(err),
        }
    }
    Err(HandshakeError::Timeout { stage: "await-ready", waited: config.ready_timeout })
}

/// One attempt; the flag in the error reports whether the opcode was sent.
fn run_attempt<L, C>(
    link: &mut L,
    clock: &C,
    config: ExchangeConfig,
    command: Command,
) -> Result<Option<Verdict>, (HandshakeError, bool)>
where
    L: WireLink + ?Sized,
    C: Clock + ?Sized,
{
    let mut exchange = Exchange::new(command, clock.now(), config);

    while !exchange.is_complete() {
        let now = clock.now();
        let remaining = exchange.deadline().saturating_duration_since(now);
        let byte = match link.recv_deadline(remaining) {
            Ok(byte) => byte,
            Err(LinkError::TimedOut { .. }) => {
                let err = HandshakeError::Timeout { stage: exchange.stage(), waited: remaining };
                return Err((err, exchange.opcode_sent()));
            },
            Err(err) => return Err((err.into(), exchange.opcode_sent())),
        };

        let actions = exchange
            .on_byte(byte, clock.now())
            .map_err(|err| (err, exchange.opcode_sent()))?;
        for action in actions {
            let sent = match action {
                ExchangeAction::SendByte(byte) => link.send(byte),
                ExchangeAction::SendBytes(bytes) => link.send_all(&bytes),
            };
            sent.map_err(|err| (HandshakeError::from(err), exchange.opcode_sent()))?;
        }
    }

    Ok(exchange.verdict())
}
