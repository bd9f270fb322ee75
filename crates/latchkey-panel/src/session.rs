//! Front session orchestration.
//!
//! Drives the pure state machines from `latchkey-core` against the panel,
//! link, and clock seams: collect a confirmed credential, verify it with
//! the retry/lockout sequence, and perform the door and change flows the
//! menu offers. The session object owns all working state; nothing about
//! a credential or a retry count outlives it.

use std::time::Duration;

use latchkey_core::{
    AccessAttempt, AccessState, Clock, DoorTiming, EntryAction, EntrySession, ExchangeConfig,
    HandshakeError, PromptKind, WireLink,
};
use latchkey_proto::{Command, Credential, Verdict};

use crate::error::SessionError;
use crate::exchange::{LinkPolicy, run_exchange};
use crate::panel::{Notice, Panel, PromptSet};

/// Timing and policy knobs for the front session.
#[derive(Debug, Clone, Copy)]
pub struct FrontConfig {
    /// Exchange timeouts.
    pub exchange: ExchangeConfig,
    /// Exchange retry policy.
    pub policy: LinkPolicy,
    /// Door timing, mirrored while the vault runs the sequence.
    pub door: DoorTiming,
    /// Pause after each accepted key, letting the switch settle.
    pub key_settle: Duration,
    /// How long the "not confirmed" notice stays readable.
    pub notice_pause: Duration,
    /// How long a verdict notice stays readable.
    pub verdict_pause: Duration,
    /// How long the lockout notice is held while the alarm sounds.
    pub alarm_pause: Duration,
}

impl Default for FrontConfig {
    fn default() -> Self {
        Self {
            exchange: ExchangeConfig::default(),
            policy: LinkPolicy::default(),
            door: DoorTiming::default(),
            key_settle: Duration::from_millis(50),
            notice_pause: Duration::from_secs(5),
            verdict_pause: Duration::from_secs(2),
            alarm_pause: Duration::from_secs(10),
        }
    }
}

/// One front-node session over a connected link.
pub struct FrontSession<P, L, C> {
    panel: P,
    link: L,
    clock: C,
    config: FrontConfig,
}

impl<P, L, C> FrontSession<P, L, C>
where
    P: Panel,
    L: WireLink,
    C: Clock,
{
    /// Build a session over the given devices.
    pub fn new(panel: P, link: L, clock: C, config: FrontConfig) -> Self {
        Self { panel, link, clock, config }
    }

    /// Tear down and recover the devices, e.g. for post-run inspection.
    pub fn into_parts(self) -> (P, L, C) {
        (self.panel, self.link, self.clock)
    }

    /// First-time provisioning: collect a confirmed credential and store it
    /// in the vault through the ordinary change exchange.
    ///
    /// # Errors
    ///
    /// Propagates panel, protocol, and handshake failures.
    pub fn enroll(&mut self) -> Result<(), SessionError> {
        let credential = self.collect_confirmed(PromptSet::verify())?;
        self.dispatch(Command::ChangePassword(credential))?;
        tracing::info!("credential enrolled");
        Ok(())
    }

    /// Door request: verify with retry/lockout, then open on grant.
    ///
    /// # Errors
    ///
    /// Propagates panel, protocol, and handshake failures.
    pub fn open_door(&mut self) -> Result<AccessState, SessionError> {
        let outcome = self.request_access(PromptSet::verify())?;
        if outcome == AccessState::Granted {
            self.dispatch(Command::OpenDoor)?;
            self.panel.show(Notice::OpeningDoor)?;
            // Mirror the vault's open/hold/close timeline.
            self.clock.sleep(self.config.door.total());
        }
        Ok(outcome)
    }

    /// Change request: verify with retry/lockout, then collect and send the
    /// replacement credential on grant.
    ///
    /// # Errors
    ///
    /// Propagates panel, protocol, and handshake failures.
    pub fn change_password(&mut self) -> Result<AccessState, SessionError> {
        let outcome = self.request_access(PromptSet::verify())?;
        if outcome == AccessState::Granted {
            let replacement = self.collect_confirmed(PromptSet::change())?;
            self.dispatch(Command::ChangePassword(replacement))?;
            tracing::info!("credential changed");
        }
        Ok(outcome)
    }

    /// Full front-node program: welcome, enroll, then loop on the menu.
    ///
    /// Runs until a device or link error ends the session.
    ///
    /// # Errors
    ///
    /// Propagates the failure that ended the session.
    pub fn run(&mut self) -> Result<(), SessionError> {
        self.panel.show(Notice::Welcome)?;
        self.enroll()?;
        loop {
            self.panel.show(Notice::Menu)?;
            match self.panel.read_key()? {
                b'+' => {
                    let outcome = self.open_door()?;
                    tracing::info!(?outcome, "door request finished");
                },
                b'-' => {
                    let outcome = self.change_password()?;
                    tracing::info!(?outcome, "change request finished");
                },
                key => {
                    tracing::debug!(key, "unassigned menu key");
                },
            }
        }
    }

    /// Up to three verification attempts, each a fresh entry/confirmation
    /// round; dispatches the buzzer and holds the alarm notice on lockout.
    fn request_access(&mut self, prompts: PromptSet) -> Result<AccessState, SessionError> {
        let mut attempt = AccessAttempt::new();
        loop {
            let candidate = self.collect_confirmed(prompts)?;
            self.panel.show(Notice::Processing)?;
            let verdict = self.check(candidate)?;

            match attempt.record(verdict)? {
                AccessState::Granted => {
                    self.panel.show(Notice::CorrectPassword)?;
                    self.clock.sleep(self.config.verdict_pause);
                    return Ok(AccessState::Granted);
                },
                AccessState::Lockout => {
                    self.panel.show(Notice::WrongPassword)?;
                    self.clock.sleep(self.config.verdict_pause);
                    self.dispatch(Command::FireBuzzer)?;
                    self.panel.show(Notice::LockoutAlarm)?;
                    self.clock.sleep(self.config.alarm_pause);
                    tracing::warn!("verification locked out");
                    return Ok(AccessState::Lockout);
                },
                AccessState::Attempting(count) => {
                    self.panel.show(Notice::WrongPassword)?;
                    self.clock.sleep(self.config.verdict_pause);
                    tracing::debug!(count, "verification mismatch, re-entering");
                },
            }
        }
    }

    /// One entry/confirmation round; loops until the user confirms.
    fn collect_confirmed(&mut self, prompts: PromptSet) -> Result<Credential, SessionError> {
        let mut session = EntrySession::new();
        self.panel.show(prompts.enter)?;
        loop {
            let key = self.panel.read_key()?;
            self.clock.sleep(self.config.key_settle);
            for action in session.on_symbol(key)? {
                match action {
                    EntryAction::MaskSymbol => self.panel.mask_key()?,
                    EntryAction::Prompt(PromptKind::Enter) => self.panel.show(prompts.enter)?,
                    EntryAction::Prompt(PromptKind::Confirm) => self.panel.show(prompts.confirm)?,
                    EntryAction::NotifyMismatch => {
                        self.panel.show(Notice::NotConfirmed)?;
                        self.clock.sleep(self.config.notice_pause);
                    },
                    EntryAction::Accepted(credential) => return Ok(credential),
                }
            }
        }
    }

    /// Run a `CheckPassword` exchange and require a verdict.
    fn check(&mut self, candidate: Credential) -> Result<Verdict, SessionError> {
        self.dispatch(Command::CheckPassword(candidate))?
            .ok_or(SessionError::Handshake(HandshakeError::InvalidState {
                stage: "complete",
                operation: "take-verdict",
            }))
    }

    fn dispatch(&mut self, command: Command) -> Result<Option<Verdict>, SessionError> {
        tracing::debug!(opcode = ?command.opcode(), "dispatching exchange");
        run_exchange(
            &mut self.link,
            &self.clock,
            self.config.exchange,
            self.config.policy,
            command,
        )
        .map_err(SessionError::from)
    }
}
