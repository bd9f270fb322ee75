//! Credential entry and confirmation session.
//!
//! One reusable state machine serves initial enrollment, verification
//! attempts, and the change-password payload: collect exactly five symbols,
//! collect five more as confirmation, compare. On mismatch the session
//! notifies, clears both buffers, and re-prompts indefinitely, until the
//! buffers agree. There is deliberately no retry bound here; the bound in
//! [`crate::access`] applies only to verification against the stored
//! credential.
//!
//! The session owns its buffers. The equality check is only reachable once
//! both buffers hold five symbols, so it can never trivially pass on
//! uninitialized state.

use latchkey_proto::{CREDENTIAL_LEN, Credential, ProtocolError, credential::is_reserved_symbol};

/// Which prompt the driver should display next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Ask for the credential.
    Enter,
    /// Ask for the confirmation copy.
    Confirm,
}

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPhase {
    /// Filling the working buffer.
    Entering,
    /// Filling the confirmation buffer.
    Confirming,
    /// Both buffers matched; the candidate has been produced.
    Confirmed,
}

/// Actions returned by the session for the driver to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    /// Echo a mask character for the accepted symbol.
    MaskSymbol,
    /// Display the given prompt.
    Prompt(PromptKind),
    /// Display the "not confirmed" notice and hold it for a readable pause.
    NotifyMismatch,
    /// The confirmed candidate credential.
    Accepted(Credential),
}

#[derive(Debug, Default)]
struct SymbolBuffer {
    bytes: [u8; CREDENTIAL_LEN],
    len: usize,
}

impl SymbolBuffer {
    fn push(&mut self, symbol: u8) -> bool {
        self.bytes[self.len] = symbol;
        self.len += 1;
        self.len == CREDENTIAL_LEN
    }

    fn clear(&mut self) {
        self.len = 0;
    }
}

/// Entry/confirmation state machine.
#[derive(Debug, Default)]
pub struct EntrySession {
    phase: EntryPhase,
    entry: SymbolBuffer,
    confirm: SymbolBuffer,
}

impl Default for EntryPhase {
    fn default() -> Self {
        Self::Entering
    }
}

impl EntrySession {
    /// Start a fresh session in the entering phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> EntryPhase {
        self.phase
    }

    /// Prompt matching the current phase, or `None` once confirmed.
    #[must_use]
    pub fn current_prompt(&self) -> Option<PromptKind> {
        match self.phase {
            EntryPhase::Entering => Some(PromptKind::Enter),
            EntryPhase::Confirming => Some(PromptKind::Confirm),
            EntryPhase::Confirmed => None,
        }
    }

    /// Feed one key press.
    ///
    /// Reserved framing bytes are ignored and produce no actions; they can
    /// never enter a buffer. Input after confirmation is ignored.
    ///
    /// # Errors
    ///
    /// Propagates credential construction failures from the shared schema.
    pub fn on_symbol(&mut self, symbol: u8) -> Result<Vec<EntryAction>, ProtocolError> {
        if self.phase == EntryPhase::Confirmed || is_reserved_symbol(symbol) {
            return Ok(Vec::new());
        }

        match self.phase {
            EntryPhase::Entering => {
                let mut actions = vec![EntryAction::MaskSymbol];
                if self.entry.push(symbol) {
                    self.phase = EntryPhase::Confirming;
                    actions.push(EntryAction::Prompt(PromptKind::Confirm));
                }
                Ok(actions)
            },
            EntryPhase::Confirming => {
                let mut actions = vec![EntryAction::MaskSymbol];
                if self.confirm.push(symbol) {
                    if self.entry.bytes == self.confirm.bytes {
                        let credential = Credential::new(self.entry.bytes)?;
                        self.phase = EntryPhase::Confirmed;
                        actions.push(EntryAction::Accepted(credential));
                    } else {
                        self.entry.clear();
                        self.confirm.clear();
                        self.phase = EntryPhase::Entering;
                        actions.push(EntryAction::NotifyMismatch);
                        actions.push(EntryAction::Prompt(PromptKind::Enter));
                    }
                }
                Ok(actions)
            },
            EntryPhase::Confirmed => Ok(Vec::new()),
        }
    }
}
