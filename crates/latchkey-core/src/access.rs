//! Retry/lockout state machine for one privileged request.
//!
//! Spans a door or change request on the front node: up to three
//! independent verification attempts, each preceded by a full
//! entry/confirmation round. The first match grants; the third consecutive
//! mismatch locks the session out. Both outcomes are terminal and the
//! counter never persists across sessions.

use latchkey_proto::Verdict;

use crate::error::AccessError;

/// Verification attempts allowed before lockout. Fixed contract constant.
pub const MAX_ATTEMPTS: u8 = 3;

/// State of one attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    /// Mid-sequence, with the number of mismatches recorded so far.
    Attempting(u8),
    /// A submission matched; the caller may perform the privileged action.
    Granted,
    /// Three mismatches; the session ends without access.
    Lockout,
}

/// Attempt sequence owned by the front node for one privileged request.
#[derive(Debug, Clone, Copy)]
pub struct AccessAttempt {
    state: AccessState,
}

impl Default for AccessAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessAttempt {
    /// Start a fresh sequence with zero mismatches.
    #[must_use]
    pub fn new() -> Self {
        Self { state: AccessState::Attempting(0) }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AccessState {
        self.state
    }

    /// Mismatches recorded so far.
    #[must_use]
    pub fn mismatches(&self) -> u8 {
        match self.state {
            AccessState::Attempting(count) => count,
            AccessState::Granted => 0,
            AccessState::Lockout => MAX_ATTEMPTS,
        }
    }

    /// Record a verification verdict and return the resulting state.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Finished`] if the sequence already reached a
    /// terminal state.
    pub fn record(&mut self, verdict: Verdict) -> Result<AccessState, AccessError> {
        let AccessState::Attempting(count) = self.state else {
            return Err(AccessError::Finished { state: self.state });
        };

        self.state = match verdict {
            Verdict::Match => AccessState::Granted,
            Verdict::Mismatch if count + 1 < MAX_ATTEMPTS => AccessState::Attempting(count + 1),
            Verdict::Mismatch => AccessState::Lockout,
        };
        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn first_match_grants() {
        let mut attempt = AccessAttempt::new();
        assert_eq!(attempt.record(Verdict::Match).unwrap(), AccessState::Granted);
    }

    #[test]
    fn match_after_two_mismatches_still_grants() {
        let mut attempt = AccessAttempt::new();
        assert_eq!(attempt.record(Verdict::Mismatch).unwrap(), AccessState::Attempting(1));
        assert_eq!(attempt.record(Verdict::Mismatch).unwrap(), AccessState::Attempting(2));
        assert_eq!(attempt.record(Verdict::Match).unwrap(), AccessState::Granted);
    }

    #[test]
    fn third_mismatch_locks_out() {
        let mut attempt = AccessAttempt::new();
        attempt.record(Verdict::Mismatch).unwrap();
        attempt.record(Verdict::Mismatch).unwrap();
        assert_eq!(attempt.record(Verdict::Mismatch).unwrap(), AccessState::Lockout);
    }

    #[test]
    fn terminal_states_reject_further_verdicts() {
        let mut attempt = AccessAttempt::new();
        attempt.record(Verdict::Match).unwrap();
        assert_eq!(
            attempt.record(Verdict::Mismatch),
            Err(AccessError::Finished { state: AccessState::Granted })
        );
    }

    proptest! {
        /// Lockout iff three mismatches arrive with no intervening match;
        /// granted on the first match while the count is still below the
        /// bound.
        #[test]
        fn outcome_matches_reference_model(verdicts in proptest::collection::vec(
            prop_oneof![Just(Verdict::Match), Just(Verdict::Mismatch)],
            0..10,
        )) {
            let mut attempt = AccessAttempt::new();
            let mut outcome = None;
            let mut consumed = 0usize;
            for verdict in &verdicts {
                consumed += 1;
                match attempt.record(*verdict).unwrap() {
                    AccessState::Granted => {
                        outcome = Some(AccessState::Granted);
                        break;
                    },
                    AccessState::Lockout => {
                        outcome = Some(AccessState::Lockout);
                        break;
                    },
                    AccessState::Attempting(_) => {},
                }
            }

            let leading_mismatches =
                verdicts.iter().take_while(|v| **v == Verdict::Mismatch).count();
            let expected = if leading_mismatches >= MAX_ATTEMPTS as usize {
                Some(AccessState::Lockout)
            } else if verdicts.len() > leading_mismatches {
                Some(AccessState::Granted)
            } else {
                None
            };

            prop_assert_eq!(outcome, expected);
            if expected == Some(AccessState::Lockout) {
                prop_assert_eq!(consumed, MAX_ATTEMPTS as usize);
            }
        }
    }
}
