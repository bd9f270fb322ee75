//! Panel driver trait: the keypad and display seam.
//!
//! Character scanning and display rendering are external collaborators.
//! The session layer only needs three operations: read one key, echo a
//! mask character, and show a notice. Implementations decide how a notice
//! is rendered: the reference binary writes text lines, a hardware build
//! would draw on a character LCD, the harness records them for assertions.

use crate::error::PanelError;

/// User-visible notices the session can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Greeting shown once at startup.
    Welcome,
    /// Ask for the credential.
    EnterPassword,
    /// Ask for the confirmation copy.
    ConfirmPassword,
    /// Ask for the replacement credential.
    EnterNewPassword,
    /// The two entries differed; re-entry follows.
    NotConfirmed,
    /// Submission sent; waiting on the vault.
    Processing,
    /// The vault accepted the submission.
    CorrectPassword,
    /// The vault rejected the submission.
    WrongPassword,
    /// Third rejection; the alarm is sounding.
    LockoutAlarm,
    /// Door sequence in progress.
    OpeningDoor,
    /// Main menu: open the door or change the credential.
    Menu,
}

/// Keypad and display device abstraction.
pub trait Panel {
    /// Block until the user presses a key and return its symbol.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Input`] if the device fails.
    fn read_key(&mut self) -> Result<u8, PanelError>;

    /// Echo a mask character for an accepted symbol.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Render`] if the device fails.
    fn mask_key(&mut self) -> Result<(), PanelError>;

    /// Display a notice, replacing whatever was shown before.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Render`] if the device fails.
    fn show(&mut self, notice: Notice) -> Result<(), PanelError>;
}

impl<P: Panel + ?Sized> Panel for &mut P {
    fn read_key(&mut self) -> Result<u8, PanelError> {
        (**self).read_key()
    }

    fn mask_key(&mut self) -> Result<(), PanelError> {
        (**self).mask_key()
    }

    fn show(&mut self, notice: Notice) -> Result<(), PanelError> {
        (**self).show(notice)
    }
}

/// Prompt pair for one entry/confirmation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptSet {
    /// Prompt for the first collection.
    pub enter: Notice,
    /// Prompt for the confirmation collection.
    pub confirm: Notice,
}

impl PromptSet {
    /// Prompts for enrollment and verification rounds.
    #[must_use]
    pub fn verify() -> Self {
        Self { enter: Notice::EnterPassword, confirm: Notice::ConfirmPassword }
    }

    /// Prompts for collecting a replacement credential.
    #[must_use]
    pub fn change() -> Self {
        Self { enter: Notice::EnterNewPassword, confirm: Notice::ConfirmPassword }
    }
}
