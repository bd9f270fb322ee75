//! Terminal-backed panel for the reference binary.
//!
//! Stands in for the keypad/display hardware: keys come from stdin one
//! character at a time, notices render as text lines on stdout.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use crate::error::PanelError;
use crate::panel::{Notice, Panel};

/// Panel implementation over stdin/stdout.
pub struct StdioPanel {
    pending: VecDeque<u8>,
    out: std::io::Stdout,
}

impl Default for StdioPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl StdioPanel {
    /// Create a panel over the process's stdin and stdout.
    #[must_use]
    pub fn new() -> Self {
        Self { pending: VecDeque::new(), out: std::io::stdout() }
    }

    fn render(err: std::io::Error) -> PanelError {
        PanelError::Render { reason: err.to_string() }
    }

    fn notice_text(notice: Notice) -> &'static str {
        match notice {
            Notice::Welcome => "Welcome!",
            Notice::EnterPassword => "Enter your password (5 symbols):",
            Notice::ConfirmPassword => "Please confirm your password:",
            Notice::EnterNewPassword => "Enter your new password (5 symbols):",
            Notice::NotConfirmed => "Password not confirmed. Please re-enter your password!",
            Notice::Processing => "Processing...",
            Notice::CorrectPassword => "Correct password.",
            Notice::WrongPassword => "Wrong password.",
            Notice::LockoutAlarm => "WRONG PASSWORD - alarm on",
            Notice::OpeningDoor => "Opening the door...",
            Notice::Menu => "+: open the door  -: change the password",
        }
    }
}

impl Panel for StdioPanel {
    fn read_key(&mut self) -> Result<u8, PanelError> {
        loop {
            if let Some(key) = self.pending.pop_front() {
                return Ok(key);
            }
            let mut line = String::new();
            let read = std::io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(|err| PanelError::Input { reason: err.to_string() })?;
            if read == 0 {
                return Err(PanelError::Input { reason: "input stream ended".to_owned() });
            }
            self.pending.extend(line.trim_end_matches(['\r', '\n']).bytes());
        }
    }

    fn mask_key(&mut self) -> Result<(), PanelError> {
        write!(self.out, "*").map_err(Self::render)?;
        self.out.flush().map_err(Self::render)
    }

    fn show(&mut self, notice: Notice) -> Result<(), PanelError> {
        writeln!(self.out, "\n{}", Self::notice_text(notice)).map_err(Self::render)
    }
}
