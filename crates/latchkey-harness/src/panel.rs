//! Scripted keypad/display.
//!
//! Keys come from a prepared script; notices are recorded for assertions.
//! Running out of script is reported as an input failure, which is how a
//! scenario that drives the open-ended menu loop terminates.

use std::collections::VecDeque;

use latchkey_panel::{Notice, Panel, PanelError};

/// Panel double fed from a key script.
#[derive(Debug, Default)]
pub struct ScriptedPanel {
    keys: VecDeque<u8>,
    notices: Vec<Notice>,
    masked: usize,
}

impl ScriptedPanel {
    /// Create a panel with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a panel preloaded with the given key presses.
    #[must_use]
    pub fn with_keys(keys: &[u8]) -> Self {
        let mut panel = Self::new();
        panel.queue(keys);
        panel
    }

    /// Append key presses to the script.
    pub fn queue(&mut self, keys: &[u8]) {
        self.keys.extend(keys.iter().copied());
    }

    /// Notices shown so far, in display order.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// True if the given notice was displayed at least once.
    #[must_use]
    pub fn saw(&self, notice: Notice) -> bool {
        self.notices.contains(&notice)
    }

    /// How many times the given notice was displayed.
    #[must_use]
    pub fn count(&self, notice: Notice) -> usize {
        self.notices.iter().filter(|shown| **shown == notice).count()
    }

    /// Mask characters echoed so far.
    #[must_use]
    pub fn masked(&self) -> usize {
        self.masked
    }
}

impl Panel for ScriptedPanel {
    fn read_key(&mut self) -> Result<u8, PanelError> {
        self.keys
            .pop_front()
            .ok_or_else(|| PanelError::Input { reason: "key script exhausted".to_owned() })
    }

    fn mask_key(&mut self) -> Result<(), PanelError> {
        self.masked += 1;
        Ok(())
    }

    fn show(&mut self, notice: Notice) -> Result<(), PanelError> {
        self.notices.push(notice);
        Ok(())
    }
}
