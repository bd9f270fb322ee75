//! Front node for the Latchkey lock.
//!
//! Owns user interaction and session-level credential logic: the
//! entry/confirmation loop, the retry/lockout sequence, and the menu that
//! initiates every protocol exchange. All I/O goes through narrow seams
//! ([`Panel`] for the keypad and display, `WireLink` for the line to the
//! vault, `Clock` for pauses) so the same orchestration runs against real
//! devices and the deterministic test harness.
//!
//! # Components
//!
//! - [`Panel`]: driver trait for key input and notice display
//! - [`FrontSession`]: session orchestration (enroll, door, change)
//! - [`run_exchange`]: exchange driver with bounded waits and retry policy
//! - [`StdioPanel`]: terminal-backed panel for the reference binary

mod error;
mod exchange;
mod panel;
mod session;
mod stdio;

pub use error::{PanelError, SessionError};
pub use exchange::{LinkPolicy, run_exchange};
pub use panel::{Notice, Panel, PromptSet};
pub use session::{FrontConfig, FrontSession};
pub use stdio::StdioPanel;
