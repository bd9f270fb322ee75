//! Back node for the Latchkey lock.
//!
//! Owns the canonical credential, the persistent store, and the actuators.
//! Never initiates: it invites commands with the ready byte, performs the
//! requested action, and for verification requests replies with a status
//! opcode. All device access goes through the `CredentialStore`, [`Latch`],
//! and [`Alarm`] seams so the dispatch loop runs unchanged against real
//! hardware stand-ins and the test harness.
//!
//! # Components
//!
//! - [`VaultService`]: command dispatch loop
//! - [`FileStore`]: byte-addressable persistent store over a backing file
//! - [`Latch`] / [`Alarm`]: actuator seams plus logged implementations

mod actuators;
mod dispatch;
mod error;
mod store;

pub use actuators::{Alarm, Latch, LogAlarm, LogLatch};
pub use dispatch::{VaultConfig, VaultService};
pub use error::{ActuatorError, VaultError};
pub use store::FileStore;
