//! Deterministic test harness for the Latchkey lock.
//!
//! Simulation implementations of every device seam the two nodes depend on:
//! a virtual clock whose sleeps advance instantly, an in-memory byte link, a
//! fault-injecting link wrapper with scripted and seeded drops, a scripted
//! keypad/display, a shared in-memory credential store, and actuators that
//! record a timestamped timeline. [`LockWorld`] wires a full panel/vault
//! pair over these doubles so scenario tests drive real sessions end to end
//! and assert on the recorded outcome.

pub mod clock;
pub mod devices;
pub mod fault;
pub mod link;
pub mod panel;
pub mod store;
pub mod world;

pub use clock::VirtualClock;
pub use devices::{DeviceEvent, DeviceLog, SimAlarm, SimLatch};
pub use fault::FaultLink;
pub use link::MemoryLink;
pub use panel::ScriptedPanel;
pub use store::MemoryStore;
pub use world::{LockWorld, WorldReport};
