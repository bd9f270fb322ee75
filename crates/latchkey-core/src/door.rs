//! Door actuator sequencing.
//!
//! Opening the door is a fixed, non-interruptible straight line: extend for
//! the travel interval, stop and hold, retract for the travel interval,
//! stop. Timing is the sole completion signal; there is no sensor
//! feedback confirming the door reached either end. The sequence is
//! expressed as data so the vault driver and the tests share one source of
//! truth.

use std::time::Duration;

/// Latch motor drive states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorDrive {
    /// Motor stopped.
    Stop,
    /// Drive toward the open position.
    Extend,
    /// Drive toward the closed position.
    Retract,
}

/// One step of the door sequence: a drive state held for a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorStep {
    /// Drive state to apply.
    pub drive: MotorDrive,
    /// How long to hold it before the next step.
    pub hold: Duration,
}

/// Door timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorTiming {
    /// Travel time in each direction.
    pub travel: Duration,
    /// How long the door is held open between travels.
    pub hold_open: Duration,
}

impl Default for DoorTiming {
    fn default() -> Self {
        Self { travel: Duration::from_secs(15), hold_open: Duration::from_secs(3) }
    }
}

impl DoorTiming {
    /// Wall time of the full open/hold/close sequence.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.travel * 2 + self.hold_open
    }
}

/// The fixed door sequence for the given timing.
#[must_use]
pub fn door_sequence(timing: DoorTiming) -> [DoorStep; 4] {
    [
        DoorStep { drive: MotorDrive::Extend, hold: timing.travel },
        DoorStep { drive: MotorDrive::Stop, hold: timing.hold_open },
        DoorStep { drive: MotorDrive::Retract, hold: timing.travel },
        DoorStep { drive: MotorDrive::Stop, hold: Duration::ZERO },
    ]
}
