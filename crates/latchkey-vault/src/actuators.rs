//! Actuator seams: latch motor and alarm.
//!
//! Both traits are fallible: a driver that can detect a fault reports it
//! instead of the sequence silently running open-loop. Drivers with no
//! feedback path simply never fail.

use latchkey_core::MotorDrive;

use crate::error::ActuatorError;

/// Door latch motor.
pub trait Latch: Send {
    /// Apply a drive state.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError::Latch`] if the driver fails.
    fn drive(&mut self, drive: MotorDrive) -> Result<(), ActuatorError>;
}

/// Alarm/buzzer.
pub trait Alarm: Send {
    /// Switch the alarm on or off.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError::Alarm`] if the driver fails.
    fn set(&mut self, on: bool) -> Result<(), ActuatorError>;
}

impl<L: Latch + ?Sized> Latch for &mut L {
    fn drive(&mut self, drive: MotorDrive) -> Result<(), ActuatorError> {
        (**self).drive(drive)
    }
}

impl<A: Alarm + ?Sized> Alarm for &mut A {
    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        (**self).set(on)
    }
}

/// Latch stand-in that logs drive transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLatch;

impl Latch for LogLatch {
    fn drive(&mut self, drive: MotorDrive) -> Result<(), ActuatorError> {
        tracing::info!(?drive, "latch drive");
        Ok(())
    }
}

/// Alarm stand-in that logs on/off transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlarm;

impl Alarm for LogAlarm {
    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        tracing::info!(on, "alarm");
        Ok(())
    }
}
