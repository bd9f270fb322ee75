//! Recording actuators on a shared, timestamped timeline.
//!
//! The latch and alarm doubles write every transition into one [`DeviceLog`]
//! stamped with the vault's virtual time, so a scenario can assert the full
//! actuator sequence, order and durations both, after the run.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use latchkey_core::MotorDrive;
use latchkey_vault::{ActuatorError, Alarm, Latch};

use crate::clock::VirtualClock;

/// One actuator transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Latch motor drive change.
    Latch(MotorDrive),
    /// Alarm switched on or off.
    Alarm(bool),
}

/// Timestamped actuator timeline shared by the latch and alarm doubles.
#[derive(Debug, Clone)]
pub struct DeviceLog {
    clock: VirtualClock,
    events: Arc<Mutex<Vec<(Duration, DeviceEvent)>>>,
}

impl DeviceLog {
    /// Create an empty log stamped from the given clock.
    #[must_use]
    pub fn new(clock: VirtualClock) -> Self {
        Self { clock, events: Arc::new(Mutex::new(Vec::new())) }
    }

    fn record(&self, event: DeviceEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((self.clock.elapsed(), event));
    }

    /// All recorded events in order.
    #[must_use]
    pub fn events(&self) -> Vec<(Duration, DeviceEvent)> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Latch transitions only.
    #[must_use]
    pub fn latch_steps(&self) -> Vec<(Duration, MotorDrive)> {
        self.events()
            .into_iter()
            .filter_map(|(at, event)| match event {
                DeviceEvent::Latch(drive) => Some((at, drive)),
                DeviceEvent::Alarm(_) => None,
            })
            .collect()
    }

    /// Alarm transitions only.
    #[must_use]
    pub fn alarm_switches(&self) -> Vec<(Duration, bool)> {
        self.events()
            .into_iter()
            .filter_map(|(at, event)| match event {
                DeviceEvent::Alarm(on) => Some((at, on)),
                DeviceEvent::Latch(_) => None,
            })
            .collect()
    }
}

/// Latch double recording into a [`DeviceLog`].
#[derive(Debug, Clone)]
pub struct SimLatch {
    log: DeviceLog,
    fail: bool,
}

impl SimLatch {
    /// Create a recording latch.
    #[must_use]
    pub fn new(log: DeviceLog) -> Self {
        Self { log, fail: false }
    }

    /// Create a latch whose driver always reports failure.
    #[must_use]
    pub fn failing(log: DeviceLog) -> Self {
        Self { log, fail: true }
    }
}

impl Latch for SimLatch {
    fn drive(&mut self, drive: MotorDrive) -> Result<(), ActuatorError> {
        if self.fail {
            return Err(ActuatorError::Latch { reason: "injected fault".to_owned() });
        }
        self.log.record(DeviceEvent::Latch(drive));
        Ok(())
    }
}

/// Alarm double recording into a [`DeviceLog`].
#[derive(Debug, Clone)]
pub struct SimAlarm {
    log: DeviceLog,
}

impl SimAlarm {
    /// Create a recording alarm.
    #[must_use]
    pub fn new(log: DeviceLog) -> Self {
        Self { log }
    }
}

impl Alarm for SimAlarm {
    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.log.record(DeviceEvent::Alarm(on));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use latchkey_core::Clock;

    use super::*;

    #[test]
    fn events_carry_virtual_timestamps() {
        let clock = VirtualClock::new();
        let log = DeviceLog::new(clock.clone());
        let mut latch = SimLatch::new(log.clone());
        let mut alarm = SimAlarm::new(log.clone());

        latch.drive(MotorDrive::Extend).unwrap();
        clock.sleep(Duration::from_secs(15));
        latch.drive(MotorDrive::Stop).unwrap();
        alarm.set(true).unwrap();

        assert_eq!(
            log.events(),
            vec![
                (Duration::ZERO, DeviceEvent::Latch(MotorDrive::Extend)),
                (Duration::from_secs(15), DeviceEvent::Latch(MotorDrive::Stop)),
                (Duration::from_secs(15), DeviceEvent::Alarm(true)),
            ]
        );
        assert_eq!(log.latch_steps().len(), 2);
        assert_eq!(log.alarm_switches(), vec![(Duration::from_secs(15), true)]);
    }

    #[test]
    fn failing_latch_reports_and_records_nothing() {
        let log = DeviceLog::new(VirtualClock::new());
        let mut latch = SimLatch::failing(log.clone());
        assert!(latch.drive(MotorDrive::Extend).is_err());
        assert!(log.events().is_empty());
    }
}
