//! Command dispatch loop.
//!
//! The vault's control loop: invite one command through the receiver state
//! machine, execute it against the store and actuators, repeat. The receiver
//! in `latchkey-core` decides which bytes are valid; this driver moves the
//! bytes and performs the effects. A handshake violation or a store failure
//! ends the loop with an error; the vault never guesses its way past a
//! desynchronized panel or an unreadable credential.

use std::time::Duration;

use latchkey_core::error::LinkError;
use latchkey_core::{
    Clock, CommandReceiver, CredentialStore, DoorTiming, HandshakeError, ReceiverAction,
    ReceiverConfig, WireLink, door_sequence,
};
use latchkey_proto::{Command, Credential, Verdict};

use crate::actuators::{Alarm, Latch};
use crate::error::VaultError;

/// Timing and policy knobs for the vault.
#[derive(Debug, Clone, Copy)]
pub struct VaultConfig {
    /// Receiver wait bounds.
    pub receiver: ReceiverConfig,
    /// Door sequence timing.
    pub door: DoorTiming,
    /// How long the alarm sounds on `FireBuzzer`.
    pub alarm_hold: Duration,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            receiver: ReceiverConfig::default(),
            door: DoorTiming::default(),
            alarm_hold: Duration::from_secs(10),
        }
    }
}

/// Back-node service: one connected panel, one command at a time.
pub struct VaultService<L, S, T, A, C> {
    link: L,
    store: S,
    latch: T,
    alarm: A,
    clock: C,
    config: VaultConfig,
}

impl<L, S, T, A, C> VaultService<L, S, T, A, C>
where
    L: WireLink,
    S: CredentialStore,
    T: Latch,
    A: Alarm,
    C: Clock,
{
    /// Build a service over the given devices.
    pub fn new(link: L, store: S, latch: T, alarm: A, clock: C, config: VaultConfig) -> Self {
        Self { link, store, latch, alarm, clock, config }
    }

    /// Serve commands until the panel disconnects.
    ///
    /// # Errors
    ///
    /// Returns the first handshake, store, or actuator failure. A clean
    /// disconnect between exchanges is not an error.
    pub fn serve(&mut self) -> Result<(), VaultError> {
        loop {
            match self.serve_one() {
                Ok(command) => {
                    tracing::info!(opcode = ?command.opcode(), "command served");
                },
                Err(err) if err.is_disconnect() => {
                    tracing::info!("panel disconnected");
                    return Ok(());
                },
                Err(err) => return Err(err),
            }
        }
    }

    /// Receive and execute exactly one command.
    ///
    /// # Errors
    ///
    /// Propagates handshake violations, bounded-wait expiry, and store or
    /// actuator failures.
    pub fn serve_one(&mut self) -> Result<Command, VaultError> {
        let mut receiver = CommandReceiver::new(self.config.receiver, self.clock.now());
        let mut actions = receiver.begin(self.clock.now()).map_err(VaultError::from)?;

        loop {
            for action in actions {
                match action {
                    ReceiverAction::SendByte(byte) => {
                        self.link.send(byte).map_err(HandshakeError::from)?;
                    },
                    ReceiverAction::Deliver(command) => {
                        self.execute(command)?;
                        return Ok(command);
                    },
                }
            }

            let byte = match receiver.deadline() {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(self.clock.now());
                    match self.link.recv_deadline(remaining) {
                        Ok(byte) => byte,
                        Err(LinkError::TimedOut { .. }) => {
                            let now = self.clock.now();
                            let err = receiver.check_timeout(now).unwrap_or(
                                HandshakeError::Timeout { stage: receiver.stage(), waited: remaining },
                            );
                            return Err(err.into());
                        },
                        Err(err) => return Err(HandshakeError::from(err).into()),
                    }
                },
                None => self.link.recv().map_err(HandshakeError::from)?,
            };

            actions = receiver.on_byte(byte, self.clock.now()).map_err(VaultError::from)?;
        }
    }

    fn execute(&mut self, command: Command) -> Result<(), VaultError> {
        match command {
            Command::OpenDoor => self.run_door(),
            Command::FireBuzzer => self.sound_alarm(),
            Command::ChangePassword(credential) => self.commit(&credential),
            Command::CheckPassword(credential) => self.verify(&credential),
        }
    }

    /// Fixed open/hold/close sequence. Non-interruptible; timing is the
    /// only completion signal.
    fn run_door(&mut self) -> Result<(), VaultError> {
        for step in door_sequence(self.config.door) {
            self.latch.drive(step.drive)?;
            self.clock.sleep(step.hold);
        }
        Ok(())
    }

    fn sound_alarm(&mut self) -> Result<(), VaultError> {
        tracing::warn!("lockout alarm");
        self.alarm.set(true)?;
        self.clock.sleep(self.config.alarm_hold);
        self.alarm.set(false)?;
        Ok(())
    }

    /// Overwrite the stored credential. A failed byte write propagates and
    /// ends the session: the stored state is unknown and the node fails
    /// closed rather than pretending the change committed.
    fn commit(&mut self, credential: &Credential) -> Result<(), VaultError> {
        self.store.store_credential(credential)?;
        tracing::info!("stored credential replaced");
        Ok(())
    }

    /// Compare the submission against the stored bytes and reply with a
    /// status opcode. Pure read-and-compare; the verdict is computed fresh
    /// every time.
    fn verify(&mut self, candidate: &Credential) -> Result<(), VaultError> {
        let stored = self.store.load_credential()?;
        let verdict = if stored == *candidate.symbols() {
            Verdict::Match
        } else {
            Verdict::Mismatch
        };
        tracing::debug!(?verdict, "verification");
        self.link
            .send(verdict.status_opcode().to_byte())
            .map_err(HandshakeError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use latchkey_core::{CREDENTIAL_BASE, MotorDrive, StoreError, SystemClock};
    use latchkey_proto::READY;

    use super::*;
    use crate::error::ActuatorError;

    struct ScriptLink {
        incoming: VecDeque<u8>,
        sent: Vec<u8>,
    }

    impl ScriptLink {
        fn new(incoming: &[u8]) -> Self {
            Self { incoming: incoming.iter().copied().collect(), sent: Vec::new() }
        }
    }

    impl WireLink for ScriptLink {
        fn send(&mut self, byte: u8) -> Result<(), LinkError> {
            self.sent.push(byte);
            Ok(())
        }

        fn recv(&mut self) -> Result<u8, LinkError> {
            self.incoming.pop_front().ok_or(LinkError::Closed)
        }

        fn recv_deadline(&mut self, timeout: Duration) -> Result<u8, LinkError> {
            self.incoming.pop_front().ok_or(LinkError::TimedOut { timeout })
        }
    }

    struct MemStore {
        bytes: Vec<u8>,
    }

    impl MemStore {
        fn holding(credential: &[u8]) -> Self {
            let mut bytes = vec![0u8; 1024];
            bytes[CREDENTIAL_BASE as usize..CREDENTIAL_BASE as usize + credential.len()]
                .copy_from_slice(credential);
            Self { bytes }
        }
    }

    impl CredentialStore for MemStore {
        fn read_byte(&mut self, offset: u64) -> Result<u8, StoreError> {
            self.bytes.get(offset as usize).copied().ok_or(StoreError::ReadFailed {
                offset,
                message: "out of range".to_owned(),
            })
        }

        fn write_byte(&mut self, offset: u64, byte: u8) -> Result<(), StoreError> {
            match self.bytes.get_mut(offset as usize) {
                Some(slot) => {
                    *slot = byte;
                    Ok(())
                },
                None => Err(StoreError::WriteFailed { offset, message: "out of range".to_owned() }),
            }
        }
    }

    #[derive(Default)]
    struct RecLatch {
        drives: Vec<MotorDrive>,
    }

    impl Latch for RecLatch {
        fn drive(&mut self, drive: MotorDrive) -> Result<(), ActuatorError> {
            self.drives.push(drive);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecAlarm {
        switches: Vec<bool>,
    }

    impl Alarm for RecAlarm {
        fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
            self.switches.push(on);
            Ok(())
        }
    }

    fn instant_config() -> VaultConfig {
        VaultConfig {
            receiver: ReceiverConfig::default(),
            door: DoorTiming { travel: Duration::ZERO, hold_open: Duration::ZERO },
            alarm_hold: Duration::ZERO,
        }
    }

    #[test]
    fn check_password_replies_correct_on_match() {
        let mut link = ScriptLink::new(b"\x0654321#");
        let mut store = MemStore::holding(b"54321");
        let mut latch = RecLatch::default();
        let mut alarm = RecAlarm::default();

        let command = VaultService::new(
            &mut link,
            &mut store,
            &mut latch,
            &mut alarm,
            SystemClock::new(),
            instant_config(),
        )
        .serve_one()
        .unwrap();

        assert!(matches!(command, Command::CheckPassword(_)));
        assert_eq!(link.sent, vec![READY, READY, 0x01]);
    }

    #[test]
    fn check_password_replies_wrong_on_mismatch() {
        let mut link = ScriptLink::new(b"\x0611111#");
        let mut store = MemStore::holding(b"54321");
        let mut latch = RecLatch::default();
        let mut alarm = RecAlarm::default();

        VaultService::new(
            &mut link,
            &mut store,
            &mut latch,
            &mut alarm,
            SystemClock::new(),
            instant_config(),
        )
        .serve_one()
        .unwrap();

        assert_eq!(link.sent, vec![READY, READY, 0x02]);
    }

    #[test]
    fn change_password_overwrites_fixed_layout() {
        let mut link = ScriptLink::new(b"\x0598765#");
        let mut store = MemStore::holding(b"54321");
        let mut latch = RecLatch::default();
        let mut alarm = RecAlarm::default();

        VaultService::new(
            &mut link,
            &mut store,
            &mut latch,
            &mut alarm,
            SystemClock::new(),
            instant_config(),
        )
        .serve_one()
        .unwrap();

        assert_eq!(link.sent, vec![READY, READY]);
        assert_eq!(
            &store.bytes[CREDENTIAL_BASE as usize..CREDENTIAL_BASE as usize + 5],
            b"98765"
        );
    }

    #[test]
    fn open_door_drives_full_sequence() {
        let mut link = ScriptLink::new(&[0x03]);
        let mut store = MemStore::holding(b"54321");
        let mut latch = RecLatch::default();
        let mut alarm = RecAlarm::default();

        let command = VaultService::new(
            &mut link,
            &mut store,
            &mut latch,
            &mut alarm,
            SystemClock::new(),
            instant_config(),
        )
        .serve_one()
        .unwrap();

        assert_eq!(command, Command::OpenDoor);
        assert_eq!(
            latch.drives,
            vec![MotorDrive::Extend, MotorDrive::Stop, MotorDrive::Retract, MotorDrive::Stop]
        );
        assert!(alarm.switches.is_empty());
    }

    #[test]
    fn fire_buzzer_pulses_alarm() {
        let mut link = ScriptLink::new(&[0x04]);
        let mut store = MemStore::holding(b"54321");
        let mut latch = RecLatch::default();
        let mut alarm = RecAlarm::default();

        VaultService::new(
            &mut link,
            &mut store,
            &mut latch,
            &mut alarm,
            SystemClock::new(),
            instant_config(),
        )
        .serve_one()
        .unwrap();

        assert_eq!(alarm.switches, vec![true, false]);
        assert!(latch.drives.is_empty());
    }

    #[test]
    fn serve_ends_cleanly_on_disconnect() {
        let mut link = ScriptLink::new(b"\x0654321#");
        let mut store = MemStore::holding(b"54321");
        let mut latch = RecLatch::default();
        let mut alarm = RecAlarm::default();

        let result = VaultService::new(
            &mut link,
            &mut store,
            &mut latch,
            &mut alarm,
            SystemClock::new(),
            instant_config(),
        )
        .serve();

        assert_eq!(result, Ok(()));
        assert_eq!(link.sent, vec![READY, READY, 0x01, READY]);
    }

    #[test]
    fn failed_store_read_fails_closed() {
        let mut link = ScriptLink::new(b"\x0654321#");
        let mut store = MemStore { bytes: vec![0u8; 4] };
        let mut latch = RecLatch::default();
        let mut alarm = RecAlarm::default();

        let err = VaultService::new(
            &mut link,
            &mut store,
            &mut latch,
            &mut alarm,
            SystemClock::new(),
            instant_config(),
        )
        .serve_one()
        .unwrap_err();

        assert!(matches!(err, VaultError::Store(StoreError::ReadFailed { .. })));
        // No verdict was invented.
        assert_eq!(link.sent, vec![READY, READY]);
    }
}

