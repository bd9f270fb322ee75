//! Fault injection: glitched link bytes and failing actuators.
//!
//! A lost byte must never stall either node. These scenarios pin down the
//! failure policy: every wait is bounded, expiry surfaces as a handshake
//! timeout, and the vault never acts on an exchange it did not complete.

use latchkey_core::{AccessState, HandshakeError};
use latchkey_harness::LockWorld;
use latchkey_panel::{Notice, SessionError};
use latchkey_vault::VaultError;

#[test]
fn dropped_ready_byte_times_out_instead_of_deadlocking() {
    // Send index 0 is the vault's first ready byte.
    let (result, report) = LockWorld::new()
        .stored(b"54321")
        .drop_vault_send(0)
        .run(b"5432154321", |session| session.open_door());

    assert!(matches!(
        result,
        Err(SessionError::Handshake(HandshakeError::Timeout { .. }))
    ));
    // The vault invited a command, saw none, and observed the disconnect;
    // it processed nothing.
    assert_eq!(report.vault, Some(Ok(())));
    assert!(report.devices.latch_steps().is_empty());
    assert!(report.devices.alarm_switches().is_empty());
}

#[test]
fn dropped_verdict_is_terminal_for_the_exchange() {
    // Send indices: 0 = ready, 1 = payload ready, 2 = verdict.
    let (result, report) = LockWorld::new()
        .stored(b"54321")
        .drop_vault_send(2)
        .run(b"5432154321", |session| session.open_door());

    // The opcode was already on the wire, so the timeout is not retried.
    assert!(matches!(
        result,
        Err(SessionError::Handshake(HandshakeError::Timeout { stage: "await-verdict", .. }))
    ));
    assert!(!report.panel.saw(Notice::CorrectPassword));
    assert!(report.devices.latch_steps().is_empty());
}

#[test]
fn seeded_byte_loss_always_ends_bounded() {
    // Whatever a lossy line does to the exchange, the session either
    // completes or fails with a distinct error; it never hangs. Same seed,
    // same outcome.
    for seed in 0..8 {
        let (result, report) = LockWorld::new()
            .stored(b"54321")
            .vault_drop_rate(0.15, seed)
            .run(b"5432154321", |session| session.open_door());

        match result {
            Ok(outcome) => assert_eq!(outcome, AccessState::Granted, "seed {seed}"),
            Err(SessionError::Handshake(_)) => {
                assert!(
                    report.devices.latch_steps().is_empty(),
                    "seed {seed}: door ran despite a failed exchange"
                );
            },
            Err(other) => panic!("seed {seed}: unexpected error {other}"),
        }
    }
}

#[test]
fn latch_failure_surfaces_instead_of_running_open_loop() {
    let (result, report) = LockWorld::new()
        .stored(b"54321")
        .failing_latch()
        .run(b"5432154321", |session| session.open_door());

    // The panel's view of the exchange is complete; the fault is the
    // vault's to report.
    assert_eq!(result.unwrap(), AccessState::Granted);
    assert!(matches!(report.vault, Some(Err(VaultError::Actuator(_)))));
    assert!(report.devices.latch_steps().is_empty());
}
