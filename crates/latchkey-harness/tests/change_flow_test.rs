//! Credential lifecycle scenarios: enrollment, change, confirmation.

use latchkey_core::AccessState;
use latchkey_harness::LockWorld;
use latchkey_panel::Notice;

#[test]
fn enrolled_credential_round_trips_through_verification() {
    let mut keys = Vec::new();
    keys.extend_from_slice(b"5432154321"); // enroll: entry + confirmation
    keys.extend_from_slice(b"5432154321"); // verify for the door request

    let (result, report) = LockWorld::new().run(&keys, |session| {
        session.enroll()?;
        session.open_door()
    });

    assert_eq!(result.unwrap(), AccessState::Granted);
    assert_eq!(report.vault, Some(Ok(())));
    assert_eq!(report.store.stored_bytes(), *b"54321");
}

#[test]
fn change_requires_the_current_credential_then_commits_the_new_one() {
    let mut keys = Vec::new();
    keys.extend_from_slice(b"5432154321"); // verify the old credential
    keys.extend_from_slice(b"9876598765"); // new credential: entry + confirmation
    keys.extend_from_slice(b"9876598765"); // verify the new one for the door

    let (result, report) = LockWorld::new().stored(b"54321").run(&keys, |session| {
        let change = session.change_password()?;
        let door = session.open_door()?;
        Ok::<_, latchkey_panel::SessionError>((change, door))
    });

    let (change, door) = result.unwrap();
    assert_eq!(change, AccessState::Granted);
    assert_eq!(door, AccessState::Granted);
    assert_eq!(report.store.stored_bytes(), *b"98765");
    assert_eq!(report.devices.latch_steps().len(), 4);
}

#[test]
fn lockout_blocks_the_change_and_keeps_the_old_credential() {
    let mut keys = Vec::new();
    keys.extend_from_slice(b"1111111111");
    keys.extend_from_slice(b"2222222222");
    keys.extend_from_slice(b"3333333333");

    let (result, report) =
        LockWorld::new().stored(b"54321").run(&keys, |session| session.change_password());

    assert_eq!(result.unwrap(), AccessState::Lockout);
    assert_eq!(report.store.stored_bytes(), *b"54321");
    assert!(!report.devices.alarm_switches().is_empty());
}

#[test]
fn unconfirmed_entries_never_reach_the_vault() {
    let mut keys = Vec::new();
    keys.extend_from_slice(b"1234554321"); // entry and confirmation disagree
    keys.extend_from_slice(b"5432154321"); // retry agrees

    let (result, report) =
        LockWorld::new().stored(b"54321").run(&keys, |session| session.open_door());

    assert_eq!(result.unwrap(), AccessState::Granted);
    assert!(report.panel.saw(Notice::NotConfirmed));
    // Exactly one submission crossed the link: the confirmed one.
    assert_eq!(report.panel.count(Notice::Processing), 1);
}

#[test]
fn repeated_verification_is_idempotent() {
    let mut keys = Vec::new();
    keys.extend_from_slice(b"5432154321");
    keys.extend_from_slice(b"5432154321");

    let (result, report) = LockWorld::new().stored(b"54321").run(&keys, |session| {
        let first = session.open_door()?;
        let second = session.open_door()?;
        Ok::<_, latchkey_panel::SessionError>((first, second))
    });

    let (first, second) = result.unwrap();
    assert_eq!(first, AccessState::Granted);
    assert_eq!(second, AccessState::Granted);
    assert_eq!(report.panel.count(Notice::CorrectPassword), 2);
    assert_eq!(report.devices.latch_steps().len(), 8);
}
