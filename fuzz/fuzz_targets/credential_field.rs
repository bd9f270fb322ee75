//! Feed arbitrary bytes into the credential field decoder.
//!
//! The assembler must never panic, and any field it completes must be a
//! valid 5-symbol credential that re-frames to a terminated wire field.

#![no_main]

use latchkey_proto::{CredentialAssembler, FIELD_TERMINATOR, WIRE_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut assembler = CredentialAssembler::new();
    for &byte in data {
        match assembler.push(byte) {
            Ok(Some(credential)) => {
                let wire = credential.to_wire();
                assert_eq!(wire.len(), WIRE_LEN);
                assert_eq!(wire[WIRE_LEN - 1], FIELD_TERMINATOR);
            },
            Ok(None) => {},
            Err(_) => break,
        }
    }
});
