//! Feed arbitrary bytes into the back-side command receiver.
//!
//! The receiver must never panic and must never deliver a command unless
//! the byte stream actually formed a valid exchange.

#![no_main]

use std::time::{Duration, Instant};

use latchkey_core::{CommandReceiver, ReceiverAction, ReceiverConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let now = Instant::now();
    let config = ReceiverConfig {
        opcode_timeout: Some(Duration::from_secs(1)),
        payload_timeout: Duration::from_secs(1),
    };

    let mut receiver = CommandReceiver::new(config, now);
    if receiver.begin(now).is_err() {
        return;
    }

    for &byte in data {
        match receiver.on_byte(byte, now) {
            Ok(actions) => {
                let delivered =
                    actions.iter().any(|action| matches!(action, ReceiverAction::Deliver(_)));
                if delivered {
                    receiver = CommandReceiver::new(config, now);
                    if receiver.begin(now).is_err() {
                        return;
                    }
                }
            },
            Err(_) => return,
        }
    }
});
