//! Fault-injecting link wrapper.
//!
//! Wraps any link and silently drops selected outgoing bytes, simulating a
//! glitched line the far side never sees. Drops are either scripted by send
//! index, for pinpoint scenarios like losing a single ready byte, or drawn
//! from a seeded RNG so randomized soaks replay byte for byte.

use std::collections::HashSet;
use std::time::Duration;

use latchkey_core::{LinkError, WireLink};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Link wrapper that drops outgoing bytes.
#[derive(Debug)]
pub struct FaultLink<L> {
    inner: L,
    scripted: HashSet<u64>,
    rng: Option<(ChaCha8Rng, f64)>,
    sent: u64,
}

impl<L: WireLink> FaultLink<L> {
    /// Wrap a link with no faults configured.
    pub fn new(inner: L) -> Self {
        Self { inner, scripted: HashSet::new(), rng: None, sent: 0 }
    }

    /// Drop the outgoing byte with the given send index (0-based).
    #[must_use]
    pub fn drop_send(mut self, index: u64) -> Self {
        self.scripted.insert(index);
        self
    }

    /// Drop each outgoing byte with probability `rate`, deterministically
    /// from `seed`.
    #[must_use]
    pub fn drop_rate(mut self, rate: f64, seed: u64) -> Self {
        self.rng = Some((ChaCha8Rng::seed_from_u64(seed), rate));
        self
    }

    /// Bytes handed to `send` so far, dropped ones included.
    #[must_use]
    pub fn sent(&self) -> u64 {
        self.sent
    }

    fn should_drop(&mut self) -> bool {
        if self.scripted.contains(&self.sent) {
            return true;
        }
        match &mut self.rng {
            Some((rng, rate)) => rng.gen_bool(*rate),
            None => false,
        }
    }
}

impl<L: WireLink> WireLink for FaultLink<L> {
    fn send(&mut self, byte: u8) -> Result<(), LinkError> {
        let drop_it = self.should_drop();
        let index = self.sent;
        self.sent += 1;
        if drop_it {
            tracing::debug!(byte, index, "fault link dropped byte");
            return Ok(());
        }
        self.inner.send(byte)
    }

    fn recv(&mut self) -> Result<u8, LinkError> {
        self.inner.recv()
    }

    fn recv_deadline(&mut self, timeout: Duration) -> Result<u8, LinkError> {
        self.inner.recv_deadline(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::MemoryLink;

    #[test]
    fn scripted_drop_removes_exactly_one_byte() {
        let (a, mut b) = MemoryLink::pair();
        let mut faulty = FaultLink::new(a).drop_send(1);

        faulty.send_all(&[0x10, 0x20, 0x30]).unwrap();
        assert_eq!(b.recv().unwrap(), 0x10);
        assert_eq!(b.recv().unwrap(), 0x30);
        assert_eq!(faulty.sent(), 3);
    }

    #[test]
    fn zero_rate_drops_nothing() {
        let (a, mut b) = MemoryLink::pair();
        let mut faulty = FaultLink::new(a).drop_rate(0.0, 7);

        faulty.send_all(b"54321#").unwrap();
        for &expected in b"54321#" {
            assert_eq!(b.recv().unwrap(), expected);
        }
    }

    #[test]
    fn same_seed_drops_the_same_bytes() {
        let survivors = |seed: u64| {
            let (a, mut b) = MemoryLink::pair();
            let mut faulty = FaultLink::new(a).drop_rate(0.5, seed);
            faulty.send_all(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
            drop(faulty);
            let mut seen = Vec::new();
            while let Ok(byte) = b.recv() {
                seen.push(byte);
            }
            seen
        };

        assert_eq!(survivors(42), survivors(42));
    }
}
