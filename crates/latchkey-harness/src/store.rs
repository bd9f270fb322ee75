//! Shared in-memory credential store with fault injection.
//!
//! Byte-addressable like the real device, but held behind a shared handle
//! so a scenario can keep inspecting the image while the vault thread owns
//! its clone. Read and write failures can be injected per offset to test
//! the fail-closed paths.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use latchkey_core::{CREDENTIAL_BASE, CredentialStore, StoreError};
use latchkey_proto::CREDENTIAL_LEN;

const IMAGE_SIZE: usize = 1024;

#[derive(Debug)]
struct Inner {
    bytes: [u8; IMAGE_SIZE],
    fail_read_at: Option<u64>,
    fail_write_at: Option<u64>,
}

/// In-memory store. Clones share one image.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a zero-filled, unprovisioned store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                bytes: [0; IMAGE_SIZE],
                fail_read_at: None,
                fail_write_at: None,
            })),
        }
    }

    /// Create a store already holding the given credential bytes.
    #[must_use]
    pub fn holding(credential: &[u8; CREDENTIAL_LEN]) -> Self {
        let store = Self::new();
        store.lock().bytes[CREDENTIAL_BASE as usize..CREDENTIAL_BASE as usize + CREDENTIAL_LEN]
            .copy_from_slice(credential);
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail every read of the given offset.
    pub fn fail_read_at(&self, offset: u64) {
        self.lock().fail_read_at = Some(offset);
    }

    /// Fail every write of the given offset.
    pub fn fail_write_at(&self, offset: u64) {
        self.lock().fail_write_at = Some(offset);
    }

    /// The raw credential bytes in the image, bypassing fault injection.
    #[must_use]
    pub fn stored_bytes(&self) -> [u8; CREDENTIAL_LEN] {
        let inner = self.lock();
        let mut bytes = [0u8; CREDENTIAL_LEN];
        bytes.copy_from_slice(
            &inner.bytes[CREDENTIAL_BASE as usize..CREDENTIAL_BASE as usize + CREDENTIAL_LEN],
        );
        bytes
    }
}

impl CredentialStore for MemoryStore {
    fn read_byte(&mut self, offset: u64) -> Result<u8, StoreError> {
        let inner = self.lock();
        if inner.fail_read_at == Some(offset) {
            return Err(StoreError::ReadFailed { offset, message: "injected fault".to_owned() });
        }
        inner
            .bytes
            .get(offset as usize)
            .copied()
            .ok_or_else(|| StoreError::ReadFailed { offset, message: "out of range".to_owned() })
    }

    fn write_byte(&mut self, offset: u64, byte: u8) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.fail_write_at == Some(offset) {
            return Err(StoreError::WriteFailed { offset, message: "injected fault".to_owned() });
        }
        match inner.bytes.get_mut(offset as usize) {
            Some(slot) => {
                *slot = byte;
                Ok(())
            },
            None => Err(StoreError::WriteFailed { offset, message: "out of range".to_owned() }),
        }
    }
}
