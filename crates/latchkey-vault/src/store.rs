//! File-backed credential store.
//!
//! A byte-addressable stand-in for an EEPROM part: a fixed-size backing
//! file addressed one byte at a time, with a configurable settle delay
//! after each operation standing in for the device's write cycle. No
//! checksum, no versioning; the layout is the fixed contract from the
//! shared schema.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Duration;

use latchkey_core::{Clock, CredentialStore, StoreError};

/// Size of the backing image. Covers the fixed credential offset with room
/// to spare.
const IMAGE_SIZE: u64 = 1024;

/// Byte-addressable persistent store over a backing file.
#[derive(Debug)]
pub struct FileStore<C> {
    file: File,
    clock: C,
    settle: Duration,
}

impl<C: Clock> FileStore<C> {
    /// Open or create the backing file, zero-filled to the image size.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriteFailed`] if the file cannot be opened or
    /// sized.
    pub fn open(path: &Path, clock: C, settle: Duration) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|err| StoreError::WriteFailed { offset: 0, message: err.to_string() })?;
        let len = file
            .metadata()
            .map_err(|err| StoreError::WriteFailed { offset: 0, message: err.to_string() })?
            .len();
        if len < IMAGE_SIZE {
            file.set_len(IMAGE_SIZE)
                .map_err(|err| StoreError::WriteFailed { offset: 0, message: err.to_string() })?;
        }
        Ok(Self { file, clock, settle })
    }

    fn settle(&self) {
        if !self.settle.is_zero() {
            self.clock.sleep(self.settle);
        }
    }
}

impl<C: Clock + Send> CredentialStore for FileStore<C> {
    fn read_byte(&mut self, offset: u64) -> Result<u8, StoreError> {
        let read = || -> std::io::Result<u8> {
            self.file.seek(SeekFrom::Start(offset))?;
            let mut buf = [0u8; 1];
            self.file.read_exact(&mut buf)?;
            Ok(buf[0])
        };
        let byte =
            read().map_err(|err| StoreError::ReadFailed { offset, message: err.to_string() })?;
        self.settle();
        Ok(byte)
    }

    fn write_byte(&mut self, offset: u64, byte: u8) -> Result<(), StoreError> {
        let write = || -> std::io::Result<()> {
            self.file.seek(SeekFrom::Start(offset))?;
            self.file.write_all(&[byte])?;
            self.file.flush()
        };
        write().map_err(|err| StoreError::WriteFailed { offset, message: err.to_string() })?;
        self.settle();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use latchkey_core::{CREDENTIAL_BASE, SystemClock};
    use latchkey_proto::Credential;

    use super::*;

    #[test]
    fn bytes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");

        {
            let mut store =
                FileStore::open(&path, SystemClock::new(), Duration::ZERO).unwrap();
            let credential = Credential::from_slice(b"54321").unwrap();
            store.store_credential(&credential).unwrap();
        }

        let mut store = FileStore::open(&path, SystemClock::new(), Duration::ZERO).unwrap();
        assert_eq!(store.load_credential().unwrap(), *b"54321");
    }

    #[test]
    fn fresh_image_reads_nul_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");

        let mut store = FileStore::open(&path, SystemClock::new(), Duration::ZERO).unwrap();
        assert_eq!(store.load_credential().unwrap(), [0u8; 5]);
        assert_eq!(store.read_byte(CREDENTIAL_BASE).unwrap(), 0);
    }

    #[test]
    fn single_byte_addressing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");

        let mut store = FileStore::open(&path, SystemClock::new(), Duration::ZERO).unwrap();
        store.write_byte(CREDENTIAL_BASE + 2, b'9').unwrap();
        assert_eq!(store.read_byte(CREDENTIAL_BASE + 2).unwrap(), b'9');
        assert_eq!(store.read_byte(CREDENTIAL_BASE + 1).unwrap(), 0);
    }
}
