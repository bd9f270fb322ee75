//! Persistent credential store abstraction.
//!
//! The canonical credential lives in byte-addressable storage that survives
//! power cycles, at a fixed base offset with one byte per symbol position.
//! The vault is the single reader and writer; implementations own any
//! device-specific settle delay between byte operations.
//!
//! Store failures are never swallowed: a failed byte read or write aborts
//! the surrounding operation so the node fails closed rather than acting on
//! a credential that may not be what it thinks it is.

use latchkey_proto::{CREDENTIAL_LEN, Credential};

use crate::error::StoreError;

/// Fixed base offset of the credential bytes in the store.
pub const CREDENTIAL_BASE: u64 = 0x0311;

/// Byte-addressable persistent storage for the canonical credential.
pub trait CredentialStore: Send {
    /// Read one byte at the given offset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ReadFailed`] on a device failure.
    fn read_byte(&mut self, offset: u64) -> Result<u8, StoreError>;

    /// Write one byte at the given offset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriteFailed`] on a device failure.
    fn write_byte(&mut self, offset: u64, byte: u8) -> Result<(), StoreError>;

    /// Read the stored credential bytes from the fixed layout.
    ///
    /// Returns raw bytes rather than a [`Credential`]: an unprovisioned
    /// store holds NUL bytes, which are not valid symbols and therefore can
    /// never match a submitted credential.
    ///
    /// # Errors
    ///
    /// Propagates the first failed byte read.
    fn load_credential(&mut self) -> Result<[u8; CREDENTIAL_LEN], StoreError> {
        let mut bytes = [0u8; CREDENTIAL_LEN];
        for (position, slot) in bytes.iter_mut().enumerate() {
            *slot = self.read_byte(CREDENTIAL_BASE + position as u64)?;
        }
        Ok(bytes)
    }

    /// Write the credential bytes to the fixed layout, one byte per
    /// position.
    ///
    /// There is no rollback: a failure partway leaves earlier positions
    /// written. Callers must treat the error as "stored credential state
    /// unknown" and surface it.
    ///
    /// # Errors
    ///
    /// Propagates the first failed byte write.
    fn store_credential(&mut self, credential: &Credential) -> Result<(), StoreError> {
        for (position, &byte) in credential.symbols().iter().enumerate() {
            self.write_byte(CREDENTIAL_BASE + position as u64, byte)?;
        }
        Ok(())
    }
}

impl<S: CredentialStore + ?Sized> CredentialStore for &mut S {
    fn read_byte(&mut self, offset: u64) -> Result<u8, StoreError> {
        (**self).read_byte(offset)
    }

    fn write_byte(&mut self, offset: u64, byte: u8) -> Result<(), StoreError> {
        (**self).write_byte(offset, byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ArrayStore {
        bytes: Vec<u8>,
    }

    impl CredentialStore for ArrayStore {
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

    #[test]
    fn credential_round_trips_through_fixed_layout() {
        let mut store = ArrayStore { bytes: vec![0; 1024] };
        let credential = Credential::from_slice(b"54321").unwrap();

        store.store_credential(&credential).unwrap();
        assert_eq!(store.load_credential().unwrap(), *b"54321");
        assert_eq!(&store.bytes[CREDENTIAL_BASE as usize..CREDENTIAL_BASE as usize + 5], b"54321");
    }

    #[test]
    fn unprovisioned_store_reads_nul_bytes() {
        let mut store = ArrayStore { bytes: vec![0; 1024] };
        assert_eq!(store.load_credential().unwrap(), [0; CREDENTIAL_LEN]);
    }
}
