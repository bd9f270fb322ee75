//! Credential representation and wire framing.
//!
//! A credential is exactly [`CREDENTIAL_LEN`] input symbols. On the wire it
//! is the symbols followed by the field terminator `#`; receivers read until
//! the terminator. The NUL string terminator is a local storage convention
//! only and never crosses the link.

use std::fmt;

use crate::errors::ProtocolError;

/// Number of symbols in a credential. Fixed contract constant.
pub const CREDENTIAL_LEN: usize = 5;

/// End-of-field marker appended after the last symbol on the wire.
pub const FIELD_TERMINATOR: u8 = b'#';

/// Local end-of-string marker. Reserved so it can never appear as a symbol.
pub const STRING_TERMINATOR: u8 = 0x00;

/// Length of the credential field on the wire: symbols plus terminator.
pub const WIRE_LEN: usize = CREDENTIAL_LEN + 1;

/// A complete, validated 5-symbol credential.
///
/// Construction enforces that no symbol collides with the framing bytes, so
/// a `Credential` value can always be transmitted and stored verbatim.
/// `Debug` is redacted: credentials never leak into logs.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Credential([u8; CREDENTIAL_LEN]);

impl Credential {
    /// Build a credential from exactly [`CREDENTIAL_LEN`] symbols.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ReservedSymbol`] if any symbol is the field
    /// or string terminator.
    pub fn new(symbols: [u8; CREDENTIAL_LEN]) -> Result<Self, ProtocolError> {
        for &symbol in &symbols {
            if is_reserved_symbol(symbol) {
                return Err(ProtocolError::ReservedSymbol { symbol });
            }
        }
        Ok(Self(symbols))
    }

    /// Build a credential from a slice.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::WrongLength`] unless the slice holds exactly
    /// [`CREDENTIAL_LEN`] bytes, or [`ProtocolError::ReservedSymbol`] for a
    /// framing-byte collision.
    pub fn from_slice(symbols: &[u8]) -> Result<Self, ProtocolError> {
        let fixed: [u8; CREDENTIAL_LEN] = symbols
            .try_into()
            .map_err(|_| ProtocolError::WrongLength { len: symbols.len() })?;
        Self::new(fixed)
    }

    /// The raw symbols.
    #[must_use]
    pub fn symbols(&self) -> &[u8; CREDENTIAL_LEN] {
        &self.0
    }

    /// Serialize for transport: symbols followed by the field terminator.
    #[must_use]
    pub fn to_wire(&self) -> [u8; WIRE_LEN] {
        let mut wire = [FIELD_TERMINATOR; WIRE_LEN];
        wire[..CREDENTIAL_LEN].copy_from_slice(&self.0);
        wire
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(*****)")
    }
}

/// True for bytes that can never appear as a credential symbol.
#[must_use]
pub fn is_reserved_symbol(byte: u8) -> bool {
    byte == FIELD_TERMINATOR || byte == STRING_TERMINATOR
}

/// Incremental decoder for a credential field arriving byte-by-byte.
///
/// Feed received bytes with [`CredentialAssembler::push`]; the assembler
/// yields the completed credential when the field terminator arrives. It
/// enforces the exact-length invariant: no partial or oversized field is
/// ever accepted.
#[derive(Debug, Default)]
pub struct CredentialAssembler {
    buf: [u8; CREDENTIAL_LEN],
    len: usize,
}

impl CredentialAssembler {
    /// Create an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of symbols received so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no symbols have been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consume one received byte.
    ///
    /// Returns `Ok(Some(credential))` when the field terminator completes a
    /// 5-symbol field, `Ok(None)` while the field is still open.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::WrongLength`] if the terminator arrives before 5
    ///   symbols were received.
    /// - [`ProtocolError::Overflow`] if a sixth symbol arrives before the
    ///   terminator.
    /// - [`ProtocolError::ReservedSymbol`] if a NUL byte arrives inside the
    ///   field.
    pub fn push(&mut self, byte: u8) -> Result<Option<Credential>, ProtocolError> {
        if byte == FIELD_TERMINATOR {
            if self.len != CREDENTIAL_LEN {
                return Err(ProtocolError::WrongLength { len: self.len });
            }
            let credential = Credential::new(self.buf)?;
            self.len = 0;
            return Ok(Some(credential));
        }
        if byte == STRING_TERMINATOR {
            return Err(ProtocolError::ReservedSymbol { symbol: byte });
        }
        if self.len == CREDENTIAL_LEN {
            return Err(ProtocolError::Overflow);
        }
        self.buf[self.len] = byte;
        self.len += 1;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn wire_form_appends_terminator() {
        let credential = Credential::from_slice(b"54321").unwrap();
        assert_eq!(credential.to_wire(), *b"54321#");
    }

    #[test]
    fn rejects_reserved_symbols() {
        assert_eq!(
            Credential::from_slice(b"12#45"),
            Err(ProtocolError::ReservedSymbol { symbol: b'#' })
        );
        assert_eq!(
            Credential::from_slice(&[b'1', b'2', 0, b'4', b'5']),
            Err(ProtocolError::ReservedSymbol { symbol: 0 })
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(Credential::from_slice(b"1234"), Err(ProtocolError::WrongLength { len: 4 }));
        assert_eq!(Credential::from_slice(b"123456"), Err(ProtocolError::WrongLength { len: 6 }));
    }

    #[test]
    fn debug_is_redacted() {
        let credential = Credential::from_slice(b"54321").unwrap();
        assert_eq!(format!("{credential:?}"), "Credential(*****)");
    }

    #[test]
    fn assembler_accepts_exact_field() {
        let mut assembler = CredentialAssembler::new();
        for &byte in b"54321" {
            assert_eq!(assembler.push(byte), Ok(None));
        }
        let credential = assembler.push(FIELD_TERMINATOR).unwrap();
        assert_eq!(credential, Some(Credential::from_slice(b"54321").unwrap()));
    }

    #[test]
    fn assembler_rejects_short_field() {
        let mut assembler = CredentialAssembler::new();
        for &byte in b"543" {
            assert_eq!(assembler.push(byte), Ok(None));
        }
        assert_eq!(assembler.push(FIELD_TERMINATOR), Err(ProtocolError::WrongLength { len: 3 }));
    }

    #[test]
    fn assembler_rejects_oversized_field() {
        let mut assembler = CredentialAssembler::new();
        for &byte in b"54321" {
            assert_eq!(assembler.push(byte), Ok(None));
        }
        assert_eq!(assembler.push(b'9'), Err(ProtocolError::Overflow));
    }

    proptest! {
        #[test]
        fn assembler_round_trips_valid_fields(
            symbols in proptest::array::uniform5(
                (1u8..=255).prop_filter("not terminator", |b| *b != FIELD_TERMINATOR)
            )
        ) {
            let credential = Credential::new(symbols).unwrap();
            let mut assembler = CredentialAssembler::new();
            let mut decoded = None;
            for byte in credential.to_wire() {
                decoded = assembler.push(byte).unwrap();
            }
            prop_assert_eq!(decoded, Some(credential));
        }

        #[test]
        fn assembler_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
            let mut assembler = CredentialAssembler::new();
            for byte in bytes {
                if assembler.push(byte).is_err() {
                    break;
                }
            }
        }
    }
}
