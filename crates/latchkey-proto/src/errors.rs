//! Protocol error taxonomy.

use thiserror::Error;

/// Errors from decoding wire bytes or constructing protocol values.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Byte is not in the shared opcode table.
    #[error("unknown opcode byte {byte:#04x}")]
    UnknownOpcode {
        /// The offending wire byte.
        byte: u8,
    },

    /// A framing byte appeared as a credential symbol.
    #[error("reserved framing byte {symbol:#04x} used as credential symbol")]
    ReservedSymbol {
        /// The offending symbol.
        symbol: u8,
    },

    /// Credential field closed at the wrong length.
    #[error("credential field holds {len} symbols, expected 5")]
    WrongLength {
        /// Symbols seen before the terminator.
        len: usize,
    },

    /// More symbols arrived than a credential field can hold.
    #[error("credential field overflow: more than 5 symbols before terminator")]
    Overflow,
}
