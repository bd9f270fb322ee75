//! Wire schema for the Latchkey lock protocol.
//!
//! The panel (front node) and the vault (back node) exchange single command
//! bytes and raw credential fields over a half-duplex serial byte link. This
//! crate is the single source of truth for that encoding: the opcode table,
//! the ready sentinel, and the credential framing rules. Both nodes consume
//! these types, so the two independently built binaries can never drift on
//! the numeric values.
//!
//! There is deliberately no structured payload format here. The link carries
//! exactly one opcode byte per exchange, optionally followed by a
//! terminator-delimited 5-symbol credential field.

pub mod command;
pub mod credential;
pub mod errors;
pub mod opcodes;

pub use command::{Command, Verdict};
pub use credential::{
    CREDENTIAL_LEN, Credential, CredentialAssembler, FIELD_TERMINATOR, STRING_TERMINATOR, WIRE_LEN,
};
pub use errors::ProtocolError;
pub use opcodes::{Opcode, READY};
