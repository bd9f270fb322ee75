//! Opcode table shared by both nodes.
//!
//! Every command exchange starts with exactly one of these bytes. The values
//! must match bit-for-bit between the panel and vault builds, which is why
//! they live here rather than as per-node constants.

use crate::errors::ProtocolError;

/// Sentinel byte emitted by the vault to signal it is prepared to receive
/// the next command or payload.
///
/// Distinct from every [`Opcode`] value. The panel never sends it.
pub const READY: u8 = 0x10;

/// Single-byte command identifiers.
///
/// Direction and payload rules:
///
/// | Opcode | Direction | Payload |
/// |---|---|---|
/// | `CorrectPassword` | vault→panel | none |
/// | `WrongPassword` | vault→panel | none |
/// | `OpenDoor` | panel→vault | none |
/// | `FireBuzzer` | panel→vault | none |
/// | `ChangePassword` | panel→vault | credential |
/// | `CheckPassword` | panel→vault | credential |
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Submitted credential matched the stored one.
    CorrectPassword = 0x01,
    /// Submitted credential did not match the stored one.
    WrongPassword = 0x02,
    /// Run the door open/hold/close actuator sequence.
    OpenDoor = 0x03,
    /// Sound the alarm for the lockout interval.
    FireBuzzer = 0x04,
    /// Overwrite the stored credential with the payload.
    ChangePassword = 0x05,
    /// Compare the payload against the stored credential.
    CheckPassword = 0x06,
}

impl Opcode {
    /// Decode a wire byte into an opcode.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownOpcode`] for any byte outside the
    /// table, including [`READY`].
    pub fn from_byte(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            0x01 => Ok(Self::CorrectPassword),
            0x02 => Ok(Self::WrongPassword),
            0x03 => Ok(Self::OpenDoor),
            0x04 => Ok(Self::FireBuzzer),
            0x05 => Ok(Self::ChangePassword),
            0x06 => Ok(Self::CheckPassword),
            _ => Err(ProtocolError::UnknownOpcode { byte }),
        }
    }

    /// Wire encoding of this opcode.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// True for opcodes sent panel→vault to request an action.
    #[must_use]
    pub fn is_request(self) -> bool {
        matches!(
            self,
            Self::OpenDoor | Self::FireBuzzer | Self::ChangePassword | Self::CheckPassword
        )
    }

    /// True for opcodes sent vault→panel as a verification status.
    #[must_use]
    pub fn is_status(self) -> bool {
        matches!(self, Self::CorrectPassword | Self::WrongPassword)
    }

    /// True if this opcode is followed by a credential field on the wire.
    #[must_use]
    pub fn carries_credential(self) -> bool {
        matches!(self, Self::ChangePassword | Self::CheckPassword)
    }
}
