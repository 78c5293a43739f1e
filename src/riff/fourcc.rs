//! Four-character codes
//!
//! Chunk identifiers, container tags and form types are all 4-byte values.
//! They are stored in file order, so `b"RIFF"` reads back as `"RIFF"`.

use std::fmt;
use std::str::FromStr;

/// A 4-byte chunk or container identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FourCc([u8; 4]);

impl FourCc {
    /// "RIFF" container tag
    pub const RIFF: FourCc = FourCc(*b"RIFF");
    /// "LIST" chunk id
    pub const LIST: FourCc = FourCc(*b"LIST");

    /// Create a code from its bytes in file order
    pub const fn new(bytes: [u8; 4]) -> Self {
        FourCc(bytes)
    }

    /// Build from a little-endian packed value (first character in the low byte)
    pub const fn from_u32_le(value: u32) -> Self {
        FourCc(value.to_le_bytes())
    }

    /// Packed little-endian value, first character in the low byte
    pub const fn as_u32_le(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for FourCc {
    fn from(bytes: [u8; 4]) -> Self {
        FourCc(bytes)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

/// Error returned when text cannot be turned into a [`FourCc`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid four-character code '{0}': expected 1 to 4 ASCII characters")]
pub struct ParseFourCcError(pub String);

impl FromStr for FourCc {
    type Err = ParseFourCcError;

    /// Shorter codes are padded with spaces, so `"fmt"` parses as `"fmt "`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 4 || !s.is_ascii() {
            return Err(ParseFourCcError(s.to_string()));
        }
        let mut bytes = [b' '; 4];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Ok(FourCc(bytes))
    }
}
