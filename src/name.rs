use std::convert::TryFrom;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::error::{Error, ErrorKind};

/// A 4 byte atom identifier.
///
/// Rendered as 4 printable ASCII characters when every byte is printable per the FC32 rule
/// (`0x20..=0x7E`, excluding the single quote `0x27`); otherwise rendered as `0x` followed by
/// 8 uppercase hex digits. See spec §3 and §6.2.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AtomName(pub [u8; 4]);

impl AtomName {
    /// Wraps 4 raw bytes as a name.
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Creates a name from a 4 byte ASCII string slice. Panics if `s` is not 4 bytes; intended
    /// for compile-time-checked literals (`AtomName::from_str_exact("BVER")`).
    pub fn from_str_exact(s: &str) -> Self {
        let bytes = s.as_bytes();
        assert_eq!(bytes.len(), 4, "atom name must be exactly 4 bytes");
        Self([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Returns whether every byte of the name is printable per the FC32 rule: in
    /// `0x20..=0x7E`, excluding `0x27` (single quote).
    pub fn is_printable(&self) -> bool {
        self.0.iter().all(|&b| (0x20..=0x7E).contains(&b) && b != 0x27)
    }

    /// Renders the name as either 4 printable ASCII characters, or `0x` + 8 uppercase hex
    /// digits when any byte is non-printable.
    pub fn render(&self) -> String {
        if self.is_printable() {
            // SAFETY: all 4 bytes were just checked to be in 0x20..=0x7E.
            String::from_utf8(self.0.to_vec()).unwrap_or_else(|_| self.render_hex())
        } else {
            self.render_hex()
        }
    }

    fn render_hex(&self) -> String {
        format!(
            "0x{:02X}{:02X}{:02X}{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }

    /// Parses a rendered name: either a bare 4 character token, or `0x` followed by 8 hex
    /// digits (case-insensitive).
    pub fn parse(s: &str) -> crate::Result<Self> {
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            if hex.len() != 8 {
                return Err(Error::new(
                    ErrorKind::InvalidName(hex.len()),
                    format!("Name hex literal must be 8 digits: {s}"),
                ));
            }
            let mut bytes = [0u8; 4];
            for i in 0..4 {
                bytes[i] = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| {
                    Error::new(
                        ErrorKind::InvalidName(hex.len()),
                        format!("Invalid hex name literal: {s}"),
                    )
                })?;
            }
            Ok(Self(bytes))
        } else {
            let bytes = s.as_bytes();
            if bytes.len() != 4 {
                return Err(Error::new(
                    ErrorKind::InvalidName(bytes.len()),
                    format!("Name must be exactly 4 bytes: {s}"),
                ));
            }
            Ok(Self([bytes[0], bytes[1], bytes[2], bytes[3]]))
        }
    }

    /// Interprets the name's 4 bytes as a big-endian `u32`, per §4.7 `NameAsUint32`.
    pub fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl Deref for AtomName {
    type Target = [u8; 4];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for AtomName {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl TryFrom<&[u8]> for AtomName {
    type Error = Error;

    fn try_from(value: &[u8]) -> crate::Result<Self> {
        if value.len() != 4 {
            return Err(Error::new(
                ErrorKind::InvalidName(value.len()),
                format!("Atom name must be exactly 4 bytes, got {}", value.len()),
            ));
        }
        Ok(Self([value[0], value[1], value[2], value[3]]))
    }
}

impl From<[u8; 4]> for AtomName {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for AtomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtomName({})", self.render())
    }
}

impl fmt::Display for AtomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_renders_ascii() {
        let n = AtomName(*b"BID0");
        assert!(n.is_printable());
        assert_eq!(n.render(), "BID0");
    }

    #[test]
    fn non_printable_renders_hex() {
        let n = AtomName([0x00, 0x00, 0x00, 0x01]);
        assert!(!n.is_printable());
        assert_eq!(n.render(), "0x00000001");
    }

    #[test]
    fn single_quote_forces_hex() {
        let n = AtomName(*b"A'BC");
        assert!(!n.is_printable());
        assert_eq!(n.render(), format!("0x{:08X}", n.as_u32()));
    }

    #[test]
    fn parse_round_trips_ascii() {
        let n = AtomName::parse("BVER").unwrap();
        assert_eq!(n.render(), "BVER");
    }

    #[test]
    fn parse_round_trips_hex() {
        let n = AtomName::parse("0x00000001").unwrap();
        assert_eq!(n, AtomName([0, 0, 0, 1]));
    }

    #[test]
    fn as_u32_is_big_endian() {
        let n = AtomName([0, 0, 0, 1]);
        assert_eq!(n.as_u32(), 1);
    }
}
