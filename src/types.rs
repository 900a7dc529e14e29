use std::convert::TryFrom;
use std::fmt;

use crate::error::{Error, ErrorKind};

/// The closed set of ADE AtomContainer data types (spec §4.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum AtomType {
    /// Boolean stored in 32 bits; only 0 and 1 are valid.
    UI01,
    /// 8-bit unsigned big-endian integer.
    UI08,
    /// 16-bit unsigned big-endian integer.
    UI16,
    /// 32-bit unsigned big-endian integer.
    UI32,
    /// 64-bit unsigned big-endian integer.
    UI64,
    /// 8-bit signed big-endian two's-complement integer.
    SI08,
    /// 16-bit signed big-endian two's-complement integer.
    SI16,
    /// 32-bit signed big-endian two's-complement integer.
    SI32,
    /// 64-bit signed big-endian two's-complement integer.
    SI64,
    /// IEEE-754 32-bit big-endian float.
    FP32,
    /// IEEE-754 64-bit big-endian float.
    FP64,
    /// Unsigned 16.16 fixed-point.
    UF32,
    /// Unsigned 32.32 fixed-point.
    UF64,
    /// Signed fixed-point, 32-bit total width.
    SF32,
    /// Signed fixed-point, 64-bit total width.
    SF64,
    /// Unsigned rational pair, 32-bit total width.
    UR32,
    /// Unsigned rational pair, 64-bit total width.
    UR64,
    /// Signed rational pair, 32-bit total width.
    SR32,
    /// Signed rational pair, 64-bit total width.
    SR64,
    /// Four-character code.
    FC32,
    /// IPv4 address, or repeated run of addresses.
    IP32,
    /// Printable IP address (v4 or v6), null-terminated.
    IPAD,
    /// RFC-style UUID.
    UUID,
    /// C-style null-terminated string.
    CSTR,
    /// UTF-32 big-endian code point sequence.
    USTR,
    /// Opaque byte data.
    DATA,
    /// Opaque byte data (connection-oriented variant).
    CNCT,
    /// Opaque byte data (mixed-case variant seen on the wire).
    Cnct,
    /// 32-bit signed enumerated value.
    ENUM,
    /// No payload.
    NULL,
    /// Container; data is empty, children follow.
    CONT,
}

use AtomType::*;

/// All recognized type codes, used for exhaustive lookup by 4-byte code.
const ALL: &[(AtomType, &[u8; 4])] = &[
    (UI01, b"UI01"),
    (UI08, b"UI08"),
    (UI16, b"UI16"),
    (UI32, b"UI32"),
    (UI64, b"UI64"),
    (SI08, b"SI08"),
    (SI16, b"SI16"),
    (SI32, b"SI32"),
    (SI64, b"SI64"),
    (FP32, b"FP32"),
    (FP64, b"FP64"),
    (UF32, b"UF32"),
    (UF64, b"UF64"),
    (SF32, b"SF32"),
    (SF64, b"SF64"),
    (UR32, b"UR32"),
    (UR64, b"UR64"),
    (SR32, b"SR32"),
    (SR64, b"SR64"),
    (FC32, b"FC32"),
    (IP32, b"IP32"),
    (IPAD, b"IPAD"),
    (UUID, b"UUID"),
    (CSTR, b"CSTR"),
    (USTR, b"USTR"),
    (DATA, b"DATA"),
    (CNCT, b"CNCT"),
    (Cnct, b"Cnct"),
    (ENUM, b"ENUM"),
    (NULL, b"NULL"),
    (CONT, b"CONT"),
];

impl AtomType {
    /// Returns the 4 ASCII bytes used to spell this type code on the wire and in text.
    pub fn code(&self) -> [u8; 4] {
        for (t, code) in ALL {
            if t == self {
                return **code;
            }
        }
        unreachable!("every AtomType variant is listed in ALL")
    }

    /// Parses a 4-byte type code, failing with `ErrorKind::UnknownType` if unrecognized.
    pub fn from_code(code: &[u8]) -> crate::Result<Self> {
        for (t, c) in ALL {
            if c.as_slice() == code {
                return Ok(*t);
            }
        }
        Err(Error::new(
            ErrorKind::UnknownType(String::from_utf8_lossy(code).into_owned()),
            format!("Unknown ADE type code: {}", String::from_utf8_lossy(code)),
        ))
    }

    /// Returns the type's fixed byte width, or `None` for variable-width types
    /// (`CSTR`, `USTR`, `DATA`, `CNCT`, `Cnct`, `IPAD`, `IP32`) and `CONT` (always 0, no
    /// fixed expectation since width is driven by the children).
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            UI01 => Some(4),
            UI08 => Some(1),
            UI16 => Some(2),
            UI32 => Some(4),
            UI64 => Some(8),
            SI08 => Some(1),
            SI16 => Some(2),
            SI32 => Some(4),
            SI64 => Some(8),
            FP32 => Some(4),
            FP64 => Some(8),
            UF32 => Some(4),
            UF64 => Some(8),
            SF32 => Some(4),
            SF64 => Some(8),
            UR32 => Some(4),
            UR64 => Some(8),
            SR32 => Some(4),
            SR64 => Some(8),
            FC32 => Some(4),
            UUID => Some(16),
            ENUM => Some(4),
            NULL => Some(0),
            CONT => Some(0),
            IP32 | IPAD | CSTR | USTR | DATA | CNCT | Cnct => None,
        }
    }

    /// Returns whether this is the container type.
    pub fn is_container(&self) -> bool {
        matches!(self, CONT)
    }

    /// Returns whether this is one of the opaque byte types (`DATA`/`CNCT`/`Cnct`).
    pub fn is_opaque_bytes(&self) -> bool {
        matches!(self, DATA | CNCT | Cnct)
    }

    /// Returns whether the delimited text form uses double quotes (string-like types).
    pub fn uses_double_quotes(&self) -> bool {
        matches!(self, CSTR | USTR | IPAD | UUID)
    }
}

impl TryFrom<[u8; 4]> for AtomType {
    type Error = Error;

    fn try_from(code: [u8; 4]) -> crate::Result<Self> {
        Self::from_code(&code)
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code();
        f.write_str(std::str::from_utf8(&code).unwrap_or("????"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_round_trips_through_code() {
        for (t, code) in ALL {
            assert_eq!(AtomType::from_code(code.as_slice()).unwrap(), *t);
            assert_eq!(&t.code(), *code);
        }
    }

    #[test]
    fn unknown_code_errors() {
        assert!(AtomType::from_code(b"ZZZZ").is_err());
    }

    #[test]
    fn fixed_widths_match_spec_table() {
        assert_eq!(AtomType::UI08.fixed_width(), Some(1));
        assert_eq!(AtomType::UI64.fixed_width(), Some(8));
        assert_eq!(AtomType::UUID.fixed_width(), Some(16));
        assert_eq!(AtomType::CSTR.fixed_width(), None);
        assert_eq!(AtomType::CONT.fixed_width(), Some(0));
    }
}
