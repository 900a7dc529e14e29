//! The native (Rust-level) decoded representation of an atom's data, spanning every ADE type
//! (spec §4.2, §4.7's "value is one of: …").

use crate::name::AtomName;

/// A decoded or to-be-encoded native value for a single (non-container) ADE type.
///
/// This is the "native" side of `Codec::decode`/`Codec::encode` (spec §4.2). Containers have no
/// `AtomValue` — their payload is their children.
#[derive(Clone, Debug, PartialEq)]
pub enum AtomValue {
    /// `UI01`
    Bool(bool),
    /// `UI08`
    U8(u8),
    /// `UI16`
    U16(u16),
    /// `UI32`
    U32(u32),
    /// `UI64`
    U64(u64),
    /// `SI08`
    I8(i8),
    /// `SI16`
    I16(i16),
    /// `SI32`
    I32(i32),
    /// `SI64`
    I64(i64),
    /// `FP32`
    F32(f32),
    /// `FP64`
    F64(f64),
    /// `UF32`: raw 32-bit wire word (16.16 unsigned fixed point).
    UFixed32(u32),
    /// `UF64`: raw 64-bit wire word (32.32 unsigned fixed point).
    UFixed64(u64),
    /// `SF32`: raw 32-bit wire word (16.16 two's-complement fixed point).
    SFixed32(u32),
    /// `SF64`: raw 64-bit wire word (32.32 two's-complement fixed point).
    SFixed64(u64),
    /// `UR32`: numerator/denominator, each 16 bits.
    URational32(u16, u16),
    /// `UR64`: numerator/denominator, each 32 bits.
    URational64(u32, u32),
    /// `SR32`: numerator/denominator, each 16 bits.
    SRational32(i16, i16),
    /// `SR64`: numerator/denominator, each 32 bits.
    SRational64(i32, i32),
    /// `FC32`
    FourCC(AtomName),
    /// `IP32`: one or more IPv4 addresses.
    Ip32(Vec<[u8; 4]>),
    /// `IPAD`: printable IPv4/IPv6 address text.
    IpAddr(String),
    /// `UUID`
    Uuid([u8; 16]),
    /// `CSTR`: already UTF-8 safe; invalid source bytes are represented as literal `\xHH`
    /// tokens (spec §4.2).
    CStr(String),
    /// `USTR`: UTF-32BE code points re-encoded as a UTF-8 `String`.
    UStr(String),
    /// `DATA`/`CNCT`/`Cnct`: opaque bytes.
    Data(Vec<u8>),
    /// `ENUM`
    Enum(i32),
    /// `NULL`: no payload.
    Null,
}

impl AtomValue {
    /// Constructs from an unsigned integer, picking the narrowest lossless width's counterpart
    /// is the caller's job — this always produces a `U64`. Convenience for generic callers (spec
    /// §4.7 "unsigned int (8/16/32/64)").
    pub fn from_u64(v: u64) -> Self {
        AtomValue::U64(v)
    }

    /// Constructs from a signed integer. See [`AtomValue::from_u64`].
    pub fn from_i64(v: i64) -> Self {
        AtomValue::I64(v)
    }

    /// Returns the `U64` payload, widening other unsigned-integer variants.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            AtomValue::Bool(b) => Some(b as u64),
            AtomValue::U8(v) => Some(v as u64),
            AtomValue::U16(v) => Some(v as u64),
            AtomValue::U32(v) => Some(v as u64),
            AtomValue::U64(v) => Some(v),
            AtomValue::Enum(v) if v >= 0 => Some(v as u64),
            _ => None,
        }
    }

    /// Returns the `I64` payload, widening other signed-integer variants.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            AtomValue::I8(v) => Some(v as i64),
            AtomValue::I16(v) => Some(v as i64),
            AtomValue::I32(v) => Some(v as i64),
            AtomValue::I64(v) => Some(v),
            AtomValue::Enum(v) => Some(v as i64),
            _ => None,
        }
    }

    /// Returns the float payload, widening `F32`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            AtomValue::F32(v) => Some(v as f64),
            AtomValue::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the string payload for string-like types.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AtomValue::CStr(s) | AtomValue::UStr(s) | AtomValue::IpAddr(s) => Some(s),
            _ => None,
        }
    }
}
