//! Per-type encode/decode and text conversion (spec §4.2). This is the largest subsystem: every
//! ADE type gets a `decode`/`encode` pair (bytes ↔ native) and a `to_string`/`from_string` pair
//! (native ↔ undelimited text), plus `to_string_delimited`/`from_string_delimited` for the
//! quoted text forms used inside ContainerText (spec §4.6).

use std::convert::TryInto;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, ErrorKind};
use crate::fixed::{self, FixedSpec};
use crate::name::AtomName;
use crate::text_escape;
use crate::types::AtomType;
use crate::value::AtomValue;

use AtomType::*;

fn byte_count_err(ty: AtomType, expected: usize, got: usize) -> Error {
    Error::new(
        ErrorKind::ByteCount(ty, expected, got),
        format!("{ty} expects {expected} bytes, got {got}"),
    )
}

fn range_err(ty: AtomType, what: impl Into<String>) -> Error {
    let what = what.into();
    Error::new(ErrorKind::Range(ty, what.clone()), format!("{ty} value out of range: {what}"))
}

fn str_invalid_err(ty: AtomType, text: &str) -> Error {
    Error::new(
        ErrorKind::StrInvalid(ty, text.to_owned()),
        format!("Invalid {ty} text: {text}"),
    )
}

/// Decodes `bytes` as `ty`, producing the native value. Fails with `ByteCount` if the length
/// doesn't match the type's constraints, or `Range` if a value like `UI01` carries an
/// out-of-domain payload.
pub fn decode(ty: AtomType, bytes: &[u8]) -> crate::Result<AtomValue> {
    if let Some(width) = ty.fixed_width() {
        if !ty.is_container() && bytes.len() != width {
            return Err(byte_count_err(ty, width, bytes.len()));
        }
    }

    match ty {
        UI01 => {
            let v = BigEndian::read_u32(bytes);
            match v {
                0 => Ok(AtomValue::Bool(false)),
                1 => Ok(AtomValue::Bool(true)),
                _ => Err(range_err(ty, v.to_string())),
            }
        }
        UI08 => Ok(AtomValue::U8(bytes[0])),
        UI16 => Ok(AtomValue::U16(BigEndian::read_u16(bytes))),
        UI32 => Ok(AtomValue::U32(BigEndian::read_u32(bytes))),
        UI64 => Ok(AtomValue::U64(BigEndian::read_u64(bytes))),
        SI08 => Ok(AtomValue::I8(bytes[0] as i8)),
        SI16 => Ok(AtomValue::I16(BigEndian::read_i16(bytes))),
        SI32 => Ok(AtomValue::I32(BigEndian::read_i32(bytes))),
        SI64 => Ok(AtomValue::I64(BigEndian::read_i64(bytes))),
        FP32 => {
            let v = BigEndian::read_f32(bytes);
            if !v.is_finite() {
                return Err(range_err(ty, "NaN/Inf is not encodable".to_owned()));
            }
            Ok(AtomValue::F32(v))
        }
        FP64 => {
            let v = BigEndian::read_f64(bytes);
            if !v.is_finite() {
                return Err(range_err(ty, "NaN/Inf is not encodable".to_owned()));
            }
            Ok(AtomValue::F64(v))
        }
        UF32 => Ok(AtomValue::UFixed32(BigEndian::read_u32(bytes))),
        UF64 => Ok(AtomValue::UFixed64(BigEndian::read_u64(bytes))),
        SF32 => Ok(AtomValue::SFixed32(BigEndian::read_u32(bytes))),
        SF64 => Ok(AtomValue::SFixed64(BigEndian::read_u64(bytes))),
        UR32 => Ok(AtomValue::URational32(BigEndian::read_u16(&bytes[0..2]), BigEndian::read_u16(&bytes[2..4]))),
        UR64 => Ok(AtomValue::URational64(BigEndian::read_u32(&bytes[0..4]), BigEndian::read_u32(&bytes[4..8]))),
        SR32 => {
            let den = BigEndian::read_i16(&bytes[2..4]);
            if den == 0 {
                return Err(Error::new(ErrorKind::ZeroDenominator(ty), "SR32 denominator is 0".to_owned()));
            }
            Ok(AtomValue::SRational32(BigEndian::read_i16(&bytes[0..2]), den))
        }
        SR64 => {
            let den = BigEndian::read_i32(&bytes[4..8]);
            if den == 0 {
                return Err(Error::new(ErrorKind::ZeroDenominator(ty), "SR64 denominator is 0".to_owned()));
            }
            Ok(AtomValue::SRational64(BigEndian::read_i32(&bytes[0..4]), den))
        }
        FC32 => Ok(AtomValue::FourCC(AtomName::new(bytes.try_into().unwrap()))),
        IP32 => {
            if bytes.is_empty() || bytes.len() % 4 != 0 {
                return Err(byte_count_err(ty, 4, bytes.len()));
            }
            let addrs = bytes.chunks_exact(4).map(|c| [c[0], c[1], c[2], c[3]]).collect();
            Ok(AtomValue::Ip32(addrs))
        }
        IPAD => {
            let text = decode_null_terminated_utf8(ty, bytes)?;
            Ok(AtomValue::IpAddr(text))
        }
        UUID => {
            let mut b = [0u8; 16];
            b.copy_from_slice(bytes);
            Ok(AtomValue::Uuid(b))
        }
        CSTR => {
            let raw = decode_cstr_bytes(ty, bytes)?;
            Ok(AtomValue::CStr(text_escape::bytes_to_escaped_utf8(raw)))
        }
        USTR => {
            if bytes.len() % 4 != 0 {
                return Err(byte_count_err(ty, 4, bytes.len()));
            }
            let mut s = String::new();
            for chunk in bytes.chunks_exact(4) {
                let cp = BigEndian::read_u32(chunk);
                let c = char::from_u32(cp).ok_or_else(|| range_err(ty, format!("invalid code point {cp:#X}")))?;
                s.push(c);
            }
            Ok(AtomValue::UStr(s))
        }
        DATA | CNCT | Cnct => Ok(AtomValue::Data(bytes.to_vec())),
        ENUM => Ok(AtomValue::Enum(BigEndian::read_i32(bytes))),
        NULL => Ok(AtomValue::Null),
        CONT => Ok(AtomValue::Null),
    }
}

/// Encodes `value` as `ty`'s wire bytes.
pub fn encode(ty: AtomType, value: &AtomValue) -> crate::Result<Vec<u8>> {
    let mut out = Vec::new();
    match (ty, value) {
        (UI01, AtomValue::Bool(b)) => out.extend_from_slice(&(*b as u32).to_be_bytes()),
        (UI08, AtomValue::U8(v)) => out.push(*v),
        (UI16, AtomValue::U16(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (UI32, AtomValue::U32(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (UI64, AtomValue::U64(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (SI08, AtomValue::I8(v)) => out.push(*v as u8),
        (SI16, AtomValue::I16(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (SI32, AtomValue::I32(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (SI64, AtomValue::I64(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (FP32, AtomValue::F32(v)) => {
            if !v.is_finite() {
                return Err(range_err(ty, "NaN/Inf is not encodable".to_owned()));
            }
            out.extend_from_slice(&v.to_be_bytes());
        }
        (FP64, AtomValue::F64(v)) => {
            if !v.is_finite() {
                return Err(range_err(ty, "NaN/Inf is not encodable".to_owned()));
            }
            out.extend_from_slice(&v.to_be_bytes());
        }
        (UF32, AtomValue::UFixed32(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (UF64, AtomValue::UFixed64(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (SF32, AtomValue::SFixed32(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (SF64, AtomValue::SFixed64(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (UR32, AtomValue::URational32(n, d)) => {
            out.extend_from_slice(&n.to_be_bytes());
            out.extend_from_slice(&d.to_be_bytes());
        }
        (UR64, AtomValue::URational64(n, d)) => {
            out.extend_from_slice(&n.to_be_bytes());
            out.extend_from_slice(&d.to_be_bytes());
        }
        (SR32, AtomValue::SRational32(n, d)) => {
            if *d == 0 {
                return Err(Error::new(ErrorKind::ZeroDenominator(ty), "SR32 denominator is 0".to_owned()));
            }
            out.extend_from_slice(&n.to_be_bytes());
            out.extend_from_slice(&d.to_be_bytes());
        }
        (SR64, AtomValue::SRational64(n, d)) => {
            if *d == 0 {
                return Err(Error::new(ErrorKind::ZeroDenominator(ty), "SR64 denominator is 0".to_owned()));
            }
            out.extend_from_slice(&n.to_be_bytes());
            out.extend_from_slice(&d.to_be_bytes());
        }
        (FC32, AtomValue::FourCC(name)) => out.extend_from_slice(&name.0),
        (IP32, AtomValue::Ip32(addrs)) => {
            if addrs.is_empty() {
                return Err(byte_count_err(ty, 4, 0));
            }
            for a in addrs {
                out.extend_from_slice(a);
            }
        }
        (IPAD, AtomValue::IpAddr(s)) => {
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        (UUID, AtomValue::Uuid(b)) => out.extend_from_slice(b),
        (CSTR, AtomValue::CStr(s)) => {
            let raw = text_escape::escaped_utf8_to_bytes(s);
            if raw.contains(&0) {
                return Err(str_invalid_err(ty, s));
            }
            out.extend_from_slice(&raw);
            out.push(0);
        }
        (USTR, AtomValue::UStr(s)) => {
            for c in s.chars() {
                out.extend_from_slice(&(c as u32).to_be_bytes());
            }
        }
        (DATA | CNCT | Cnct, AtomValue::Data(bytes)) => out.extend_from_slice(bytes),
        (ENUM, AtomValue::Enum(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (NULL, AtomValue::Null) => {}
        (CONT, _) => {}
        _ => {
            return Err(Error::new(
                ErrorKind::StrInvalid(ty, format!("{value:?}")),
                format!("Value does not match type {ty}"),
            ));
        }
    }
    Ok(out)
}

fn decode_null_terminated_utf8<'a>(ty: AtomType, bytes: &'a [u8]) -> crate::Result<String> {
    let nul_pos = bytes.iter().position(|&b| b == 0).ok_or_else(|| {
        Error::new(ErrorKind::StrInvalid(ty, String::new()), format!("{ty} missing NUL terminator"))
    })?;
    if nul_pos != bytes.len() - 1 {
        return Err(Error::new(
            ErrorKind::StrInvalid(ty, String::new()),
            format!("{ty} has embedded NUL before terminator"),
        ));
    }
    String::from_utf8(bytes[..nul_pos].to_vec()).map_err(Error::from)
}

fn decode_cstr_bytes(ty: AtomType, bytes: &[u8]) -> crate::Result<&[u8]> {
    let nul_pos = bytes.iter().position(|&b| b == 0).ok_or_else(|| {
        Error::new(ErrorKind::StrInvalid(ty, String::new()), "CSTR missing NUL terminator".to_owned())
    })?;
    if nul_pos != bytes.len() - 1 {
        return Err(Error::new(
            ErrorKind::StrInvalid(ty, String::new()),
            "CSTR has embedded NUL before terminator".to_owned(),
        ));
    }
    Ok(&bytes[..nul_pos])
}

fn fixed_spec_for(ty: AtomType) -> FixedSpec {
    match ty {
        UF32 => FixedSpec::UF32,
        UF64 => FixedSpec::UF64,
        SF32 => FixedSpec::SF32,
        SF64 => FixedSpec::SF64,
        _ => unreachable!(),
    }
}

fn fixed_raw(ty: AtomType, value: &AtomValue) -> crate::Result<u64> {
    match value {
        AtomValue::UFixed32(v) => Ok(*v as u64),
        AtomValue::UFixed64(v) => Ok(*v),
        AtomValue::SFixed32(v) => Ok(*v as u64),
        AtomValue::SFixed64(v) => Ok(*v),
        _ => Err(Error::new(
            ErrorKind::StrInvalid(ty, format!("{value:?}")),
            format!("Value does not match type {ty}"),
        )),
    }
}

fn uuid_to_string(b: &[u8; 16]) -> String {
    format!(
        "{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]
    )
}

fn uuid_from_string(ty: AtomType, s: &str) -> crate::Result<[u8; 16]> {
    let hex: String = s.chars().filter(|&c| c != '-').collect();
    if hex.len() != 32 {
        return Err(str_invalid_err(ty, s));
    }
    let mut out = [0u8; 16];
    for i in 0..16 {
        out[i] = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| str_invalid_err(ty, s))?;
    }
    Ok(out)
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02X}"));
    }
    s
}

fn hex_decode(ty: AtomType, s: &str) -> crate::Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(str_invalid_err(ty, s));
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let byte_str = std::str::from_utf8(&bytes[i..i + 2]).map_err(|_| str_invalid_err(ty, s))?;
        out.push(u8::from_str_radix(byte_str, 16).map_err(|_| str_invalid_err(ty, s))?);
        i += 2;
    }
    Ok(out)
}

/// Prints the C-style `%.N E` scientific notation used by `FP32`/`FP64`: `digits` fractional
/// mantissa digits, uppercase `E`, a signed exponent padded to at least 2 digits.
fn format_scientific(v: f64, digits: usize) -> String {
    if v == 0.0 {
        let sign = if v.is_sign_negative() { "-" } else { "" };
        return format!("{sign}{:.prec$}E+00", 0.0, prec = digits);
    }
    let neg = v < 0.0;
    let mag = v.abs();
    let exp = mag.log10().floor() as i32;
    let mut mantissa = mag / 10f64.powi(exp);
    let mut exp = exp;
    // Guard against log10 rounding pushing the mantissa out of [1, 10).
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exp += 1;
    } else if mantissa < 1.0 {
        mantissa *= 10.0;
        exp -= 1;
    }
    let mantissa_str = format!("{mantissa:.prec$}", prec = digits);
    // Re-check rounding at the requested precision didn't carry into a new leading digit
    // (e.g. 9.999999995 rounding up to 10.000000000).
    let (mantissa_str, exp) = if mantissa_str.starts_with("10.") {
        let trimmed = &mantissa_str[1..];
        let fixed: String = trimmed
            .char_indices()
            .map(|(i, c)| if i == 0 { '1' } else { c })
            .collect();
        (fixed, exp + 1)
    } else {
        (mantissa_str, exp)
    };
    format!("{}{}E{}{:02}", if neg { "-" } else { "" }, mantissa_str, if exp < 0 { "-" } else { "+" }, exp.abs())
}

fn parse_scientific(ty: AtomType, s: &str) -> crate::Result<f64> {
    // Rust's f64::from_str already accepts `1.5E+08`-style input.
    s.parse::<f64>().map_err(|_| str_invalid_err(ty, s))
}

/// Undelimited canonical text form (spec §4.2 `ToString`).
pub fn to_string(ty: AtomType, value: &AtomValue) -> crate::Result<String> {
    Ok(match (ty, value) {
        (UI01, AtomValue::Bool(b)) => if *b { "1" } else { "0" }.to_owned(),
        (UI08, AtomValue::U8(v)) => v.to_string(),
        (UI16, AtomValue::U16(v)) => v.to_string(),
        (UI32, AtomValue::U32(v)) => v.to_string(),
        (UI64, AtomValue::U64(v)) => v.to_string(),
        (SI08, AtomValue::I8(v)) => v.to_string(),
        (SI16, AtomValue::I16(v)) => v.to_string(),
        (SI32, AtomValue::I32(v)) => v.to_string(),
        (SI64, AtomValue::I64(v)) => v.to_string(),
        (FP32, AtomValue::F32(v)) => format_scientific(*v as f64, 8),
        (FP64, AtomValue::F64(v)) => format_scientific(*v, 17),
        (UF32 | UF64 | SF32 | SF64, _) => {
            fixed::fixed_to_string(fixed_spec_for(ty), fixed_raw(ty, value)?)
        }
        (UR32, AtomValue::URational32(n, d)) => format!("{n}/{d}"),
        (UR64, AtomValue::URational64(n, d)) => format!("{n}/{d}"),
        (SR32, AtomValue::SRational32(n, d)) => format!("{n}/{d}"),
        (SR64, AtomValue::SRational64(n, d)) => format!("{n}/{d}"),
        (FC32, AtomValue::FourCC(name)) => name.render(),
        (IP32, AtomValue::Ip32(addrs)) => {
            if addrs.len() == 1 {
                let a = addrs[0];
                format!("{}.{}.{}.{}", a[0], a[1], a[2], a[3])
            } else {
                let flat: Vec<u8> = addrs.iter().flatten().copied().collect();
                format!("0x{}", hex_encode(&flat))
            }
        }
        (IPAD, AtomValue::IpAddr(s)) => s.clone(),
        (UUID, AtomValue::Uuid(b)) => uuid_to_string(b),
        (CSTR, AtomValue::CStr(s)) => s.clone(),
        (USTR, AtomValue::UStr(s)) => s.clone(),
        (DATA | CNCT | Cnct, AtomValue::Data(bytes)) => format!("0x{}", hex_encode(bytes)),
        (ENUM, AtomValue::Enum(v)) => v.to_string(),
        (NULL, AtomValue::Null) => String::new(),
        _ => {
            return Err(Error::new(
                ErrorKind::StrInvalid(ty, format!("{value:?}")),
                format!("Value does not match type {ty}"),
            ));
        }
    })
}

/// Parses `text` as `ty`'s undelimited canonical form (spec §4.2 `FromString`).
pub fn from_string(ty: AtomType, text: &str) -> crate::Result<AtomValue> {
    Ok(match ty {
        UI01 => match text {
            "0" => AtomValue::Bool(false),
            "1" => AtomValue::Bool(true),
            _ => return Err(str_invalid_err(ty, text)),
        },
        UI08 => AtomValue::U8(text.parse().map_err(|_| str_invalid_err(ty, text))?),
        UI16 => AtomValue::U16(text.parse().map_err(|_| str_invalid_err(ty, text))?),
        UI32 => AtomValue::U32(text.parse().map_err(|_| str_invalid_err(ty, text))?),
        UI64 => AtomValue::U64(text.parse().map_err(|_| str_invalid_err(ty, text))?),
        SI08 => AtomValue::I8(text.parse().map_err(|_| str_invalid_err(ty, text))?),
        SI16 => AtomValue::I16(text.parse().map_err(|_| str_invalid_err(ty, text))?),
        SI32 => AtomValue::I32(text.parse().map_err(|_| str_invalid_err(ty, text))?),
        SI64 => AtomValue::I64(text.parse().map_err(|_| str_invalid_err(ty, text))?),
        FP32 => {
            let v = parse_scientific(ty, text)?;
            if !v.is_finite() {
                return Err(range_err(ty, "NaN/Inf is not encodable".to_owned()));
            }
            AtomValue::F32(v as f32)
        }
        FP64 => {
            let v = parse_scientific(ty, text)?;
            if !v.is_finite() {
                return Err(range_err(ty, "NaN/Inf is not encodable".to_owned()));
            }
            AtomValue::F64(v)
        }
        UF32 => AtomValue::UFixed32(fixed::fixed_from_string(FixedSpec::UF32, ty, text)? as u32),
        UF64 => AtomValue::UFixed64(fixed::fixed_from_string(FixedSpec::UF64, ty, text)?),
        SF32 => AtomValue::SFixed32(fixed::fixed_from_string(FixedSpec::SF32, ty, text)? as u32),
        SF64 => AtomValue::SFixed64(fixed::fixed_from_string(FixedSpec::SF64, ty, text)?),
        UR32 => {
            let (n, d) = parse_rational(ty, text)?;
            AtomValue::URational32(to_u16(ty, n)?, to_u16(ty, d)?)
        }
        UR64 => {
            let (n, d) = parse_rational(ty, text)?;
            AtomValue::URational64(to_u32(ty, n)?, to_u32(ty, d)?)
        }
        SR32 => {
            let (n, d) = parse_signed_rational(ty, text)?;
            if d == 0 {
                return Err(Error::new(ErrorKind::ZeroDenominator(ty), "SR32 denominator is 0".to_owned()));
            }
            AtomValue::SRational32(to_i16(ty, n)?, to_i16(ty, d)?)
        }
        SR64 => {
            let (n, d) = parse_signed_rational(ty, text)?;
            if d == 0 {
                return Err(Error::new(ErrorKind::ZeroDenominator(ty), "SR64 denominator is 0".to_owned()));
            }
            AtomValue::SRational64(to_i32(ty, n)?, to_i32(ty, d)?)
        }
        FC32 => AtomValue::FourCC(AtomName::parse(text)?),
        IP32 => {
            if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                let flat = hex_decode(ty, hex)?;
                if flat.is_empty() || flat.len() % 4 != 0 {
                    return Err(str_invalid_err(ty, text));
                }
                AtomValue::Ip32(flat.chunks_exact(4).map(|c| [c[0], c[1], c[2], c[3]]).collect())
            } else {
                let parts: Vec<&str> = text.split('.').collect();
                if parts.len() != 4 {
                    return Err(str_invalid_err(ty, text));
                }
                let mut a = [0u8; 4];
                for (i, p) in parts.iter().enumerate() {
                    a[i] = p.parse().map_err(|_| str_invalid_err(ty, text))?;
                }
                AtomValue::Ip32(vec![a])
            }
        }
        IPAD => AtomValue::IpAddr(text.to_owned()),
        UUID => AtomValue::Uuid(uuid_from_string(ty, text)?),
        CSTR => AtomValue::CStr(text.to_owned()),
        USTR => AtomValue::UStr(text.to_owned()),
        DATA | CNCT | Cnct => {
            let hex = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).ok_or_else(|| str_invalid_err(ty, text))?;
            AtomValue::Data(hex_decode(ty, hex)?)
        }
        ENUM => AtomValue::Enum(text.parse().map_err(|_| str_invalid_err(ty, text))?),
        NULL => AtomValue::Null,
        CONT => AtomValue::Null,
    })
}

/// Narrows a parsed rational half to its wire width, failing with `ErrorKind::Range` rather than
/// silently wrapping when the text named a value the type can't represent.
fn to_u16(ty: AtomType, v: u64) -> crate::Result<u16> {
    v.try_into().map_err(|_| range_err(ty, v.to_string()))
}

fn to_u32(ty: AtomType, v: u64) -> crate::Result<u32> {
    v.try_into().map_err(|_| range_err(ty, v.to_string()))
}

fn to_i16(ty: AtomType, v: i64) -> crate::Result<i16> {
    v.try_into().map_err(|_| range_err(ty, v.to_string()))
}

fn to_i32(ty: AtomType, v: i64) -> crate::Result<i32> {
    v.try_into().map_err(|_| range_err(ty, v.to_string()))
}

fn parse_rational(ty: AtomType, text: &str) -> crate::Result<(u64, u64)> {
    let mut parts = text.splitn(2, '/');
    let n = parts.next().ok_or_else(|| str_invalid_err(ty, text))?;
    let d = parts.next().ok_or_else(|| str_invalid_err(ty, text))?;
    Ok((
        n.parse().map_err(|_| str_invalid_err(ty, text))?,
        d.parse().map_err(|_| str_invalid_err(ty, text))?,
    ))
}

fn parse_signed_rational(ty: AtomType, text: &str) -> crate::Result<(i64, i64)> {
    let mut parts = text.splitn(2, '/');
    let n = parts.next().ok_or_else(|| str_invalid_err(ty, text))?;
    let d = parts.next().ok_or_else(|| str_invalid_err(ty, text))?;
    Ok((
        n.parse().map_err(|_| str_invalid_err(ty, text))?,
        d.parse().map_err(|_| str_invalid_err(ty, text))?,
    ))
}

/// Delimited text form (spec §4.2 `ToStringDelimited`): adds surrounding quotes and escapes for
/// string-like types (`CSTR`,`USTR`,`IPAD`,`UUID` get double quotes; printable-form `FC32` gets
/// single quotes); all other types are identical to the undelimited form.
pub fn to_string_delimited(ty: AtomType, value: &AtomValue) -> crate::Result<String> {
    let plain = to_string(ty, value)?;
    if ty.uses_double_quotes() {
        Ok(text_escape::delimit(&plain, '"'))
    } else if ty == FC32 {
        if let AtomValue::FourCC(name) = value {
            if name.is_printable() {
                return Ok(text_escape::delimit(&plain, '\''));
            }
        }
        Ok(plain)
    } else {
        Ok(plain)
    }
}

/// Parses the delimited text form (spec §4.2 `FromStringDelimited`).
pub fn from_string_delimited(ty: AtomType, text: &str) -> crate::Result<AtomValue> {
    if ty.uses_double_quotes() {
        let inner = text_escape::undelimit(text, '"')?;
        from_string(ty, &inner)
    } else if ty == FC32 && text.starts_with('\'') {
        let inner = text_escape::undelimit(text, '\'')?;
        from_string(ty, &inner)
    } else {
        from_string(ty, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui64_round_trip() {
        let bytes = [0x00, 0x05, 0x46, 0x59, 0x2C, 0xD6, 0xDB, 0x2C];
        let v = decode(UI64, &bytes).unwrap();
        assert_eq!(v, AtomValue::U64(1484723701865260));
        assert_eq!(encode(UI64, &v).unwrap(), bytes);
        assert_eq!(to_string(UI64, &v).unwrap(), "1484723701865260");
        assert_eq!(from_string(UI64, "1484723701865260").unwrap(), v);
    }

    #[test]
    fn fc32_printable_vs_hex() {
        let printable = decode(FC32, &[0x24, 0x23, 0x5C, 0x21]).unwrap();
        assert_eq!(to_string(FC32, &printable).unwrap(), "$#\\!");

        let hex = decode(FC32, &[0x00, 0x00, 0x00, 0x01]).unwrap();
        assert_eq!(to_string(FC32, &hex).unwrap(), "0x00000001");
    }

    #[test]
    fn cstr_invalid_utf8_escapes() {
        let v = decode(CSTR, &[0xFF, 0x00]).unwrap();
        assert_eq!(v, AtomValue::CStr("\\xFF".to_owned()));
        assert_eq!(encode(CSTR, &v).unwrap(), vec![0xFF, 0x00]);
        assert_eq!(to_string_delimited(CSTR, &v).unwrap(), "\"\\xFF\"");
    }

    #[test]
    fn cstr_embedded_nul_errors() {
        assert!(decode(CSTR, &[b'a', 0, b'b']).is_err());
    }

    #[test]
    fn ustr_round_trip() {
        let bytes = [0, 0, 0, 0x41, 0, 0, 0, 0x42];
        let v = decode(USTR, &bytes).unwrap();
        assert_eq!(v, AtomValue::UStr("AB".to_owned()));
        assert_eq!(encode(USTR, &v).unwrap(), bytes);
    }

    #[test]
    fn uuid_round_trip() {
        let bytes: [u8; 16] = [
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF,
        ];
        let v = decode(UUID, &bytes).unwrap();
        let s = to_string(UUID, &v).unwrap();
        assert_eq!(s, "01234567-89AB-CDEF-0123-456789ABCDEF");
        assert_eq!(from_string(UUID, &s).unwrap(), v);
    }

    #[test]
    fn data_round_trip() {
        let bytes = [0xDE, 0xAD, 0xBE, 0xEF];
        let v = decode(DATA, &bytes).unwrap();
        assert_eq!(to_string(DATA, &v).unwrap(), "0xDEADBEEF");
        assert_eq!(from_string(DATA, "0xDEADBEEF").unwrap(), v);
        assert_eq!(encode(DATA, &v).unwrap(), bytes);
    }

    #[test]
    fn ur32_round_trip() {
        let v = AtomValue::URational32(3, 4);
        assert_eq!(to_string(UR32, &v).unwrap(), "3/4");
        assert_eq!(from_string(UR32, "3/4").unwrap(), v);
    }

    #[test]
    fn sr32_zero_denominator_errors() {
        let bytes = [0x00, 0x01, 0x00, 0x00];
        assert!(decode(SR32, &bytes).is_err());
    }

    #[test]
    fn ur32_numerator_out_of_range_errors() {
        // 70000 overflows UR32's 16-bit numerator; it must not silently wrap to 4464.
        assert!(from_string(UR32, "70000/1").is_err());
    }

    #[test]
    fn ur64_denominator_out_of_range_errors() {
        assert!(from_string(UR64, "1/4294967296").is_err());
    }

    #[test]
    fn sr32_numerator_out_of_range_errors() {
        assert!(from_string(SR32, "40000/1").is_err());
    }

    #[test]
    fn sr64_numerator_out_of_range_errors() {
        assert!(from_string(SR64, "4294967296/1").is_err());
    }

    #[test]
    fn ip32_single_is_dotted() {
        let v = decode(IP32, &[192, 168, 1, 1]).unwrap();
        assert_eq!(to_string(IP32, &v).unwrap(), "192.168.1.1");
    }

    #[test]
    fn ip32_multiple_is_hex() {
        let v = decode(IP32, &[192, 168, 1, 1, 10, 0, 0, 1]).unwrap();
        assert_eq!(to_string(IP32, &v).unwrap(), "0xC0A80101 0A000001".replace(' ', ""));
    }

    #[test]
    fn fp32_scientific_format() {
        let v = AtomValue::F32(1.5);
        assert_eq!(to_string(FP32, &v).unwrap(), "1.50000000E+00");
    }

    #[test]
    fn ui01_only_accepts_zero_or_one() {
        assert!(decode(UI01, &[0, 0, 0, 2]).is_err());
    }
}
