//! Fixed-point arithmetic shared by `UF32`/`UF64`/`SF32`/`SF64` (spec §4.2).
//!
//! Every fixed-point value is stored on the wire as a single big-endian word whose upper half
//! is the integer part and whose lower half is the fractional part (`frac / 2^frac_bits`).
//! Negative signed values are the two's-complement of the (always non-negative) magnitude word,
//! which is exactly equivalent to negating the integer half and complementing the fractional
//! half (spec §4.2's "fixed-point arithmetic contract"), but is simpler to compute over the
//! whole word.
//!
//! Decimal string conversion never round-trips through a binary float: digits after the decimal
//! point are scaled by exact integer arithmetic so that values representable exactly in the
//! type's fractional width survive a `to_string`/`from_string` round trip (spec §9, Open
//! Question on `UF64` rounding — this crate truncates rather than rounds, consistently in both
//! directions).

use crate::error::{Error, ErrorKind};
use crate::types::AtomType;

/// Parameters describing one fixed-point type's bit layout.
#[derive(Clone, Copy)]
pub struct FixedSpec {
    pub total_bits: u32,
    pub frac_bits: u32,
    pub signed: bool,
    pub frac_digits: usize,
}

impl FixedSpec {
    pub const UF32: FixedSpec = FixedSpec { total_bits: 32, frac_bits: 16, signed: false, frac_digits: 4 };
    pub const UF64: FixedSpec = FixedSpec { total_bits: 64, frac_bits: 32, signed: false, frac_digits: 9 };
    pub const SF32: FixedSpec = FixedSpec { total_bits: 32, frac_bits: 16, signed: true, frac_digits: 4 };
    pub const SF64: FixedSpec = FixedSpec { total_bits: 64, frac_bits: 32, signed: true, frac_digits: 9 };

    fn mask(&self) -> u128 {
        if self.total_bits >= 128 {
            u128::MAX
        } else {
            (1u128 << self.total_bits) - 1
        }
    }
}

/// Renders a fixed-point raw word (as stored on the wire, zero-extended into a `u64`) to its
/// canonical decimal string.
pub fn fixed_to_string(spec: FixedSpec, raw: u64) -> String {
    let word = raw as u128 & spec.mask();
    let sign_bit = spec.signed && word >> (spec.total_bits - 1) != 0;
    let magnitude = if sign_bit { word.wrapping_neg() & spec.mask() } else { word };

    let int_part = magnitude >> spec.frac_bits;
    let frac_mask = (1u128 << spec.frac_bits) - 1;
    let frac_raw = magnitude & frac_mask;

    let scale = 10u128.pow(spec.frac_digits as u32);
    let frac_decimal = (frac_raw * scale) >> spec.frac_bits;

    format!(
        "{}{}.{:0width$}",
        if sign_bit { "-" } else { "" },
        int_part,
        frac_decimal,
        width = spec.frac_digits
    )
}

/// Parses a canonical fixed-point decimal string into its raw wire word.
pub fn fixed_from_string(spec: FixedSpec, ty: AtomType, s: &str) -> crate::Result<u64> {
    let invalid = || {
        Error::new(
            ErrorKind::StrInvalid(ty, s.to_owned()),
            format!("Invalid fixed-point literal for {ty}: {s}"),
        )
    };

    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if negative && !spec.signed {
        return Err(invalid());
    }

    let mut parts = rest.splitn(2, '.');
    let int_str = parts.next().ok_or_else(invalid)?;
    let frac_str = parts.next().unwrap_or("");
    if int_str.is_empty() || !int_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !frac_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let int_part: u128 = int_str.parse().map_err(|_| invalid())?;
    let int_bits = spec.total_bits - spec.frac_bits;

    let frac_raw: u128 = if frac_str.is_empty() {
        0
    } else {
        let numerator: u128 = frac_str.parse().map_err(|_| invalid())?;
        let denom = 10u128.pow(frac_str.len() as u32);
        (numerator << spec.frac_bits) / denom
    };

    // The signed integer half only has `int_bits - 1` magnitude bits plus a sign bit; the one
    // extra negative extreme (e.g. -32768.0000 for a 16-bit signed half) is representable only
    // when the fraction is exactly zero, since it maps to the two's-complement minimum.
    if spec.signed {
        let limit = 1u128 << (int_bits - 1);
        let max_allowed = if negative && frac_raw == 0 { limit } else { limit - 1 };
        if int_part > max_allowed {
            return Err(Error::new(
                ErrorKind::Range(ty, s.to_owned()),
                format!("Integer part out of range for {ty}: {s}"),
            ));
        }
    } else {
        let limit = 1u128 << int_bits;
        if int_part >= limit {
            return Err(Error::new(
                ErrorKind::Range(ty, s.to_owned()),
                format!("Integer part out of range for {ty}: {s}"),
            ));
        }
    }

    let magnitude = (int_part << spec.frac_bits) | frac_raw;
    let word = if negative { magnitude.wrapping_neg() & spec.mask() } else { magnitude };

    Ok(word as u64)
}

/// Converts a fixed-point raw word to the nearest `f64`, for use by the path engine's numeric
/// coercion (spec §4.8).
pub fn fixed_to_f64(spec: FixedSpec, raw: u64) -> f64 {
    let word = raw as u128 & spec.mask();
    let sign_bit = spec.signed && word >> (spec.total_bits - 1) != 0;
    let magnitude = if sign_bit { word.wrapping_neg() & spec.mask() } else { word };
    let value = magnitude as f64 / (1u128 << spec.frac_bits) as f64;
    if sign_bit { -value } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uf32_positive_fraction() {
        let raw = u32::from_be_bytes([0x00, 0x01, 0x80, 0x00]) as u64;
        assert_eq!(fixed_to_string(FixedSpec::UF32, raw), "1.5000");
        assert_eq!(fixed_from_string(FixedSpec::UF32, AtomType::UF32, "1.5000").unwrap(), raw);
    }

    #[test]
    fn sf64_negative_fraction() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFE, 0x80, 0x00, 0x00, 0x00];
        let raw = u64::from_be_bytes(bytes);
        assert_eq!(fixed_to_string(FixedSpec::SF64, raw), "-1.500000000");
        assert_eq!(fixed_from_string(FixedSpec::SF64, AtomType::SF64, "-1.500000000").unwrap(), raw);
    }

    #[test]
    fn sf32_negative_integer_and_fraction() {
        // -32752.6250
        let s = "-32752.6250";
        let raw = fixed_from_string(FixedSpec::SF32, AtomType::SF32, s).unwrap();
        assert_eq!(fixed_to_string(FixedSpec::SF32, raw), s);
    }

    #[test]
    fn unsigned_rejects_negative() {
        assert!(fixed_from_string(FixedSpec::UF32, AtomType::UF32, "-1.0").is_err());
    }

    #[test]
    fn out_of_range_integer_part_errors() {
        assert!(fixed_from_string(FixedSpec::UF32, AtomType::UF32, "99999999999.0").is_err());
    }

    #[test]
    fn signed_rejects_integer_part_beyond_positive_range() {
        // 40000 overflows SF32's 16-bit signed integer half (max +32767); it must not silently
        // wrap around into a negative word.
        assert!(fixed_from_string(FixedSpec::SF32, AtomType::SF32, "40000.0").is_err());
    }

    #[test]
    fn signed_accepts_exact_negative_extreme() {
        // -32768.0000 is exactly representable as the two's-complement minimum.
        let raw = fixed_from_string(FixedSpec::SF32, AtomType::SF32, "-32768.0000").unwrap();
        assert_eq!(fixed_to_string(FixedSpec::SF32, raw), "-32768.0000");
    }

    #[test]
    fn signed_rejects_negative_extreme_with_fraction() {
        // -32768.0001 has no representable two's-complement word (the sign-magnitude extreme
        // only exists at a zero fraction).
        assert!(fixed_from_string(FixedSpec::SF32, AtomType::SF32, "-32768.0001").is_err());
    }

    #[test]
    fn signed_rejects_positive_integer_part_at_negative_extreme() {
        // +32768.0000 is out of range even though -32768.0000 is valid.
        assert!(fixed_from_string(FixedSpec::SF32, AtomType::SF32, "32768.0000").is_err());
    }
}
