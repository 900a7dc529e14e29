//! Shared delimited-string escaping/parsing (spec §4.2 "Delimited string parsing").
//!
//! The delimited text form of string-like types wraps content in double quotes (or, for
//! printable-form `FC32`, single quotes) and escapes control bytes, backslashes, and the quote
//! character itself as `\n \r \\ \" \xHH`.

use crate::error::{Error, ErrorKind};

/// Escapes `raw` for embedding inside a `quote`-delimited string.
pub fn escape_for_delimiter(raw: &str, quote: char) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Wraps `raw` in `quote` characters, escaping its content first.
pub fn delimit(raw: &str, quote: char) -> String {
    format!("{quote}{}{quote}", escape_for_delimiter(raw, quote))
}

/// Parses a `quote`-delimited string starting and ending with `quote`, unescaping `\\ \" \n \r
/// \xHH`. Returns the unescaped content. Fails on an unterminated string, a lone trailing `\`,
/// an unescaped raw control byte or quote inside the content, or missing surrounding quotes.
pub fn undelimit(s: &str, quote: char) -> crate::Result<String> {
    let mut chars = s.chars();
    if chars.next() != Some(quote) {
        return Err(Error::new(
            ErrorKind::Undelimited(s.to_owned()),
            format!("Expected opening {quote}: {s}"),
        ));
    }

    let mut out = String::with_capacity(s.len());
    let rest: Vec<char> = chars.collect();
    let mut i = 0;
    let mut closed = false;
    while i < rest.len() {
        let c = rest[i];
        match c {
            '\\' => {
                i += 1;
                let esc = *rest.get(i).ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidEscape(s.to_owned()),
                        format!("Trailing escape at end of input: {s}"),
                    )
                })?;
                match esc {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    '\'' => out.push('\''),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    'x' => {
                        let hex: String = rest.get(i + 1..i + 3).map(|s| s.iter().collect()).ok_or_else(|| {
                            Error::new(
                                ErrorKind::InvalidEscape(s.to_owned()),
                                format!("Truncated \\x escape: {s}"),
                            )
                        })?;
                        let byte = u8::from_str_radix(&hex, 16).map_err(|_| {
                            Error::new(
                                ErrorKind::InvalidEscape(s.to_owned()),
                                format!("Invalid \\x escape: {s}"),
                            )
                        })?;
                        out.push(byte as char);
                        i += 2;
                    }
                    _ => {
                        return Err(Error::new(
                            ErrorKind::InvalidEscape(s.to_owned()),
                            format!("Unknown escape \\{esc}: {s}"),
                        ));
                    }
                }
                i += 1;
            }
            c if c == quote => {
                closed = true;
                i += 1;
                break;
            }
            c if (c as u32) < 0x20 => {
                return Err(Error::new(
                    ErrorKind::Unescaped(s.to_owned()),
                    format!("Unescaped control byte inside delimited string: {s}"),
                ));
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    if !closed {
        return Err(Error::new(
            ErrorKind::Undelimited(s.to_owned()),
            format!("Unterminated delimited string: {s}"),
        ));
    }
    if i != rest.len() {
        return Err(Error::new(
            ErrorKind::Unescaped(s.to_owned()),
            format!("Trailing data after closing {quote}: {s}"),
        ));
    }

    Ok(out)
}

/// Substitutes the literal 4-character token `\xHH` for every byte that is not part of a valid
/// UTF-8 sequence, so the result is always valid UTF-8. Used by `CSTR` decode (spec §4.2).
pub fn bytes_to_escaped_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(e) => {
                let (valid, after_valid) = rest.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap());
                let bad_byte = after_valid[0];
                out.push_str(&format!("\\x{bad_byte:02X}"));
                rest = &after_valid[1..];
            }
        }
    }
    out
}

/// Reverses [`bytes_to_escaped_utf8`]: every `\xHH` token becomes the single raw byte `HH`,
/// everything else is encoded as UTF-8.
pub fn escaped_utf8_to_bytes(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && bytes.get(i + 1) == Some(&b'x')
            && i + 3 < bytes.len()
            && bytes[i + 2].is_ascii_hexdigit()
            && bytes[i + 3].is_ascii_hexdigit()
        {
            let hex = std::str::from_utf8(&bytes[i + 2..i + 4]).unwrap();
            out.push(u8::from_str_radix(hex, 16).unwrap());
            i += 4;
        } else {
            // Copy one UTF-8 encoded char verbatim.
            let rest = std::str::from_utf8(&bytes[i..]).unwrap_or("");
            let ch_len = rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            out.extend_from_slice(&bytes[i..i + ch_len]);
            i += ch_len;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_round_trip_basic() {
        let raw = "hi \"there\"\n\\x";
        let d = delimit(raw, '"');
        assert_eq!(undelimit(&d, '"').unwrap(), raw);
    }

    #[test]
    fn undelimit_rejects_missing_quotes() {
        assert!(undelimit("abc", '"').is_err());
    }

    #[test]
    fn undelimit_rejects_trailing_backslash() {
        assert!(undelimit("\"abc\\", '"').is_err());
    }

    #[test]
    fn undelimit_rejects_unescaped_control() {
        assert!(undelimit("\"a\nb\"", '"').is_err());
    }

    #[test]
    fn invalid_utf8_round_trips_through_escape() {
        let bytes = [0xFFu8, 0x00];
        let s = bytes_to_escaped_utf8(&bytes[..1]);
        assert_eq!(s, "\\xFF");
        assert_eq!(escaped_utf8_to_bytes(&s), vec![0xFF]);
    }
}
