//! Binary framing for atom trees (spec §4.3, §6.1).
//!
//! Every atom is `size(u32 BE) | name(4 bytes) | type(4 bytes) | data`, where `size` is the
//! total encoded length including the 12 byte header. A `CONT` atom's `data` region is empty on
//! the wire; its children are encoded back to back immediately after the header and their sizes
//! sum to `size - 12`.
//!
//! The architecture note describes decoding as a LIFO stack of open containers that cascade-pop
//! when a child's end offset reaches its parent's declared end. A recursive descent over a byte
//! cursor is the equivalent single-threaded formulation: each recursive call is one open
//! container, and returning from it is the pop.

use byteorder::{BigEndian, ByteOrder};

use crate::atom::Atom;
use crate::error::{Error, ErrorKind};
use crate::name::AtomName;
use crate::types::AtomType;

const HEADER_LEN: usize = 12;

/// Encodes `atom` and appends the bytes to `out`.
pub fn encode_atom(atom: &Atom, out: &mut Vec<u8>) {
    let size = encoded_len(atom) as u32;
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(&atom.name.0);
    out.extend_from_slice(&atom.ty.code());
    if atom.ty.is_container() {
        for child in &atom.children {
            encode_atom(child, out);
        }
    } else {
        out.extend_from_slice(&atom.data);
    }
}

/// Returns the total encoded length of `atom`, including its header.
pub fn encoded_len(atom: &Atom) -> usize {
    if atom.ty.is_container() {
        HEADER_LEN + atom.children.iter().map(encoded_len).sum::<usize>()
    } else {
        HEADER_LEN + atom.data.len()
    }
}

/// Decodes one atom starting at `bytes[0]`, returning it and the number of bytes consumed.
/// Fails with `BinaryFrame` on truncated input or a declared size that doesn't fit.
pub fn decode_atom(bytes: &[u8]) -> crate::Result<(Atom, usize)> {
    if bytes.len() < HEADER_LEN {
        return Err(frame_err(format!(
            "truncated atom header: need {HEADER_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    let size = BigEndian::read_u32(&bytes[0..4]) as usize;
    let name = AtomName::from(<[u8; 4]>::try_from(&bytes[4..8]).unwrap());
    let ty = AtomType::from_code(&bytes[8..12])?;

    if size < HEADER_LEN {
        return Err(frame_err(format!("declared size {size} is shorter than the {HEADER_LEN} byte header")));
    }
    if size > bytes.len() {
        return Err(frame_err(format!("declared size {size} exceeds the {} bytes available", bytes.len())));
    }

    let body = &bytes[HEADER_LEN..size];
    let atom = if ty.is_container() {
        let mut children = Vec::new();
        let mut pos = 0;
        while pos < body.len() {
            let (child, consumed) = decode_atom(&body[pos..])?;
            children.push(child);
            pos += consumed;
        }
        if pos != body.len() {
            return Err(frame_err(format!(
                "container {name} children consumed {pos} bytes but {} were declared",
                body.len()
            )));
        }
        Atom { name, ty, data: Vec::new(), children }
    } else {
        if let Some(width) = ty.fixed_width() {
            if body.len() != width {
                return Err(frame_err(format!(
                    "atom {name} of type {ty} has {} data bytes, expected {width}",
                    body.len()
                )));
            }
        }
        Atom { name, ty, data: body.to_vec(), children: Vec::new() }
    };

    Ok((atom, size))
}

/// Decodes a sequence of sibling atoms occupying the entirety of `bytes`.
pub fn decode_all(bytes: &[u8]) -> crate::Result<Vec<Atom>> {
    let mut roots = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let (atom, consumed) = decode_atom(&bytes[pos..])?;
        roots.push(atom);
        pos += consumed;
    }
    Ok(roots)
}

fn frame_err(msg: String) -> Error {
    Error::new(ErrorKind::BinaryFrame(msg.clone()), msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::AtomValue;

    #[test]
    fn leaf_round_trip() {
        let atom = Atom::new_leaf(AtomName::from_str_exact("BVER"), AtomType::UI32, &AtomValue::U32(7)).unwrap();
        let mut bytes = Vec::new();
        encode_atom(&atom, &mut bytes);
        assert_eq!(bytes.len(), 16);
        let (decoded, consumed) = decode_atom(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded.data, atom.data);
    }

    #[test]
    fn container_round_trip() {
        let child = Atom::new_leaf(AtomName::from_str_exact("NEXT"), AtomType::UI32, &AtomValue::U32(1)).unwrap();
        let root = Atom::new_container(AtomName::from_str_exact("BID0"), vec![child]);
        let mut bytes = Vec::new();
        encode_atom(&root, &mut bytes);
        let (decoded, consumed) = decode_atom(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded.children.len(), 1);
        assert_eq!(decoded.children[0].name.render(), "NEXT");
    }

    #[test]
    fn truncated_header_errors() {
        assert!(decode_atom(&[0, 0, 0, 12, 0, 0]).is_err());
    }

    #[test]
    fn oversized_declared_length_errors() {
        let mut bytes = vec![0, 0, 0, 99];
        bytes.extend_from_slice(b"BVER");
        bytes.extend_from_slice(b"UI32");
        bytes.extend_from_slice(&[0, 0, 0, 1]);
        assert!(decode_atom(&bytes).is_err());
    }
}
