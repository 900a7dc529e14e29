//! A library for reading and writing ADE AtomContainer binary/text containers, and for
//! selecting subtrees with an XPath-like path query language.
//!
//! A container is a tree of [`Atom`]s: each atom has a 4 byte [`AtomName`], an [`AtomType`],
//! raw wire `data`, and (for `CONT` atoms) `children`. [`AtomTree`] is the top-level handle for
//! marshaling to and from binary and [`text`]'s ContainerText, and [`path::select`] runs path
//! queries over a decoded tree.

mod atom;
mod binary;
mod codec;
mod error;
mod fixed;
mod name;
mod path;
mod text;
mod text_escape;
mod types;
mod value;

pub use atom::{Atom, AtomTree};
pub use error::{Error, ErrorKind, Result};
pub use name::AtomName;
pub use path::select as select_path;
pub use types::AtomType;
pub use value::AtomValue;

pub use codec::{decode, encode, from_string, from_string_delimited, to_string, to_string_delimited};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_binary_to_text() {
        let hex = "0000004442494430434F4E5400000010425645525549333200000001000000144254494D55493634000546592CD6DB2C000000144E45585455493634DDDDF0000C000000";
        let bytes = decode_hex(hex);
        let tree = AtomTree::unmarshal_binary(&bytes).unwrap();
        let text = tree.marshal_text();
        assert_eq!(
            text,
            "BID0:CONT:\n\tBVER:UI32:1\n\tBTIM:UI64:1484723701865260\n\tNEXT:UI64:15987198135227121664\nEND\n"
        );

        let reparsed = AtomTree::unmarshal_text(&text).unwrap();
        assert_eq!(reparsed, tree);
        assert_eq!(tree.marshal_binary(), bytes);
    }

    #[test]
    fn path_selection_over_decoded_tree() {
        let hex = "0000004442494430434F4E5400000010425645525549333200000001000000144254494D55493634000546592CD6DB2C000000144E45585455493634DDDDF0000C000000";
        let bytes = decode_hex(hex);
        let tree = AtomTree::unmarshal_binary(&bytes).unwrap();
        let result = select_path(tree.roots(), "/BID0/BVER").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].value().unwrap(), AtomValue::U32(1));
    }

    fn decode_hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }
}
