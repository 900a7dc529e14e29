//! The in-memory atom tree (spec §3 data model, §4.7 `AtomTree`).

use std::fs;
use std::path::Path;

use crate::binary;
use crate::codec;
use crate::error::{Error, ErrorKind};
use crate::name::AtomName;
use crate::text;
use crate::types::AtomType;
use crate::value::AtomValue;

/// One node of an atom tree: a 4 byte name, a type, raw wire data (empty for containers), and
/// children (empty for leaves).
#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    pub name: AtomName,
    pub ty: AtomType,
    pub data: Vec<u8>,
    pub children: Vec<Atom>,
}

impl Atom {
    /// Constructs a leaf atom of `ty` by encoding `value` (spec §4.7 "Construct(name, type,
    /// value)"). Fails if `value` doesn't match `ty` or falls outside its range.
    pub fn new_leaf(name: AtomName, ty: AtomType, value: &AtomValue) -> crate::Result<Self> {
        if ty.is_container() {
            return Err(Error::new(
                ErrorKind::StrInvalid(ty, "CONT".to_owned()),
                "new_leaf cannot construct a container; use new_container".to_owned(),
            ));
        }
        let data = codec::encode(ty, value)?;
        Ok(Atom { name, ty, data, children: Vec::new() })
    }

    /// Constructs a container atom with the given children.
    pub fn new_container(name: AtomName, children: Vec<Atom>) -> Self {
        Atom { name, ty: AtomType::CONT, data: Vec::new(), children }
    }

    /// `Name()`: the atom's 4 byte name.
    pub fn name(&self) -> AtomName {
        self.name
    }

    /// `NameAsUint32()`: the name's bytes as a big-endian `u32`.
    pub fn name_as_u32(&self) -> u32 {
        self.name.as_u32()
    }

    /// `Type()`: the atom's type.
    pub fn ty(&self) -> AtomType {
        self.ty
    }

    /// `Children()`: the atom's children (empty for leaves).
    pub fn children(&self) -> &[Atom] {
        &self.children
    }

    /// `NumChildren()`: the number of children, or `-1` for non-containers.
    pub fn num_children(&self) -> i64 {
        if self.ty.is_container() {
            self.children.len() as i64
        } else {
            -1
        }
    }

    /// `AddChild()`: appends `child`. Returns `false` (and does not append) if `self` is not a
    /// container.
    pub fn add_child(&mut self, child: Atom) -> bool {
        if !self.ty.is_container() {
            return false;
        }
        self.children.push(child);
        true
    }

    /// Decodes this atom's native value. Returns `Null` for containers.
    pub fn value(&self) -> crate::Result<AtomValue> {
        codec::decode(self.ty, &self.data)
    }

    /// Returns the first direct child named `name`, if any.
    pub fn child(&self, name: &str) -> Option<&Atom> {
        self.children.iter().find(|c| c.name.render() == name)
    }

    /// `Descendants()`: every atom in pre-order starting with `self` (spec §4.7, §9 ordering
    /// guarantees).
    pub fn descendants(&self) -> Vec<&Atom> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.descendants());
        }
        out
    }
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&text::emit_atom_line(self, 0))
    }
}

/// The top-level result of decoding a container: one or more sibling root atoms (spec §4.7's
/// serializer operations, `MarshalBinary`/`UnmarshalBinary`/`MarshalText`/`UnmarshalText`/
/// `FromFile`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AtomTree(pub Vec<Atom>);

impl AtomTree {
    /// Wraps a list of root atoms.
    pub fn new(roots: Vec<Atom>) -> Self {
        AtomTree(roots)
    }

    /// The root atoms, in file order.
    pub fn roots(&self) -> &[Atom] {
        &self.0
    }

    /// `Descendants()` across every root, pre-order, in file order.
    pub fn descendants(&self) -> Vec<&Atom> {
        self.0.iter().flat_map(|root| root.descendants()).collect()
    }

    /// `MarshalBinary`: encodes every root atom back to back.
    pub fn marshal_binary(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for root in &self.0 {
            binary::encode_atom(root, &mut out);
        }
        out
    }

    /// `UnmarshalBinary`: decodes a byte buffer into a sequence of root atoms.
    pub fn unmarshal_binary(bytes: &[u8]) -> crate::Result<Self> {
        Ok(AtomTree(binary::decode_all(bytes)?))
    }

    /// `MarshalText`: renders ContainerText for every root atom (spec §4.6).
    pub fn marshal_text(&self) -> String {
        let mut out = String::new();
        for root in &self.0 {
            out.push_str(&text::emit_tree(root));
        }
        out
    }

    /// `UnmarshalText`: parses ContainerText into a sequence of root atoms (spec §4.4, §4.5).
    pub fn unmarshal_text(text: &str) -> crate::Result<Self> {
        Ok(AtomTree(text::parse_tree(text)?))
    }

    /// `FromFile`: reads `path` and decodes it as binary, verifying that the root atom's
    /// declared size equals the file size (spec §4.3 "Failure semantics").
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let bytes = fs::read(path)?;
        if bytes.len() >= 4 {
            let declared = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
            if declared != bytes.len() {
                return Err(Error::new(
                    ErrorKind::BinaryFrame(format!(
                        "root atom declares size {declared} but file is {} bytes",
                        bytes.len()
                    )),
                    "Root atom size does not match file size".to_owned(),
                ));
            }
        }
        Self::unmarshal_binary(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_rejects_container_type() {
        assert!(Atom::new_leaf(AtomName::from_str_exact("BID0"), AtomType::CONT, &AtomValue::Null).is_err());
    }

    #[test]
    fn num_children_is_negative_one_for_leaves() {
        let leaf = Atom::new_leaf(AtomName::from_str_exact("NEXT"), AtomType::UI32, &AtomValue::U32(1)).unwrap();
        assert_eq!(leaf.num_children(), -1);
    }

    #[test]
    fn add_child_fails_on_leaf() {
        let mut leaf = Atom::new_leaf(AtomName::from_str_exact("NEXT"), AtomType::UI32, &AtomValue::U32(1)).unwrap();
        let other = Atom::new_leaf(AtomName::from_str_exact("PREV"), AtomType::UI32, &AtomValue::U32(2)).unwrap();
        assert!(!leaf.add_child(other));
    }

    #[test]
    fn descendants_are_preorder() {
        let grandchild = Atom::new_leaf(AtomName::from_str_exact("NEXT"), AtomType::UI32, &AtomValue::U32(1)).unwrap();
        let child = Atom::new_container(AtomName::from_str_exact("BVER"), vec![grandchild]);
        let root = Atom::new_container(AtomName::from_str_exact("BID0"), vec![child]);
        let names: Vec<String> = root.descendants().iter().map(|a| a.name.render()).collect();
        assert_eq!(names, vec!["BID0", "BVER", "NEXT"]);
    }

    #[test]
    fn binary_round_trip_via_tree() {
        let leaf = Atom::new_leaf(AtomName::from_str_exact("NEXT"), AtomType::UI32, &AtomValue::U32(42)).unwrap();
        let root = Atom::new_container(AtomName::from_str_exact("BID0"), vec![leaf]);
        let tree = AtomTree::new(vec![root]);
        let bytes = tree.marshal_binary();
        let decoded = AtomTree::unmarshal_binary(&bytes).unwrap();
        assert_eq!(decoded, tree);
    }
}
