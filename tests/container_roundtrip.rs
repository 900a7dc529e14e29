//! End-to-end coverage exercising only `adecon`'s public API: binary decode, ContainerText
//! encode/decode, and path selection over a realistic multi-level container.

use adecon::{decode, select_path, Atom, AtomName, AtomTree, AtomType, AtomValue};

fn hex_to_bytes(s: &str) -> Vec<u8> {
    (0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap()).collect()
}

const BID0_HEX: &str = "0000004442494430434F4E5400000010425645525549333200000001000000144254494D55493634000546592CD6DB2C000000144E45585455493634DDDDF0000C000000";

#[test]
fn decodes_binary_to_the_documented_text_form() {
    let bytes = hex_to_bytes(BID0_HEX);
    let tree = AtomTree::unmarshal_binary(&bytes).unwrap();

    assert_eq!(tree.roots().len(), 1);
    let root = &tree.roots()[0];
    assert_eq!(root.name().render(), "BID0");
    assert_eq!(root.ty(), AtomType::CONT);
    assert_eq!(root.children().len(), 3);

    let text = tree.marshal_text();
    assert_eq!(
        text,
        "BID0:CONT:\n\tBVER:UI32:1\n\tBTIM:UI64:1484723701865260\n\tNEXT:UI64:15987198135227121664\nEND\n"
    );
}

#[test]
fn text_and_binary_round_trip_agree() {
    let bytes = hex_to_bytes(BID0_HEX);
    let from_binary = AtomTree::unmarshal_binary(&bytes).unwrap();
    let text = from_binary.marshal_text();
    let from_text = AtomTree::unmarshal_text(&text).unwrap();

    assert_eq!(from_binary, from_text);
    assert_eq!(from_text.marshal_binary(), bytes);
}

#[test]
fn nested_containers_preserve_structure_through_both_forms() {
    let leaf_a = Atom::new_leaf(AtomName::from_str_exact("ID01"), AtomType::UI32, &AtomValue::U32(7)).unwrap();
    let leaf_b = Atom::new_leaf(AtomName::from_str_exact("NAME"), AtomType::CSTR, &AtomValue::CStr("hi".to_owned()))
        .unwrap();
    let inner = Atom::new_container(AtomName::from_str_exact("GRP0"), vec![leaf_a, leaf_b]);
    let root = Atom::new_container(AtomName::from_str_exact("ROOT"), vec![inner]);
    let tree = AtomTree::new(vec![root]);

    let bytes = tree.marshal_binary();
    let decoded = AtomTree::unmarshal_binary(&bytes).unwrap();
    assert_eq!(decoded, tree);

    let text = tree.marshal_text();
    let reparsed = AtomTree::unmarshal_text(&text).unwrap();
    assert_eq!(reparsed, tree);
}

#[test]
fn path_selects_descendants_by_type_across_the_whole_tree() {
    let bytes = hex_to_bytes(BID0_HEX);
    let tree = AtomTree::unmarshal_binary(&bytes).unwrap();

    let matches = select_path(tree.roots(), "//*[@type=UI64]").unwrap();
    let names: Vec<String> = matches.iter().map(|a| a.name().render()).collect();
    assert_eq!(names, vec!["BTIM", "NEXT"]);
}

#[test]
fn path_position_predicate_selects_later_siblings() {
    let bytes = hex_to_bytes(BID0_HEX);
    let tree = AtomTree::unmarshal_binary(&bytes).unwrap();

    let matches = select_path(tree.roots(), "/BID0/*[position()>1]").unwrap();
    let names: Vec<String> = matches.iter().map(|a| a.name().render()).collect();
    assert_eq!(names, vec!["BTIM", "NEXT"]);
}

#[test]
fn path_bare_identifier_does_not_reach_into_sibling_scope() {
    let bytes = hex_to_bytes(BID0_HEX);
    let tree = AtomTree::unmarshal_binary(&bytes).unwrap();

    // NEXT is BID0's child, not a child of BVER/BTIM/NEXT themselves, so this matches nothing.
    let matches = select_path(tree.roots(), "/BID0/*[NEXT > 0]").unwrap();
    assert!(matches.is_empty());
}

#[test]
fn codec_decode_matches_tree_decoded_value() {
    let bytes = hex_to_bytes(BID0_HEX);
    let tree = AtomTree::unmarshal_binary(&bytes).unwrap();
    let bver = tree.roots()[0].child("BVER").unwrap();
    assert_eq!(decode(AtomType::UI32, &bver.data).unwrap(), AtomValue::U32(1));
}

#[test]
fn malformed_binary_input_is_rejected() {
    let truncated = hex_to_bytes("000000440000");
    assert!(AtomTree::unmarshal_binary(&truncated).is_err());
}

#[test]
fn malformed_text_input_is_rejected() {
    assert!(AtomTree::unmarshal_text("BID0:CONT:\n\tBVER:UI32:1\n").is_err());
}
