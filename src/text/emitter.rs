//! Renders an atom tree as ContainerText (spec §4.6).

use crate::atom::Atom;
use crate::codec;
use crate::types::AtomType;

/// Renders a single atom's own line, without recursing into children or appending `END`. Used
/// by `Atom`'s `Display` impl.
pub fn emit_atom_line(atom: &Atom, depth: usize) -> String {
    let indent = "\t".repeat(depth);
    if atom.ty == AtomType::CONT {
        format!("{indent}{}:CONT:", atom.name.render())
    } else {
        let value = render_value(atom);
        format!("{indent}{}:{}:{}", atom.name.render(), atom.ty, value)
    }
}

fn render_value(atom: &Atom) -> String {
    match atom.value().and_then(|v| {
        if atom.ty.uses_double_quotes() || atom.ty == AtomType::FC32 {
            codec::to_string_delimited(atom.ty, &v)
        } else {
            codec::to_string(atom.ty, &v)
        }
    }) {
        Ok(s) => s,
        Err(_) => String::new(),
    }
}

/// Renders `atom` and, if it's a container, all of its descendants and the closing `END` line,
/// at depth 0. Each line is terminated with `\n`.
pub fn emit_tree(atom: &Atom) -> String {
    let mut out = String::new();
    emit_tree_at(atom, 0, &mut out);
    out
}

fn emit_tree_at(atom: &Atom, depth: usize, out: &mut String) {
    out.push_str(&emit_atom_line(atom, depth));
    out.push('\n');
    if atom.ty == AtomType::CONT {
        for child in &atom.children {
            emit_tree_at(child, depth + 1, out);
        }
        out.push_str(&"\t".repeat(depth));
        out.push_str("END\n");
    }
}
