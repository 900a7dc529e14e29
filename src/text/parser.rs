//! Consumes the lexer's token stream and builds the atom tree with a LIFO stack of open
//! containers (spec §4.5).

use crate::atom::Atom;
use crate::codec;
use crate::error::{Error, ErrorKind};
use crate::types::AtomType;

use super::lexer::{lex, Token};

/// Parses ContainerText into a sequence of root atoms.
pub fn parse_tree(text: &str) -> crate::Result<Vec<Atom>> {
    let lines = lex(text)?;

    let mut roots: Vec<Atom> = Vec::new();
    // Each stack entry is a still-open container atom plus the line number it opened on, used
    // for the unterminated-container error message.
    let mut stack: Vec<(Atom, usize)> = Vec::new();

    for line in lines {
        match line.token {
            Token::ContainerOpen { name } => {
                stack.push((Atom::new_container(name, Vec::new()), line.line_no));
            }
            Token::Leaf { name, ty, value } => {
                let native = codec::from_string_delimited(ty, &value).map_err(|e| {
                    Error::new(
                        ErrorKind::TextGrammar(line.line_no, value.clone()),
                        format!("Line {}: {}", line.line_no, e),
                    )
                })?;
                let leaf = Atom::new_leaf(name, ty, &native).map_err(|e| {
                    Error::new(
                        ErrorKind::TextGrammar(line.line_no, value.clone()),
                        format!("Line {}: {}", line.line_no, e),
                    )
                })?;
                push_atom(&mut stack, &mut roots, leaf);
            }
            Token::ContainerEnd => {
                let (closed, _) = stack.pop().ok_or_else(|| {
                    Error::new(
                        ErrorKind::TextGrammar(line.line_no, "END".to_owned()),
                        format!("Line {}: unmatched END", line.line_no),
                    )
                })?;
                push_atom(&mut stack, &mut roots, closed);
            }
        }
    }

    if let Some((_, opened_at)) = stack.last() {
        return Err(Error::new(
            ErrorKind::TextGrammar(*opened_at, "CONT".to_owned()),
            format!("Container opened at line {opened_at} was never closed with END"),
        ));
    }

    Ok(roots)
}

fn push_atom(stack: &mut Vec<(Atom, usize)>, roots: &mut Vec<Atom>, atom: Atom) {
    debug_assert!(atom.ty == AtomType::CONT || atom.children.is_empty());
    match stack.last_mut() {
        Some((parent, _)) => {
            parent.children.push(atom);
        }
        None => roots.push(atom),
    }
}
