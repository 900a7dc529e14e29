//! Tokenizes ContainerText (spec §4.4).
//!
//! The architecture note permits materializing the whole token vector up front in place of a
//! producer/consumer channel pair when no native channel primitive is convenient; the two are
//! defined to be semantically identical, and a `Vec<Line>` is the simpler fit for a synchronous
//! library call. Granular value token kinds (`Number`, `Vinculum`, `UUID`, `IP32`, `String`,
//! `FC32Hex`, `FC32Quoted`, `Null`) collapse into a single raw `value` string per leaf line — the
//! same text is handed to the codec's `FromString`/`FromStringDelimited`, which already
//! discriminates on the atom's declared type.

use crate::error::{Error, ErrorKind};
use crate::name::AtomName;
use crate::types::AtomType;

/// One token emitted by the lexer, tagged with its 1-based source line number.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A leaf line: `NAME:TYPE:VALUE`.
    Leaf { name: AtomName, ty: AtomType, value: String },
    /// A container-open line: `NAME:CONT:`.
    ContainerOpen { name: AtomName },
    /// An `END` line closing the innermost open container.
    ContainerEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexedLine {
    pub line_no: usize,
    pub indent: usize,
    pub token: Token,
}

/// Lexes `text` into a flat list of `LexedLine`s, skipping blank lines and `#` comments.
pub fn lex(text: &str) -> crate::Result<Vec<LexedLine>> {
    let mut out = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed_start = raw_line.trim_start_matches(['\t', ' ']);
        let indent = raw_line.len() - trimmed_start.len();
        let content = trimmed_start.trim_end();

        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        if content == "END" {
            out.push(LexedLine { line_no, indent, token: Token::ContainerEnd });
            continue;
        }

        let mut parts = content.splitn(3, ':');
        let name_str = parts.next().ok_or_else(|| grammar_err(line_no, content))?;
        let ty_str = parts.next().ok_or_else(|| grammar_err(line_no, content))?;
        let value = parts.next().unwrap_or("");

        let name = AtomName::parse(name_str)?;
        let ty = AtomType::from_code(ty_str.as_bytes())?;

        if ty == AtomType::CONT {
            out.push(LexedLine { line_no, indent, token: Token::ContainerOpen { name } });
        } else {
            out.push(LexedLine { line_no, indent, token: Token::Leaf { name, ty, value: value.to_owned() } });
        }
    }
    Ok(out)
}

fn grammar_err(line_no: usize, content: &str) -> Error {
    Error::new(
        ErrorKind::TextGrammar(line_no, content.to_owned()),
        format!("Line {line_no}: expected NAME:TYPE:VALUE or END, got: {content}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_leaf_and_container_lines() {
        let text = "BID0:CONT:\n\tBVER:UI32:1\nEND\n";
        let lines = lex(text).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(matches!(lines[0].token, Token::ContainerOpen { .. }));
        assert!(matches!(lines[1].token, Token::Leaf { .. }));
        assert_eq!(lines[1].indent, 1);
        assert!(matches!(lines[2].token, Token::ContainerEnd));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# a comment\n\nBID0:CONT:\nEND\n";
        let lines = lex(text).unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn rejects_malformed_line() {
        assert!(lex("BID0\n").is_err());
    }
}
