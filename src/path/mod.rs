//! The path query engine (spec §4.8): selects subtrees of an in-memory atom tree with an
//! XPath-3.1 subset.

mod eval;
mod lexer;
mod parser;

use std::collections::HashSet;

use crate::atom::Atom;
use crate::error::{Error, ErrorKind};

use eval::{eval, EvalCtx, Value};

/// Selects every atom in `roots` (and their descendants) matching `path`.
///
/// Binary set operators (`union`/`|`/`intersect`) combine two whole path expressions — only the
/// binary infix form is supported, per spec §9's Open Question on "incomplete handling for
/// chained set operations".
pub fn select<'a>(roots: &'a [Atom], path: &str) -> crate::Result<Vec<&'a Atom>> {
    let path = path.trim();
    if let Some((lhs, rhs)) = split_top_level(path, " union ").or_else(|| split_top_level(path, "|")) {
        let a = select(roots, lhs)?;
        let b = select(roots, rhs)?;
        return Ok(union(a, b));
    }
    if let Some((lhs, rhs)) = split_top_level(path, " intersect ") {
        let a = select(roots, lhs)?;
        let b = select(roots, rhs)?;
        return Ok(intersect(a, b));
    }
    select_subpath(roots, path)
}

/// Splits `path` on the first top-level (bracket-depth 0) occurrence of `sep`.
fn split_top_level<'a>(path: &'a str, sep: &str) -> Option<(&'a str, &'a str)> {
    let bytes = path.as_bytes();
    let sep_bytes = sep.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i + sep_bytes.len() <= bytes.len() {
        match bytes[i] {
            b'[' => depth += 1,
            b']' => depth -= 1,
            _ => {}
        }
        if depth == 0 && &bytes[i..i + sep_bytes.len()] == sep_bytes {
            return Some((&path[..i], &path[i + sep_bytes.len()..]));
        }
        i += 1;
    }
    None
}

fn union<'a>(a: Vec<&'a Atom>, b: Vec<&'a Atom>) -> Vec<&'a Atom> {
    let mut seen: HashSet<usize> = HashSet::new();
    let mut out = Vec::new();
    for atom in a.into_iter().chain(b) {
        let key = atom as *const Atom as usize;
        if seen.insert(key) {
            out.push(atom);
        }
    }
    out
}

fn intersect<'a>(a: Vec<&'a Atom>, b: Vec<&'a Atom>) -> Vec<&'a Atom> {
    let b_keys: HashSet<usize> = b.iter().map(|atom| *atom as *const Atom as usize).collect();
    a.into_iter().filter(|atom| b_keys.contains(&(*atom as *const Atom as usize))).collect()
}

struct Step {
    descend_before: bool,
    node_test: String,
    predicates: Vec<String>,
}

fn select_subpath<'a>(roots: &'a [Atom], path: &str) -> crate::Result<Vec<&'a Atom>> {
    let (from_root_descend_all, rest) = if let Some(r) = path.strip_prefix("//") {
        (true, r)
    } else if let Some(r) = path.strip_prefix('/') {
        (false, r)
    } else {
        (false, path)
    };

    let steps = parse_steps(rest)?;

    let mut context: Vec<&Atom> = if from_root_descend_all {
        roots.iter().flat_map(|r| r.descendants()).collect()
    } else {
        roots.iter().collect()
    };

    for (i, step) in steps.iter().enumerate() {
        let base: Vec<&Atom> = if i == 0 { context } else { context.iter().flat_map(|a| a.children.iter()).collect() };
        let expanded: Vec<&Atom> = if step.descend_before {
            base.iter().flat_map(|a| a.descendants()).collect()
        } else {
            base
        };
        let matched: Vec<&Atom> =
            expanded.into_iter().filter(|a| step.node_test == "*" || a.name.render() == step.node_test).collect();

        let mut current = matched;
        for pred_src in &step.predicates {
            current = apply_predicate(current, pred_src)?;
        }
        context = current;
    }

    Ok(context)
}

fn apply_predicate<'a>(candidates: Vec<&'a Atom>, pred_src: &str) -> crate::Result<Vec<&'a Atom>> {
    let expr = parser::parse(pred_src)?;
    let total = candidates.len();
    let mut out = Vec::new();
    for (idx, atom) in candidates.into_iter().enumerate() {
        let ctx = EvalCtx { atom, position: idx + 1, last: total };
        let value = eval(&expr, &ctx)?;
        let keep = match value {
            Value::Bool(b) => b,
            Value::IntSigned(n) => n == ctx.position as i64,
            Value::IntUnsigned(n) => n == ctx.position as u64,
            Value::Float(f) => f == ctx.position as f64,
            Value::String(_) => false,
        };
        if keep {
            out.push(atom);
        }
    }
    Ok(out)
}

/// Splits the part of a path after any leading `/`/`//` into steps, tracking interior `//` as a
/// "descend to all descendants before this step" marker on the following step (spec §4.8 "Leading
/// `//` or interior `//` means descend to all descendants").
fn parse_steps(rest: &str) -> crate::Result<Vec<Step>> {
    let chars: Vec<char> = rest.chars().collect();
    let mut raw_steps: Vec<(bool, String)> = Vec::new();
    let mut depth = 0i32;
    let mut cur = String::new();
    let mut pending_descend = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '[' => {
                depth += 1;
                cur.push(c);
            }
            ']' => {
                depth -= 1;
                cur.push(c);
            }
            '/' if depth == 0 => {
                if cur.is_empty() {
                    pending_descend = true;
                } else {
                    raw_steps.push((pending_descend, std::mem::take(&mut cur)));
                    pending_descend = false;
                }
            }
            _ => cur.push(c),
        }
        i += 1;
    }
    if !cur.is_empty() {
        raw_steps.push((pending_descend, cur));
    }

    raw_steps
        .into_iter()
        .map(|(descend_before, text)| {
            let (node_test, predicates) = split_node_test_and_predicates(&text)?;
            Ok(Step { descend_before, node_test, predicates })
        })
        .collect()
}

fn split_node_test_and_predicates(step_text: &str) -> crate::Result<(String, Vec<String>)> {
    let chars: Vec<char> = step_text.chars().collect();
    let mut i = 0;
    let mut node_test = String::new();
    while i < chars.len() && chars[i] != '[' {
        node_test.push(chars[i]);
        i += 1;
    }

    let mut predicates = Vec::new();
    while i < chars.len() {
        if chars[i] != '[' {
            return Err(Error::new(
                ErrorKind::PathSyntax(step_text.to_owned(), "expected '[' to start a predicate".to_owned()),
                format!("Path syntax error in '{step_text}': expected '[' to start a predicate"),
            ));
        }
        let mut depth = 1;
        i += 1;
        let start = i;
        while i < chars.len() && depth > 0 {
            match chars[i] {
                '[' => depth += 1,
                ']' => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                i += 1;
            }
        }
        if depth != 0 {
            return Err(Error::new(
                ErrorKind::PathSyntax(step_text.to_owned(), "unterminated predicate".to_owned()),
                format!("Path syntax error in '{step_text}': unterminated predicate"),
            ));
        }
        predicates.push(chars[start..i].iter().collect());
        i += 1;
    }

    Ok((node_test.trim().to_owned(), predicates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::AtomName;
    use crate::types::AtomType;
    use crate::value::AtomValue;

    fn sample_tree() -> Atom {
        let bver = Atom::new_leaf(AtomName::from_str_exact("BVER"), AtomType::UI32, &AtomValue::U32(1)).unwrap();
        let btim =
            Atom::new_leaf(AtomName::from_str_exact("BTIM"), AtomType::UI64, &AtomValue::U64(1484723701865260))
                .unwrap();
        let next =
            Atom::new_leaf(AtomName::from_str_exact("NEXT"), AtomType::UI64, &AtomValue::U64(15987198135227121664))
                .unwrap();
        Atom::new_container(AtomName::from_str_exact("BID0"), vec![bver, btim, next])
    }

    #[test]
    fn simple_child_step() {
        let root = sample_tree();
        let roots = vec![root];
        let result = select(&roots, "/BID0/BVER").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name.render(), "BVER");
    }

    #[test]
    fn descendant_axis_by_type() {
        let root = sample_tree();
        let roots = vec![root];
        let result = select(&roots, "//*[@type=UI64]").unwrap();
        let names: Vec<String> = result.iter().map(|a| a.name.render()).collect();
        assert_eq!(names, vec!["BTIM", "NEXT"]);
    }

    #[test]
    fn position_predicate() {
        let root = sample_tree();
        let roots = vec![root];
        let result = select(&roots, "/BID0/*[position()>1]").unwrap();
        let names: Vec<String> = result.iter().map(|a| a.name.render()).collect();
        assert_eq!(names, vec!["BTIM", "NEXT"]);
    }

    #[test]
    fn bare_identifier_misses_sibling_scope() {
        let root = sample_tree();
        let roots = vec![root];
        // NEXT is a child of BID0, not of BID0's children, so this matches nothing.
        let result = select(&roots, "/BID0/*[NEXT > 0]").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn root_step_alone() {
        let root = sample_tree();
        let roots = vec![root];
        let result = select(&roots, "/BID0").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name.render(), "BID0");
    }
}
