//! Evaluates a parsed predicate expression against one candidate atom (spec §4.8 evaluator).
//!
//! `Value` is the tagged-variant replacement for the source's `Equaler`/`Comparer`/
//! `Arithmeticker` interface hierarchy (spec §9 "Interface-based coercive numeric type system").

use crate::atom::Atom;
use crate::error::{Error, ErrorKind};

use super::parser::{Expr, OpKind};

/// The coercive value type shared by every predicate operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    IntSigned(i64),
    IntUnsigned(u64),
    Float(f64),
    String(String),
}

/// The context a predicate is evaluated in: the candidate atom plus its 1-based position and
/// the total candidate count (`last()`/`count()`) among its siblings in this step.
pub struct EvalCtx<'a> {
    pub atom: &'a Atom,
    pub position: usize,
    pub last: usize,
}

pub fn eval(expr: &Expr, ctx: &EvalCtx) -> crate::Result<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Float(*n)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Var(name) => eval_variable(name, ctx),
        Expr::Ident(name) => Ok(match ctx.atom.child(name) {
            Some(child) => atom_value_to_value(child),
            None => Value::String(name.clone()),
        }),
        Expr::Neg(inner) => {
            let v = eval(inner, ctx)?;
            Ok(match to_float(&v) {
                Some(f) => Value::Float(-f),
                None => Value::Float(0.0),
            })
        }
        Expr::Call(name, args) => eval_call(name, args, ctx),
        Expr::BinOp(op, lhs, rhs) => {
            let l = eval(lhs, ctx)?;
            let r = eval(rhs, ctx)?;
            eval_binop(op, &l, &r)
        }
    }
}

fn eval_variable(name: &str, ctx: &EvalCtx) -> crate::Result<Value> {
    match name {
        "name" => Ok(Value::String(ctx.atom.name.render())),
        "type" => Ok(Value::String(ctx.atom.ty.to_string())),
        "data" => Ok(atom_value_to_value(ctx.atom)),
        _ => Err(Error::new(
            ErrorKind::PathSemantic(format!("unknown variable @{name}")),
            format!("Unknown path variable: @{name}"),
        )),
    }
}

fn atom_value_to_value(atom: &Atom) -> Value {
    use crate::value::AtomValue;

    match atom.value() {
        Ok(v) => match &v {
            AtomValue::I8(_) | AtomValue::I16(_) | AtomValue::I32(_) | AtomValue::I64(_) | AtomValue::Enum(_) => {
                Value::IntSigned(v.as_i64().unwrap_or(0))
            }
            AtomValue::Bool(_) | AtomValue::U8(_) | AtomValue::U16(_) | AtomValue::U32(_) | AtomValue::U64(_) => {
                Value::IntUnsigned(v.as_u64().unwrap_or(0))
            }
            AtomValue::F32(_) | AtomValue::F64(_) => Value::Float(v.as_f64().unwrap_or(0.0)),
            AtomValue::CStr(_) | AtomValue::UStr(_) | AtomValue::IpAddr(_) => {
                Value::String(v.as_str().unwrap_or_default().to_owned())
            }
            _ => Value::String(crate::codec::to_string(atom.ty, &v).unwrap_or_default()),
        },
        Err(_) => Value::String(String::new()),
    }
}

fn eval_call(name: &str, args: &[Expr], ctx: &EvalCtx) -> crate::Result<Value> {
    match name {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        "position" => Ok(Value::IntUnsigned(ctx.position as u64)),
        "last" | "count" => Ok(Value::IntUnsigned(ctx.last as u64)),
        "name" => Ok(Value::String(ctx.atom.name.render())),
        "type" => Ok(Value::String(ctx.atom.ty.to_string())),
        "data" => Ok(atom_value_to_value(ctx.atom)),
        "not" => {
            let inner = args.first().ok_or_else(|| {
                Error::new(ErrorKind::PathSemantic("not() requires one argument".to_owned()), "not() requires one argument".to_owned())
            })?;
            let v = eval(inner, ctx)?;
            Ok(Value::Bool(!as_bool(&v)))
        }
        other => Err(Error::new(
            ErrorKind::PathSemantic(format!("unknown function {other}()")),
            format!("Unknown path function: {other}()"),
        )),
    }
}

fn as_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::IntSigned(i) => *i != 0,
        Value::IntUnsigned(u) => *u != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => !s.is_empty(),
    }
}

fn to_float(v: &Value) -> Option<f64> {
    match v {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::IntSigned(i) => Some(*i as f64),
        Value::IntUnsigned(u) => Some(*u as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => s.parse::<f64>().ok(),
    }
}

/// Parses `s` the way string-to-numeric coercion does: float, then unsigned, then signed,
/// first success wins (spec §4.8 coercion rule 3).
fn parse_numeric(s: &str) -> Option<Value> {
    if let Ok(u) = s.parse::<u64>() {
        return Some(Value::IntUnsigned(u));
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::IntSigned(i));
    }
    if let Ok(f) = s.parse::<f64>() {
        return Some(Value::Float(f));
    }
    None
}

fn eval_binop(op: &OpKind, l: &Value, r: &Value) -> crate::Result<Value> {
    match op {
        OpKind::And => return Ok(Value::Bool(as_bool(l) && as_bool(r))),
        OpKind::Or => return Ok(Value::Bool(as_bool(l) || as_bool(r))),
        _ => {}
    }

    // String-vs-string comparisons have their own rules (case-insensitive equality,
    // lexicographic ordering); everything else goes through numeric coercion.
    if let (Value::String(a), Value::String(b)) = (l, r) {
        return Ok(match op {
            OpKind::Eq => Value::Bool(a.eq_ignore_ascii_case(b)),
            OpKind::Ne => Value::Bool(!a.eq_ignore_ascii_case(b)),
            OpKind::Lt => Value::Bool(a < b),
            OpKind::Le => Value::Bool(a <= b),
            OpKind::Gt => Value::Bool(a > b),
            OpKind::Ge => Value::Bool(a >= b),
            _ => return arithmetic_on_strings(op, a, b),
        });
    }

    let (lv, rv) = (coerce_numeric(l), coerce_numeric(r));
    let (lv, rv) = match (lv, rv) {
        (Some(lv), Some(rv)) => (lv, rv),
        _ => {
            // One side failed to parse as numeric: equality/ordering are false, arithmetic
            // is a semantic error (spec §4.8 coercion rule 3).
            return match op {
                OpKind::Eq => Ok(Value::Bool(false)),
                OpKind::Ne => Ok(Value::Bool(true)),
                OpKind::Lt | OpKind::Le | OpKind::Gt | OpKind::Ge => Ok(Value::Bool(false)),
                _ => Err(Error::new(
                    ErrorKind::PathSemantic("arithmetic on a non-numeric string".to_owned()),
                    "Cannot perform arithmetic on a non-numeric string".to_owned(),
                )),
            };
        }
    };

    // Promotion: float beats everything; otherwise widen to signed 64-bit.
    if matches!(lv, Value::Float(_)) || matches!(rv, Value::Float(_)) {
        let a = to_float(&lv).unwrap_or(0.0);
        let b = to_float(&rv).unwrap_or(0.0);
        return Ok(match op {
            OpKind::Eq => Value::Bool(a == b),
            OpKind::Ne => Value::Bool(a != b),
            OpKind::Lt => Value::Bool(a < b),
            OpKind::Le => Value::Bool(a <= b),
            OpKind::Gt => Value::Bool(a > b),
            OpKind::Ge => Value::Bool(a >= b),
            OpKind::Add => Value::Float(a + b),
            OpKind::Sub => Value::Float(a - b),
            OpKind::Mul => Value::Float(a * b),
            OpKind::Div => Value::Float(a / b),
            OpKind::IDiv => Value::IntSigned((a / b).trunc() as i64),
            OpKind::Mod => Value::Float(a % b),
            OpKind::And | OpKind::Or => unreachable!("handled above"),
        });
    }

    if let (Value::IntUnsigned(a), Value::IntUnsigned(b)) = (&lv, &rv) {
        let (a, b) = (*a, *b);
        return Ok(match op {
            OpKind::Eq => Value::Bool(a == b),
            OpKind::Ne => Value::Bool(a != b),
            OpKind::Lt => Value::Bool(a < b),
            OpKind::Le => Value::Bool(a <= b),
            OpKind::Gt => Value::Bool(a > b),
            OpKind::Ge => Value::Bool(a >= b),
            OpKind::Add => Value::IntUnsigned(a.wrapping_add(b)),
            OpKind::Sub => Value::IntSigned(a as i64 - b as i64),
            OpKind::Mul => Value::IntUnsigned(a.wrapping_mul(b)),
            OpKind::Div => Value::Float(a as f64 / b as f64),
            OpKind::IDiv => Value::IntUnsigned(if b == 0 { 0 } else { a / b }),
            OpKind::Mod => Value::IntUnsigned(if b == 0 { 0 } else { a % b }),
            OpKind::And | OpKind::Or => unreachable!("handled above"),
        });
    }

    // At least one signed operand: widen both to i64 (spec §4.8 coercion rule 2).
    let a = to_signed(&lv);
    let b = to_signed(&rv);
    Ok(match op {
        OpKind::Eq => Value::Bool(a == b),
        OpKind::Ne => Value::Bool(a != b),
        OpKind::Lt => Value::Bool(a < b),
        OpKind::Le => Value::Bool(a <= b),
        OpKind::Gt => Value::Bool(a > b),
        OpKind::Ge => Value::Bool(a >= b),
        OpKind::Add => Value::IntSigned(a.wrapping_add(b)),
        OpKind::Sub => Value::IntSigned(a.wrapping_sub(b)),
        OpKind::Mul => Value::IntSigned(a.wrapping_mul(b)),
        OpKind::Div => Value::Float(a as f64 / b as f64),
        OpKind::IDiv => Value::IntSigned(if b == 0 { 0 } else { a / b }),
        OpKind::Mod => Value::IntSigned(if b == 0 { 0 } else { a % b }),
        OpKind::And | OpKind::Or => unreachable!("handled above"),
    })
}

fn arithmetic_on_strings(op: &OpKind, a: &str, b: &str) -> crate::Result<Value> {
    match (parse_numeric(a), parse_numeric(b)) {
        (Some(lv), Some(rv)) => eval_binop(op, &lv, &rv),
        _ => Err(Error::new(
            ErrorKind::PathSemantic("arithmetic on a non-numeric string".to_owned()),
            "Cannot perform arithmetic on a non-numeric string".to_owned(),
        )),
    }
}

fn coerce_numeric(v: &Value) -> Option<Value> {
    match v {
        Value::String(s) => parse_numeric(s),
        other => Some(other.clone()),
    }
}

fn to_signed(v: &Value) -> i64 {
    match v {
        Value::Bool(b) => *b as i64,
        Value::IntSigned(i) => *i,
        Value::IntUnsigned(u) => *u as i64,
        Value::Float(f) => *f as i64,
        Value::String(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::AtomName;
    use crate::types::AtomType;
    use crate::value::AtomValue;

    fn leaf(name: &str, ty: AtomType, v: AtomValue) -> Atom {
        Atom::new_leaf(AtomName::from_str_exact(name), ty, &v).unwrap()
    }

    #[test]
    fn position_equality() {
        let atom = leaf("NEXT", AtomType::UI32, AtomValue::U32(1));
        let ctx = EvalCtx { atom: &atom, position: 2, last: 3 };
        let expr = parse_helper("position()=2");
        assert_eq!(eval(&expr, &ctx).unwrap(), Value::Bool(true));
    }

    #[test]
    fn bare_identifier_falls_back_to_literal_string() {
        let atom = leaf("NEXT", AtomType::UI32, AtomValue::U32(1));
        let ctx = EvalCtx { atom: &atom, position: 1, last: 1 };
        let expr = parse_helper("NEXT>0");
        // NEXT has no child atom named NEXT, so NEXT is the literal string "NEXT", which fails
        // to parse as numeric, so the comparison is false.
        assert_eq!(eval(&expr, &ctx).unwrap(), Value::Bool(false));
    }

    #[test]
    fn not_negates() {
        let atom = leaf("NEXT", AtomType::UI32, AtomValue::U32(1));
        let ctx = EvalCtx { atom: &atom, position: 1, last: 1 };
        let expr = parse_helper("not(position()=1)");
        assert_eq!(eval(&expr, &ctx).unwrap(), Value::Bool(false));
    }

    #[test]
    fn type_variable_compares_as_string() {
        let atom = leaf("BTIM", AtomType::UI64, AtomValue::U64(1));
        let ctx = EvalCtx { atom: &atom, position: 1, last: 1 };
        let expr = parse_helper("@type=UI64");
        assert_eq!(eval(&expr, &ctx).unwrap(), Value::Bool(true));
    }

    fn parse_helper(src: &str) -> Expr {
        super::super::parser::parse(src).unwrap()
    }
}
