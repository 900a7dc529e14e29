//! Parses a predicate expression's token stream into a tree honoring XPath 3.1 precedence and
//! left-associativity (spec §4.8 `PathParser`).
//!
//! The spec names Dijkstra's shunting-yard, whose observable contract is "produce a parse
//! honoring the grammar's precedence and associativity" — a postfix/RPN list is one way to
//! serialize that parse, a precedence-climbing recursive-descent parser producing a tree
//! directly is another. The two are semantically identical for this grammar (no user-visible
//! behavior distinguishes them, mirroring the token-channel/token-vector equivalence the
//! architecture note draws for the text lexer/parser pair); this crate uses recursive descent
//! because it composes more naturally with `not(expr)`'s one required argument.

use crate::error::{Error, ErrorKind};

use super::lexer::{lex, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum OpKind {
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Var(String),
    /// A bare identifier: either a child atom's name (resolved at eval time) or, failing that,
    /// a literal string (spec §4.8 "a bare identifier ... ").
    Ident(String),
    Neg(Box<Expr>),
    BinOp(OpKind, Box<Expr>, Box<Expr>),
    /// A call to one of the fixed keyword functions. All are zero-arity except `not`, which
    /// takes exactly one (spec §9 Open Question — see `DESIGN.md`).
    Call(String, Vec<Expr>),
}

/// Parses a full predicate expression (the text between `[` and `]`).
pub fn parse(src: &str) -> crate::Result<Expr> {
    let tokens = lex(src)?;
    let mut p = Parser { tokens, pos: 0, src };
    if p.tokens.is_empty() {
        return Err(Error::new(ErrorKind::PredicateEmpty, "Predicate is empty: []".to_owned()));
    }
    let expr = p.parse_or()?;
    if p.pos != p.tokens.len() {
        return Err(p.err("trailing tokens after expression"));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    src: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn err(&self, msg: &str) -> Error {
        Error::new(
            ErrorKind::PathSyntax(self.src.to_owned(), msg.to_owned()),
            format!("Path syntax error in '{}': {msg}", self.src),
        )
    }

    fn parse_or(&mut self) -> crate::Result<Expr> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::BinOp(OpKind::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> crate::Result<Expr> {
        let mut lhs = self.parse_compare()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.advance();
            let rhs = self.parse_compare()?;
            lhs = Expr::BinOp(OpKind::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_compare(&mut self) -> crate::Result<Expr> {
        let lhs = self.parse_add()?;
        let op = match self.peek() {
            Some(Token::Eq) => OpKind::Eq,
            Some(Token::Ne) => OpKind::Ne,
            Some(Token::Lt) => OpKind::Lt,
            Some(Token::Le) => OpKind::Le,
            Some(Token::Gt) => OpKind::Gt,
            Some(Token::Ge) => OpKind::Ge,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_add()?;
        Ok(Expr::BinOp(op, Box::new(lhs), Box::new(rhs)))
    }

    fn parse_add(&mut self) -> crate::Result<Expr> {
        let mut lhs = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => OpKind::Add,
                Some(Token::Minus) => OpKind::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul()?;
            lhs = Expr::BinOp(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> crate::Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => OpKind::Mul,
                Some(Token::Div) => OpKind::Div,
                Some(Token::IDiv) => OpKind::IDiv,
                Some(Token::Mod) => OpKind::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::BinOp(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> crate::Result<Expr> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> crate::Result<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::String(s)) => Ok(Expr::Str(s)),
            Some(Token::Variable(name)) => Ok(Expr::Var(name)),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(self.err("expected closing ')'")),
                }
            }
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.advance();
                    let mut args = Vec::new();
                    if name == "not" {
                        args.push(self.parse_or()?);
                    }
                    match self.advance() {
                        Some(Token::RParen) => Ok(Expr::Call(name, args)),
                        _ => Err(self.err("expected closing ')' in function call")),
                    }
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            other => Err(self.err(&format!("unexpected token: {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comparison() {
        let e = parse("@type=UI64").unwrap();
        assert_eq!(
            e,
            Expr::BinOp(OpKind::Eq, Box::new(Expr::Var("type".to_owned())), Box::new(Expr::Ident("UI64".to_owned())))
        );
    }

    #[test]
    fn parses_not_with_argument() {
        let e = parse("not(position()=1)").unwrap();
        match e {
            Expr::Call(name, args) => {
                assert_eq!(name, "not");
                assert_eq!(args.len(), 1);
            }
            _ => panic!("expected a call"),
        }
    }

    #[test]
    fn honors_precedence() {
        // 1+2*3 should parse as 1+(2*3), not (1+2)*3.
        let e = parse("1+2*3").unwrap();
        match e {
            Expr::BinOp(OpKind::Add, lhs, rhs) => {
                assert_eq!(*lhs, Expr::Number(1.0));
                assert_eq!(*rhs, Expr::BinOp(OpKind::Mul, Box::new(Expr::Number(2.0)), Box::new(Expr::Number(3.0))));
            }
            _ => panic!("expected addition at the top"),
        }
    }

    #[test]
    fn rejects_empty_predicate() {
        assert!(parse("").is_err());
    }
}
