//! Recursive-descent parser turning a token stream into [`Ast`] nodes, then
//! handing top-level forms to [`super::transform`] for semantic promotion.

use super::lexer::{Token, TokenKind};
use super::transform;
use crate::ast::Ast;
use crate::atom::Atom;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub fn parse_top_level(&mut self) -> Result<Vec<Ast>, String> {
        let mut forms = Vec::new();
        while self.peek().is_some() {
            forms.push(self.parse_one()?);
        }
        forms.into_iter().map(transform::promote).collect()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn line(&self) -> usize {
        self.peek().map(|t| t.line).unwrap_or(0)
    }

    /// Parses one complete expression at the current position.
    fn parse_one(&mut self) -> Result<Ast, String> {
        let line = self.line();
        let tok = self
            .bump()
            .ok_or_else(|| "unexpected end of input".to_string())?;
        match tok.kind {
            TokenKind::Number(n) => Ok(Ast::Number(n)),
            TokenKind::String(s) => Ok(Ast::String(s)),
            TokenKind::Atom(a) => Ok(Ast::Atom(Atom::intern(&a))),
            TokenKind::LocalRef(a) => Ok(Ast::LocalRef(Atom::intern(&a))),
            TokenKind::GlobalRef(a) => Ok(Ast::GlobalRef(Atom::intern(&a))),
            TokenKind::QuotedAtom(a) => Ok(Ast::QuotedAtom(Atom::intern(&a))),
            TokenKind::CharLiteral(c) => Ok(Ast::CharLiteral(c)),
            TokenKind::AngleOpen => self.parse_form(),
            TokenKind::ParenOpen => self.parse_list(),
            TokenKind::SpliceOpen => {
                let inner = self.parse_form()?;
                Ok(Ast::Splice(std::rc::Rc::new(inner)))
            }
            TokenKind::PercentOpen => {
                let inner = self.parse_form()?;
                Ok(Ast::PercentEval(std::rc::Rc::new(inner)))
            }
            TokenKind::Hash(tag) => {
                // `#TAG v...>` when inside a form context has no closing
                // delimiter of its own; it consumes exactly one following
                // value when present, matching e.g. `#DECL (...)`.
                let mut values = Vec::new();
                if matches!(
                    self.peek().map(|t| &t.kind),
                    Some(TokenKind::ParenOpen) | Some(TokenKind::AngleOpen)
                ) {
                    values.push(self.parse_one()?);
                }
                Ok(Ast::HashExpr(Atom::intern(&tag), values))
            }
            other => Err(format!("line {line}: unexpected token {other:?}")),
        }
    }

    fn parse_form(&mut self) -> Result<Ast, String> {
        let line = self.line();
        if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::AngleClose)) {
            self.bump();
            return Ok(Ast::false_form());
        }
        let op = self.parse_one()?;
        let mut args = Vec::new();
        loop {
            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::AngleClose) => {
                    self.bump();
                    break;
                }
                None => return Err(format!("line {line}: unterminated form")),
                _ => args.push(self.parse_one()?),
            }
        }
        Ok(Ast::form(op, args))
    }

    fn parse_list(&mut self) -> Result<Ast, String> {
        let line = self.line();
        let mut items = Vec::new();
        loop {
            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::ParenClose) => {
                    self.bump();
                    break;
                }
                None => return Err(format!("line {line}: unterminated list")),
                _ => items.push(self.parse_one()?),
            }
        }
        Ok(Ast::List(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::lexer::Lexer;

    fn parse(src: &str) -> Vec<Ast> {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse_top_level().unwrap()
    }

    #[test]
    fn empty_angle_brackets_is_false() {
        let forms = parse("<>");
        assert_eq!(forms, vec![Ast::false_form()]);
    }

    #[test]
    fn nested_forms_and_lists() {
        let forms = parse("<FOO (A B) <BAR 1>>");
        match &forms[0] {
            Ast::Form(_, args) => {
                assert_eq!(args.len(), 2);
                assert!(matches!(args[0], Ast::List(_)));
                assert!(matches!(args[1], Ast::Form(_, _)));
            }
            _ => panic!("expected form"),
        }
    }
}
