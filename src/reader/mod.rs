//! Lexer + parser for ZIL concrete syntax (§4.1).

mod lexer;
mod parser;
mod transform;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::ast::Ast;

/// Lex and parse `source`, returning the file's top-level forms after the
/// semantic transform (`ROUTINE`/`OBJECT`/`GLOBAL`/`DEFMAC`/`INSERT-FILE`
/// promoted to their typed AST nodes).
pub fn read(source: &str) -> Result<Vec<Ast>, String> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    parser.parse_top_level()
}
