//! Token scanner for ZIL source text.

use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Atom(String),
    Number(i16),
    String(String),
    LocalRef(String),
    GlobalRef(String),
    QuotedAtom(String),
    /// `<` opens a form, `>` closes one
    AngleOpen,
    AngleClose,
    /// `(` opens a list, `)` closes one
    ParenOpen,
    ParenClose,
    /// `!<` opens a splice form
    SpliceOpen,
    /// `%<` opens a percent-eval form
    PercentOpen,
    /// `#TAG` — the tag name is captured, the following values are lexed normally
    Hash(String),
    CharLiteral(char),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: usize,
}

fn is_atom_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'-' | b'?' | b'!' | b'+' | b'*' | b'/' | b'=' | b'.' | b'_' | b':')
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_ws_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.bump();
                }
                Some(b';') => {
                    // `;<form>` elides a single s-expression; a bare `;` runs
                    // to end of line. Either way, the lexer just skips past
                    // it — the elided form never reaches the parser.
                    self.bump();
                    if self.peek() == Some(b'<') {
                        self.skip_elided_form();
                    } else {
                        while let Some(c) = self.peek() {
                            if c == b'\n' {
                                break;
                            }
                            self.bump();
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn skip_elided_form(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => break,
                Some(b'<') => {
                    depth += 1;
                    self.bump();
                }
                Some(b'>') => {
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some(b'"') => {
                    self.bump();
                    while let Some(c) = self.peek() {
                        self.bump();
                        if c == b'"' {
                            break;
                        }
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        'outer: loop {
            self.skip_ws_and_comments();
            let line = self.line;
            let Some(c) = self.peek() else { break };
            let kind = match c {
                b'<' => {
                    self.bump();
                    TokenKind::AngleOpen
                }
                b'>' => {
                    self.bump();
                    TokenKind::AngleClose
                }
                b'(' => {
                    self.bump();
                    TokenKind::ParenOpen
                }
                b')' => {
                    self.bump();
                    TokenKind::ParenClose
                }
                b'"' => self.lex_string(line)?,
                b'.' if self.peek_at(1).is_some_and(is_atom_char) => {
                    self.bump();
                    TokenKind::LocalRef(self.lex_atom_text())
                }
                b',' => {
                    self.bump();
                    TokenKind::GlobalRef(self.lex_atom_text())
                }
                b'\'' if self.peek_at(1).is_some_and(is_atom_char) => {
                    self.bump();
                    TokenKind::QuotedAtom(self.lex_atom_text())
                }
                b'\'' => {
                    // A quote on a non-atom is semantically inert: drop it
                    // and let the following list/form lex normally.
                    self.bump();
                    continue 'outer;
                }
                b'!' if self.peek_at(1) == Some(b'<') => {
                    self.bump();
                    self.bump();
                    TokenKind::SpliceOpen
                }
                b'!' if self.peek_at(1) == Some(b'\\') => {
                    self.bump();
                    self.bump();
                    let ch = self.bump().ok_or_else(|| format!("line {line}: unterminated char literal"))?;
                    TokenKind::CharLiteral(ch as char)
                }
                b'%' if self.peek_at(1) == Some(b'<') => {
                    self.bump();
                    self.bump();
                    TokenKind::PercentOpen
                }
                b'#' => {
                    self.bump();
                    TokenKind::Hash(self.lex_atom_text())
                }
                c if c.is_ascii_digit() => self.lex_number(line)?,
                c if (c == b'-' || c == b'+') && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => {
                    self.lex_number(line)?
                }
                c if is_atom_char(c) => TokenKind::Atom(self.lex_atom_text()),
                other => {
                    return Err(format!(
                        "line {line}: unexpected character '{}'",
                        other as char
                    ))
                }
            };
            tokens.push(Token { kind, line });
        }
        debug!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }

    fn lex_atom_text(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_atom_char) {
            self.bump();
        }
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }

    fn lex_number(&mut self, line: usize) -> Result<TokenKind, String> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-') | Some(b'+')) {
            self.bump();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        text.parse::<i16>()
            .map(TokenKind::Number)
            .map_err(|e| format!("line {line}: invalid number '{text}': {e}"))
    }

    fn lex_string(&mut self, line: usize) -> Result<TokenKind, String> {
        self.bump(); // opening quote
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(format!("line {line}: unterminated string")),
                Some(b'"') => break,
                Some(b'\\') => match self.bump() {
                    Some(b'n') => s.push('\n'),
                    Some(b't') => s.push('\t'),
                    Some(b'"') => s.push('"'),
                    Some(b'\\') => s.push('\\'),
                    Some(c) => s.push(c as char),
                    None => return Err(format!("line {line}: unterminated string escape")),
                },
                Some(c) => s.push(c as char),
            }
        }
        Ok(TokenKind::String(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_sigils() {
        let k = kinds(".X ,Y 'Z !<F> %<G> #DECL (A)");
        assert_eq!(
            k,
            vec![
                TokenKind::LocalRef("X".into()),
                TokenKind::GlobalRef("Y".into()),
                TokenKind::QuotedAtom("Z".into()),
                TokenKind::SpliceOpen,
                TokenKind::Atom("F".into()),
                TokenKind::AngleClose,
                TokenKind::PercentOpen,
                TokenKind::Atom("G".into()),
                TokenKind::AngleClose,
                TokenKind::Hash("DECL".into()),
                TokenKind::ParenOpen,
                TokenKind::Atom("A".into()),
                TokenKind::ParenClose,
            ]
        );
    }

    #[test]
    fn elided_comment_is_dropped() {
        let k = kinds(";<IGNORE ME> <TELL \"hi\">");
        assert_eq!(k[0], TokenKind::AngleOpen);
    }

    #[test]
    fn negative_numbers_lex_as_numbers_not_atoms() {
        let k = kinds("-5 +3");
        assert_eq!(k, vec![TokenKind::Number(-5), TokenKind::Number(3)]);
    }

    #[test]
    fn quote_on_a_list_is_dropped_not_a_quoted_atom() {
        let k = kinds("'(A B)");
        assert_eq!(
            k,
            vec![
                TokenKind::ParenOpen,
                TokenKind::Atom("A".into()),
                TokenKind::Atom("B".into()),
                TokenKind::ParenClose,
            ]
        );
    }
}
