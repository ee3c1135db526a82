//! Command Lexer (§4.7): splits a raw input line into classified tokens.

use crate::atom::Atom;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Verb,
    Direction,
    Preposition,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub word: Atom,
    pub kind: TokenKind,
}

const PREPOSITIONS: &[&str] = &[
    "IN", "INTO", "ON", "ONTO", "WITH", "AT", "TO", "FROM", "UNDER", "THROUGH", "OVER", "OFF",
];

fn split_words(line: &str) -> Vec<String> {
    line.chars()
        .map(|c| if ".,!?\"'".contains(c) { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .map(|w| w.to_uppercase())
        .collect()
}

pub fn tokenize(world: &World, line: &str) -> Vec<Token> {
    let words = split_words(line);
    let mut tokens = Vec::new();
    let mut first = true;
    for word in words {
        let atom = Atom::intern(&word);
        if world.buzz_words.contains(&atom) {
            continue;
        }
        let resolved = world.resolve_synonym(atom);
        let kind = if first && world.directions.contains(&resolved) {
            TokenKind::Direction
        } else if first && !world.syntax_entries(resolved).is_empty() {
            TokenKind::Verb
        } else if !first && PREPOSITIONS.contains(&resolved.name().as_str()) {
            TokenKind::Preposition
        } else if world.directions.contains(&resolved) {
            TokenKind::Direction
        } else {
            TokenKind::Unknown
        };
        tokens.push(Token { word: resolved, kind });
        first = false;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        let mut w = World::new();
        w.set_directions(vec![Atom::intern("NORTH"), Atom::intern("SOUTH")]);
        w.add_buzz_words(vec![Atom::intern("THE")]);
        w.add_synonym(Atom::intern("TAKE"), Atom::intern("GRAB"));
        w.add_syntax_entry(crate::world::SyntaxEntry {
            verb: Atom::intern("TAKE"),
            action: Atom::intern("V-TAKE"),
            preaction: None,
            object_count: 1,
            prepositions: vec![],
            constraints: vec![vec![]],
        });
        w
    }

    #[test]
    fn classifies_verb_buzz_and_preposition() {
        let w = world();
        let tokens = tokenize(&w, "take the lamp with hand");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Verb,
                TokenKind::Unknown,
                TokenKind::Preposition,
                TokenKind::Unknown,
            ]
        );
    }

    #[test]
    fn resolves_synonym_before_classification() {
        let w = world();
        let tokens = tokenize(&w, "grab lamp");
        assert_eq!(tokens[0].word, Atom::intern("TAKE"));
        assert_eq!(tokens[0].kind, TokenKind::Verb);
    }

    #[test]
    fn bare_direction_is_classified() {
        let w = world();
        let tokens = tokenize(&w, "north");
        assert_eq!(tokens, vec![Token { word: Atom::intern("NORTH"), kind: TokenKind::Direction }]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        let w = world();
        assert!(tokenize(&w, "   ").is_empty());
    }
}
