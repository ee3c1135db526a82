//! Command Parser (§4.8): turns a lexed token stream into a structured
//! verb/noun-phrase/preposition shape.

use crate::atom::Atom;
use crate::command_lexer::{Token, TokenKind};

#[derive(Debug, Clone)]
pub struct NounPhrase {
    pub noun: Atom,
    pub adjectives: Vec<Atom>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedCommand {
    pub verb: Option<Atom>,
    pub noun_phrases: Vec<NounPhrase>,
    pub preposition: Option<Atom>,
    pub direction: Option<Atom>,
}

impl ParsedCommand {
    pub fn object_count(&self) -> usize {
        self.noun_phrases.len()
    }
}

fn close_phrase(buffer: &mut Vec<Atom>, phrases: &mut Vec<NounPhrase>) {
    if let Some(noun) = buffer.pop() {
        phrases.push(NounPhrase {
            noun,
            adjectives: std::mem::take(buffer),
        });
    }
}

pub fn parse(tokens: &[Token]) -> ParsedCommand {
    let mut cmd = ParsedCommand::default();
    if tokens.is_empty() {
        return cmd;
    }

    if tokens.len() == 1 && tokens[0].kind == TokenKind::Direction {
        cmd.verb = Some(Atom::intern("WALK"));
        cmd.direction = Some(tokens[0].word);
        return cmd;
    }

    let mut rest = tokens;
    match tokens[0].kind {
        TokenKind::Verb => {
            cmd.verb = Some(tokens[0].word);
            rest = &tokens[1..];
        }
        TokenKind::Direction => {
            cmd.verb = Some(Atom::intern("WALK"));
            cmd.direction = Some(tokens[0].word);
            rest = &tokens[1..];
        }
        _ => {}
    }

    let mut buffer = Vec::new();
    let mut preposition_set = false;
    for token in rest {
        match token.kind {
            TokenKind::Preposition if !preposition_set => {
                close_phrase(&mut buffer, &mut cmd.noun_phrases);
                cmd.preposition = Some(token.word);
                preposition_set = true;
            }
            TokenKind::Direction => {
                close_phrase(&mut buffer, &mut cmd.noun_phrases);
                cmd.noun_phrases.push(NounPhrase {
                    noun: token.word,
                    adjectives: Vec::new(),
                });
            }
            _ => buffer.push(token.word),
        }
    }
    close_phrase(&mut buffer, &mut cmd.noun_phrases);
    cmd
}
