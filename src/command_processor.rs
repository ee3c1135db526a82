//! Command Processor (§4.10): orchestrates the lexer, parser, syntax-table
//! match, and object resolver into one turn, binding the `PRSA`/`PRSO`/`PRSI`
//! action globals for the host to then dispatch.

use crate::atom::Atom;
use crate::command_lexer::tokenize;
use crate::command_parser::{parse, ParsedCommand};
use crate::resolver::{self, ResolveError};
use crate::value::{ObjectHandle, Value};
use crate::world::{SyntaxEntry, World};

#[derive(Debug, Clone)]
pub enum TurnOutcome {
    Success { action: Atom, direct: Option<ObjectHandle>, indirect: Option<ObjectHandle> },
    Unrecognized(String),
}

fn matching_entry<'a>(entries: &'a [SyntaxEntry], parsed: &ParsedCommand) -> Option<&'a SyntaxEntry> {
    entries.iter().find(|e| {
        e.object_count == parsed.object_count()
            && (e.object_count < 2
                || match parsed.preposition {
                    Some(p) => e.prepositions.contains(&p),
                    None => true,
                })
    })
}

fn resolve_noun(world: &World, noun: Atom, adjectives: &[Atom], here: ObjectHandle) -> Result<ObjectHandle, String> {
    match resolver::resolve(world, noun, adjectives, here) {
        Ok(obj) => Ok(obj),
        Err(ResolveError::NotFound) => Err(format!("I don't see any {} here.", noun.name())),
        Err(ResolveError::NotAccessible) => Err(format!("You can't reach the {} from here.", noun.name())),
        Err(ResolveError::Disambiguate(candidates)) => {
            let names: Vec<String> = candidates
                .iter()
                .filter_map(|&h| world.get_object(h))
                .map(|o| o.name.name())
                .collect();
            Err(format!("Which do you mean: {}?", names.join(", ")))
        }
    }
}

pub fn process_turn(world: &mut World, line: &str) -> TurnOutcome {
    let tokens = tokenize(world, line);
    if tokens.is_empty() {
        return TurnOutcome::Unrecognized("I beg your pardon?".into());
    }
    let parsed = parse(&tokens);

    let Some(verb) = parsed.verb else {
        return TurnOutcome::Unrecognized("I don't understand that.".into());
    };

    if verb.eq_str("WALK") && parsed.object_count() == 0 {
        world.set_global(Atom::intern("PRSA"), Value::Atom(Atom::intern("V-WALK")));
        if let Some(dir) = parsed.direction {
            world.set_global(Atom::intern("P-DIR"), Value::Atom(dir));
        }
        return TurnOutcome::Success { action: Atom::intern("V-WALK"), direct: None, indirect: None };
    }

    let entries = world.syntax_entries(verb);
    let Some(entry) = matching_entry(entries, &parsed) else {
        return TurnOutcome::Unrecognized(format!(
            "I don't understand how to use '{}' that way.",
            verb.name()
        ));
    };

    let here = world
        .get_global(Atom::intern("HERE"))
        .and_then(|v| v.as_object());
    let Some(here) = here else {
        return TurnOutcome::Unrecognized("You are nowhere.".into());
    };

    let mut resolved = Vec::new();
    for phrase in &parsed.noun_phrases {
        match resolve_noun(world, phrase.noun, &phrase.adjectives, here) {
            Ok(obj) => resolved.push(obj),
            Err(msg) => return TurnOutcome::Unrecognized(msg),
        }
    }

    let direct = resolved.first().copied();
    let indirect = resolved.get(1).copied();
    let action = entry.action;

    world.set_global(Atom::intern("PRSA"), Value::Atom(action));
    world.set_global(
        Atom::intern("PRSO"),
        direct.map(Value::Object).unwrap_or(Value::Nil),
    );
    world.set_global(
        Atom::intern("PRSI"),
        indirect.map(Value::Object).unwrap_or(Value::Nil),
    );

    TurnOutcome::Success { action, direct, indirect }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives;
    use crate::macros::MacroRegistry;
    use crate::reader::read;

    fn world(src: &str) -> World {
        let forms = read(src).unwrap();
        let mut reg = MacroRegistry::new();
        let expanded = reg.expand_program(forms).unwrap();
        let mut w = World::new();
        directives::process(expanded, &mut w).unwrap();
        directives::link_object_parents(&mut w).unwrap();
        w
    }

    fn basic_world() -> World {
        let mut w = world(
            r#"
            <OBJECT ROOM1 (DESC "Room") (FLAGS ROOMBIT)>
            <OBJECT LAMP (IN ROOM1) (SYNONYM LAMP) (ADJECTIVE BRASS) (FLAGS TAKEBIT)>
            <OBJECT CASE (IN ROOM1) (SYNONYM CASE) (ADJECTIVE WOODEN) (FLAGS CONTBIT OPENBIT)>
            "#,
        );
        w.set_directions(vec![Atom::intern("NORTH")]);
        w.add_syntax_entry(SyntaxEntry {
            verb: Atom::intern("TAKE"),
            action: Atom::intern("V-TAKE"),
            preaction: None,
            object_count: 1,
            prepositions: vec![],
            constraints: vec![vec![]],
        });
        w.add_syntax_entry(SyntaxEntry {
            verb: Atom::intern("PUT"),
            action: Atom::intern("V-PUT"),
            preaction: None,
            object_count: 2,
            prepositions: vec![Atom::intern("IN")],
            constraints: vec![vec![], vec![]],
        });
        let room = w.object_by_name(Atom::intern("ROOM1")).unwrap();
        w.set_global(Atom::intern("HERE"), Value::Object(room));
        w
    }

    #[test]
    fn resolves_brass_lamp_and_wooden_case() {
        let mut w = basic_world();
        let outcome = process_turn(&mut w, "put the brass lamp in the wooden case");
        match outcome {
            TurnOutcome::Success { action, direct, indirect } => {
                assert_eq!(action, Atom::intern("V-PUT"));
                assert_eq!(direct, w.object_by_name(Atom::intern("LAMP")));
                assert_eq!(indirect, w.object_by_name(Atom::intern("CASE")));
            }
            TurnOutcome::Unrecognized(msg) => panic!("expected success, got {msg}"),
        }
    }

    #[test]
    fn bare_direction_walks() {
        let mut w = basic_world();
        let outcome = process_turn(&mut w, "north");
        assert!(matches!(outcome, TurnOutcome::Success { action, .. } if action == Atom::intern("V-WALK")));
        assert_eq!(w.get_global(Atom::intern("P-DIR")), Some(&Value::Atom(Atom::intern("NORTH"))));
    }

    #[test]
    fn unknown_verb_is_unrecognized() {
        let mut w = basic_world();
        let outcome = process_turn(&mut w, "xyzzy");
        assert!(matches!(outcome, TurnOutcome::Unrecognized(_)));
    }
}
