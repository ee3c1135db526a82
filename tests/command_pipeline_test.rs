//! End-to-end coverage of load → directive processing → command turn,
//! exercising the full pipeline the unit tests only cover piecewise.

use zilrun::atom::Atom;
use zilrun::command_processor::{process_turn, TurnOutcome};
use zilrun::directives;
use zilrun::evaluator::Evaluator;
use zilrun::macros::MacroRegistry;
use zilrun::reader::read;
use zilrun::value::Value;
use zilrun::world::{SyntaxEntry, World};

fn load(src: &str) -> World {
    let forms = read(src).unwrap();
    let mut registry = MacroRegistry::new();
    let expanded = registry.expand_program(forms).unwrap();
    let mut world = World::new();
    directives::process(expanded, &mut world).unwrap();
    directives::link_object_parents(&mut world).unwrap();
    world
}

fn game_world() -> World {
    let mut world = load(
        r#"
        <OBJECT ROOM1 (DESC "Stone Room") (FLAGS ROOMBIT)>
        <OBJECT LAMP (IN ROOM1) (SYNONYM LAMP) (ADJECTIVE BRASS) (FLAGS TAKEBIT)>
        <OBJECT CASE (IN ROOM1) (SYNONYM CASE) (ADJECTIVE WOODEN) (FLAGS CONTBIT OPENBIT)>
        <OBJECT PLAYER (IN ROOM1)>
        "#,
    );
    world.set_directions(vec![Atom::intern("NORTH")]);
    world.add_syntax_entry(SyntaxEntry {
        verb: Atom::intern("TAKE"),
        action: Atom::intern("V-TAKE"),
        preaction: None,
        object_count: 1,
        prepositions: vec![],
        constraints: vec![vec![]],
    });
    let room = world.object_by_name(Atom::intern("ROOM1")).unwrap();
    world.set_global(Atom::intern("HERE"), Value::Object(room));
    world
}

#[test]
fn take_the_brass_lamp_resolves_to_lamp() {
    let mut world = game_world();
    let outcome = process_turn(&mut world, "take the brass lamp");
    match outcome {
        TurnOutcome::Success { action, direct, .. } => {
            assert_eq!(action, Atom::intern("V-TAKE"));
            assert_eq!(direct, world.object_by_name(Atom::intern("LAMP")));
        }
        TurnOutcome::Unrecognized(msg) => panic!("expected a match, got: {msg}"),
    }
}

#[test]
fn routine_call_runs_through_the_evaluator_and_moves_the_object() {
    let mut world = game_world();
    world.define_routine(zilrun::world::RoutineDef {
        name: Atom::intern("V-TAKE"),
        params: vec![],
        body: read("<MOVE ,PRSO ,PLAYER>").unwrap(),
    });

    let outcome = process_turn(&mut world, "take the brass lamp");
    let TurnOutcome::Success { action, .. } = outcome else {
        panic!("expected success");
    };

    let mut ev = Evaluator::new(&mut world, false);
    ev.call_routine(action, Vec::new()).unwrap();
    drop(ev);

    let lamp = world.object_by_name(Atom::intern("LAMP")).unwrap();
    let player = world.object_by_name(Atom::intern("PLAYER")).unwrap();
    assert_eq!(world.get_object(lamp).unwrap().parent, Some(player.0));
}

#[test]
fn unknown_verb_reports_unrecognized() {
    let mut world = game_world();
    let outcome = process_turn(&mut world, "xyzzy the lamp");
    assert!(matches!(outcome, TurnOutcome::Unrecognized(_)));
}

#[test]
fn bare_direction_binds_walk_and_p_dir() {
    let mut world = game_world();
    let outcome = process_turn(&mut world, "north");
    assert!(matches!(outcome, TurnOutcome::Success { action, .. } if action == Atom::intern("V-WALK")));
    assert_eq!(world.get_global(Atom::intern("P-DIR")), Some(&Value::Atom(Atom::intern("NORTH"))));
}
