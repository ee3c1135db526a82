//! Directive Processor (§4.4): a one-pass scan over the expanded AST that
//! materializes the vocabulary and world tables. Routines and objects are
//! the only forms retained afterward; everything else is consumed.

use crate::ast::Ast;
use crate::atom::Atom;
use crate::value::Value;
use crate::world::object::Flag;
use crate::world::{GameObject, RoutineDef, SyntaxEntry, World};
use log::debug;

pub fn process(forms: Vec<Ast>, world: &mut World) -> Result<(), String> {
    for form in forms {
        process_one(form, world)?;
    }
    Ok(())
}

fn process_one(form: Ast, world: &mut World) -> Result<(), String> {
    match form {
        Ast::Routine { name, params, body } => {
            world.define_routine(RoutineDef { name, params, body });
        }
        Ast::Object { name, properties } => {
            world.define_object(build_object(name, properties)?);
        }
        Ast::Global { name, init } => {
            world.globals.insert(name, eval_constant(&init));
        }
        Ast::Form(op, args) => {
            let Ast::Atom(op_atom) = op.as_ref() else {
                return Ok(());
            };
            match op_atom.name().as_str() {
                "CONSTANT" => process_constant(&args, world)?,
                "PROPDEF" => process_propdef(&args, world)?,
                "DIRECTIONS" => process_directions(&args, world),
                "BUZZ" => process_buzz(&args, world),
                "SYNONYM" => process_synonym(&args, world)?,
                "SYNTAX" => process_syntax(&args, world)?,
                _ => {} // everything else is data the directive processor doesn't own
            }
        }
        _ => {}
    }
    Ok(())
}

/// `<GLOBAL n v>`/`<CONSTANT n v>` share the same literal-or-lazy-form rule.
pub fn eval_constant(node: &Ast) -> Value {
    match node {
        Ast::Number(n) => Value::Number(*n),
        Ast::String(s) => Value::string(s.clone()),
        Ast::Atom(a) if a.eq_str("T") => Value::Boolean(true),
        Ast::Form(op, args) if args.is_empty() => match op.as_ref() {
            Ast::Atom(a) if a.eq_str("FALSE") => Value::Boolean(false),
            _ => Value::Form(std::rc::Rc::new(node.clone())),
        },
        _ => Value::Form(std::rc::Rc::new(node.clone())),
    }
}

fn process_constant(args: &[Ast], world: &mut World) -> Result<(), String> {
    let (Some(Ast::Atom(name)), Some(value)) = (args.first(), args.get(1)) else {
        return Err("CONSTANT requires a name and a value".into());
    };
    world.constants.insert(*name, eval_constant(value));
    Ok(())
}

fn process_propdef(args: &[Ast], world: &mut World) -> Result<(), String> {
    let (Some(Ast::Atom(name)), Some(value)) = (args.first(), args.get(1)) else {
        return Err("PROPDEF requires a property name and a default".into());
    };
    world.property_defaults.insert(*name, eval_constant(value));
    Ok(())
}

fn process_directions(args: &[Ast], world: &mut World) {
    let dirs: Vec<Atom> = args.iter().filter_map(atom_of).collect();
    debug!("registered {} directions", dirs.len());
    world.set_directions(dirs);
}

fn process_buzz(args: &[Ast], world: &mut World) {
    world.add_buzz_words(args.iter().filter_map(atom_of));
}

fn process_synonym(args: &[Ast], world: &mut World) -> Result<(), String> {
    let Some(primary) = args.first().and_then(atom_of) else {
        return Err("SYNONYM requires a primary atom".into());
    };
    for alias in &args[1..] {
        let Some(alias) = atom_of(alias) else {
            return Err("SYNONYM aliases must be atoms".into());
        };
        world.add_synonym(primary, alias);
    }
    Ok(())
}

/// `<SYNTAX verb OBJECT [(c...)] [prep OBJECT [(c...)]] = action [preaction]>`
fn process_syntax(args: &[Ast], world: &mut World) -> Result<(), String> {
    let Some(verb) = args.first().and_then(atom_of) else {
        return Err("SYNTAX requires a verb".into());
    };
    let eq_pos = args
        .iter()
        .position(|a| matches!(a, Ast::Atom(x) if x.eq_str("=")))
        .ok_or("SYNTAX requires '='")?;

    let mut object_count = 0usize;
    let mut prepositions = Vec::new();
    let mut constraints: Vec<Vec<Atom>> = Vec::new();
    let mut i = 1;
    while i < eq_pos {
        match &args[i] {
            Ast::Atom(a) if a.eq_str("OBJECT") => {
                object_count += 1;
                constraints.push(Vec::new());
                i += 1;
                if let Some(Ast::List(c)) = args.get(i) {
                    if let Some(last) = constraints.last_mut() {
                        *last = c.iter().filter_map(atom_of).collect();
                    }
                    i += 1;
                }
            }
            Ast::Atom(a) => {
                prepositions.push(*a);
                i += 1;
            }
            _ => i += 1,
        }
    }

    let after: Vec<&Ast> = args[eq_pos + 1..].iter().collect();
    let action = after.first().and_then(|a| atom_of(a)).ok_or("SYNTAX requires an action atom")?;
    let preaction = after.get(1).and_then(|a| atom_of(a));

    world.add_syntax_entry(SyntaxEntry {
        verb,
        action,
        preaction,
        object_count,
        prepositions,
        constraints,
    });
    Ok(())
}

fn atom_of(a: &Ast) -> Option<Atom> {
    match a {
        Ast::Atom(a) | Ast::QuotedAtom(a) | Ast::GlobalRef(a) | Ast::LocalRef(a) => Some(*a),
        _ => None,
    }
}

fn build_object(name: Atom, properties: Vec<(Atom, Vec<Ast>)>) -> Result<GameObject, String> {
    let mut obj = GameObject::new(name);
    for (pname, values) in properties {
        match pname.name().as_str() {
            "DESC" => {
                if let Some(Ast::String(s)) = values.first() {
                    obj.desc = Some(s.clone());
                }
            }
            "FLAGS" => {
                for v in &values {
                    if let Some(a) = atom_of(v) {
                        obj.set_flag(Flag::from_atom(a));
                    }
                }
            }
            "IN" | "LOC" => {
                // Parent linkage is resolved by the caller once every object
                // exists; stash it as a plain property for now and let the
                // world-builder wire parents up in a second pass.
                if let Some(a) = values.first().and_then(atom_of) {
                    obj.properties.insert(pname, Value::Atom(a));
                }
            }
            "SYNONYM" => {
                obj.synonyms = values.iter().filter_map(atom_of).collect();
            }
            "ADJECTIVE" | "ADJECTIVES" => {
                obj.adjectives = values.iter().filter_map(atom_of).collect();
            }
            "ACTION" => {
                obj.action = values.first().and_then(atom_of);
            }
            _ => {
                let value = values_to_value(&values);
                obj.properties.insert(pname, value);
            }
        }
    }
    Ok(obj)
}

fn values_to_value(values: &[Ast]) -> Value {
    if values.len() == 1 {
        ast_literal_value(&values[0])
    } else {
        Value::list(values.iter().map(ast_literal_value).collect())
    }
}

fn ast_literal_value(a: &Ast) -> Value {
    match a {
        Ast::Number(n) => Value::Number(*n),
        Ast::String(s) => Value::string(s.clone()),
        Ast::Atom(a) | Ast::QuotedAtom(a) | Ast::GlobalRef(a) => Value::Atom(*a),
        _ => Value::Form(std::rc::Rc::new(a.clone())),
    }
}

/// Second pass: wires object parents from their `IN`/`LOC` property now
/// that every named object exists. The directive processor can't do this
/// inline because it processes objects (and the rooms they reference) in
/// source order, not dependency order.
pub fn link_object_parents(world: &mut World) -> Result<(), String> {
    let names: Vec<Atom> = world.objects.keys().copied().collect();
    for name in names {
        let parent_name = world
            .objects
            .get(&name)
            .and_then(|o| o.properties.get(&Atom::intern("IN")).or_else(|| o.properties.get(&Atom::intern("LOC"))))
            .and_then(|v| v.as_atom());
        if let Some(parent_name) = parent_name {
            if world.objects.contains_key(&parent_name) {
                world.move_object(
                    crate::value::ObjectHandle(name),
                    Some(crate::value::ObjectHandle(parent_name)),
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::MacroRegistry;
    use crate::reader::read;

    fn build(src: &str) -> World {
        let forms = read(src).unwrap();
        let mut reg = MacroRegistry::new();
        let expanded = reg.expand_program(forms).unwrap();
        let mut world = World::new();
        process(expanded, &mut world).unwrap();
        link_object_parents(&mut world).unwrap();
        world
    }

    #[test]
    fn synonym_directive_maps_aliases_to_primary() {
        let world = build("<SYNONYM LAMP LANTERN LANTHORN>");
        assert_eq!(world.resolve_synonym(Atom::intern("LANTERN")), Atom::intern("LAMP"));
        assert_eq!(world.resolve_synonym(Atom::intern("LAMP")), Atom::intern("LAMP"));
    }

    #[test]
    fn object_and_room_linkage() {
        let world = build(
            r#"
            <OBJECT ROOM1 (DESC "A Room") (FLAGS ROOMBIT)>
            <OBJECT LAMP (IN ROOM1) (SYNONYM LAMP LANTERN) (ADJECTIVE BRASS) (FLAGS TAKEBIT)>
            "#,
        );
        let room = world.object_by_name(Atom::intern("ROOM1")).unwrap();
        let lamp = world.object_by_name(Atom::intern("LAMP")).unwrap();
        assert_eq!(world.objects[&lamp.0].parent, Some(room.0));
        assert!(world.objects[&room.0].has_flag(Flag::RoomBit));
    }

    #[test]
    fn syntax_entry_parses_two_object_form() {
        let world = build("<SYNTAX PUT OBJECT IN OBJECT = V-PUT>");
        let entries = world.syntax_entries(Atom::intern("PUT"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].object_count, 2);
        assert_eq!(entries[0].prepositions, vec![Atom::intern("IN")]);
        assert_eq!(entries[0].action, Atom::intern("V-PUT"));
    }
}
