//! Object Resolver (§4.9): turns a noun phrase into a single accessible
//! object, or signals why it couldn't.

use crate::atom::Atom;
use crate::value::ObjectHandle;
use crate::world::object::Flag;
use crate::world::World;

#[derive(Debug, Clone)]
pub enum ResolveError {
    NotFound,
    NotAccessible,
    Disambiguate(Vec<ObjectHandle>),
}

/// An object matches a noun phrase if its synonym set contains the noun
/// and, when adjectives are given, its adjective set contains every one.
pub fn matches(world: &World, obj: ObjectHandle, noun: Atom, adjectives: &[Atom]) -> bool {
    world
        .get_object(obj)
        .is_some_and(|o| o.matches_noun(noun, adjectives))
}

/// Walks the parent chain from `obj` to `here`. A non-container ancestor
/// never blocks visibility (§4.9: "a surface does not hide its contents");
/// a closed container does.
pub fn is_accessible(world: &World, obj: Option<ObjectHandle>, here: Option<ObjectHandle>) -> bool {
    let (Some(obj), Some(here)) = (obj, here) else {
        return false;
    };
    let player = world
        .get_global(Atom::intern("WINNER"))
        .and_then(|v| v.as_object())
        .or_else(|| world.object_by_name(Atom::intern("PLAYER")));

    let mut current = obj;
    loop {
        let Some(node) = world.get_object(current) else {
            return false;
        };
        let Some(parent_atom) = node.parent else {
            return false;
        };
        let parent = ObjectHandle(parent_atom);
        if parent == here || Some(parent) == player {
            return true;
        }
        let parent_obj = world.get_object(parent);
        let blocks = parent_obj.is_some_and(|p| p.has_flag(Flag::ContainerBit) && !p.has_flag(Flag::OpenBit));
        if blocks {
            return false;
        }
        current = parent;
    }
}

pub fn find_matches(world: &World, noun: Atom, adjectives: &[Atom], here: ObjectHandle) -> Vec<ObjectHandle> {
    world
        .objects
        .keys()
        .map(|name| ObjectHandle(*name))
        .filter(|&obj| matches(world, obj, noun, adjectives))
        .filter(|&obj| is_accessible(world, Some(obj), Some(here)))
        .collect()
}

pub fn resolve(
    world: &World,
    noun: Atom,
    adjectives: &[Atom],
    here: ObjectHandle,
) -> Result<ObjectHandle, ResolveError> {
    let mut matches = find_matches(world, noun, adjectives, here);
    match matches.len() {
        0 => Err(ResolveError::NotFound),
        1 => Ok(matches.remove(0)),
        _ => Err(ResolveError::Disambiguate(matches)),
    }
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

    #[test]
    fn surface_does_not_hide_its_contents() {
        let w = world(
            r#"
            <OBJECT ROOM1 (DESC "Room") (FLAGS ROOMBIT)>
            <OBJECT TABLE (IN ROOM1) (FLAGS SURFACEBIT)>
            <OBJECT LAMP (IN TABLE) (SYNONYM LAMP) (FLAGS TAKEBIT)>
            "#,
        );
        let room = w.object_by_name(Atom::intern("ROOM1")).unwrap();
        let lamp = w.object_by_name(Atom::intern("LAMP")).unwrap();
        assert!(is_accessible(&w, Some(lamp), Some(room)));
    }

    #[test]
    fn closed_container_hides_its_contents() {
        let w = world(
            r#"
            <OBJECT ROOM1 (DESC "Room") (FLAGS ROOMBIT)>
            <OBJECT CASE (IN ROOM1) (FLAGS CONTBIT)>
            <OBJECT LAMP (IN CASE) (SYNONYM LAMP) (FLAGS TAKEBIT)>
            "#,
        );
        let room = w.object_by_name(Atom::intern("ROOM1")).unwrap();
        let lamp = w.object_by_name(Atom::intern("LAMP")).unwrap();
        assert!(!is_accessible(&w, Some(lamp), Some(room)));
    }

    #[test]
    fn disambiguation_lists_every_candidate() {
        let w = world(
            r#"
            <OBJECT ROOM1 (DESC "Room") (FLAGS ROOMBIT)>
            <OBJECT LAMP1 (IN ROOM1) (SYNONYM LAMP)>
            <OBJECT LAMP2 (IN ROOM1) (SYNONYM LAMP)>
            "#,
        );
        let room = w.object_by_name(Atom::intern("ROOM1")).unwrap();
        let err = resolve(&w, Atom::intern("LAMP"), &[], room).unwrap_err();
        assert!(matches!(err, ResolveError::Disambiguate(c) if c.len() == 2));
    }
}
