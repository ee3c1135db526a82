//! Serializer (§4.12, §6): captures globals, object state, and tables into
//! a JSON document. Routines and macros are never serialized — they are
//! rebuilt from source on restore.

use crate::atom::Atom;
use crate::value::Value;
use crate::world::object::{Flag, GameObject};
use crate::world::{Table, World};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize)]
pub struct SaveDocument {
    globals: HashMap<String, JsonValue>,
    objects: HashMap<String, SavedObject>,
    tables: HashMap<String, Vec<i16>>,
}

#[derive(Serialize, Deserialize)]
struct SavedObject {
    parent: Option<String>,
    children: Vec<String>,
    flags: Vec<String>,
    properties: HashMap<String, JsonValue>,
}

/// A JSON-friendly mirror of [`Value`]; Object/Table handles round-trip as
/// their atom name, re-resolved against the restored world on load.
#[derive(Serialize, Deserialize, Clone)]
#[serde(tag = "type", content = "value")]
enum JsonValue {
    Number(i16),
    String(String),
    Atom(String),
    List(Vec<JsonValue>),
    Object(String),
    Table(String),
    Boolean(bool),
    Nil,
}

fn value_to_json(v: &Value) -> JsonValue {
    match v {
        Value::Number(n) => JsonValue::Number(*n),
        Value::String(s) => JsonValue::String(s.as_str().to_string()),
        Value::Atom(a) => JsonValue::Atom(a.name()),
        Value::List(items) => JsonValue::List(items.iter().map(value_to_json).collect()),
        Value::Object(h) => JsonValue::Object(h.0.name()),
        Value::Table(h) => JsonValue::Table(h.0.name()),
        Value::Boolean(b) => JsonValue::Boolean(*b),
        Value::Nil => JsonValue::Nil,
        Value::Form(_) => JsonValue::Nil,
    }
}

fn json_to_value(v: &JsonValue) -> Value {
    match v {
        JsonValue::Number(n) => Value::Number(*n),
        JsonValue::String(s) => Value::string(s.clone()),
        JsonValue::Atom(a) => Value::Atom(Atom::intern(a)),
        JsonValue::List(items) => Value::list(items.iter().map(json_to_value).collect()),
        JsonValue::Object(name) => Value::Object(crate::value::ObjectHandle(Atom::intern(name))),
        JsonValue::Table(name) => Value::Table(crate::value::TableHandle(Atom::intern(name))),
        JsonValue::Boolean(b) => Value::Boolean(*b),
        JsonValue::Nil => Value::Nil,
    }
}

fn flag_name(f: &Flag) -> String {
    match f {
        Flag::TakeBit => "TAKEBIT".into(),
        Flag::ContainerBit => "CONTBIT".into(),
        Flag::OpenBit => "OPENBIT".into(),
        Flag::LightBit => "LIGHTBIT".into(),
        Flag::OnBit => "ONBIT".into(),
        Flag::DoorBit => "DOORBIT".into(),
        Flag::SurfaceBit => "SURFACEBIT".into(),
        Flag::RoomBit => "ROOMBIT".into(),
        Flag::InvisibleBit => "INVISIBLE".into(),
        Flag::TouchBit => "TOUCHBIT".into(),
        Flag::NDescBit => "NDESCBIT".into(),
        Flag::VowelBit => "VOWELBIT".into(),
        Flag::Custom(a) => a.name(),
    }
}

pub fn serialize(world: &World) -> SaveDocument {
    let globals = world
        .globals
        .iter()
        .map(|(name, v)| (name.name(), value_to_json(v)))
        .collect();

    let objects = world
        .objects
        .iter()
        .map(|(name, obj)| (name.name(), saved_object(obj)))
        .collect();

    let tables = world
        .tables
        .iter()
        .map(|(name, t)| (name.name(), table_words(t)))
        .collect();

    SaveDocument {
        globals,
        objects,
        tables,
    }
}

fn saved_object(obj: &GameObject) -> SavedObject {
    SavedObject {
        parent: obj.parent.map(|a| a.name()),
        children: obj.children.iter().map(|a| a.name()).collect(),
        flags: obj.flags.iter().map(flag_name).collect(),
        properties: obj
            .properties
            .iter()
            .map(|(p, v)| (p.name(), value_to_json(v)))
            .collect(),
    }
}

fn table_words(t: &Table) -> Vec<i16> {
    (0..t.len() as i16).filter_map(|i| t.get_word(i)).collect()
}

/// Replaces `world`'s mutable sections with the document's contents.
/// Routines, macros, constants, and vocabulary tables are left untouched —
/// they come from source, not the save file.
pub fn deserialize_into(doc: &SaveDocument, world: &mut World) -> Result<(), String> {
    world.globals.clear();
    for (name, v) in &doc.globals {
        world.globals.insert(Atom::intern(name), json_to_value(v));
    }

    for (name, saved) in &doc.objects {
        let atom = Atom::intern(name);
        let obj = world
            .get_object_mut(crate::value::ObjectHandle(atom))
            .ok_or_else(|| format!("save references unknown object: {name}"))?;
        obj.parent = saved.parent.as_deref().map(Atom::intern);
        obj.children = saved.children.iter().map(|c| Atom::intern(c)).collect();
        obj.flags = saved.flags.iter().map(|f| Flag::from_atom(Atom::intern(f))).collect();
        obj.properties = saved
            .properties
            .iter()
            .map(|(p, v)| (Atom::intern(p), json_to_value(v)))
            .collect();
    }

    world.tables.clear();
    for (name, words) in &doc.tables {
        let atom = Atom::intern(name);
        world.define_table(Table::new(atom, words.clone()));
    }
    Ok(())
}

pub fn to_json(doc: &SaveDocument) -> Result<String, String> {
    serde_json::to_string_pretty(doc).map_err(|e| format!("save-encode-error: {e}"))
}

pub fn from_json(text: &str) -> Result<SaveDocument, String> {
    serde_json::from_str(text).map_err(|e| format!("save-decode-error: {e}"))
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
    fn round_trips_through_json() {
        let mut w = world(
            r#"
            <OBJECT ROOM1 (DESC "Room") (FLAGS ROOMBIT)>
            <OBJECT LAMP (IN ROOM1) (FLAGS TAKEBIT) (FDESC "A lamp")>
            <GLOBAL SCORE 0>
            "#,
        );
        w.set_global(Atom::intern("SCORE"), Value::Number(42));

        let doc = serialize(&w);
        let json = to_json(&doc).unwrap();
        let restored_doc = from_json(&json).unwrap();

        let mut fresh = world(
            r#"
            <OBJECT ROOM1 (DESC "Room") (FLAGS ROOMBIT)>
            <OBJECT LAMP (IN ROOM1) (FLAGS TAKEBIT) (FDESC "A lamp")>
            <GLOBAL SCORE 0>
            "#,
        );
        deserialize_into(&restored_doc, &mut fresh).unwrap();

        assert_eq!(fresh.get_global(Atom::intern("SCORE")), Some(&Value::Number(42)));
        let lamp = fresh.object_by_name(Atom::intern("LAMP")).unwrap();
        assert!(fresh.get_object(lamp).unwrap().has_flag(Flag::TakeBit));
    }
}
