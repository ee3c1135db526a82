//! World objects: single-parent tree nodes with a flag bitmap, property
//! map, and vocabulary attributes (§3 "World objects").

use crate::atom::Atom;
use crate::value::Value;
use indexmap::IndexMap;

/// The flag enumeration is open-ended in real ZIL source (games declare
/// their own flags via object property lists), but a fixed core set is
/// reserved because the evaluator and resolver reason about it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    TakeBit,
    ContainerBit,
    OpenBit,
    LightBit,
    OnBit,
    DoorBit,
    SurfaceBit,
    RoomBit,
    InvisibleBit,
    TouchBit,
    NDescBit,
    VowelBit,
    /// Any flag declared in source that isn't one of the reserved core
    /// flags above still needs a stable bit; these are interned lazily.
    Custom(Atom),
}

impl Flag {
    pub fn from_atom(a: Atom) -> Flag {
        match a.name().as_str() {
            "TAKEBIT" | "TAKEABLE" => Flag::TakeBit,
            "CONTBIT" | "CONTAINERBIT" | "CONTAINER" => Flag::ContainerBit,
            "OPENBIT" | "OPEN" => Flag::OpenBit,
            "LIGHTBIT" => Flag::LightBit,
            "ONBIT" => Flag::OnBit,
            "DOORBIT" => Flag::DoorBit,
            "SURFACEBIT" | "SURFACE" => Flag::SurfaceBit,
            "ROOMBIT" | "ROOM" => Flag::RoomBit,
            "INVISIBLE" => Flag::InvisibleBit,
            "TOUCHBIT" => Flag::TouchBit,
            "NDESCBIT" => Flag::NDescBit,
            "VOWELBIT" => Flag::VowelBit,
            _ => Flag::Custom(a),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameObject {
    pub name: Atom,
    pub parent: Option<Atom>,
    /// Insertion-ordered sibling list, matching `NEXT?`/`BACK` semantics
    /// (§3: "children form a doubly-linked sibling list ... iteration
    /// order is insertion order").
    pub children: Vec<Atom>,
    pub flags: std::collections::HashSet<Flag>,
    pub properties: IndexMap<Atom, Value>,
    pub action: Option<Atom>,
    pub synonyms: Vec<Atom>,
    pub adjectives: Vec<Atom>,
    pub desc: Option<String>,
}

impl GameObject {
    pub fn new(name: Atom) -> Self {
        GameObject {
            name,
            parent: None,
            children: Vec::new(),
            flags: std::collections::HashSet::new(),
            properties: IndexMap::new(),
            action: None,
            synonyms: Vec::new(),
            adjectives: Vec::new(),
            desc: None,
        }
    }

    pub fn has_flag(&self, f: Flag) -> bool {
        self.flags.contains(&f)
    }

    pub fn set_flag(&mut self, f: Flag) {
        self.flags.insert(f);
    }

    pub fn clear_flag(&mut self, f: Flag) {
        self.flags.remove(&f);
    }

    pub fn matches_noun(&self, noun: Atom, adjectives: &[Atom]) -> bool {
        self.synonyms.contains(&noun)
            && adjectives.iter().all(|a| self.adjectives.contains(a))
    }
}
