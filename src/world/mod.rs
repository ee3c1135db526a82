//! The populated game world: objects, globals, tables, and the vocabulary
//! tables the Directive Processor materializes (§3, §4.4).

pub mod object;
pub mod table;

pub use object::{Flag, GameObject};
pub use table::Table;

use crate::ast::{Ast, Param};
use crate::atom::Atom;
use crate::value::{ObjectHandle, TableHandle, Value};
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};

#[derive(Debug, Clone)]
pub struct RoutineDef {
    pub name: Atom,
    pub params: Vec<Param>,
    pub body: Vec<Ast>,
}

#[derive(Debug, Clone)]
pub struct SyntaxEntry {
    pub verb: Atom,
    pub action: Atom,
    pub preaction: Option<Atom>,
    pub object_count: usize,
    pub prepositions: Vec<Atom>,
    pub constraints: Vec<Vec<Atom>>,
}

#[derive(Default)]
pub struct World {
    pub objects: IndexMap<Atom, GameObject>,
    pub globals: IndexMap<Atom, Value>,
    pub constants: IndexMap<Atom, Value>,
    pub property_defaults: IndexMap<Atom, Value>,
    pub directions: Vec<Atom>,
    direction_set: IndexSet<Atom>,
    pub buzz_words: IndexSet<Atom>,
    pub synonyms: IndexMap<Atom, Atom>,
    pub syntax_table: IndexMap<Atom, Vec<SyntaxEntry>>,
    pub tables: IndexMap<Atom, Table>,
    pub routines: IndexMap<Atom, RoutineDef>,
    anon_table_counter: u32,
}

impl World {
    pub fn new() -> Self {
        World::default()
    }

    // -- objects ----------------------------------------------------------

    pub fn define_object(&mut self, obj: GameObject) {
        self.objects.insert(obj.name, obj);
    }

    pub fn get_object(&self, handle: ObjectHandle) -> Option<&GameObject> {
        self.objects.get(&handle.0)
    }

    pub fn get_object_mut(&mut self, handle: ObjectHandle) -> Option<&mut GameObject> {
        self.objects.get_mut(&handle.0)
    }

    pub fn object_by_name(&self, name: Atom) -> Option<ObjectHandle> {
        self.objects.contains_key(&name).then_some(ObjectHandle(name))
    }

    /// Detach `obj` from its current parent (if any) and attach it under
    /// `new_parent`, atomically (§3: "`move_to(p)` detaches from the
    /// previous parent atomically"). `new_parent = None` implements REMOVE.
    pub fn move_object(&mut self, obj: ObjectHandle, new_parent: Option<ObjectHandle>) -> Result<(), String> {
        if Some(obj) == new_parent {
            return Err(format!("cannot make {} its own parent", obj.0));
        }
        if let Some(old_parent) = self.objects.get(&obj.0).and_then(|o| o.parent) {
            if let Some(op) = self.objects.get_mut(&old_parent) {
                op.children.retain(|c| *c != obj.0);
            }
        }
        match new_parent {
            Some(p) => {
                if !self.objects.contains_key(&p.0) {
                    return Err(format!("unknown-object: {}", p.0));
                }
                self.objects.get_mut(&p.0).unwrap().children.push(obj.0);
            }
            None => {}
        }
        if let Some(o) = self.objects.get_mut(&obj.0) {
            o.parent = new_parent.map(|h| h.0);
        }
        Ok(())
    }

    pub fn next_sibling(&self, obj: ObjectHandle) -> Option<ObjectHandle> {
        let parent = self.objects.get(&obj.0)?.parent?;
        let siblings = &self.objects.get(&parent)?.children;
        let idx = siblings.iter().position(|c| *c == obj.0)?;
        siblings.get(idx + 1).map(|a| ObjectHandle(*a))
    }

    pub fn prev_sibling(&self, obj: ObjectHandle) -> Option<ObjectHandle> {
        let parent = self.objects.get(&obj.0)?.parent?;
        let siblings = &self.objects.get(&parent)?.children;
        let idx = siblings.iter().position(|c| *c == obj.0)?;
        idx.checked_sub(1).and_then(|i| siblings.get(i)).map(|a| ObjectHandle(*a))
    }

    pub fn first_child(&self, obj: ObjectHandle) -> Option<ObjectHandle> {
        self.objects.get(&obj.0)?.children.first().map(|a| ObjectHandle(*a))
    }

    /// Climbs parents until an object with the ROOM flag is found (§4.5 `META-LOC`).
    pub fn meta_loc(&self, obj: ObjectHandle) -> Option<ObjectHandle> {
        let mut current = obj;
        loop {
            let o = self.objects.get(&current.0)?;
            if o.has_flag(Flag::RoomBit) {
                return Some(current);
            }
            current = ObjectHandle(o.parent?);
        }
    }

    // -- globals / constants ------------------------------------------------

    pub fn get_global(&self, name: Atom) -> Option<&Value> {
        self.globals.get(&name)
    }

    pub fn set_global(&mut self, name: Atom, value: Value) {
        self.globals.insert(name, value);
    }

    pub fn get_constant(&self, name: Atom) -> Option<&Value> {
        self.constants.get(&name)
    }

    // -- tables --------------------------------------------------------------

    pub fn define_table(&mut self, table: Table) -> TableHandle {
        let handle = TableHandle(table.name);
        self.tables.insert(table.name, table);
        handle
    }

    pub fn get_table(&self, handle: TableHandle) -> Option<&Table> {
        self.tables.get(&handle.0)
    }

    pub fn get_table_mut(&mut self, handle: TableHandle) -> Option<&mut Table> {
        self.tables.get_mut(&handle.0)
    }

    /// `TABLE`/`LTABLE`/`ITABLE` construct anonymous tables; each gets a
    /// synthetic name so it can still live in the same `tables` map as
    /// source-declared ones.
    pub fn fresh_table_name(&mut self) -> Atom {
        self.anon_table_counter += 1;
        Atom::intern(&format!("$TABLE-{}", self.anon_table_counter))
    }

    // -- vocabulary ------------------------------------------------------------

    pub fn set_directions(&mut self, dirs: Vec<Atom>) {
        self.direction_set = dirs.iter().copied().collect();
        self.directions = dirs;
    }

    pub fn is_direction(&self, a: Atom) -> bool {
        self.direction_set.contains(&a)
    }

    pub fn add_buzz_words(&mut self, words: impl IntoIterator<Item = Atom>) {
        self.buzz_words.extend(words);
    }

    pub fn add_synonym(&mut self, primary: Atom, alias: Atom) {
        self.synonyms.entry(primary).or_insert(primary);
        self.synonyms.insert(alias, primary);
    }

    pub fn resolve_synonym(&self, word: Atom) -> Atom {
        self.synonyms.get(&word).copied().unwrap_or(word)
    }

    pub fn add_syntax_entry(&mut self, entry: SyntaxEntry) {
        debug!("registering syntax entry for verb {}", entry.verb);
        self.syntax_table.entry(entry.verb).or_default().push(entry);
    }

    pub fn syntax_entries(&self, verb: Atom) -> &[SyntaxEntry] {
        self.syntax_table.get(&verb).map(Vec::as_slice).unwrap_or(&[])
    }

    // -- routines ------------------------------------------------------------

    pub fn define_routine(&mut self, def: RoutineDef) {
        if self.routines.contains_key(&def.name) {
            warn!("redefining routine {}", def.name);
        }
        self.routines.insert(def.name, def);
    }

    pub fn get_routine(&self, name: Atom) -> Option<&RoutineDef> {
        self.routines.get(&name)
    }

    /// Restores the world's mutable sections (globals, object parent chain,
    /// flags, properties, tables) while leaving routines and macros alone —
    /// they are rebuilt from source, per §6.
    pub fn reset_mutable_state(&mut self, fresh: World) {
        self.objects = fresh.objects;
        self.globals = fresh.globals;
        self.tables = fresh.tables;
    }
}
