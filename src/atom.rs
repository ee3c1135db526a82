//! Process-wide atom interning.
//!
//! ZIL identifiers are case-folded to upper case on intern and carry no
//! storage beyond their identity, so an [`Atom`] is a small `Copy` handle
//! into a global pool rather than an owned `String`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(u32);

struct InternPool {
    names: Vec<String>,
    ids: HashMap<String, u32>,
}

impl InternPool {
    fn new() -> Self {
        InternPool {
            names: Vec::new(),
            ids: HashMap::new(),
        }
    }

    fn intern(&mut self, raw: &str) -> Atom {
        let key = raw.to_ascii_uppercase();
        if let Some(&id) = self.ids.get(&key) {
            return Atom(id);
        }
        let id = self.names.len() as u32;
        self.names.push(key.clone());
        self.ids.insert(key, id);
        Atom(id)
    }

    fn name(&self, atom: Atom) -> &str {
        &self.names[atom.0 as usize]
    }
}

lazy_static! {
    static ref POOL: Mutex<InternPool> = Mutex::new(InternPool::new());
}

impl Atom {
    /// Intern `raw`, case-folding to upper. Stable for the life of the process.
    pub fn intern(raw: &str) -> Atom {
        POOL.lock().unwrap().intern(raw)
    }

    /// The atom's canonical (upper-case) spelling.
    pub fn name(self) -> String {
        POOL.lock().unwrap().name(self).to_string()
    }

    pub fn eq_str(self, s: &str) -> bool {
        self.name().eq_ignore_ascii_case(s)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_case_insensitive_and_stable() {
        let a = Atom::intern("lamp");
        let b = Atom::intern("LAMP");
        let c = Atom::intern("Lamp");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.name(), "LAMP");
    }

    #[test]
    fn distinct_names_get_distinct_atoms() {
        let a = Atom::intern("LAMP");
        let b = Atom::intern("LANTERN");
        assert_ne!(a, b);
    }
}
