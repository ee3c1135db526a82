//! Interrupt Manager (§4.11): a map of named, turn-counted timers.

use crate::atom::Atom;
use indexmap::IndexMap;
use log::debug;

#[derive(Debug, Clone)]
pub struct Interrupt {
    pub routine: Atom,
    pub turns_remaining: i16,
    pub enabled: bool,
}

#[derive(Default)]
pub struct InterruptManager {
    interrupts: IndexMap<Atom, Interrupt>,
}

impl InterruptManager {
    pub fn new() -> Self {
        InterruptManager::default()
    }

    pub fn queue(&mut self, name: Atom, routine: Atom, turns: i16) {
        self.interrupts.insert(
            name,
            Interrupt {
                routine,
                turns_remaining: turns,
                enabled: true,
            },
        );
    }

    pub fn enable(&mut self, name: Atom) -> bool {
        match self.interrupts.get_mut(&name) {
            Some(i) => {
                i.enabled = true;
                true
            }
            None => false,
        }
    }

    pub fn disable(&mut self, name: Atom) -> bool {
        match self.interrupts.get_mut(&name) {
            Some(i) => {
                i.enabled = false;
                true
            }
            None => false,
        }
    }

    pub fn dequeue(&mut self, name: Atom) -> bool {
        self.interrupts.shift_remove(&name).is_some()
    }

    /// Decrements every enabled interrupt by one turn; any that reach zero
    /// are removed and their routines returned for the host to invoke.
    pub fn tick(&mut self) -> Vec<Atom> {
        let mut fired = Vec::new();
        let mut expired = Vec::new();
        for (name, interrupt) in self.interrupts.iter_mut() {
            if !interrupt.enabled {
                continue;
            }
            interrupt.turns_remaining -= 1;
            if interrupt.turns_remaining <= 0 {
                fired.push(interrupt.routine);
                expired.push(*name);
            }
        }
        for name in &expired {
            debug!("interrupt {name} expired");
            self.interrupts.shift_remove(name);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_fires_after_its_turn_count() {
        let mut mgr = InterruptManager::new();
        mgr.queue(Atom::intern("I-LANTERN"), Atom::intern("LANTERN-OUT"), 2);
        assert!(mgr.tick().is_empty());
        assert_eq!(mgr.tick(), vec![Atom::intern("LANTERN-OUT")]);
        assert!(mgr.tick().is_empty());
    }

    #[test]
    fn disabled_interrupt_does_not_decrement() {
        let mut mgr = InterruptManager::new();
        mgr.queue(Atom::intern("I-X"), Atom::intern("R-X"), 1);
        mgr.disable(Atom::intern("I-X"));
        assert!(mgr.tick().is_empty());
        mgr.enable(Atom::intern("I-X"));
        assert_eq!(mgr.tick(), vec![Atom::intern("R-X")]);
    }
}
