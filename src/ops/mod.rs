//! Operation registry (§4.5): the ~90 built-in operations, dispatched by
//! case-folded name. Arguments arrive already evaluated; special forms that
//! need raw AST (COND, PROG, SET, …) are handled directly by the evaluator
//! instead of living here.

mod arithmetic;
mod comparison;
mod io;
mod lists;
mod objects;
mod strings;
mod system;
mod tables;

use crate::evaluator::{EvalResult, Evaluator};
use crate::value::Value;

/// Tries each operation group in turn. Returns `None` if `name` names no
/// known operation (the evaluator then falls back to the routine table).
pub fn dispatch(ev: &mut Evaluator, name: &str, args: &[Value]) -> Option<EvalResult> {
    arithmetic::dispatch(ev, name, args)
        .or_else(|| comparison::dispatch(ev, name, args))
        .or_else(|| objects::dispatch(ev, name, args))
        .or_else(|| tables::dispatch(ev, name, args))
        .or_else(|| strings::dispatch(ev, name, args))
        .or_else(|| lists::dispatch(ev, name, args))
        .or_else(|| io::dispatch(ev, name, args))
        .or_else(|| system::dispatch(ev, name, args))
}

pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Nil)
}

/// Shared `<ROUTINE GO () ...>`-running harness for each operation group's
/// inline tests, so they exercise a dispatch the same way the evaluator does.
#[cfg(test)]
pub(crate) mod test_support {
    use crate::atom::Atom;
    use crate::directives;
    use crate::evaluator::Evaluator;
    use crate::macros::MacroRegistry;
    use crate::reader::read;
    use crate::value::Value;
    use crate::world::World;

    pub fn run(src: &str) -> Value {
        let forms = read(src).unwrap();
        let mut reg = MacroRegistry::new();
        let expanded = reg.expand_program(forms).unwrap();
        let mut world = World::new();
        directives::process(expanded, &mut world).unwrap();
        directives::link_object_parents(&mut world).unwrap();
        let mut ev = Evaluator::with_seed(&mut world, false, 1);
        ev.call_routine(Atom::intern("GO"), vec![]).unwrap()
    }
}
