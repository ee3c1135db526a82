//! Routine call protocol (§4.6): parameter classification already happened
//! in [`crate::reader::transform`] (separator atoms `OPTIONAL`/`AUX`/`ARGS`);
//! this module only binds a call's arguments into a fresh scope.

use crate::ast::{Param, ParamKind};
use crate::evaluator::{fail, EvalResult, Evaluator, Signal};
use crate::value::Value;

/// Binds `caller_args` into the evaluator's current (freshly pushed) scope
/// per each parameter's kind (§4.6). Errors on missing required arguments.
pub fn bind_params(ev: &mut Evaluator, params: &[Param], caller_args: Vec<Value>) -> Result<(), Signal> {
    let mut args = caller_args.into_iter();
    for p in params {
        match p.kind {
            ParamKind::Required => {
                let value = args
                    .next()
                    .ok_or_else(|| fail(&format!("missing required argument: {}", p.name)))?;
                ev.bind_local(p.name, value);
            }
            ParamKind::Optional => {
                let value = match args.next() {
                    Some(v) => v,
                    None => eval_default(ev, p)?,
                };
                ev.bind_local(p.name, value);
            }
            ParamKind::Aux => {
                let value = eval_default(ev, p)?;
                ev.bind_local(p.name, value);
            }
            ParamKind::Args => {
                let rest: Vec<Value> = args.by_ref().collect();
                ev.bind_local(p.name, Value::list(rest));
            }
        }
    }
    Ok(())
}

fn eval_default(ev: &mut Evaluator, p: &Param) -> EvalResult {
    match &p.default {
        Some(expr) => ev.eval(expr),
        None => Ok(Value::Nil),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::directives;
    use crate::macros::MacroRegistry;
    use crate::reader::read;
    use crate::world::World;

    fn run(src: &str) -> Value {
        let forms = read(src).unwrap();
        let mut reg = MacroRegistry::new();
        let expanded = reg.expand_program(forms).unwrap();
        let mut world = World::new();
        directives::process(expanded, &mut world).unwrap();
        let mut ev = Evaluator::with_seed(&mut world, false, 1);
        ev.call_routine(Atom::intern("GO"), vec![Value::Number(5)]).unwrap()
    }

    #[test]
    fn optional_param_falls_back_to_default() {
        let v = run("<ROUTINE GO (X OPTIONAL (Y 99)) <+ .X .Y>>");
        assert_eq!(v, Value::Number(104));
    }

    #[test]
    fn args_param_captures_remaining_arguments() {
        let v = run("<ROUTINE GO (X AUX (Z 1) ARGS REST) <LENGTH .REST>>");
        assert_eq!(v, Value::Number(0));
    }
}
