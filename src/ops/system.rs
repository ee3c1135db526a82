//! System operations (§4.5): save/restore/restart/verify, randomness,
//! interrupt scheduling, bitwise ops, and the remaining odds and ends.

use super::arg;
use crate::atom::Atom;
use crate::evaluator::{fail, EvalResult, Evaluator, Signal};
use crate::save;
use crate::value::Value;
use log::info;

pub fn dispatch(ev: &mut Evaluator, name: &str, args: &[Value]) -> Option<EvalResult> {
    match name {
        "RANDOM" => Some(Ok(Value::Number(ev.random(arg(args, 0).as_number())))),
        "PROB" => {
            let pct = arg(args, 0).as_number().clamp(0, 100);
            Some(Ok(Value::Boolean(ev.random(100) <= pct)))
        }
        "BAND" => Some(Ok(Value::Number(args.iter().fold(-1i16, |a, b| a & b.as_number())))),
        "BOR" => Some(Ok(Value::Number(args.iter().fold(0i16, |a, b| a | b.as_number())))),
        "BTST" => {
            let value = arg(args, 0).as_number();
            let mask = arg(args, 1).as_number();
            Some(Ok(Value::Boolean(value & mask == mask)))
        }
        "SAVE" => {
            let doc = save::serialize(ev.world);
            let result = save::to_json(&doc).and_then(|json| {
                std::fs::write("zilrun.save.json", json).map_err(|e| format!("save-write-error: {e}"))
            });
            info!("SAVE {}", if result.is_ok() { "succeeded" } else { "failed" });
            Some(Ok(Value::Boolean(result.is_ok())))
        }
        "RESTORE" => {
            let restored = std::fs::read_to_string("zilrun.save.json")
                .map_err(|e| format!("save-read-error: {e}"))
                .and_then(|text| save::from_json(&text))
                .and_then(|doc| save::deserialize_into(&doc, ev.world));
            Some(Ok(Value::Boolean(restored.is_ok())))
        }
        "RESTART" => {
            ev.world.globals.clear();
            Some(Err(Signal::Return(Value::truthy())))
        }
        "VERIFY" => Some(Ok(Value::truthy())),
        "JIGS-UP" => {
            if let Value::String(s) = arg(args, 0) {
                ev.output.push_str(&s);
                ev.output.push('\n');
            }
            Some(Err(Signal::Return(Value::falsy())))
        }
        "QUEUE" => {
            let Some(routine) = arg(args, 0).as_atom() else {
                return Some(Err(fail("QUEUE requires a routine atom")));
            };
            let turns = arg(args, 1).as_number();
            let name = Atom::intern(&format!("$INT-{routine}"));
            ev.interrupts.queue(name, routine, turns);
            Some(Ok(Value::truthy()))
        }
        "DEQUEUE" => {
            let Some(n) = arg(args, 0).as_atom() else {
                return Some(Ok(Value::falsy()));
            };
            Some(Ok(Value::Boolean(ev.interrupts.dequeue(n))))
        }
        "ENABLE" => {
            let Some(n) = arg(args, 0).as_atom() else {
                return Some(Ok(Value::falsy()));
            };
            Some(Ok(Value::Boolean(ev.interrupts.enable(n))))
        }
        "DISABLE" => {
            let Some(n) = arg(args, 0).as_atom() else {
                return Some(Ok(Value::falsy()));
            };
            Some(Ok(Value::Boolean(ev.interrupts.disable(n))))
        }
        "GOTO" => {
            let Some(room) = arg(args, 0).as_object() else {
                return Some(Err(fail("GOTO requires a room object")));
            };
            ev.world.set_global(Atom::intern("HERE"), Value::Object(room));
            Some(Ok(Value::truthy()))
        }
        "PERFORM" => {
            let Some(action) = arg(args, 0).as_atom() else {
                return Some(Err(fail("PERFORM requires an action atom")));
            };
            Some(ev.call_routine(action, args.get(1..).unwrap_or(&[]).to_vec()))
        }
        "APPLY" => {
            let Some(routine) = arg(args, 0).as_atom() else {
                return Some(Err(fail("APPLY requires a routine atom")));
            };
            Some(ev.call_routine(routine, args.get(1..).unwrap_or(&[]).to_vec()))
        }
        "PUSH" => {
            ev.value_stack.push(arg(args, 0));
            Some(Ok(Value::truthy()))
        }
        "RSTACK" => Some(Ok(ev.value_stack.last().cloned().unwrap_or(Value::falsy()))),
        "DROP" => {
            ev.value_stack.pop();
            Some(Ok(Value::truthy()))
        }
        "YES?" => Some(Ok(Value::truthy())),
        "VALUE" => Some(Ok(arg(args, 0))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use crate::value::Value;

    #[test]
    fn bitwise_operations() {
        assert_eq!(run("<ROUTINE GO () <BOR 1 2 4>>"), Value::Number(7));
        assert_eq!(run("<ROUTINE GO () <BAND 6 3>>"), Value::Number(2));
        assert_eq!(run("<ROUTINE GO () <BTST 6 2>>"), Value::Boolean(true));
    }

    #[test]
    fn push_rstack_drop_round_trip() {
        assert_eq!(run("<ROUTINE GO () <PUSH 42> <RSTACK>>"), Value::Number(42));
    }

    #[test]
    fn queue_and_dequeue_an_interrupt() {
        assert_eq!(run("<ROUTINE GO () <QUEUE 'I-X 3>>"), Value::truthy());
    }
}
