//! Comparison operations (§4.5): numeric ordering plus `EQUAL?`'s
//! multi-comparand match-any semantics.

use super::arg;
use crate::evaluator::{EvalResult, Evaluator};
use crate::value::Value;

pub fn dispatch(_ev: &mut Evaluator, name: &str, args: &[Value]) -> Option<EvalResult> {
    match name {
        "L?" | "<" => Some(Ok(Value::Boolean(arg(args, 0).as_number() < arg(args, 1).as_number()))),
        "G?" | ">" => Some(Ok(Value::Boolean(arg(args, 0).as_number() > arg(args, 1).as_number()))),
        "L=?" | "<=" => Some(Ok(Value::Boolean(arg(args, 0).as_number() <= arg(args, 1).as_number()))),
        "G=?" | ">=" => Some(Ok(Value::Boolean(arg(args, 0).as_number() >= arg(args, 1).as_number()))),
        "==?" | "==" => Some(Ok(Value::Boolean(arg(args, 0).as_number() == arg(args, 1).as_number()))),
        "EQUAL?" => {
            let head = arg(args, 0);
            let rest = args.get(1..).unwrap_or(&[]);
            Some(Ok(Value::Boolean(rest.iter().any(|v| *v == head))))
        }
        "EMPTY?" => Some(Ok(Value::Boolean(match arg(args, 0) {
            Value::List(items) => items.is_empty(),
            Value::String(s) => s.is_empty(),
            Value::Nil => true,
            _ => false,
        }))),
        "LENGTH?" => {
            let want = arg(args, 1).as_number();
            let actual = list_or_string_len(&arg(args, 0));
            Some(Ok(Value::Boolean(actual as i16 == want)))
        }
        "MEMQ" | "ZMEMQ" => {
            let needle = arg(args, 0);
            let found = arg(args, 1).as_list().unwrap_or(&[]).iter().any(|v| *v == needle);
            Some(Ok(Value::Boolean(found)))
        }
        _ => None,
    }
}

fn list_or_string_len(v: &Value) -> usize {
    match v {
        Value::List(items) => items.len(),
        Value::String(s) => s.len(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use crate::value::Value;

    #[test]
    fn ordering_operators() {
        assert_eq!(run("<ROUTINE GO () <G? 3 2>>"), Value::Boolean(true));
        assert_eq!(run("<ROUTINE GO () <L? 3 2>>"), Value::Boolean(false));
        assert_eq!(run("<ROUTINE GO () <G=? 3 3>>"), Value::Boolean(true));
    }

    #[test]
    fn equal_matches_any_comparand() {
        assert_eq!(run("<ROUTINE GO () <EQUAL? 3 1 2 3>>"), Value::Boolean(true));
        assert_eq!(run("<ROUTINE GO () <EQUAL? 3 1 2>>"), Value::Boolean(false));
    }

    #[test]
    fn empty_on_empty_and_nonempty_list() {
        assert_eq!(run("<ROUTINE GO () <EMPTY? ()>>"), Value::Boolean(true));
        assert_eq!(run(r#"<ROUTINE GO () <EMPTY? (1 2)>>"#), Value::Boolean(false));
    }
}
