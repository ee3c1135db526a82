//! List construction and access operations (§4.5).

use super::arg;
use crate::evaluator::{fail, EvalResult, Evaluator};
use crate::value::Value;

pub fn dispatch(_ev: &mut Evaluator, name: &str, args: &[Value]) -> Option<EvalResult> {
    match name {
        "LIST" => Some(Ok(Value::list(args.to_vec()))),
        "NTH" => {
            let items = arg(args, 0);
            let idx = arg(args, 1).as_number();
            Some(Ok(match items {
                Value::List(items) if idx >= 1 => {
                    items.get(idx as usize - 1).cloned().unwrap_or(Value::falsy())
                }
                Value::String(s) if idx >= 1 => s
                    .chars()
                    .nth(idx as usize - 1)
                    .map(|c| Value::Number(c as i16))
                    .unwrap_or(Value::falsy()),
                _ => Value::falsy(),
            }))
        }
        "REST" => {
            let n = arg(args, 1);
            let skip = if matches!(n, Value::Nil) { 1 } else { n.as_number().max(0) as usize };
            Some(Ok(match arg(args, 0) {
                Value::List(items) => Value::list(items.iter().skip(skip).cloned().collect()),
                Value::String(s) => Value::string(s.chars().skip(skip).collect::<String>()),
                other => other,
            }))
        }
        "PUTREST" => match arg(args, 0) {
            Value::List(_) => {
                let tail = arg(args, 1).as_list().unwrap_or(&[]).to_vec();
                Some(Ok(Value::list(tail)))
            }
            _ => Some(Err(fail("PUTREST requires a list"))),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use crate::value::Value;

    #[test]
    fn nth_is_one_indexed() {
        assert_eq!(run("<ROUTINE GO () <NTH (10 20 30) 2>>"), Value::Number(20));
    }

    #[test]
    fn rest_defaults_to_skipping_one() {
        assert_eq!(run("<ROUTINE GO () <REST (1 2 3)>>"), Value::list(vec![Value::Number(2), Value::Number(3)]));
    }

    #[test]
    fn list_builds_from_evaluated_args() {
        assert_eq!(
            run("<ROUTINE GO () <LIST 1 2 3>>"),
            Value::list(vec![Value::Number(1), Value::Number(2), Value::Number(3)])
        );
    }
}
