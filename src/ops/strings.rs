//! String operations and the type-predicate/conversion group (§4.5).

use super::arg;
use crate::atom::Atom;
use crate::evaluator::{EvalResult, Evaluator};
use crate::value::Value;

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Number(_) => "FIX",
        Value::String(_) => "STRING",
        Value::Atom(_) => "ATOM",
        Value::List(_) => "LIST",
        Value::Object(_) => "OBJECT",
        Value::Table(_) => "TABLE",
        Value::Boolean(_) => "FALSE",
        Value::Nil => "FALSE",
        Value::Form(_) => "FORM",
    }
}

pub fn dispatch(_ev: &mut Evaluator, name: &str, args: &[Value]) -> Option<EvalResult> {
    match name {
        "STRING" | "CONCAT" => {
            let joined: String = args.iter().map(value_text).collect();
            Some(Ok(Value::string(joined)))
        }
        "SUBSTRING" => {
            let s = value_text(&arg(args, 0));
            let start = arg(args, 1).as_number().max(1) as usize - 1;
            let len = arg(args, 2).as_number();
            let chars: Vec<char> = s.chars().collect();
            let end = if len < 0 {
                chars.len()
            } else {
                (start + len as usize).min(chars.len())
            };
            let slice: String = chars.get(start.min(chars.len())..end).unwrap_or(&[]).iter().collect();
            Some(Ok(Value::string(slice)))
        }
        "LENGTH" => Some(Ok(Value::Number(match arg(args, 0) {
            Value::String(s) => s.chars().count() as i16,
            Value::List(items) => items.len() as i16,
            Value::Table(_) => 0,
            _ => 0,
        }))),
        "SPNAME" => Some(Ok(arg(args, 0).as_atom().map(|a| Value::string(a.name())).unwrap_or(Value::falsy()))),
        "ZSTRING" => Some(Ok(Value::string(value_text(&arg(args, 0))))),
        "ATOM" => Some(Ok(Value::Atom(Atom::intern(&value_text(&arg(args, 0)))))),
        "NUMBER?" => Some(Ok(Value::Boolean(matches!(arg(args, 0), Value::Number(_))))),
        "LIT?" => Some(Ok(Value::Boolean(matches!(
            arg(args, 0),
            Value::Number(_) | Value::String(_) | Value::Atom(_)
        )))),
        "TYPE?" => {
            let actual = type_name(&arg(args, 0));
            let wants = args.get(1..).unwrap_or(&[]);
            Some(Ok(Value::Boolean(
                wants.iter().filter_map(Value::as_atom).any(|t| t.eq_str(actual)),
            )))
        }
        "PRIMTYPE" => Some(Ok(Value::Atom(Atom::intern(type_name(&arg(args, 0)))))),
        "CHTYPE" => Some(Ok(arg(args, 0))),
        _ => None,
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.as_str().to_string(),
        Value::Atom(a) => a.name(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use crate::value::Value;

    #[test]
    fn concat_joins_text() {
        assert_eq!(run(r#"<ROUTINE GO () <STRING "foo" "bar">>"#), Value::string("foobar"));
    }

    #[test]
    fn substring_is_one_indexed() {
        assert_eq!(run(r#"<ROUTINE GO () <SUBSTRING "hello" 2 3>>"#), Value::string("ell"));
    }

    #[test]
    fn type_predicate_matches_any_given_type() {
        assert_eq!(run(r#"<ROUTINE GO () <TYPE? 3 'STRING 'FIX>>"#), Value::Boolean(true));
        assert_eq!(run(r#"<ROUTINE GO () <TYPE? 3 'STRING>>"#), Value::Boolean(false));
    }
}
