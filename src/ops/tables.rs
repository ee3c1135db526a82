//! Table access and construction (§4.5, §3 "Tables"): `GET`/`PUT` index by
//! word, `GETB`/`PUTB` by byte; `LTABLE`/`ITABLE`/`TABLE` construct one.

use super::arg;
use crate::evaluator::{fail, EvalResult, Evaluator};
use crate::value::{TableHandle, Value};
use crate::world::Table;

fn table_of(v: &Value) -> Option<TableHandle> {
    v.as_table()
}

pub fn dispatch(ev: &mut Evaluator, name: &str, args: &[Value]) -> Option<EvalResult> {
    match name {
        "GET" => {
            let Some(t) = table_of(&arg(args, 0)) else {
                return Some(Err(fail("GET requires a table")));
            };
            let idx = arg(args, 1).as_number();
            Some(Ok(ev
                .world
                .get_table(t)
                .and_then(|tbl| tbl.get_word(idx))
                .map(Value::Number)
                .unwrap_or(Value::Number(0))))
        }
        "PUT" => {
            let Some(t) = table_of(&arg(args, 0)) else {
                return Some(Err(fail("PUT requires a table")));
            };
            let idx = arg(args, 1).as_number();
            let value = arg(args, 2).as_number();
            let result = match ev.world.get_table_mut(t) {
                Some(tbl) => tbl.put_word(idx, value),
                None => Err(format!("unknown-table: {}", t.0)),
            };
            Some(result.map(|()| Value::Number(value)).map_err(|e| fail(&e)))
        }
        "GETB" => {
            let Some(t) = table_of(&arg(args, 0)) else {
                return Some(Err(fail("GETB requires a table")));
            };
            let idx = arg(args, 1).as_number();
            Some(Ok(ev
                .world
                .get_table(t)
                .and_then(|tbl| tbl.get_byte(idx))
                .map(Value::Number)
                .unwrap_or(Value::Number(0))))
        }
        "PUTB" => {
            let Some(t) = table_of(&arg(args, 0)) else {
                return Some(Err(fail("PUTB requires a table")));
            };
            let idx = arg(args, 1).as_number();
            let value = arg(args, 2).as_number();
            let result = match ev.world.get_table_mut(t) {
                Some(tbl) => tbl.put_byte(idx, value),
                None => Err(format!("unknown-table: {}", t.0)),
            };
            Some(result.map(|()| Value::Number(value)).map_err(|e| fail(&e)))
        }
        "LTABLE" => {
            let words: Vec<i16> = args.iter().map(Value::as_number).collect();
            let table_name = ev.world.fresh_table_name();
            let len = words.len() as i16;
            let mut all = vec![len];
            all.extend(words);
            let handle = ev.world.define_table(Table::new(table_name, all));
            Some(Ok(Value::Table(handle)))
        }
        "ITABLE" => {
            let count = arg(args, 0).as_number().max(0) as usize;
            let table_name = ev.world.fresh_table_name();
            let handle = ev.world.define_table(Table::new(table_name, vec![0; count]));
            Some(Ok(Value::Table(handle)))
        }
        "TABLE" => {
            let words: Vec<i16> = args.iter().map(Value::as_number).collect();
            let table_name = ev.world.fresh_table_name();
            let handle = ev.world.define_table(Table::new(table_name, words));
            Some(Ok(Value::Table(handle)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use crate::value::Value;

    #[test]
    fn table_get_and_put_round_trip() {
        assert_eq!(
            run("<ROUTINE GO (\"AUX\" T) <SET T <TABLE 10 20 30>> <PUT .T 1 99> <GET .T 1>>"),
            Value::Number(99)
        );
    }

    #[test]
    fn itable_entries_start_at_zero() {
        assert_eq!(run("<ROUTINE GO (\"AUX\" T) <SET T <ITABLE 3>> <GET .T 0>>"), Value::Number(0));
    }

    #[test]
    fn ltable_prefixes_its_length() {
        assert_eq!(run("<ROUTINE GO (\"AUX\" T) <SET T <LTABLE 5 6>> <GET .T 0>>"), Value::Number(2));
    }
}
