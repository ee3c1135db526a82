//! Output operations (§4.5 "I/O"): everything here appends to the
//! evaluator's output accumulator and returns true.

use super::arg;
use crate::evaluator::{EvalResult, Evaluator};
use crate::value::Value;

pub fn dispatch(ev: &mut Evaluator, name: &str, args: &[Value]) -> Option<EvalResult> {
    match name {
        "PRINT" | "PRINC" => {
            ev.output.push_str(&display(&arg(args, 0), name == "PRINC"));
            Some(Ok(Value::truthy()))
        }
        "PRINTI" => {
            if let Value::String(s) = arg(args, 0) {
                ev.output.push_str(&s);
            }
            Some(Ok(Value::truthy()))
        }
        "PRINTN" => {
            ev.output.push_str(&arg(args, 0).as_number().to_string());
            Some(Ok(Value::truthy()))
        }
        "PRINTC" => {
            let code = arg(args, 0).as_number();
            if (0..=255).contains(&code) {
                if let Some(c) = char::from_u32(code as u32) {
                    ev.output.push(c);
                }
            }
            Some(Ok(Value::truthy()))
        }
        "PRINTD" | "D" => {
            if let Some(o) = arg(args, 0).as_object() {
                if let Some(desc) = ev.world.get_object(o).and_then(|obj| obj.desc.clone()) {
                    ev.output.push_str(&desc);
                }
            }
            Some(Ok(Value::truthy()))
        }
        "PRINTA" => {
            if let Some(o) = arg(args, 0).as_object() {
                if let Some(obj) = ev.world.get_object(o) {
                    ev.output.push_str(if starts_with_vowel(obj.desc.as_deref()) { "an " } else { "a " });
                    if let Some(desc) = &obj.desc {
                        ev.output.push_str(desc);
                    }
                }
            }
            Some(Ok(Value::truthy()))
        }
        "PRINTB" => {
            if let Some(t) = arg(args, 0).as_table() {
                if let Some(tbl) = ev.world.get_table(t) {
                    let bytes: Vec<u8> = (0..tbl.len() as i16 * 2)
                        .filter_map(|i| tbl.get_byte(i))
                        .map(|b| b as u8)
                        .collect();
                    ev.output.push_str(&String::from_utf8_lossy(&bytes));
                }
            }
            Some(Ok(Value::truthy()))
        }
        "CR" | "CRLF" => {
            ev.output.push('\n');
            Some(Ok(Value::truthy()))
        }
        "FIXED-FONT-ON" | "FIXED-FONT-OFF" => Some(Ok(Value::truthy())),
        _ => None,
    }
}

fn display(v: &Value, raw: bool) -> String {
    match v {
        Value::String(s) if raw => s.as_str().to_string(),
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

fn starts_with_vowel(desc: Option<&str>) -> bool {
    desc.and_then(|s| s.chars().next())
        .is_some_and(|c| "aeiouAEIOU".contains(c))
}

#[cfg(test)]
mod tests {
    use crate::atom::Atom;
    use crate::directives;
    use crate::evaluator::Evaluator;
    use crate::macros::MacroRegistry;
    use crate::reader::read;
    use crate::world::World;

    fn output(src: &str) -> String {
        let forms = read(src).unwrap();
        let mut reg = MacroRegistry::new();
        let expanded = reg.expand_program(forms).unwrap();
        let mut world = World::new();
        directives::process(expanded, &mut world).unwrap();
        directives::link_object_parents(&mut world).unwrap();
        let mut ev = Evaluator::with_seed(&mut world, false, 1);
        ev.call_routine(Atom::intern("GO"), vec![]).unwrap();
        ev.output
    }

    #[test]
    fn printi_and_crlf_accumulate_output() {
        let text = output(r#"<ROUTINE GO () <PRINTI "Hello"> <CRLF>>"#);
        assert_eq!(text, "Hello\n");
    }

    #[test]
    fn printd_prints_the_objects_description() {
        let text = output(
            r#"
            <OBJECT LAMP (DESC "brass lamp")>
            <ROUTINE GO () <PRINTD ,LAMP>>
            "#,
        );
        assert_eq!(text, "brass lamp");
    }

    #[test]
    fn printa_prefixes_with_indefinite_article() {
        let text = output(
            r#"
            <OBJECT EGG (DESC "egg")>
            <ROUTINE GO () <PRINTA ,EGG>>
            "#,
        );
        assert_eq!(text, "an egg");
    }
}
