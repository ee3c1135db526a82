//! Object-tree, flag, and property operations (§4.5 "Flags"/"Properties"/
//! "Object tree").

use super::arg;
use crate::atom::Atom;
use crate::evaluator::{fail, EvalResult, Evaluator};
use crate::value::{ObjectHandle, Value};
use crate::world::object::Flag;

fn flag_of(v: &Value) -> Option<Flag> {
    v.as_atom().map(Flag::from_atom)
}

fn obj_of(v: &Value) -> Option<ObjectHandle> {
    v.as_object()
}

pub fn dispatch(ev: &mut Evaluator, name: &str, args: &[Value]) -> Option<EvalResult> {
    match name {
        "MOVE" => {
            let Some(x) = obj_of(&arg(args, 0)) else {
                return Some(Err(fail("MOVE requires an object")));
            };
            let y = obj_of(&arg(args, 1));
            Some(ev.world.move_object(x, y).map(|()| Value::truthy()).map_err(|e| fail(&e)))
        }
        "REMOVE" => {
            let Some(x) = obj_of(&arg(args, 0)) else {
                return Some(Err(fail("REMOVE requires an object")));
            };
            Some(ev.world.move_object(x, None).map(|()| Value::truthy()).map_err(|e| fail(&e)))
        }
        "IN?" => {
            let (Some(x), Some(y)) = (obj_of(&arg(args, 0)), obj_of(&arg(args, 1))) else {
                return Some(Ok(Value::falsy()));
            };
            let parent = ev.world.get_object(x).and_then(|o| o.parent);
            Some(Ok(Value::Boolean(parent == Some(y.0))))
        }
        "GLOBAL-IN?" => {
            let Some(x) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::falsy()));
            };
            let Some(room) = ev.world.meta_loc(x) else {
                return Some(Ok(Value::falsy()));
            };
            let want = obj_of(&arg(args, 1));
            Some(Ok(Value::Boolean(want == Some(room))))
        }
        "LOC" => {
            let obj = obj_of(&arg(args, 0));
            let parent = obj.and_then(|o| ev.world.get_object(o)).and_then(|o| o.parent);
            Some(Ok(parent.map(|a| Value::Object(ObjectHandle(a))).unwrap_or(Value::falsy())))
        }
        "FIRST?" => match arg(args, 0) {
            Value::Object(o) => Some(Ok(ev
                .world
                .first_child(o)
                .map(Value::Object)
                .unwrap_or(Value::falsy()))),
            Value::List(items) => Some(Ok(items.first().cloned().unwrap_or(Value::falsy()))),
            _ => Some(Ok(Value::falsy())),
        },
        "NEXT?" | "NEXT" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::falsy()));
            };
            Some(Ok(ev.world.next_sibling(o).map(Value::Object).unwrap_or(Value::falsy())))
        }
        "BACK" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::falsy()));
            };
            Some(Ok(ev.world.prev_sibling(o).map(Value::Object).unwrap_or(Value::falsy())))
        }
        "META-LOC" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::falsy()));
            };
            Some(Ok(ev.world.meta_loc(o).map(Value::Object).unwrap_or(Value::falsy())))
        }
        "HELD?" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::falsy()));
            };
            let player = ev
                .world
                .get_global(Atom::intern("WINNER"))
                .and_then(Value::as_object)
                .or_else(|| ev.world.object_by_name(Atom::intern("PLAYER")));
            let parent = ev.world.get_object(o).and_then(|obj| obj.parent);
            Some(Ok(Value::Boolean(player.is_some() && parent == player.map(|p| p.0))))
        }
        "FSET" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Err(fail("FSET requires an object")));
            };
            let Some(f) = flag_of(&arg(args, 1)) else {
                return Some(Err(fail("FSET requires a flag")));
            };
            if let Some(obj) = ev.world.get_object_mut(o) {
                obj.set_flag(f);
            }
            Some(Ok(Value::truthy()))
        }
        "FCLEAR" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Err(fail("FCLEAR requires an object")));
            };
            let Some(f) = flag_of(&arg(args, 1)) else {
                return Some(Err(fail("FCLEAR requires a flag")));
            };
            if let Some(obj) = ev.world.get_object_mut(o) {
                obj.clear_flag(f);
            }
            Some(Ok(Value::truthy()))
        }
        "FSET?" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::falsy()));
            };
            let Some(f) = flag_of(&arg(args, 1)) else {
                return Some(Ok(Value::falsy()));
            };
            Some(Ok(Value::Boolean(ev.world.get_object(o).is_some_and(|obj| obj.has_flag(f)))))
        }
        "GETP" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::falsy()));
            };
            let Some(p) = arg(args, 1).as_atom() else {
                return Some(Ok(Value::falsy()));
            };
            let found = ev.world.get_object(o).and_then(|obj| obj.properties.get(&p).cloned());
            Some(Ok(found
                .or_else(|| ev.world.property_defaults.get(&p).cloned())
                .unwrap_or(Value::falsy())))
        }
        "PUTP" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Err(fail("PUTP requires an object")));
            };
            let Some(p) = arg(args, 1).as_atom() else {
                return Some(Err(fail("PUTP requires a property name")));
            };
            let v = arg(args, 2);
            if let Some(obj) = ev.world.get_object_mut(o) {
                obj.properties.insert(p, v.clone());
            }
            Some(Ok(v))
        }
        "GETPT" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::falsy()));
            };
            let Some(p) = arg(args, 1).as_atom() else {
                return Some(Ok(Value::falsy()));
            };
            let present = ev.world.get_object(o).is_some_and(|obj| obj.properties.contains_key(&p));
            Some(Ok(if present {
                Value::list(vec![Value::Object(o), Value::Atom(p)])
            } else {
                Value::falsy()
            }))
        }
        "NEXTP" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::falsy()));
            };
            let after = arg(args, 1).as_atom();
            let Some(obj) = ev.world.get_object(o) else {
                return Some(Ok(Value::falsy()));
            };
            let names: Vec<Atom> = obj.properties.keys().copied().collect();
            let next = match after {
                None => names.first().copied(),
                Some(p) => names.iter().position(|n| *n == p).and_then(|i| names.get(i + 1).copied()),
            };
            Some(Ok(next.map(Value::Atom).unwrap_or(Value::falsy())))
        }
        "ACCESSIBLE?" => Some(Ok(Value::Boolean(crate::resolver::is_accessible(
            ev.world,
            obj_of(&arg(args, 0)),
            obj_of(&arg(args, 1)),
        )))),
        "FIND-IN" => {
            let Some(container) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::falsy()));
            };
            let Some(p) = arg(args, 1).as_atom() else {
                return Some(Ok(Value::falsy()));
            };
            let mut cur = ev.world.first_child(container);
            while let Some(c) = cur {
                if ev.world.get_object(c).is_some_and(|o| o.name == p) {
                    return Some(Ok(Value::Object(c)));
                }
                cur = ev.world.next_sibling(c);
            }
            Some(Ok(Value::falsy()))
        }
        "WEIGHT" | "SIZE" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::Number(0)));
            };
            let prop = if name == "WEIGHT" { "FWEIGHT" } else { "SIZE" };
            let v = ev
                .world
                .get_object(o)
                .and_then(|obj| obj.properties.get(&Atom::intern(prop)).cloned())
                .unwrap_or(Value::Number(0));
            Some(Ok(Value::Number(v.as_number())))
        }
        "PTSIZE" => {
            let Some(o) = obj_of(&arg(args, 0)) else {
                return Some(Ok(Value::Number(0)));
            };
            Some(Ok(Value::Number(ev.world.get_object(o).map(|obj| obj.properties.len()).unwrap_or(0) as i16)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use crate::value::Value;

    #[test]
    fn move_and_in_report_the_new_parent() {
        let v = run(
            r#"
            <OBJECT ROOM1 (FLAGS ROOMBIT)>
            <OBJECT ROOM2 (FLAGS ROOMBIT)>
            <OBJECT LAMP (IN ROOM1)>
            <ROUTINE GO () <MOVE ,LAMP ,ROOM2> <IN? ,LAMP ,ROOM2>>
            "#,
        );
        assert_eq!(v, Value::Boolean(true));
    }

    #[test]
    fn getp_falls_back_to_the_property_default() {
        let v = run(
            r#"
            <PROPDEF FWEIGHT 5>
            <OBJECT ROCK>
            <ROUTINE GO () <GETP ,ROCK 'FWEIGHT>>
            "#,
        );
        assert_eq!(v, Value::Number(5));
    }

    #[test]
    fn fset_and_fset_predicate_round_trip() {
        let v = run(
            r#"
            <OBJECT LAMP>
            <ROUTINE GO () <FSET ,LAMP 'TAKEBIT> <FSET? ,LAMP 'TAKEBIT>>
            "#,
        );
        assert_eq!(v, Value::Boolean(true));
    }
}
