//! Tree-walking evaluator (§4.5): walks an [`Ast`] node against a [`World`],
//! threading a lexical scope chain and an output accumulator.

use crate::ast::Ast;
use crate::atom::Atom;
use crate::interrupts::InterruptManager;
use crate::ops;
use crate::value::{ObjectHandle, Value};
use crate::world::World;
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Non-local control signals. `Return` unwinds all the way to the enclosing
/// routine call (§4.6); `Again` is caught by the nearest `REPEAT`; `MapStop`
/// is caught by the nearest `MAPF`.
#[derive(Debug, Clone)]
pub enum Signal {
    Return(Value),
    Again,
    MapStop(Value),
    /// A genuine failure (unknown operator, bad arity, out-of-range table
    /// access, …) — shares the unwinding channel with the return signals
    /// per §4.5 but must never be mistaken for one at a routine boundary.
    Error(String),
}

pub type EvalResult = Result<Value, Signal>;

pub struct Evaluator<'w> {
    pub world: &'w mut World,
    scopes: Vec<IndexMap<Atom, Value>>,
    pub output: String,
    pub rng: StdRng,
    pub strict: bool,
    /// Backs the Zork-II-extension `PUSH`/`RSTACK`/`DROP` trio.
    pub value_stack: Vec<Value>,
    pub interrupts: InterruptManager,
}

impl<'w> Evaluator<'w> {
    pub fn new(world: &'w mut World, strict: bool) -> Self {
        Evaluator {
            world,
            scopes: vec![IndexMap::new()],
            output: String::new(),
            rng: StdRng::from_entropy(),
            strict,
            value_stack: Vec::new(),
            interrupts: InterruptManager::new(),
        }
    }

    pub fn with_seed(world: &'w mut World, strict: bool, seed: u64) -> Self {
        Evaluator {
            world,
            scopes: vec![IndexMap::new()],
            output: String::new(),
            rng: StdRng::seed_from_u64(seed),
            strict,
            value_stack: Vec::new(),
            interrupts: InterruptManager::new(),
        }
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn bind_local(&mut self, name: Atom, value: Value) {
        self.scopes.last_mut().expect("scope stack is never empty").insert(name, value);
    }

    pub fn get_local(&self, name: Atom) -> Option<Value> {
        self.scopes.iter().rev().find_map(|s| s.get(&name).cloned())
    }

    pub fn set_local(&mut self, name: Atom, value: Value) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(&name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    pub fn random(&mut self, n: i16) -> i16 {
        if n <= 0 {
            return 0;
        }
        self.rng.gen_range(1..=n)
    }

    pub fn eval_all(&mut self, nodes: &[Ast]) -> Result<Vec<Value>, Signal> {
        nodes.iter().map(|n| self.eval(n)).collect()
    }

    /// Evaluates every node, returning the last value (or `Nil` for an
    /// empty body), matching `PROG`/routine-body sequencing.
    pub fn eval_body(&mut self, body: &[Ast]) -> EvalResult {
        let mut last = Value::Nil;
        for node in body {
            last = self.eval(node)?;
        }
        Ok(last)
    }

    pub fn eval(&mut self, node: &Ast) -> EvalResult {
        match node {
            Ast::Number(n) => Ok(Value::Number(*n)),
            Ast::String(s) => Ok(Value::string(s.clone())),
            Ast::CharLiteral(c) => Ok(Value::Number(*c as i16)),
            Ast::QuotedAtom(a) => Ok(Value::Atom(*a)),
            Ast::LocalRef(name) => match self.get_local(*name) {
                Some(v) => Ok(v),
                None if self.strict => Err(Signal::Error(format!("unbound-variable: {name}"))),
                None => Ok(Value::Nil),
            },
            Ast::GlobalRef(name) => Ok(self.lookup_global_or_object(*name)),
            Ast::Atom(name) => match name.name().as_str() {
                "T" | "ELSE" | "TRUE" => Ok(Value::truthy()),
                "FALSE" => Ok(Value::falsy()),
                _ => Ok(self.lookup_global_or_object(*name)),
            },
            Ast::List(items) => Ok(self.eval_data_list(items)),
            Ast::HashExpr(_, values) => Ok(self.eval_data_list(values)),
            Ast::Splice(inner) | Ast::PercentEval(inner) => self.eval(inner),
            Ast::Form(op, args) => self.eval_form(op, args),
            Ast::Routine { .. } | Ast::Object { .. } | Ast::Global { .. } | Ast::MacroDef { .. } => {
                Err(Signal::Error("declaration form encountered at runtime".into()))
            }
            Ast::IncludeRef(_) => Ok(Value::Nil),
        }
    }

    /// Data positions (list literals, hash-expr payloads) hold literal
    /// values, not sub-expressions to re-evaluate — §4.5's "pass through".
    fn eval_data_list(&self, items: &[Ast]) -> Value {
        Value::list(items.iter().map(|i| self.literal(i)).collect())
    }

    fn literal(&self, node: &Ast) -> Value {
        match node {
            Ast::Number(n) => Value::Number(*n),
            Ast::String(s) => Value::string(s.clone()),
            Ast::Atom(a) | Ast::QuotedAtom(a) | Ast::GlobalRef(a) | Ast::LocalRef(a) => Value::Atom(*a),
            Ast::List(items) => Value::list(items.iter().map(|i| self.literal(i)).collect()),
            _ => Value::Form(std::rc::Rc::new(node.clone())),
        }
    }

    fn lookup_global_or_object(&self, name: Atom) -> Value {
        if let Some(v) = self.world.get_global(name) {
            return v.clone();
        }
        if let Some(v) = self.world.get_constant(name) {
            return v.clone();
        }
        if self.world.object_by_name(name).is_some() {
            return Value::Object(ObjectHandle(name));
        }
        Value::Nil
    }

    fn eval_form(&mut self, op: &Ast, args: &[Ast]) -> EvalResult {
        let Some(name) = op_name(op) else {
            return Err(fail("unknown-operator: non-atom operator"));
        };

        if let Some(result) = self.eval_special_form(&name, args) {
            return result;
        }

        let values = self.eval_all(args)?;

        if let Some(result) = ops::dispatch(self, &name, &values) {
            return result;
        }

        if self.world.get_routine(Atom::intern(&name)).is_some() {
            return self.call_routine(Atom::intern(&name), values);
        }

        Err(fail(&format!("unknown-operator: {name}")))
    }

    /// Forms whose arguments cannot simply be eagerly evaluated: they bind
    /// locals, short-circuit, or loop.
    fn eval_special_form(&mut self, name: &str, args: &[Ast]) -> Option<EvalResult> {
        match name {
            "COND" => Some(self.eval_cond(args)),
            "PROG" | "REPEAT" => Some(self.eval_prog(args, name == "REPEAT")),
            "AND" => Some(self.eval_and(args)),
            "OR" => Some(self.eval_or(args)),
            "NOT" | "ZERO?" => Some(self.eval_unary_logic(name, args)),
            "SET" => Some(self.eval_set_local(args)),
            "SETG" => Some(self.eval_set_global(args)),
            "DLESS?" => Some(self.eval_step_compare(args, -1)),
            "IGRTR?" => Some(self.eval_step_compare(args, 1)),
            "ASSIGNED?" => Some(self.eval_assigned(args, false)),
            "GASSIGNED?" => Some(self.eval_assigned(args, true)),
            "MAP-CONTENTS" => Some(self.eval_map_contents(args)),
            "MAPF" => Some(self.eval_mapf(args)),
            "MAPRET" => Some(self.eval_all(args).map(|mut v| v.pop().unwrap_or(Value::Nil))),
            "MAPSTOP" => Some(self.eval_mapstop(args)),
            "AGAIN" => Some(Err(Signal::Again)),
            "RTRUE" => Some(Err(Signal::Return(Value::truthy()))),
            "RFALSE" => Some(Err(Signal::Return(Value::falsy()))),
            "RETURN" => Some(self.eval_return(args)),
            "QUOTE" => Some(Ok(args.first().map(|a| self.literal(a)).unwrap_or(Value::Nil))),
            _ => None,
        }
    }

    fn eval_cond(&mut self, clauses: &[Ast]) -> EvalResult {
        for clause in clauses {
            let Ast::List(parts) = clause else {
                return Err(fail("COND clause must be a list"));
            };
            let Some((test, body)) = parts.split_first() else {
                continue;
            };
            let test_val = self.eval(test)?;
            if test_val.is_truthy() {
                return self.eval_body(body);
            }
        }
        Ok(Value::falsy())
    }

    fn eval_prog(&mut self, args: &[Ast], is_loop: bool) -> EvalResult {
        let Some((bindings, body)) = args.split_first() else {
            return Err(fail("PROG/REPEAT requires a binding list"));
        };
        let Ast::List(binding_forms) = bindings else {
            return Err(fail("PROG/REPEAT binding list must be parenthesized"));
        };
        self.push_scope();
        let result = (|| {
            for b in binding_forms {
                match b {
                    Ast::Atom(name) => self.bind_local(*name, Value::falsy()),
                    Ast::List(parts) if !parts.is_empty() => {
                        let Ast::Atom(name) = &parts[0] else {
                            return Err(fail("PROG binding name must be an atom"));
                        };
                        let init = match parts.get(1) {
                            Some(e) => self.eval(e)?,
                            None => Value::falsy(),
                        };
                        self.bind_local(*name, init);
                    }
                    _ => return Err(fail("malformed PROG binding")),
                }
            }
            if !is_loop {
                return self.eval_body(body);
            }
            // REPEAT has no implicit exit: a body that runs to completion
            // without RETURN/AGAIN simply runs again (§4.5).
            loop {
                match self.eval_body(body) {
                    Ok(_) | Err(Signal::Again) => continue,
                    Err(other) => return Err(other),
                }
            }
        })();
        self.pop_scope();
        result
    }

    fn eval_and(&mut self, args: &[Ast]) -> EvalResult {
        let mut last = Value::truthy();
        for a in args {
            last = self.eval(a)?;
            if !last.is_truthy() {
                return Ok(last);
            }
        }
        Ok(last)
    }

    fn eval_or(&mut self, args: &[Ast]) -> EvalResult {
        let mut last = Value::falsy();
        for a in args {
            last = self.eval(a)?;
            if last.is_truthy() {
                return Ok(last);
            }
        }
        Ok(last)
    }

    fn eval_unary_logic(&mut self, name: &str, args: &[Ast]) -> EvalResult {
        let v = self.eval(args.first().ok_or_else(|| fail(&format!("{name} requires an argument")))?)?;
        match name {
            "NOT" => Ok(Value::Boolean(!v.is_truthy())),
            "ZERO?" => Ok(Value::Boolean(v.is_zero())),
            _ => unreachable!(),
        }
    }

    fn target_name(&mut self, node: &Ast) -> Result<Atom, Signal> {
        match node {
            Ast::Atom(a) | Ast::LocalRef(a) | Ast::GlobalRef(a) | Ast::QuotedAtom(a) => Ok(*a),
            _ => match self.eval(node)? {
                Value::Atom(a) => Ok(a),
                _ => Err(fail("expected a variable name")),
            },
        }
    }

    fn eval_set_local(&mut self, args: &[Ast]) -> EvalResult {
        let name = self.target_name(args.first().ok_or_else(|| fail("SET requires a variable"))?)?;
        let value = self.eval(args.get(1).ok_or_else(|| fail("SET requires a value"))?)?;
        if !self.set_local(name, value.clone()) {
            self.bind_local(name, value.clone());
        }
        Ok(value)
    }

    fn eval_set_global(&mut self, args: &[Ast]) -> EvalResult {
        let name = self.target_name(args.first().ok_or_else(|| fail("SETG requires a variable"))?)?;
        let value = self.eval(args.get(1).ok_or_else(|| fail("SETG requires a value"))?)?;
        self.world.set_global(name, value.clone());
        Ok(value)
    }

    /// `DLESS?`/`IGRTR?`: step a variable by `step` (-1 or +1), then compare
    /// the new value against `args[1]` (`<=` for `DLESS?`, `>` for `IGRTR?`).
    fn eval_step_compare(&mut self, args: &[Ast], step: i16) -> EvalResult {
        let name = self.target_name(args.first().ok_or_else(|| fail("requires a variable"))?)?;
        let bound = self
            .eval(args.get(1).ok_or_else(|| fail("requires a comparison value"))?)?
            .as_number();
        let current = self.get_local(name).map(|v| v.as_number()).unwrap_or_else(|| {
            self.world.get_global(name).map(Value::as_number).unwrap_or(0)
        });
        let updated = current.wrapping_add(step);
        if !self.set_local(name, Value::Number(updated)) {
            self.world.set_global(name, Value::Number(updated));
        }
        Ok(Value::Boolean(if step < 0 { updated <= bound } else { updated > bound }))
    }

    fn eval_assigned(&mut self, args: &[Ast], global: bool) -> EvalResult {
        let name = self.target_name(args.first().ok_or_else(|| fail("requires a variable"))?)?;
        let assigned = if global {
            self.world.get_global(name).is_some()
        } else {
            self.get_local(name).is_some()
        };
        Ok(Value::Boolean(assigned))
    }

    fn eval_map_contents(&mut self, args: &[Ast]) -> EvalResult {
        let Some((header, body)) = args.split_first() else {
            return Err(fail("MAP-CONTENTS requires a (var container) header"));
        };
        let Ast::List(parts) = header else {
            return Err(fail("MAP-CONTENTS header must be a list"));
        };
        let (Some(Ast::Atom(var)), Some(container_expr)) = (parts.first(), parts.get(1)) else {
            return Err(fail("MAP-CONTENTS requires (var container)"));
        };
        let container = self
            .eval(container_expr)?
            .as_object()
            .ok_or_else(|| fail("MAP-CONTENTS container must be an object"))?;
        let children: Vec<ObjectHandle> = {
            let mut out = Vec::new();
            let mut cur = self.world.first_child(container);
            while let Some(c) = cur {
                out.push(c);
                cur = self.world.next_sibling(c);
            }
            out
        };
        self.push_scope();
        let result = (|| {
            let mut last = Value::Nil;
            for child in children {
                self.bind_local(*var, Value::Object(child));
                last = self.eval_body(body)?;
            }
            Ok(last)
        })();
        self.pop_scope();
        result
    }

    fn eval_mapf(&mut self, args: &[Ast]) -> EvalResult {
        let (Some(fn_node), Some(list_node)) = (args.first(), args.get(1)) else {
            return Err(fail("MAPF requires a function and a list"));
        };
        let fn_name = self.target_name(fn_node)?;
        let list_val = self.eval(list_node)?;
        let items = list_val.as_list().unwrap_or(&[]).to_vec();
        let mut out = Vec::new();
        for item in items {
            match self.call_routine(fn_name, vec![item]) {
                Ok(v) => out.push(v),
                Err(Signal::MapStop(v)) => {
                    out.push(v);
                    break;
                }
                Err(other) => return Err(other),
            }
        }
        Ok(Value::list(out))
    }

    fn eval_mapstop(&mut self, args: &[Ast]) -> EvalResult {
        let v = match args.first() {
            Some(a) => self.eval(a)?,
            None => Value::Nil,
        };
        Err(Signal::MapStop(v))
    }

    fn eval_return(&mut self, args: &[Ast]) -> EvalResult {
        let v = match args.first() {
            Some(a) => self.eval(a)?,
            None => Value::falsy(),
        };
        Err(Signal::Return(v))
    }

    /// Routine call protocol (§4.6): fresh scope, bind parameters, run the
    /// body, restore the caller's scope regardless of exit path.
    pub fn call_routine(&mut self, name: Atom, caller_args: Vec<Value>) -> EvalResult {
        let def = self
            .world
            .get_routine(name)
            .cloned()
            .ok_or_else(|| fail(&format!("unknown-routine: {name}")))?;

        self.push_scope();
        let bind_result = crate::routine::bind_params(self, &def.params, caller_args);
        let result = match bind_result {
            Ok(()) => match self.eval_body(&def.body) {
                Ok(v) => Ok(v),
                Err(Signal::Return(v)) => Ok(v),
                Err(other) => Err(other),
            },
            Err(e) => Err(e),
        };
        self.pop_scope();
        result
    }
}

fn op_name(op: &Ast) -> Option<String> {
    match op {
        Ast::Atom(a) => Some(a.name()),
        _ => None,
    }
}

pub fn fail(msg: &str) -> Signal {
    Signal::Error(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives;
    use crate::macros::MacroRegistry;
    use crate::reader::read;

    fn run(src: &str) -> (Value, World) {
        let forms = read(src).unwrap();
        let mut reg = MacroRegistry::new();
        let expanded = reg.expand_program(forms).unwrap();
        let mut world = World::new();
        directives::process(expanded, &mut world).unwrap();
        directives::link_object_parents(&mut world).unwrap();
        let routine = world.get_routine(Atom::intern("GO")).cloned();
        let mut ev = Evaluator::with_seed(&mut world, false, 1);
        let value = if let Some(def) = routine {
            ev.call_routine(def.name, vec![]).unwrap()
        } else {
            Value::Nil
        };
        drop(ev);
        (value, world)
    }

    #[test]
    fn arithmetic_and_cond_drive_a_routine() {
        let (v, _) = run("<ROUTINE GO () <COND (<G? 3 2> 42) (T 0)>>");
        assert_eq!(v, Value::Number(42));
    }

    #[test]
    fn repeat_with_again_loops_until_condition() {
        let (v, _) = run(
            r#"<ROUTINE GO ("AUX" (I 0))
                 <REPEAT ()
                   <SET I <+ .I 1>>
                   <COND (<L? .I 3> <AGAIN>)>
                   <RETURN .I>>>"#,
        );
        assert_eq!(v, Value::Number(3));
    }

    #[test]
    fn rtrue_unwinds_past_cond() {
        let (v, _) = run("<ROUTINE GO () <COND (T <RTRUE>)> 99>");
        assert_eq!(v, Value::truthy());
    }
}
