//! Macro registry and expander (§4.3): a fixed built-in catalog, user
//! `DEFMAC` definitions, and compile-time `%<…>` arithmetic, applied as a
//! bottom-up AST→AST rewrite.

mod builtins;
mod percent;

use crate::ast::{Ast, MacroParam, ParamKind};
use crate::atom::Atom;
use std::collections::HashMap;

pub struct MacroRegistry {
    user_macros: HashMap<Atom, UserMacro>,
}

struct UserMacro {
    params: Vec<MacroParam>,
    body: Vec<Ast>,
}

impl Default for MacroRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroRegistry {
    pub fn new() -> Self {
        MacroRegistry {
            user_macros: HashMap::new(),
        }
    }

    pub fn define(&mut self, name: Atom, params: Vec<MacroParam>, body: Vec<Ast>) {
        self.user_macros.insert(name, UserMacro { params, body });
    }

    /// Expands every form in `forms`, registering any `MacroDef` it
    /// encounters along the way and stripping them from the output (macro
    /// definitions are compile-time only, not retained in the world AST).
    pub fn expand_program(&mut self, forms: Vec<Ast>) -> Result<Vec<Ast>, String> {
        let mut out = Vec::with_capacity(forms.len());
        for form in forms {
            if let Ast::MacroDef { name, params, body } = form {
                self.define(name, params, body);
                continue;
            }
            out.push(self.expand(&form)?);
        }
        Ok(out)
    }

    /// Expands one node to a fixed point: rewrite, then recurse into the
    /// result, until a pass makes no further change.
    pub fn expand(&mut self, node: &Ast) -> Result<Ast, String> {
        let rewritten = self.expand_once(node)?;
        if &rewritten == node {
            self.expand_children(&rewritten)
        } else {
            self.expand(&rewritten)
        }
    }

    fn expand_children(&mut self, node: &Ast) -> Result<Ast, String> {
        match node {
            Ast::Form(op, args) => {
                let op = self.expand(op)?;
                let args = args
                    .iter()
                    .map(|a| self.expand(a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Ast::form(op, args))
            }
            Ast::List(items) => Ok(Ast::List(
                items
                    .iter()
                    .map(|a| self.expand(a))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Ast::Routine { name, params, body } => Ok(Ast::Routine {
                name: *name,
                params: params.clone(),
                body: body
                    .iter()
                    .map(|a| self.expand(a))
                    .collect::<Result<Vec<_>, _>>()?,
            }),
            Ast::Object { name, properties } => {
                let mut expanded_props = Vec::with_capacity(properties.len());
                for (pname, values) in properties {
                    let values = values
                        .iter()
                        .map(|a| self.expand(a))
                        .collect::<Result<Vec<_>, _>>()?;
                    expanded_props.push((*pname, values));
                }
                Ok(Ast::Object {
                    name: *name,
                    properties: expanded_props,
                })
            }
            Ast::Global { name, init } => Ok(Ast::Global {
                name: *name,
                init: Box::new(self.expand(init)?),
            }),
            Ast::Splice(f) => Ok(Ast::Splice(std::rc::Rc::new(self.expand(f)?))),
            Ast::PercentEval(f) => Ok(Ast::PercentEval(std::rc::Rc::new(self.expand(f)?))),
            other => Ok(other.clone()),
        }
    }

    /// One rewrite pass: built-in macro, then user macro, then `%<…>`
    /// compile-time arithmetic, else unchanged.
    fn expand_once(&mut self, node: &Ast) -> Result<Ast, String> {
        if let Ast::PercentEval(inner) = node {
            let evaluated = self.expand(inner)?;
            if let Some(folded) = percent::fold_constant(&evaluated) {
                return Ok(folded);
            }
            return Ok(Ast::PercentEval(std::rc::Rc::new(evaluated)));
        }

        let Some(op_atom) = node.operator_atom() else {
            return Ok(node.clone());
        };
        let args = node.as_form_args().unwrap();

        if let Some(expanded) = builtins::expand_builtin(&op_atom, args)? {
            return Ok(expanded);
        }

        if let Some(expanded) = self.expand_user_macro(&op_atom, args)? {
            return Ok(expanded);
        }

        Ok(node.clone())
    }

    fn expand_user_macro(&self, name: &Atom, args: &[Ast]) -> Result<Option<Ast>, String> {
        let Some(mac) = self.user_macros.get(name) else {
            return Ok(None);
        };
        let mut bindings: HashMap<Atom, Ast> = HashMap::new();
        let mut arg_iter = args.iter();
        let mut rest: Vec<Ast> = Vec::new();
        for p in &mac.params {
            match p.kind {
                ParamKind::Required => {
                    let value = arg_iter.next().cloned().unwrap_or_else(Ast::false_form);
                    bindings.insert(p.name, value);
                }
                ParamKind::Optional => {
                    let value = arg_iter
                        .next()
                        .cloned()
                        .or_else(|| p.default.clone())
                        .unwrap_or_else(Ast::false_form);
                    bindings.insert(p.name, value);
                }
                ParamKind::Aux => {
                    bindings.insert(p.name, p.default.clone().unwrap_or_else(Ast::false_form));
                }
                ParamKind::Args => {
                    rest = arg_iter.by_ref().cloned().collect();
                    bindings.insert(p.name, Ast::List(rest.clone()));
                }
            }
        }
        let expanded_body: Vec<Ast> = mac
            .body
            .iter()
            .map(|b| substitute(b, &bindings))
            .collect();
        let body = if expanded_body.len() == 1 {
            expanded_body.into_iter().next().unwrap()
        } else {
            Ast::form(Ast::atom("PROG"), {
                let mut v = vec![Ast::List(vec![])];
                v.extend(expanded_body);
                v
            })
        };
        Ok(Some(body))
    }
}

/// Quoted parameters substitute the caller's AST unevaluated; unquoted
/// parameters likewise splice the caller's argument expression in place
/// (it is re-evaluated at each call site through the expanded template —
/// there is no separate "value" to substitute at macro-expansion time).
fn substitute(node: &Ast, bindings: &HashMap<Atom, Ast>) -> Ast {
    match node {
        Ast::Atom(a) | Ast::LocalRef(a) => bindings.get(a).cloned().unwrap_or_else(|| node.clone()),
        Ast::Form(op, args) => Ast::form(
            substitute(op, bindings),
            args.iter().map(|a| substitute(a, bindings)).collect(),
        ),
        Ast::List(items) => Ast::List(items.iter().map(|a| substitute(a, bindings)).collect()),
        Ast::Splice(f) => Ast::Splice(std::rc::Rc::new(substitute(f, bindings))),
        Ast::PercentEval(f) => Ast::PercentEval(std::rc::Rc::new(substitute(f, bindings))),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read;

    fn expand_str(src: &str) -> Ast {
        let forms = read(src).unwrap();
        let mut reg = MacroRegistry::new();
        reg.expand_program(forms).unwrap().remove(0)
    }

    #[test]
    fn tell_expands_to_prog_of_prints() {
        let got = expand_str(r#"<TELL "Hello " D ,LAMP CR>"#);
        let want = expand_str("<PROG () <PRINTI \"Hello \"> <PRINTD ,LAMP> <CRLF>>");
        assert_eq!(got, want);
    }

    #[test]
    fn verb_fanout() {
        let got = expand_str("<VERB? TAKE DROP PUT>");
        let want = expand_str(
            "<OR <EQUAL? ,PRSA ,V?TAKE> <EQUAL? ,PRSA ,V?DROP> <EQUAL? ,PRSA ,V?PUT>>",
        );
        assert_eq!(got, want);
    }

    #[test]
    fn percent_eval_folds_nested_arithmetic() {
        let forms = read("<SETG X %<* 2 <+ 3 4>>>").unwrap();
        let mut reg = MacroRegistry::new();
        let expanded = reg.expand(&forms[0]).unwrap();
        let want = read("<SETG X 14>").unwrap().remove(0);
        assert_eq!(expanded, want);
    }

    #[test]
    fn empty_tell_expands_to_empty_prog() {
        let got = expand_str("<TELL>");
        let want = expand_str("<PROG ()>");
        assert_eq!(got, want);
    }

    #[test]
    fn omitted_optional_macro_arg_substitutes_its_declared_default() {
        let got = expand_str(
            "<DEFMAC GREET (NAME \"OPTIONAL\" (GREETING \"Hi\")) <STRING .GREETING .NAME>> <GREET \"Bob\">",
        );
        let want = expand_str(r#"<STRING "Hi" "Bob">"#);
        assert_eq!(got, want);
    }

    #[test]
    fn omitted_aux_macro_arg_substitutes_its_declared_default() {
        let got = expand_str("<DEFMAC GREET (NAME \"AUX\" (COUNT 1)) <STRING .COUNT .NAME>> <GREET \"Bob\">");
        let want = expand_str(r#"<STRING 1 "Bob">"#);
        assert_eq!(got, want);
    }
}
