//! AST node types produced by the [`crate::reader`] and consumed by every
//! later stage. The tree is immutable once macro expansion has finished.

use crate::atom::Atom;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Required,
    /// `(name default)`
    Optional,
    /// `(name default)`, never bound from the caller
    Aux,
    /// Captures remaining args as a list
    Args,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Atom,
    pub default: Option<Ast>,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroParam {
    pub name: Atom,
    pub quoted: bool,
    pub default: Option<Ast>,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Atom(Atom),
    Number(i16),
    String(String),
    Form(Rc<Ast>, Vec<Ast>),
    List(Vec<Ast>),
    LocalRef(Atom),
    GlobalRef(Atom),
    QuotedAtom(Atom),
    Splice(Rc<Ast>),
    PercentEval(Rc<Ast>),
    HashExpr(Atom, Vec<Ast>),
    CharLiteral(char),
    IncludeRef(String),
    Routine {
        name: Atom,
        params: Vec<Param>,
        body: Vec<Ast>,
    },
    Object {
        name: Atom,
        properties: Vec<(Atom, Vec<Ast>)>,
    },
    Global {
        name: Atom,
        init: Box<Ast>,
    },
    MacroDef {
        name: Atom,
        params: Vec<MacroParam>,
        body: Vec<Ast>,
    },
}

impl Ast {
    pub fn form(op: Ast, args: Vec<Ast>) -> Ast {
        Ast::Form(Rc::new(op), args)
    }

    pub fn atom(name: &str) -> Ast {
        Ast::Atom(Atom::intern(name))
    }

    /// The canonical empty form `<>`: ZIL's false literal.
    pub fn false_form() -> Ast {
        Ast::form(Ast::atom("FALSE"), vec![])
    }

    /// Returns the operator atom of a `Form`, if the operator is itself a
    /// bare atom (the common case — routines and operations are dispatched
    /// by name, not by an arbitrary computed form).
    pub fn operator_atom(&self) -> Option<Atom> {
        match self {
            Ast::Form(op, _) => match op.as_ref() {
                Ast::Atom(a) => Some(*a),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_form_args(&self) -> Option<&[Ast]> {
        match self {
            Ast::Form(_, args) => Some(args),
            _ => None,
        }
    }
}
