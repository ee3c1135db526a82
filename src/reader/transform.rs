//! Promotes recognized top-level forms (`ROUTINE`, `OBJECT`, `GLOBAL`,
//! `INSERT-FILE`, `DEFMAC`) to their typed [`Ast`] variants. Everything else
//! passes through unchanged.

use crate::ast::{Ast, MacroParam, Param, ParamKind};
use crate::atom::Atom;

pub fn promote(form: Ast) -> Result<Ast, String> {
    let Ast::Form(op, args) = &form else {
        return Ok(form);
    };
    let Ast::Atom(op_atom) = op.as_ref() else {
        return Ok(form);
    };
    let name = op_atom.name();
    match name.as_str() {
        "ROUTINE" => promote_routine(args),
        "OBJECT" | "ROOM" => promote_object(args),
        "GLOBAL" => promote_global(args),
        "INSERT-FILE" => promote_include(args),
        "DEFMAC" => promote_defmac(args),
        _ => Ok(form),
    }
}

fn promote_routine(args: &[Ast]) -> Result<Ast, String> {
    if args.len() < 2 {
        return Err("ROUTINE requires a name and a parameter list".into());
    }
    let Ast::Atom(name) = &args[0] else {
        return Err("ROUTINE name must be an atom".into());
    };
    let Ast::List(param_forms) = &args[1] else {
        return Err("ROUTINE parameter list must be parenthesized".into());
    };
    let params = parse_params(param_forms)?;
    Ok(Ast::Routine {
        name: *name,
        params,
        body: args[2..].to_vec(),
    })
}

/// A `(OPTIONAL|AUX|ARGS)` separator switches the parameter `kind` for
/// everything that follows. Real ZIL source spells these as quoted
/// strings (`"AUX"`), which the lexer/reader hand back as `Ast::String`
/// rather than `Ast::Atom`, so both forms must be recognized.
fn param_separator_kind(text: &str) -> Option<ParamKind> {
    match text.to_uppercase().as_str() {
        "OPTIONAL" => Some(ParamKind::Optional),
        "AUX" | "EXTRA" => Some(ParamKind::Aux),
        "ARGS" => Some(ParamKind::Args),
        _ => None,
    }
}

fn parse_params(forms: &[Ast]) -> Result<Vec<Param>, String> {
    let mut params = Vec::new();
    let mut kind = ParamKind::Required;
    for f in forms {
        match f {
            Ast::Atom(a) => {
                if let Some(k) = param_separator_kind(&a.name()) {
                    kind = k;
                    continue;
                }
                params.push(Param {
                    name: *a,
                    default: None,
                    kind: kind.clone(),
                });
            }
            Ast::String(s) => {
                let Some(k) = param_separator_kind(s) else {
                    return Err(format!("unexpected parameter form: {f:?}"));
                };
                kind = k;
            }
            Ast::List(items) if !items.is_empty() => {
                let Ast::Atom(pname) = &items[0] else {
                    return Err("parameter name must be an atom".into());
                };
                let default = items.get(1).cloned();
                params.push(Param {
                    name: *pname,
                    default,
                    kind: kind.clone(),
                });
            }
            _ => return Err(format!("unexpected parameter form: {f:?}")),
        }
    }
    Ok(params)
}

fn promote_object(args: &[Ast]) -> Result<Ast, String> {
    if args.is_empty() {
        return Err("OBJECT requires a name".into());
    }
    let Ast::Atom(name) = &args[0] else {
        return Err("OBJECT name must be an atom".into());
    };
    let mut properties = Vec::new();
    for prop_form in &args[1..] {
        let Ast::List(items) = prop_form else {
            return Err("OBJECT property must be a parenthesized list".into());
        };
        if items.is_empty() {
            continue;
        }
        let Ast::Atom(pname) = &items[0] else {
            return Err("OBJECT property name must be an atom".into());
        };
        properties.push((*pname, items[1..].to_vec()));
    }
    Ok(Ast::Object {
        name: *name,
        properties,
    })
}

fn promote_global(args: &[Ast]) -> Result<Ast, String> {
    if args.len() < 2 {
        return Err("GLOBAL requires a name and an initializer".into());
    }
    let Ast::Atom(name) = &args[0] else {
        return Err("GLOBAL name must be an atom".into());
    };
    Ok(Ast::Global {
        name: *name,
        init: Box::new(args[1].clone()),
    })
}

fn promote_include(args: &[Ast]) -> Result<Ast, String> {
    let Some(Ast::String(name)) = args.first() else {
        return Err("INSERT-FILE requires a quoted filename".into());
    };
    Ok(Ast::IncludeRef(name.clone()))
}

fn promote_defmac(args: &[Ast]) -> Result<Ast, String> {
    if args.len() < 2 {
        return Err("DEFMAC requires a name and a parameter list".into());
    }
    let Ast::Atom(name) = &args[0] else {
        return Err("DEFMAC name must be an atom".into());
    };
    let Ast::List(param_forms) = &args[1] else {
        return Err("DEFMAC parameter list must be parenthesized".into());
    };
    let mut params = Vec::new();
    let mut kind = ParamKind::Required;
    for f in param_forms {
        match f {
            Ast::Atom(a) => {
                if let Some(k) = param_separator_kind(&a.name()) {
                    kind = k;
                    continue;
                }
                params.push(MacroParam {
                    name: *a,
                    quoted: false,
                    default: None,
                    kind: kind.clone(),
                });
            }
            Ast::String(s) => {
                let Some(k) = param_separator_kind(s) else {
                    return Err(format!("unexpected DEFMAC parameter form: {f:?}"));
                };
                kind = k;
            }
            Ast::QuotedAtom(a) => params.push(MacroParam {
                name: *a,
                quoted: true,
                default: None,
                kind: kind.clone(),
            }),
            Ast::List(items) if !items.is_empty() => {
                let (pname, quoted) = match &items[0] {
                    Ast::Atom(a) => (*a, false),
                    Ast::QuotedAtom(a) => (*a, true),
                    other => return Err(format!("DEFMAC parameter name must be an atom: {other:?}")),
                };
                let default = items.get(1).cloned();
                params.push(MacroParam {
                    name: pname,
                    quoted,
                    default,
                    kind: kind.clone(),
                });
            }
            _ => return Err(format!("unexpected DEFMAC parameter form: {f:?}")),
        }
    }
    Ok(Ast::MacroDef {
        name: *name,
        params,
        body: args[2..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read;

    #[test]
    fn routine_params_classify_by_separator() {
        let forms = read("<ROUTINE F (X (Y 1) AUX (Z 0) ARGS REST) <RTRUE>>").unwrap();
        let Ast::Routine { params, .. } = &forms[0] else {
            panic!("expected routine")
        };
        assert_eq!(params[0].kind, ParamKind::Required);
        assert_eq!(params[1].kind, ParamKind::Optional);
        assert_eq!(params[2].kind, ParamKind::Aux);
        assert_eq!(params[3].kind, ParamKind::Args);
    }

    #[test]
    fn routine_params_classify_by_quoted_string_separator() {
        let forms = read(r#"<ROUTINE F (X "OPTIONAL" Y "AUX" (Z 0) "ARGS" REST) <RTRUE>>"#).unwrap();
        let Ast::Routine { params, .. } = &forms[0] else {
            panic!("expected routine")
        };
        assert_eq!(params[0].kind, ParamKind::Required);
        assert_eq!(params[1].kind, ParamKind::Optional);
        assert_eq!(params[2].kind, ParamKind::Aux);
        assert_eq!(params[3].kind, ParamKind::Args);
    }

    #[test]
    fn defmac_params_classify_by_quoted_string_separator() {
        let forms = read(r#"<DEFMAC M (X "AUX" Y) <FORM 'TELL .X>>"#).unwrap();
        let Ast::MacroDef { params, .. } = &forms[0] else {
            panic!("expected macro def")
        };
        assert_eq!(params[0].kind, ParamKind::Required);
        assert_eq!(params[1].kind, ParamKind::Aux);
    }

    #[test]
    fn defmac_optional_param_captures_its_default() {
        let forms = read("<DEFMAC M (X (Y 5)) <FORM 'TELL .X .Y>>").unwrap();
        let Ast::MacroDef { params, .. } = &forms[0] else {
            panic!("expected macro def")
        };
        assert_eq!(params[1].default, Some(Ast::Number(5)));
    }
}
