//! The fixed built-in macro catalog from §4.3. Each function recognizes one
//! operator name and rewrites the call form; `expand_builtin` returns `None`
//! for anything it doesn't own so the caller falls through to user macros.

use crate::ast::Ast;
use crate::atom::Atom;

pub fn expand_builtin(op: &Atom, args: &[Ast]) -> Result<Option<Ast>, String> {
    let name = op.name();
    let expanded = match name.as_str() {
        "TELL" => Some(expand_tell(args)?),
        "VERB?" => Some(fanout_equal("PRSA", "V?", args)),
        "PRSO?" => Some(equal_ref("PRSO", args)),
        "PRSI?" => Some(equal_ref("PRSI", args)),
        "ROOM?" => Some(equal_ref("HERE", args)),
        "BSET" => Some(bflag("FSET", args)),
        "BCLEAR" => Some(bflag("FCLEAR", args)),
        "BSET?" => Some(bflag_test(args)),
        "ENABLE" => Some(enable_toggle(args, 1)),
        "DISABLE" => Some(enable_toggle(args, 0)),
        "RFATAL" => Some(Ast::form(
            Ast::atom("PROG"),
            vec![
                Ast::List(vec![]),
                Ast::form(Ast::atom("PUSH"), vec![Ast::Number(2)]),
                Ast::form(Ast::atom("RSTACK"), vec![]),
            ],
        )),
        "FLAMING?" => Some(Ast::form(
            Ast::atom("AND"),
            vec![
                Ast::form(
                    Ast::atom("FSET?"),
                    vec![args[0].clone(), Ast::GlobalRef(Atom::intern("FLAMEBIT"))],
                ),
                Ast::form(
                    Ast::atom("FSET?"),
                    vec![args[0].clone(), Ast::GlobalRef(Atom::intern("ONBIT"))],
                ),
            ],
        )),
        "OPENABLE?" => Some(Ast::form(
            Ast::atom("OR"),
            vec![
                Ast::form(
                    Ast::atom("FSET?"),
                    vec![args[0].clone(), Ast::GlobalRef(Atom::intern("DOORBIT"))],
                ),
                Ast::form(
                    Ast::atom("FSET?"),
                    vec![args[0].clone(), Ast::GlobalRef(Atom::intern("CONTBIT"))],
                ),
            ],
        )),
        "ABS" => Some(Ast::form(
            Ast::atom("COND"),
            vec![
                Ast::List(vec![
                    Ast::form(Ast::atom("L?"), vec![args[0].clone(), Ast::Number(0)]),
                    Ast::form(Ast::atom("-"), vec![Ast::Number(0), args[0].clone()]),
                ]),
                Ast::List(vec![Ast::atom("T"), args[0].clone()]),
            ],
        )),
        "PROB" => Some(expand_prob(args)),
        _ => None,
    };
    Ok(expanded)
}

fn equal_ref(global: &str, args: &[Ast]) -> Ast {
    Ast::form(
        Ast::atom("EQUAL?"),
        vec![
            Ast::GlobalRef(Atom::intern(global)),
            Ast::GlobalRef(
                args.first()
                    .and_then(atom_of)
                    .unwrap_or_else(|| Atom::intern("FALSE")),
            ),
        ],
    )
}

fn atom_of(a: &Ast) -> Option<Atom> {
    match a {
        Ast::Atom(a) | Ast::QuotedAtom(a) | Ast::GlobalRef(a) | Ast::LocalRef(a) => Some(*a),
        _ => None,
    }
}

fn fanout_equal(global: &str, prefix: &str, args: &[Ast]) -> Ast {
    let comparisons: Vec<Ast> = args
        .iter()
        .map(|a| {
            let vname = atom_of(a).map(|at| at.name()).unwrap_or_default();
            Ast::form(
                Ast::atom("EQUAL?"),
                vec![
                    Ast::GlobalRef(Atom::intern(global)),
                    Ast::GlobalRef(Atom::intern(&format!("{prefix}{vname}"))),
                ],
            )
        })
        .collect();
    if comparisons.len() == 1 {
        comparisons.into_iter().next().unwrap()
    } else {
        Ast::form(Ast::atom("OR"), comparisons)
    }
}

fn bflag(single_op: &str, args: &[Ast]) -> Ast {
    if args.len() < 2 {
        return Ast::false_form();
    }
    let obj = &args[0];
    let flags = &args[1..];
    if flags.len() == 1 {
        Ast::form(
            Ast::atom(single_op),
            vec![obj.clone(), Ast::GlobalRef(atom_of(&flags[0]).unwrap_or_else(|| Atom::intern("FALSE")))],
        )
    } else {
        let mut body = vec![Ast::List(vec![])];
        for f in flags {
            body.push(Ast::form(
                Ast::atom(single_op),
                vec![obj.clone(), Ast::GlobalRef(atom_of(f).unwrap_or_else(|| Atom::intern("FALSE")))],
            ));
        }
        Ast::form(Ast::atom("PROG"), body)
    }
}

fn bflag_test(args: &[Ast]) -> Ast {
    if args.len() < 2 {
        return Ast::false_form();
    }
    let obj = &args[0];
    let flags = &args[1..];
    let tests: Vec<Ast> = flags
        .iter()
        .map(|f| {
            Ast::form(
                Ast::atom("FSET?"),
                vec![obj.clone(), Ast::GlobalRef(atom_of(f).unwrap_or_else(|| Atom::intern("FALSE")))],
            )
        })
        .collect();
    if tests.len() == 1 {
        tests.into_iter().next().unwrap()
    } else {
        Ast::form(Ast::atom("OR"), tests)
    }
}

fn enable_toggle(args: &[Ast], value: i16) -> Ast {
    Ast::form(
        Ast::atom("PUT"),
        vec![
            args.first().cloned().unwrap_or_else(Ast::false_form),
            Ast::GlobalRef(Atom::intern("C-ENABLED?")),
            Ast::Number(value),
        ],
    )
}

fn expand_prob(args: &[Ast]) -> Ast {
    if args.len() >= 2 {
        return Ast::form(Ast::atom("ZPROB"), args.to_vec());
    }
    Ast::form(
        Ast::atom("G?"),
        vec![
            args.first().cloned().unwrap_or(Ast::Number(0)),
            Ast::form(Ast::atom("RANDOM"), vec![Ast::Number(100)]),
        ],
    )
}

/// TELL walks its argument list linearly, classifying each atom against the
/// small fixed vocabulary of print directives (§4.3).
fn expand_tell(args: &[Ast]) -> Result<Ast, String> {
    let mut prints = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match &args[i] {
            Ast::String(_) => {
                prints.push(Ast::form(Ast::atom("PRINTI"), vec![args[i].clone()]));
                i += 1;
            }
            Ast::Atom(a) if a.eq_str("CR") || a.eq_str("CRLF") => {
                prints.push(Ast::form(Ast::atom("CRLF"), vec![]));
                i += 1;
            }
            Ast::Atom(a) if matches!(a.name().as_str(), "D" | "DESC" | "O" | "OBJ") => {
                let target = args.get(i + 1).cloned().ok_or("TELL: D/DESC/O/OBJ needs an argument")?;
                prints.push(Ast::form(Ast::atom("PRINTD"), vec![target]));
                i += 2;
            }
            Ast::Atom(a) if matches!(a.name().as_str(), "N" | "NUM") => {
                let target = args.get(i + 1).cloned().ok_or("TELL: N/NUM needs an argument")?;
                prints.push(Ast::form(Ast::atom("PRINTN"), vec![target]));
                i += 2;
            }
            Ast::Atom(a) if matches!(a.name().as_str(), "C" | "CHR" | "CHAR") => {
                let target = args.get(i + 1).cloned().ok_or("TELL: C/CHR/CHAR needs an argument")?;
                prints.push(Ast::form(Ast::atom("PRINTC"), vec![target]));
                i += 2;
            }
            Ast::Atom(a) if matches!(a.name().as_str(), "A" | "AN") => {
                let target = args.get(i + 1).cloned().ok_or("TELL: A/AN needs an argument")?;
                prints.push(Ast::form(Ast::atom("PRINTA"), vec![target]));
                i += 2;
            }
            Ast::Atom(a) => {
                let target = args
                    .get(i + 1)
                    .cloned()
                    .ok_or_else(|| format!("TELL: property atom {a} needs an argument"))?;
                prints.push(Ast::form(
                    Ast::atom("PRINT"),
                    vec![Ast::form(Ast::atom("GETP"), vec![target, Ast::Atom(*a)])],
                ));
                i += 2;
            }
            form @ Ast::Form(_, _) => {
                prints.push(Ast::form(Ast::atom("PRINT"), vec![form.clone()]));
                i += 1;
            }
            other => return Err(format!("TELL: unexpected item {other:?}")),
        }
    }
    let mut body = vec![Ast::List(vec![])];
    body.extend(prints);
    Ok(Ast::form(Ast::atom("PROG"), body))
}
