//! Compile-time constant folding for `%<…>` forms (§4.3). Only fully
//! literal arithmetic folds; anything else is left as a regular form for
//! the evaluator to handle at runtime (§9, "`%<…>` at runtime").

use crate::ast::Ast;

pub fn fold_constant(node: &Ast) -> Option<Ast> {
    eval_literal(node).map(Ast::Number)
}

fn eval_literal(node: &Ast) -> Option<i16> {
    match node {
        Ast::Number(n) => Some(*n),
        Ast::Form(op, args) => {
            let Ast::Atom(op_atom) = op.as_ref() else {
                return None;
            };
            let operands: Option<Vec<i16>> = args.iter().map(eval_literal).collect();
            let operands = operands?;
            apply(&op_atom.name(), &operands)
        }
        _ => None,
    }
}

fn apply(op: &str, operands: &[i16]) -> Option<i16> {
    match op {
        "+" => Some(operands.iter().fold(0i16, |a, b| a.wrapping_add(*b))),
        "*" => Some(operands.iter().fold(1i16, |a, b| a.wrapping_mul(*b))),
        "-" => match operands {
            [] => Some(0),
            [x] => Some(0i16.wrapping_sub(*x)),
            [first, rest @ ..] => Some(rest.iter().fold(*first, |a, b| a.wrapping_sub(*b))),
        },
        "/" => match operands {
            [] => Some(0),
            [x] => Some(*x),
            [first, rest @ ..] => {
                let mut acc = *first;
                for b in rest {
                    if *b == 0 {
                        // division by zero leaves the form unevaluated
                        return None;
                    }
                    acc /= b;
                }
                Some(acc)
            }
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read;

    fn fold(src: &str) -> Option<Ast> {
        let forms = read(src).unwrap();
        fold_constant(&forms[0])
    }

    #[test]
    fn nested_arithmetic_folds() {
        assert_eq!(fold("<* 2 <+ 3 4>>"), Some(Ast::Number(14)));
    }

    #[test]
    fn division_by_zero_does_not_fold() {
        assert_eq!(fold("</ 4 0>"), None);
    }

    #[test]
    fn empty_plus_is_zero_empty_star_is_one() {
        assert_eq!(fold("<+>"), Some(Ast::Number(0)));
        assert_eq!(fold("<*>"), Some(Ast::Number(1)));
        assert_eq!(fold("<- 5>"), Some(Ast::Number(-5)));
    }

    #[test]
    fn non_literal_operand_does_not_fold() {
        assert_eq!(fold("<+ 1 ,X>"), None);
    }
}
