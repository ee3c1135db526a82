//! Arithmetic operations (§4.5): integer-only, non-numeric operands coerce
//! to zero, empty-argument neutrals per spec (`+`→0, `*`→1, `-`→0, `/`→0).

use super::arg;
use crate::evaluator::{EvalResult, Evaluator};
use crate::value::Value;

pub fn dispatch(_ev: &mut Evaluator, name: &str, args: &[Value]) -> Option<EvalResult> {
    let nums: Vec<i16> = args.iter().map(Value::as_number).collect();
    match name {
        "+" => Some(Ok(Value::Number(nums.iter().fold(0i16, |a, b| a.wrapping_add(*b))))),
        "*" => Some(Ok(Value::Number(nums.iter().fold(1i16, |a, b| a.wrapping_mul(*b))))),
        "-" => Some(Ok(Value::Number(match nums.as_slice() {
            [] => 0,
            [x] => 0i16.wrapping_sub(*x),
            [first, rest @ ..] => rest.iter().fold(*first, |a, b| a.wrapping_sub(*b)),
        }))),
        "/" => Some(Ok(Value::Number(match nums.as_slice() {
            [] => 0,
            [x] => *x,
            [first, rest @ ..] => {
                let mut acc = *first;
                for b in rest {
                    if *b != 0 {
                        acc /= b;
                    }
                }
                acc
            }
        }))),
        "MOD" => {
            let b = nums.get(1).copied().unwrap_or(0);
            let a = nums.first().copied().unwrap_or(0);
            Some(Ok(Value::Number(if b == 0 { 0 } else { a % b })))
        }
        "MIN" => Some(Ok(Value::Number(nums.into_iter().min().unwrap_or(0)))),
        "MAX" => Some(Ok(Value::Number(nums.into_iter().max().unwrap_or(0)))),
        "ABS" => Some(Ok(Value::Number(arg(args, 0).as_number().abs()))),
        "FIX" => Some(Ok(Value::Number(arg(args, 0).as_number()))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use crate::value::Value;

    #[test]
    fn basic_arithmetic() {
        assert_eq!(run("<ROUTINE GO () <+ 2 3 4>>"), Value::Number(9));
        assert_eq!(run("<ROUTINE GO () <- 10 3>>"), Value::Number(7));
        assert_eq!(run("<ROUTINE GO () <* 2 3 4>>"), Value::Number(24));
        assert_eq!(run("<ROUTINE GO () </ 20 4>>"), Value::Number(5));
    }

    #[test]
    fn division_by_zero_is_skipped_not_a_panic() {
        assert_eq!(run("<ROUTINE GO () </ 10 0>>"), Value::Number(10));
    }

    #[test]
    fn mod_min_max_abs() {
        assert_eq!(run("<ROUTINE GO () <MOD 7 3>>"), Value::Number(1));
        assert_eq!(run("<ROUTINE GO () <MIN 4 1 9>>"), Value::Number(1));
        assert_eq!(run("<ROUTINE GO () <MAX 4 1 9>>"), Value::Number(9));
        assert_eq!(run("<ROUTINE GO () <ABS -5>>"), Value::Number(5));
    }
}
