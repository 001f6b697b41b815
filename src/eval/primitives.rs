//! # Binary and Unary Primitives
//!
//! The operator dispatch table of the single-stepper. A primitive either
//! produces the reduced expression or reports that it has no rule for the
//! operands — which the caller treats as "this node does not reduce yet".

use std::cmp::Ordering;

use crate::ast::expression::{Atom, Expr, Op};

use super::error::EvalError;
use super::{apply, EvalEnv};

/// `replicate`-semantics power: a non-positive exponent yields the empty
/// product, i.e. 1.
fn power(base: i64, exponent: i64) -> i64 {
    if exponent <= 0 {
        return 1;
    }
    let mut acc: i64 = 1;
    let mut base = base;
    let mut exp = exponent as u64;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    acc
}

fn int_atoms(left: &Expr<()>, right: &Expr<()>) -> Option<(i64, i64)> {
    match (left, right) {
        (
            Expr::Atom {
                atom: Atom::Int(a), ..
            },
            Expr::Atom {
                atom: Atom::Int(b), ..
            },
        ) => Some((*a, *b)),
        _ => None,
    }
}

fn bool_atom(expr: &Expr<()>) -> Option<bool> {
    match expr {
        Expr::Atom {
            atom: Atom::Bool(b),
            ..
        } => Some(*b),
        _ => None,
    }
}

/// Pointwise comparison of two atoms of the same base type.
fn compare_atoms(left: &Atom, right: &Atom) -> Option<Ordering> {
    match (left, right) {
        (Atom::Int(a), Atom::Int(b)) => Some(a.cmp(b)),
        (Atom::Char(a), Atom::Char(b)) => Some(a.cmp(b)),
        (Atom::Bool(a), Atom::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Dispatch one binary operator application.
pub fn binary(
    env: &EvalEnv,
    op: &Op,
    left: &Expr<()>,
    right: &Expr<()>,
) -> Result<Expr<()>, EvalError> {
    let err = || EvalError::binary_op_error(op, left, right);
    match op {
        Op::Power => match int_atoms(left, right) {
            Some((a, b)) => Ok(Expr::int(power(a, b))),
            None => Err(err()),
        },
        Op::Mul => match int_atoms(left, right) {
            Some((a, b)) => Ok(Expr::int(a.wrapping_mul(b))),
            None => Err(err()),
        },
        Op::Add => match int_atoms(left, right) {
            Some((a, b)) => Ok(Expr::int(a.wrapping_add(b))),
            None => Err(err()),
        },
        Op::Sub => match int_atoms(left, right) {
            Some((a, b)) => Ok(Expr::int(a.wrapping_sub(b))),
            None => Err(err()),
        },

        Op::Colon => match right {
            Expr::List { items, .. } => {
                let mut out = Vec::with_capacity(items.len() + 1);
                out.push(left.clone());
                out.extend(items.iter().cloned());
                Ok(Expr::list(out))
            }
            _ => Err(err()),
        },

        Op::Append => match (left, right) {
            (Expr::List { items: a, .. }, Expr::List { items: b, .. }) => {
                let mut out = a.clone();
                out.extend(b.iter().cloned());
                Ok(Expr::list(out))
            }
            _ => Err(err()),
        },

        Op::Equ | Op::Neq | Op::Lt | Op::Leq | Op::Gt | Op::Geq => match (left, right) {
            (Expr::Atom { atom: a, .. }, Expr::Atom { atom: b, .. }) => {
                match compare_atoms(a, b) {
                    Some(ordering) => {
                        let result = match op {
                            Op::Equ => ordering == Ordering::Equal,
                            Op::Neq => ordering != Ordering::Equal,
                            Op::Lt => ordering == Ordering::Less,
                            Op::Leq => ordering != Ordering::Greater,
                            Op::Gt => ordering == Ordering::Greater,
                            _ => ordering != Ordering::Less,
                        };
                        Ok(Expr::boolean(result))
                    }
                    None => Err(err()),
                }
            }
            _ => Err(err()),
        },

        // Short-circuits on the absorbing value in either operand; the
        // neutral value yields the other operand unevaluated.
        Op::And => {
            if bool_atom(left) == Some(false) || bool_atom(right) == Some(false) {
                Ok(Expr::boolean(false))
            } else if bool_atom(left) == Some(true) {
                Ok(right.clone())
            } else if bool_atom(right) == Some(true) {
                Ok(left.clone())
            } else {
                Err(err())
            }
        }
        Op::Or => {
            if bool_atom(left) == Some(true) || bool_atom(right) == Some(true) {
                Ok(Expr::boolean(true))
            } else if bool_atom(left) == Some(false) {
                Ok(right.clone())
            } else if bool_atom(right) == Some(false) {
                Ok(left.clone())
            } else {
                Err(err())
            }
        }

        Op::Dollar => Ok(Expr::app(left.clone(), vec![right.clone()])),

        // Composition only reduces as an application head; an
        // infix-constructor cell is already a value.
        Op::Composition | Op::InfixConstr(_) => Err(err()),

        Op::InfixFunc(name) => apply(env, name, &[left.clone(), right.clone()]),
    }
}

/// Dispatch one unary operator application. Only negation of an integer
/// atom is defined.
pub fn unary(op: &Op, expr: &Expr<()>) -> Result<Expr<()>, EvalError> {
    match (op, expr) {
        (
            Op::Sub,
            Expr::Atom {
                atom: Atom::Int(i), ..
            },
        ) => Ok(Expr::int(i.wrapping_neg())),
        _ => Err(EvalError::unary_op_error(op, expr)),
    }
}

/// Floored division and modulo, wired in under the names `div` and `mod`.
pub fn builtin_div_mod(name: &str, args: &[Expr<()>]) -> Result<Expr<()>, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::cannot_evaluate(&Expr::app(
            Expr::name(name),
            args.to_vec(),
        )));
    }
    match int_atoms(&args[0], &args[1]) {
        Some((_, 0)) => Err(EvalError::DivByZero),
        Some((a, b)) => {
            // Floors toward negative infinity.
            let q = a.wrapping_div(b);
            let r = a.wrapping_rem(b);
            let floored_div = if r != 0 && (r < 0) != (b < 0) { q - 1 } else { q };
            let result = if name == "div" {
                floored_div
            } else {
                a.wrapping_sub(floored_div.wrapping_mul(b))
            };
            Ok(Expr::int(result))
        }
        None => Err(EvalError::binary_op_error(
            &Op::InfixFunc(name.to_string()),
            &args[0],
            &args[1],
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> EvalEnv {
        EvalEnv::new()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            binary(&env(), &Op::Add, &Expr::int(2), &Expr::int(3)),
            Ok(Expr::int(5))
        );
        assert_eq!(
            binary(&env(), &Op::Mul, &Expr::int(4), &Expr::int(5)),
            Ok(Expr::int(20))
        );
        assert_eq!(
            binary(&env(), &Op::Sub, &Expr::int(2), &Expr::int(3)),
            Ok(Expr::int(-1))
        );
    }

    #[test]
    fn test_power_quirk_on_nonpositive_exponent() {
        assert_eq!(
            binary(&env(), &Op::Power, &Expr::int(2), &Expr::int(10)),
            Ok(Expr::int(1024))
        );
        assert_eq!(
            binary(&env(), &Op::Power, &Expr::int(2), &Expr::int(0)),
            Ok(Expr::int(1))
        );
        assert_eq!(
            binary(&env(), &Op::Power, &Expr::int(2), &Expr::int(-3)),
            Ok(Expr::int(1))
        );
    }

    #[test]
    fn test_colon_requires_list_tail() {
        assert_eq!(
            binary(
                &env(),
                &Op::Colon,
                &Expr::int(1),
                &Expr::list(vec![Expr::int(2)])
            ),
            Ok(Expr::list(vec![Expr::int(1), Expr::int(2)]))
        );
        assert!(binary(&env(), &Op::Colon, &Expr::int(1), &Expr::int(2)).is_err());
    }

    #[test]
    fn test_append_lists() {
        assert_eq!(
            binary(
                &env(),
                &Op::Append,
                &Expr::list(vec![Expr::int(1)]),
                &Expr::list(vec![Expr::int(2)])
            ),
            Ok(Expr::list(vec![Expr::int(1), Expr::int(2)]))
        );
    }

    #[test]
    fn test_comparisons_polymorphic_pointwise() {
        assert_eq!(
            binary(&env(), &Op::Lt, &Expr::character('a'), &Expr::character('b')),
            Ok(Expr::boolean(true))
        );
        assert_eq!(
            binary(&env(), &Op::Equ, &Expr::boolean(true), &Expr::boolean(true)),
            Ok(Expr::boolean(true))
        );
        assert!(binary(&env(), &Op::Equ, &Expr::int(1), &Expr::character('a')).is_err());
    }

    #[test]
    fn test_and_short_circuits_both_directions() {
        let pending = Expr::app(Expr::name("loop"), vec![Expr::int(1)]);
        assert_eq!(
            binary(&env(), &Op::And, &pending, &Expr::boolean(false)),
            Ok(Expr::boolean(false))
        );
        assert_eq!(
            binary(&env(), &Op::And, &Expr::boolean(true), &pending),
            Ok(pending.clone())
        );
        assert_eq!(
            binary(&env(), &Op::Or, &pending, &Expr::boolean(true)),
            Ok(Expr::boolean(true))
        );
    }

    #[test]
    fn test_dollar_becomes_application() {
        assert_eq!(
            binary(&env(), &Op::Dollar, &Expr::name("f"), &Expr::int(1)),
            Ok(Expr::app(Expr::name("f"), vec![Expr::int(1)]))
        );
    }

    #[test]
    fn test_unary_negation_only() {
        assert_eq!(unary(&Op::Sub, &Expr::int(3)), Ok(Expr::int(-3)));
        assert!(unary(&Op::Sub, &Expr::boolean(true)).is_err());
        assert!(unary(&Op::Add, &Expr::int(3)).is_err());
    }

    #[test]
    fn test_div_mod_floored() {
        let div = |a, b| builtin_div_mod("div", &[Expr::int(a), Expr::int(b)]);
        let md = |a, b| builtin_div_mod("mod", &[Expr::int(a), Expr::int(b)]);
        assert_eq!(div(7, 2), Ok(Expr::int(3)));
        assert_eq!(div(-7, 2), Ok(Expr::int(-4)));
        assert_eq!(md(-7, 2), Ok(Expr::int(1)));
        assert_eq!(md(7, -2), Ok(Expr::int(-1)));
        assert_eq!(div(5, 0), Err(EvalError::DivByZero));
    }
}
