//! # Arithmetic Sequence Unfolding
//!
//! `[x ..]`, `[x, y ..]`, `[x .. z]` and `[x, y .. z]` unfold lazily, one
//! cons cell per step: either `head : <remaining sequence>` or a
//! terminating list. Enumeration works on the ordinal of the base type
//! (`Int` as itself, `Bool` as 0/1, `Char` as its scalar value), computed
//! in 128-bit space so stepping near the type's bounds cannot wrap.
//!
//! Termination:
//! - `[x ..]` stops at the top of the type;
//! - `[x, y ..]` stops when the next element would pass the top (ascending)
//!   or the bottom (descending); a zero step emits `[x]` once;
//! - `[x .. z]` stops at `z` (empty if `x > z`);
//! - `[x, y .. z]` stops at or past `z` in the direction of the step.
//!
//! Every unfold shortens the remaining ordinal distance, so all sequences
//! produce finite lists bounded by the cardinality of the base type.

use crate::ast::expression::{Atom, Expr, Op};

use super::error::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumKind {
    Int,
    Bool,
    Char,
}

fn enum_atom(expr: &Expr<()>) -> Option<(EnumKind, i128)> {
    match expr {
        Expr::Atom { atom, .. } => match atom {
            Atom::Int(i) => Some((EnumKind::Int, *i as i128)),
            Atom::Bool(b) => Some((EnumKind::Bool, *b as i128)),
            Atom::Char(c) => Some((EnumKind::Char, *c as u32 as i128)),
            _ => None,
        },
        _ => None,
    }
}

fn make_atom(kind: EnumKind, ord: i128) -> Option<Atom> {
    match kind {
        EnumKind::Int => i64::try_from(ord).ok().map(Atom::Int),
        EnumKind::Bool => match ord {
            0 => Some(Atom::Bool(false)),
            1 => Some(Atom::Bool(true)),
            _ => None,
        },
        EnumKind::Char => u32::try_from(ord).ok().and_then(char::from_u32).map(Atom::Char),
    }
}

fn top(kind: EnumKind) -> i128 {
    match kind {
        EnumKind::Int => i64::MAX as i128,
        EnumKind::Bool => 1,
        EnumKind::Char => char::MAX as u32 as i128,
    }
}

/// Ordinal successor; for `Char` the surrogate gap is skipped. `None` at
/// the top of the type.
fn succ(kind: EnumKind, ord: i128) -> Option<i128> {
    if ord >= top(kind) {
        return None;
    }
    let next = ord + 1;
    if kind == EnumKind::Char && (0xD800..=0xDFFF).contains(&next) {
        return Some(0xE000);
    }
    Some(next)
}

fn head(kind: EnumKind, ord: i128) -> Expr<()> {
    // `ord` always came from an existing atom of this kind.
    Expr::atom(make_atom(kind, ord).expect("ordinal of an existing atom"))
}

fn cons(kind: EnumKind, ord: i128, rest: Expr<()>) -> Expr<()> {
    Expr::binary(Op::Colon, head(kind, ord), rest)
}

fn singleton(kind: EnumKind, ord: i128) -> Expr<()> {
    Expr::list(vec![head(kind, ord)])
}

/// One unfold step of an arithmetic-sequence node. Anchors that are not
/// yet enumerable atoms (or disagree on their base type) leave the node
/// unevaluable; the caller steps them first.
pub fn unfold_seq(expr: &Expr<()>) -> Result<Expr<()>, EvalError> {
    let (start, step, end) = match expr {
        Expr::ArithmSeq {
            start, step, end, ..
        } => (start, step, end),
        other => return Err(EvalError::cannot_evaluate(other)),
    };

    let (kind, x) = match enum_atom(start) {
        Some(found) => found,
        None => return Err(EvalError::cannot_evaluate(expr)),
    };
    let step = match step {
        None => None,
        Some(e) => match enum_atom(e) {
            Some((k, y)) if k == kind => Some(y),
            _ => return Err(EvalError::cannot_evaluate(expr)),
        },
    };
    let end = match end {
        None => None,
        Some(e) => match enum_atom(e) {
            Some((k, z)) if k == kind => Some(z),
            _ => return Err(EvalError::cannot_evaluate(expr)),
        },
    };

    Ok(match (step, end) {
        // [x ..]
        (None, None) => match succ(kind, x) {
            None => singleton(kind, x),
            Some(next) => cons(
                kind,
                x,
                Expr::arithm_seq(head(kind, next), None, None),
            ),
        },

        // [x .. z]
        (None, Some(z)) => {
            if x > z {
                Expr::list(vec![])
            } else if x == z {
                singleton(kind, x)
            } else {
                match succ(kind, x) {
                    None => singleton(kind, x),
                    Some(next) => cons(
                        kind,
                        x,
                        Expr::arithm_seq(head(kind, next), None, Some(head(kind, z))),
                    ),
                }
            }
        }

        // [x, y ..]
        (Some(y), None) => {
            let delta = y - x;
            if delta == 0 {
                singleton(kind, x)
            } else {
                let beyond = y + delta;
                let rest = match make_atom(kind, beyond) {
                    Some(atom) => Expr::arithm_seq(head(kind, y), Some(Expr::atom(atom)), None),
                    None => singleton(kind, y),
                };
                cons(kind, x, rest)
            }
        }

        // [x, y .. z]
        (Some(y), Some(z)) => {
            let delta = y - x;
            if delta == 0 {
                if x > z {
                    Expr::list(vec![])
                } else {
                    singleton(kind, x)
                }
            } else if (delta > 0 && x > z) || (delta < 0 && x < z) {
                Expr::list(vec![])
            } else if (delta > 0 && y > z) || (delta < 0 && y < z) {
                singleton(kind, x)
            } else {
                let beyond = y + delta;
                let rest = match make_atom(kind, beyond) {
                    Some(atom) => Expr::arithm_seq(
                        head(kind, y),
                        Some(Expr::atom(atom)),
                        Some(head(kind, z)),
                    ),
                    None => singleton(kind, y),
                };
                cons(kind, x, rest)
            }
        }
    })
}
