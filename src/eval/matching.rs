//! # Pattern Matching Engine
//!
//! Drives clause dispatch in the evaluator. The engine has two halves:
//!
//! - [`eval_to_binding`] forces an expression *just far enough* to observe
//!   the top constructor a pattern demands, recursing into sub-structure
//!   only along the pattern's shape. This is the whole of the system's
//!   laziness: nothing is evaluated that no pattern looks at.
//! - [`match_binding`] decides a (sufficiently forced) expression against a
//!   pattern, emitting a substitution from pattern variables to
//!   sub-expressions.
//!
//! A failure is either a plain mismatch (try the next clause) or a
//! strictness failure: the expression is not in weak-head-normal form, so
//! no clause decision is possible without forcing the caller refused to do.

use std::collections::HashMap;

use crate::ast::expression::{Atom, Expr, Op};
use crate::ast::pattern::{Binding, ConstrPattern};

use super::error::MatchError;
use super::{eval1, EvalEnv};

/// Result of matching a whole argument list: the substitution, the forced
/// form of every argument, and whether forcing changed anything (a changed
/// argument is itself a visible reduction step).
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub subst: HashMap<String, Expr<()>>,
    pub forced: Vec<Expr<()>>,
    pub changed: bool,
}

/// Weak-head-normal form: the outermost constructor is data (atom, list,
/// tuple, constructor application, infix-constructor cell) or a function
/// value (lambda, section, bare operator). Name references, operator
/// applications, `if`, sequences, `let` and comprehensions all still
/// reduce.
pub fn is_whnf(expr: &Expr<()>) -> bool {
    match expr {
        Expr::Atom { atom, .. } => !matches!(atom, Atom::Name(_)),
        Expr::List { .. } | Expr::NTuple { .. } | Expr::Lambda { .. } => true,
        Expr::SectL { .. } | Expr::SectR { .. } | Expr::PrefixOp { .. } => true,
        Expr::Binary { op, .. } => matches!(op.op, Op::InfixConstr(_)),
        Expr::App { func, .. } => matches!(
            func.as_ref(),
            Expr::Atom {
                atom: Atom::Constr(_),
                ..
            }
        ),
        _ => false,
    }
}

/// Does the top of `expr` already have the shape `pattern` wants to
/// inspect? A name pattern wants nothing; a cons pattern accepts a cons
/// cell or a non-empty list (which [`eval_to_binding`] re-shapes).
fn shape_matches(pattern: &Binding<()>, expr: &Expr<()>) -> bool {
    match pattern {
        Binding::Lit { atom, .. } => match atom {
            Atom::Name(_) => true,
            Atom::Constr(_) => matches!(
                expr,
                Expr::Atom {
                    atom: Atom::Constr(_),
                    ..
                }
            ),
            _ => matches!(expr, Expr::Atom { .. }),
        },
        Binding::ConsLit { .. } => match expr {
            Expr::Binary { op, .. } => matches!(op.op, Op::Colon),
            Expr::List { items, .. } => !items.is_empty(),
            _ => false,
        },
        Binding::ListLit { .. } => matches!(expr, Expr::List { .. }),
        Binding::NTupleLit { .. } => matches!(expr, Expr::NTuple { .. }),
        Binding::ConstrLit { con, .. } => match con {
            ConstrPattern::Prefix { args, .. } => {
                if args.is_empty() {
                    matches!(
                        expr,
                        Expr::Atom {
                            atom: Atom::Constr(_),
                            ..
                        }
                    )
                } else {
                    matches!(
                        expr,
                        Expr::App { func, .. }
                        if matches!(func.as_ref(), Expr::Atom { atom: Atom::Constr(_), .. })
                    )
                }
            }
            ConstrPattern::Infix { .. } => {
                matches!(expr, Expr::Binary { op, .. } if matches!(op.op, Op::InfixConstr(_)))
            }
        },
    }
}

/// Force `expr` until its top constructor matches what `pattern` demands
/// (or no further progress is possible), then recurse into the parts the
/// pattern actually names. Errors from the single-stepper mean "no further
/// progress", never failure. A non-empty list met by a cons pattern is
/// re-shaped into an explicit cons cell.
pub fn eval_to_binding(env: &EvalEnv, expr: &Expr<()>, pattern: &Binding<()>) -> Expr<()> {
    let mut current = expr.clone();
    while !shape_matches(pattern, &current) {
        match eval1(env, &current) {
            Ok(next) if next != current => current = next,
            _ => break,
        }
    }
    refine(env, current, pattern)
}

/// Recurse into sub-structure along the pattern shape only.
fn refine(env: &EvalEnv, expr: Expr<()>, pattern: &Binding<()>) -> Expr<()> {
    match (pattern, expr) {
        (Binding::ConsLit { head, tail, .. }, Expr::List { mut items, .. })
            if !items.is_empty() =>
        {
            let first = items.remove(0);
            Expr::binary(
                Op::Colon,
                eval_to_binding(env, &first, head),
                eval_to_binding(env, &Expr::list(items), tail),
            )
        }
        (Binding::ConsLit { head, tail, .. }, Expr::Binary { op, left, right, info })
            if matches!(op.op, Op::Colon) =>
        {
            Expr::Binary {
                left: Box::new(eval_to_binding(env, &left, head)),
                right: Box::new(eval_to_binding(env, &right, tail)),
                op,
                info,
            }
        }
        (Binding::ListLit { items: patterns, .. }, Expr::List { items, info })
            if patterns.len() == items.len() =>
        {
            Expr::List {
                items: items
                    .into_iter()
                    .zip(patterns.iter())
                    .map(|(e, p)| eval_to_binding(env, &e, p))
                    .collect(),
                info,
            }
        }
        (Binding::NTupleLit { items: patterns, .. }, Expr::NTuple { items, info })
            if patterns.len() == items.len() =>
        {
            Expr::NTuple {
                items: items
                    .into_iter()
                    .zip(patterns.iter())
                    .map(|(e, p)| eval_to_binding(env, &e, p))
                    .collect(),
                info,
            }
        }
        (
            Binding::ConstrLit {
                con: ConstrPattern::Prefix { name, args },
                ..
            },
            Expr::App { func, args: actual, info },
        ) if constr_name(&func) == Some(name.as_str()) && args.len() == actual.len() => {
            Expr::App {
                args: actual
                    .into_iter()
                    .zip(args.iter())
                    .map(|(e, p)| eval_to_binding(env, &e, p))
                    .collect(),
                func,
                info,
            }
        }
        (
            Binding::ConstrLit {
                con: ConstrPattern::Infix { symbol, left, right },
                ..
            },
            Expr::Binary { op, left: l, right: r, info },
        ) if matches!(&op.op, Op::InfixConstr(s) if s == symbol) => Expr::Binary {
            left: Box::new(eval_to_binding(env, &l, left)),
            right: Box::new(eval_to_binding(env, &r, right)),
            op,
            info,
        },
        (_, expr) => expr,
    }
}

fn constr_name(expr: &Expr<()>) -> Option<&str> {
    match expr {
        Expr::Atom {
            atom: Atom::Constr(name),
            ..
        } => Some(name),
        _ => None,
    }
}

/// Classify the pairing when no positive rule applies: strictness failure
/// if the expression could still reduce, plain mismatch otherwise.
fn no_match(pattern: &Binding<()>, expr: &Expr<()>) -> MatchError {
    if is_whnf(expr) {
        MatchError::matching(pattern, expr)
    } else {
        MatchError::strictness(pattern, expr)
    }
}

/// Match one (forced) expression against one pattern, extending `subst`
/// with the variables the pattern binds.
pub fn match_binding(
    pattern: &Binding<()>,
    expr: &Expr<()>,
    subst: &mut HashMap<String, Expr<()>>,
) -> Result<(), MatchError> {
    match pattern {
        Binding::Lit { atom, .. } => match atom {
            Atom::Name(name) => {
                if name != "_" {
                    subst.insert(name.clone(), expr.clone());
                }
                Ok(())
            }
            literal => match expr {
                Expr::Atom { atom: actual, .. } if actual == literal => Ok(()),
                _ => Err(no_match(pattern, expr)),
            },
        },

        Binding::ConsLit { head, tail, .. } => match expr {
            Expr::Binary { op, left, right, .. } if matches!(op.op, Op::Colon) => {
                match_binding(head, left, subst)?;
                match_binding(tail, right, subst)
            }
            Expr::List { items, .. } if !items.is_empty() => {
                match_binding(head, &items[0], subst)?;
                match_binding(tail, &Expr::list(items[1..].to_vec()), subst)
            }
            _ => Err(no_match(pattern, expr)),
        },

        Binding::ListLit { items: patterns, .. } => match expr {
            Expr::List { items, .. } if items.len() == patterns.len() => {
                for (p, e) in patterns.iter().zip(items.iter()) {
                    match_binding(p, e, subst)?;
                }
                Ok(())
            }
            _ => Err(no_match(pattern, expr)),
        },

        Binding::NTupleLit { items: patterns, .. } => match expr {
            Expr::NTuple { items, .. } if items.len() == patterns.len() => {
                for (p, e) in patterns.iter().zip(items.iter()) {
                    match_binding(p, e, subst)?;
                }
                Ok(())
            }
            _ => Err(no_match(pattern, expr)),
        },

        Binding::ConstrLit { con, .. } => match con {
            ConstrPattern::Prefix { name, args } => match expr {
                Expr::Atom {
                    atom: Atom::Constr(actual),
                    ..
                } if args.is_empty() => {
                    if actual == name {
                        Ok(())
                    } else {
                        Err(MatchError::matching(pattern, expr))
                    }
                }
                Expr::App { func, args: actual, .. }
                    if constr_name(func) == Some(name.as_str()) && actual.len() == args.len() =>
                {
                    for (p, e) in args.iter().zip(actual.iter()) {
                        match_binding(p, e, subst)?;
                    }
                    Ok(())
                }
                _ => Err(no_match(pattern, expr)),
            },
            ConstrPattern::Infix { symbol, left, right } => match expr {
                Expr::Binary { op, left: l, right: r, .. }
                    if matches!(&op.op, Op::InfixConstr(s) if s == symbol) =>
                {
                    match_binding(left, l, subst)?;
                    match_binding(right, r, subst)
                }
                _ => Err(no_match(pattern, expr)),
            },
        },
    }
}

/// Match a clause's patterns against its arguments, forcing each argument
/// just enough to decide its pattern first.
pub fn match_all(
    env: &EvalEnv,
    patterns: &[Binding<()>],
    args: &[Expr<()>],
) -> Result<MatchOutcome, MatchError> {
    let mut outcome = MatchOutcome {
        subst: HashMap::new(),
        forced: Vec::with_capacity(args.len()),
        changed: false,
    };
    for (pattern, arg) in patterns.iter().zip(args.iter()) {
        let forced = eval_to_binding(env, arg, pattern);
        if &forced != arg {
            outcome.changed = true;
        }
        match_binding(pattern, &forced, &mut outcome.subst)?;
        outcome.forced.push(forced);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::pattern::Binding as B;

    fn empty_env() -> EvalEnv {
        EvalEnv::new()
    }

    #[test]
    fn test_name_pattern_binds_unconditionally() {
        let mut subst = HashMap::new();
        let expr = Expr::app(Expr::name("f"), vec![Expr::int(1)]);
        match_binding(&B::var("x"), &expr, &mut subst).unwrap();
        assert_eq!(subst.get("x"), Some(&expr));
    }

    #[test]
    fn test_literal_pattern_equality() {
        let mut subst = HashMap::new();
        assert!(match_binding(&B::lit(Atom::Int(1)), &Expr::int(1), &mut subst).is_ok());
        assert!(matches!(
            match_binding(&B::lit(Atom::Int(1)), &Expr::int(2), &mut subst),
            Err(MatchError::MatchingError { .. })
        ));
    }

    #[test]
    fn test_unevaluated_literal_is_strictness_error() {
        let mut subst = HashMap::new();
        let expr = Expr::app(Expr::name("f"), vec![Expr::int(1)]);
        assert!(matches!(
            match_binding(&B::lit(Atom::Int(1)), &expr, &mut subst),
            Err(MatchError::StrictnessError { .. })
        ));
    }

    #[test]
    fn test_cons_matches_reshaped_list() {
        let mut subst = HashMap::new();
        let list = Expr::list(vec![Expr::int(1), Expr::int(2)]);
        let pattern = B::cons(B::var("x"), B::var("xs"));
        match_binding(&pattern, &list, &mut subst).unwrap();
        assert_eq!(subst.get("x"), Some(&Expr::int(1)));
        assert_eq!(subst.get("xs"), Some(&Expr::list(vec![Expr::int(2)])));
    }

    #[test]
    fn test_cons_rejects_empty_list() {
        let mut subst = HashMap::new();
        let pattern = B::cons(B::var("x"), B::var("xs"));
        assert!(matches!(
            match_binding(&pattern, &Expr::list(vec![]), &mut subst),
            Err(MatchError::MatchingError { .. })
        ));
    }

    #[test]
    fn test_eval_to_binding_reshapes_list_for_cons() {
        let env = empty_env();
        let list = Expr::list(vec![Expr::int(1), Expr::int(2), Expr::int(3)]);
        let pattern = B::cons(B::wildcard(), B::var("xs"));
        let forced = eval_to_binding(&env, &list, &pattern);
        assert_eq!(
            forced,
            Expr::binary(
                Op::Colon,
                Expr::int(1),
                Expr::list(vec![Expr::int(2), Expr::int(3)])
            )
        );
    }

    #[test]
    fn test_eval_to_binding_leaves_matching_shape_alone() {
        let env = empty_env();
        let cons = Expr::binary(Op::Colon, Expr::int(1), Expr::list(vec![Expr::int(2)]));
        let pattern = B::cons(B::var("x"), B::var("xs"));
        assert_eq!(eval_to_binding(&env, &cons, &pattern), cons);
    }

    #[test]
    fn test_eval_to_binding_does_not_force_under_name_pattern() {
        let env = empty_env();
        let expr = Expr::binary(Op::Add, Expr::int(1), Expr::int(2));
        assert_eq!(eval_to_binding(&env, &expr, &B::var("x")), expr);
    }

    #[test]
    fn test_tuple_pointwise() {
        let mut subst = HashMap::new();
        let pattern = B::tuple(vec![B::var("a"), B::var("b")]);
        let expr = Expr::ntuple(vec![Expr::int(1), Expr::boolean(true)]);
        match_binding(&pattern, &expr, &mut subst).unwrap();
        assert_eq!(subst.len(), 2);
    }

    #[test]
    fn test_constructor_pattern() {
        let mut subst = HashMap::new();
        let pattern = B::constr("Just", vec![B::var("v")]);
        let expr = Expr::app(Expr::constr("Just"), vec![Expr::int(5)]);
        match_binding(&pattern, &expr, &mut subst).unwrap();
        assert_eq!(subst.get("v"), Some(&Expr::int(5)));

        let wrong = Expr::constr("Nothing");
        let mut subst = HashMap::new();
        assert!(matches!(
            match_binding(&B::constr("Nothing", vec![]), &wrong, &mut subst),
            Ok(())
        ));
    }

    #[test]
    fn test_match_all_reports_changed_arguments() {
        let env = empty_env();
        let patterns = vec![B::cons(B::var("x"), B::var("xs"))];
        let args = vec![Expr::list(vec![Expr::int(1), Expr::int(2)])];
        let outcome = match_all(&env, &patterns, &args).unwrap();
        assert!(outcome.changed);
        assert_eq!(
            outcome.forced[0],
            Expr::binary(Op::Colon, Expr::int(1), Expr::list(vec![Expr::int(2)]))
        );
    }

    #[test]
    fn test_whnf_classification() {
        assert!(is_whnf(&Expr::int(1)));
        assert!(is_whnf(&Expr::list(vec![])));
        assert!(is_whnf(&Expr::app(Expr::constr("Just"), vec![Expr::int(1)])));
        assert!(!is_whnf(&Expr::name("x")));
        assert!(!is_whnf(&Expr::binary(Op::Add, Expr::int(1), Expr::int(2))));
        assert!(!is_whnf(&Expr::arithm_seq(Expr::int(1), None, None)));
    }
}
