//! # Small-Step Evaluator
//!
//! The evaluator reduces an expression *one step at a time*, at a node the
//! caller points at with a [`Path`]. Repeated steps build the visible
//! reduction chain the system exists for.
//!
//! ## How a step happens
//!
//! [`step`] descends the tree along the path and applies [`eval1`] to the
//! selected node. `eval1` knows one rewrite per node shape: operator
//! dispatch, `if` selection, sequence unfolding, clause application with
//! pattern matching. Arguments are forced only as far as the matched
//! pattern requires ([`matching::eval_to_binding`]); a clause that cannot
//! be decided without more forcing aborts dispatch rather than forcing —
//! that refusal is exactly the language's laziness.
//!
//! ## Environments
//!
//! An [`EvalEnv`] groups the program's definitions by name, preserving
//! clause order. Environments are immutable during evaluation; reduction
//! substitutes matched sub-expressions into clause bodies, checking that no
//! free variable of a substituted value would be captured by an inner
//! binder.

pub mod arith_seq;
pub mod error;
pub mod matching;
pub mod primitives;

use std::collections::{HashMap, HashSet};

use crate::ast::expression::{Atom, Expr, Op, Qual};
use crate::ast::pattern::Binding;
use crate::ast::Def;

pub use error::{EvalError, MatchError};
use matching::{eval_to_binding, match_all, match_binding};

/// One navigation token of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    Fst,
    Snd,
    Thrd,
    Nth(usize),
}

/// A path from the root to the sub-expression a step should happen at; the
/// empty path selects the root.
pub type Path = Vec<PathStep>;

/// One clause of a function: formal patterns and the body they guard.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub patterns: Vec<Binding<()>>,
    pub body: Expr<()>,
}

/// The evaluation environment: function name to clauses in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalEnv {
    defs: HashMap<String, Vec<Clause>>,
}

impl EvalEnv {
    pub fn new() -> Self {
        EvalEnv::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&[Clause]> {
        self.defs.get(name).map(|clauses| clauses.as_slice())
    }
}

/// Group a definition list by name, preserving source order of clauses.
pub fn defs_to_env(defs: &[Def<()>]) -> EvalEnv {
    let mut env = EvalEnv::new();
    for def in defs {
        env.defs.entry(def.name.clone()).or_default().push(Clause {
            patterns: def.patterns.clone(),
            body: def.body.clone(),
        });
    }
    env
}

/// Descend `expr` along `path` and apply [`eval1`] at the selected node,
/// returning the tree with that node replaced. Any error aborts the step
/// and leaves the expression unchanged on the caller's side.
pub fn step(env: &EvalEnv, path: &[PathStep], expr: &Expr<()>) -> Result<Expr<()>, EvalError> {
    let (token, rest) = match path.split_first() {
        None => return eval1(env, expr),
        Some(split) => split,
    };

    let replaced = match (token, expr) {
        (PathStep::Fst, Expr::Binary { op, left, right, info }) => Expr::Binary {
            op: op.clone(),
            left: Box::new(step(env, rest, left)?),
            right: right.clone(),
            info: *info,
        },
        (PathStep::Snd, Expr::Binary { op, left, right, info }) => Expr::Binary {
            op: op.clone(),
            left: left.clone(),
            right: Box::new(step(env, rest, right)?),
            info: *info,
        },

        (PathStep::Fst, Expr::Unary { op, expr: inner, info }) => Expr::Unary {
            op: op.clone(),
            expr: Box::new(step(env, rest, inner)?),
            info: *info,
        },

        (PathStep::Fst, Expr::SectL { expr: inner, op, info }) => Expr::SectL {
            expr: Box::new(step(env, rest, inner)?),
            op: op.clone(),
            info: *info,
        },
        (PathStep::Snd, Expr::SectR { op, expr: inner, info }) => Expr::SectR {
            op: op.clone(),
            expr: Box::new(step(env, rest, inner)?),
            info: *info,
        },

        (PathStep::Fst, Expr::IfExpr { cond, then_branch, else_branch, info }) => Expr::IfExpr {
            cond: Box::new(step(env, rest, cond)?),
            then_branch: then_branch.clone(),
            else_branch: else_branch.clone(),
            info: *info,
        },
        (PathStep::Snd, Expr::IfExpr { cond, then_branch, else_branch, info }) => Expr::IfExpr {
            cond: cond.clone(),
            then_branch: Box::new(step(env, rest, then_branch)?),
            else_branch: else_branch.clone(),
            info: *info,
        },
        (PathStep::Thrd, Expr::IfExpr { cond, then_branch, else_branch, info }) => Expr::IfExpr {
            cond: cond.clone(),
            then_branch: then_branch.clone(),
            else_branch: Box::new(step(env, rest, else_branch)?),
            info: *info,
        },

        (PathStep::Fst, Expr::ArithmSeq { start, step: st, end, info }) => Expr::ArithmSeq {
            start: Box::new(step(env, rest, start)?),
            step: st.clone(),
            end: end.clone(),
            info: *info,
        },
        (PathStep::Snd, Expr::ArithmSeq { start, step: Some(st), end, info }) => Expr::ArithmSeq {
            start: start.clone(),
            step: Some(Box::new(step(env, rest, st)?)),
            end: end.clone(),
            info: *info,
        },
        (PathStep::Thrd, Expr::ArithmSeq { start, step: st, end: Some(end), info }) => {
            Expr::ArithmSeq {
                start: start.clone(),
                step: st.clone(),
                end: Some(Box::new(step(env, rest, end)?)),
                info: *info,
            }
        }

        (PathStep::Fst, Expr::Lambda { params, body, info }) => Expr::Lambda {
            params: params.clone(),
            body: Box::new(step(env, rest, body)?),
            info: *info,
        },

        (PathStep::Fst, Expr::App { func, args, info }) => Expr::App {
            func: Box::new(step(env, rest, func)?),
            args: args.clone(),
            info: *info,
        },
        (PathStep::Nth(i), Expr::App { func, args, info }) => {
            if *i >= args.len() {
                return Err(EvalError::index_error(*i, args.len()));
            }
            let mut args = args.clone();
            args[*i] = step(env, rest, &args[*i])?;
            Expr::App {
                func: func.clone(),
                args,
                info: *info,
            }
        }

        (PathStep::Nth(i), Expr::List { items, info }) => {
            if *i >= items.len() {
                return Err(EvalError::index_error(*i, items.len()));
            }
            let mut items = items.clone();
            items[*i] = step(env, rest, &items[*i])?;
            Expr::List { items, info: *info }
        }
        (PathStep::Nth(i), Expr::NTuple { items, info }) => {
            if *i >= items.len() {
                return Err(EvalError::index_error(*i, items.len()));
            }
            let mut items = items.clone();
            items[*i] = step(env, rest, &items[*i])?;
            Expr::NTuple { items, info: *info }
        }

        (PathStep::Fst, Expr::LetExpr { bindings, body, info }) => Expr::LetExpr {
            bindings: bindings.clone(),
            body: Box::new(step(env, rest, body)?),
            info: *info,
        },
        (PathStep::Nth(i), Expr::LetExpr { bindings, body, info }) => {
            if *i >= bindings.len() {
                return Err(EvalError::index_error(*i, bindings.len()));
            }
            let mut bindings = bindings.clone();
            bindings[*i].1 = step(env, rest, &bindings[*i].1)?;
            Expr::LetExpr {
                bindings,
                body: body.clone(),
                info: *info,
            }
        }

        (PathStep::Fst, Expr::ListComp { head, quals, info }) => Expr::ListComp {
            head: Box::new(step(env, rest, head)?),
            quals: quals.clone(),
            info: *info,
        },

        _ => return Err(EvalError::path_error(path, expr)),
    };
    Ok(replaced)
}

/// Reduce to a fixpoint of `step` at the root: the root is stepped until it
/// no longer reduces, children are normalised recursively, and the root is
/// retried whenever a child changed. Divergent programs are the caller's
/// risk.
pub fn eval_all(env: &EvalEnv, expr: &Expr<()>) -> Expr<()> {
    let mut current = expr.clone();
    loop {
        current = exhaust_root(env, current);
        let next = current
            .clone()
            .map_children(&mut |child| eval_all(env, &child));
        if next == current {
            return next;
        }
        current = next;
    }
}

fn exhaust_root(env: &EvalEnv, mut expr: Expr<()>) -> Expr<()> {
    loop {
        match eval1(env, &expr) {
            Ok(next) if next != expr => expr = next,
            _ => return expr,
        }
    }
}

/// Apply one reduction rule at this node. The rules are tried by node
/// shape; a node no rule fires for is either a value or waiting on a
/// sub-expression.
pub fn eval1(env: &EvalEnv, expr: &Expr<()>) -> Result<Expr<()>, EvalError> {
    match expr {
        Expr::Binary { op, left, right, .. } => primitives::binary(env, &op.op, left, right),

        Expr::Unary { op, expr: inner, .. } => primitives::unary(&op.op, inner),

        Expr::Atom {
            atom: Atom::Name(name),
            ..
        } => apply(env, name, &[]),

        Expr::IfExpr {
            cond,
            then_branch,
            else_branch,
            ..
        } => match cond.as_ref() {
            Expr::Atom {
                atom: Atom::Bool(true),
                ..
            } => Ok(then_branch.as_ref().clone()),
            Expr::Atom {
                atom: Atom::Bool(false),
                ..
            } => Ok(else_branch.as_ref().clone()),
            cond if matching::is_whnf(cond) => Err(EvalError::eval_error(expr)),
            _ => Err(EvalError::cannot_evaluate(expr)),
        },

        Expr::ArithmSeq { .. } => arith_seq::unfold_seq(expr),

        Expr::LetExpr { bindings, body, .. } => reduce_let(env, bindings, body, expr),

        Expr::ListComp { head, quals, .. } => reduce_comp(env, head, quals, expr),

        Expr::App { func, args, .. } => reduce_app(env, func, args, expr),

        _ => Err(EvalError::cannot_evaluate(expr)),
    }
}

fn reduce_app(
    env: &EvalEnv,
    func: &Expr<()>,
    args: &[Expr<()>],
    original: &Expr<()>,
) -> Result<Expr<()>, EvalError> {
    match func {
        // (f . g) x  ->  f (g x); further arguments stay on the outer
        // application.
        Expr::Binary { op, left, right, .. }
            if matches!(op.op, Op::Composition) && !args.is_empty() =>
        {
            let mut new_args = vec![Expr::app(right.as_ref().clone(), vec![args[0].clone()])];
            new_args.extend(args[1..].iter().cloned());
            Ok(Expr::app(left.as_ref().clone(), new_args))
        }

        Expr::Lambda { params, body, .. } => {
            let clause = Clause {
                patterns: params.clone(),
                body: body.as_ref().clone(),
            };
            match try_clauses(env, std::slice::from_ref(&clause), args, "lambda")? {
                ClauseOutcome::Reduced(result) => Ok(result),
                ClauseOutcome::Forced(forced) => Ok(Expr::app(func.clone(), forced)),
            }
        }

        // A section applied to its missing operand first tries the
        // primitive; if the primitive has no rule yet, the application
        // becomes an explicit operator node.
        Expr::SectL { expr: left, op, .. } if !args.is_empty() => {
            let result = primitives::binary(env, &op.op, left, &args[0]).unwrap_or_else(|_| {
                Expr::binary(op.op.clone(), left.as_ref().clone(), args[0].clone())
            });
            Ok(rewrap(result, &args[1..]))
        }
        Expr::SectR { op, expr: right, .. } if !args.is_empty() => {
            let result = primitives::binary(env, &op.op, &args[0], right).unwrap_or_else(|_| {
                Expr::binary(op.op.clone(), args[0].clone(), right.as_ref().clone())
            });
            Ok(rewrap(result, &args[1..]))
        }
        Expr::PrefixOp { op, .. } => match args.len() {
            0 => Err(EvalError::cannot_evaluate(original)),
            1 => Ok(Expr::sect_l(args[0].clone(), op.op.clone())),
            _ => {
                let result = primitives::binary(env, &op.op, &args[0], &args[1])
                    .unwrap_or_else(|_| {
                        Expr::binary(op.op.clone(), args[0].clone(), args[1].clone())
                    });
                Ok(rewrap(result, &args[2..]))
            }
        },

        Expr::Atom {
            atom: Atom::Name(name),
            ..
        } => apply(env, name, args),

        // Left-associative flattening of nested applications.
        Expr::App {
            func: inner_func,
            args: inner_args,
            ..
        } => {
            let mut all = inner_args.clone();
            all.extend(args.iter().cloned());
            Ok(Expr::app(inner_func.as_ref().clone(), all))
        }

        _ => Err(EvalError::cannot_evaluate(original)),
    }
}

fn rewrap(result: Expr<()>, remaining: &[Expr<()>]) -> Expr<()> {
    if remaining.is_empty() {
        result
    } else {
        Expr::app(result, remaining.to_vec())
    }
}

/// Resolve a named call. `div` and `mod` are wired in; everything else
/// dispatches over the definition's clauses.
pub fn apply(env: &EvalEnv, name: &str, args: &[Expr<()>]) -> Result<Expr<()>, EvalError> {
    if name == "div" || name == "mod" {
        return primitives::builtin_div_mod(name, args);
    }
    let clauses = env
        .lookup(name)
        .ok_or_else(|| EvalError::unknown_function(name))?;
    match try_clauses(env, clauses, args, name)? {
        ClauseOutcome::Reduced(result) => Ok(result),
        ClauseOutcome::Forced(forced) => Ok(Expr::app(Expr::name(name), forced)),
    }
}

/// What clause dispatch produced: a reduced expression, or the original
/// arguments forced far enough to expose the shapes the matching clause
/// inspected (itself one visible step).
enum ClauseOutcome {
    Reduced(Expr<()>),
    Forced(Vec<Expr<()>>),
}

/// Walk the clauses in source order.
///
/// A clause with more patterns than there are arguments records a
/// too-few-arguments failure and the next clause is tried; if *every*
/// clause fails that way the call is a partial application and the first
/// clause's leading patterns are matched to build a wrapping lambda. A
/// strictness failure stops dispatch immediately: deciding a later clause
/// would force an argument the semantics refuse to force.
fn try_clauses(
    env: &EvalEnv,
    clauses: &[Clause],
    args: &[Expr<()>],
    name: &str,
) -> Result<ClauseOutcome, EvalError> {
    let mut errors: Vec<MatchError> = Vec::new();

    for clause in clauses {
        let arity = clause.patterns.len();
        if args.len() < arity {
            errors.push(MatchError::too_few_arguments(
                clause.patterns.clone(),
                args.to_vec(),
            ));
            continue;
        }
        match match_all(env, &clause.patterns, &args[..arity]) {
            Ok(outcome) => {
                if outcome.changed {
                    let mut forced = outcome.forced;
                    forced.extend(args[arity..].iter().cloned());
                    return Ok(ClauseOutcome::Forced(forced));
                }
                let body = substitute(&outcome.subst, &clause.body)?;
                return Ok(ClauseOutcome::Reduced(wrap_lambda(
                    &[],
                    &args[arity..],
                    body,
                )));
            }
            Err(err @ MatchError::StrictnessError { .. }) => {
                errors.push(err);
                return Err(EvalError::no_matching_function(name, errors));
            }
            Err(err) => {
                errors.push(err);
            }
        }
    }

    let all_arity = !errors.is_empty()
        && errors
            .iter()
            .all(|e| matches!(e, MatchError::TooFewArguments { .. }));
    if all_arity && !args.is_empty() {
        return partial_application(env, &clauses[0], args, name, errors);
    }
    Err(EvalError::no_matching_function(name, errors))
}

/// All clauses wanted more arguments: match the first clause's leading
/// patterns against what was supplied and wrap the rest into a lambda.
fn partial_application(
    env: &EvalEnv,
    clause: &Clause,
    args: &[Expr<()>],
    name: &str,
    mut errors: Vec<MatchError>,
) -> Result<ClauseOutcome, EvalError> {
    let supplied = args.len();
    match match_all(env, &clause.patterns[..supplied], args) {
        Ok(outcome) => {
            if outcome.changed {
                return Ok(ClauseOutcome::Forced(outcome.forced));
            }
            let body = substitute(&outcome.subst, &clause.body)?;
            Ok(ClauseOutcome::Reduced(wrap_lambda(
                &clause.patterns[supplied..],
                &[],
                body,
            )))
        }
        Err(err) => {
            errors.push(err);
            Err(EvalError::no_matching_function(name, errors))
        }
    }
}

/// Re-assemble a clause result: leftover patterns become a lambda, leftover
/// arguments an application, equal arity just the body.
fn wrap_lambda(patterns: &[Binding<()>], args: &[Expr<()>], body: Expr<()>) -> Expr<()> {
    if !patterns.is_empty() {
        Expr::lambda(patterns.to_vec(), body)
    } else if !args.is_empty() {
        Expr::app(body, args.to_vec())
    } else {
        body
    }
}

/// `let` reduces by matching every binder against its right-hand side and
/// substituting into the body in one step.
fn reduce_let(
    env: &EvalEnv,
    bindings: &[(Binding<()>, Expr<()>)],
    body: &Expr<()>,
    original: &Expr<()>,
) -> Result<Expr<()>, EvalError> {
    let mut subst = HashMap::new();
    for (binding, rhs) in bindings {
        let forced = eval_to_binding(env, rhs, binding);
        match match_binding(binding, &forced, &mut subst) {
            Ok(()) => {}
            Err(MatchError::StrictnessError { .. }) => {
                return Err(EvalError::cannot_evaluate(original))
            }
            Err(_) => return Err(EvalError::eval_error(original)),
        }
    }
    substitute(&subst, body)
}

/// One reduction of a list comprehension, driven by its first qualifier.
fn reduce_comp(
    env: &EvalEnv,
    head: &Expr<()>,
    quals: &[Qual<()>],
    original: &Expr<()>,
) -> Result<Expr<()>, EvalError> {
    let (first, rest) = match quals.split_first() {
        None => return Ok(Expr::list(vec![head.clone()])),
        Some(split) => split,
    };

    match first {
        Qual::Guard { expr, .. } => match expr {
            Expr::Atom {
                atom: Atom::Bool(true),
                ..
            } => Ok(Expr::list_comp(head.clone(), rest.to_vec())),
            Expr::Atom {
                atom: Atom::Bool(false),
                ..
            } => Ok(Expr::list(vec![])),
            pending => {
                let stepped = eval1(env, pending)?;
                let mut quals = vec![Qual::Guard {
                    expr: stepped,
                    info: (),
                }];
                quals.extend(rest.iter().cloned());
                Ok(Expr::list_comp(head.clone(), quals))
            }
        },

        Qual::Let { binding, expr, .. } => {
            let mut subst = HashMap::new();
            let forced = eval_to_binding(env, expr, binding);
            match match_binding(binding, &forced, &mut subst) {
                Ok(()) => {}
                Err(MatchError::StrictnessError { .. }) => {
                    return Err(EvalError::cannot_evaluate(original))
                }
                Err(_) => return Err(EvalError::eval_error(original)),
            }
            let (quals, final_subst) = substitute_quals(subst, rest)?;
            let head = substitute(&final_subst, head)?;
            Ok(Expr::list_comp(head, quals))
        }

        Qual::Gen { binding, expr, .. } => {
            let (first_elem, tail) = match expr {
                Expr::List { items, .. } if items.is_empty() => {
                    return Ok(Expr::list(vec![]))
                }
                Expr::List { items, .. } => {
                    (items[0].clone(), Expr::list(items[1..].to_vec()))
                }
                Expr::Binary { op, left, right, .. } if matches!(op.op, Op::Colon) => {
                    (left.as_ref().clone(), right.as_ref().clone())
                }
                pending => {
                    let stepped = eval1(env, pending)?;
                    let mut quals = vec![Qual::Gen {
                        binding: binding.clone(),
                        expr: stepped,
                        info: (),
                    }];
                    quals.extend(rest.iter().cloned());
                    return Ok(Expr::list_comp(head.clone(), quals));
                }
            };

            let mut remaining = vec![Qual::Gen {
                binding: binding.clone(),
                expr: tail,
                info: (),
            }];
            remaining.extend(rest.iter().cloned());
            let skip = Expr::list_comp(head.clone(), remaining);

            let mut subst = HashMap::new();
            let forced = eval_to_binding(env, &first_elem, binding);
            match match_binding(binding, &forced, &mut subst) {
                Ok(()) => {
                    let (quals, final_subst) = substitute_quals(subst, rest)?;
                    let instance = Expr::list_comp(substitute(&final_subst, head)?, quals);
                    Ok(Expr::binary(Op::Append, instance, skip))
                }
                // A non-matching element is filtered out.
                Err(MatchError::MatchingError { .. }) => Ok(skip),
                Err(_) => Err(EvalError::cannot_evaluate(original)),
            }
        }
    }
}

/// The free variables of an expression: every `Name` atom not bound by an
/// enclosing lambda, `let`, or comprehension qualifier inside the value.
pub fn free_variables(expr: &Expr<()>) -> HashSet<String> {
    match expr {
        Expr::Atom { atom, .. } => match atom {
            Atom::Name(name) => {
                let mut set = HashSet::new();
                set.insert(name.clone());
                set
            }
            _ => HashSet::new(),
        },

        Expr::Lambda { params, body, .. } => {
            let mut free = free_variables(body);
            for param in params {
                for name in param.bound_names() {
                    free.remove(&name);
                }
            }
            free
        }

        Expr::LetExpr { bindings, body, .. } => {
            let mut free = free_variables(body);
            for (_, rhs) in bindings {
                free.extend(free_variables(rhs));
            }
            for (binding, _) in bindings {
                for name in binding.bound_names() {
                    free.remove(&name);
                }
            }
            free
        }

        Expr::ListComp { head, quals, .. } => {
            let mut bound: HashSet<String> = HashSet::new();
            let mut free: HashSet<String> = HashSet::new();
            let add = |names: HashSet<String>, bound: &HashSet<String>, free: &mut HashSet<String>| {
                free.extend(names.into_iter().filter(|n| !bound.contains(n)));
            };
            for qual in quals {
                match qual {
                    Qual::Gen { binding, expr, .. } => {
                        add(free_variables(expr), &bound, &mut free);
                        bound.extend(binding.bound_names());
                    }
                    Qual::Let { binding, expr, .. } => {
                        bound.extend(binding.bound_names());
                        add(free_variables(expr), &bound, &mut free);
                    }
                    Qual::Guard { expr, .. } => {
                        add(free_variables(expr), &bound, &mut free);
                    }
                }
            }
            add(free_variables(head), &bound, &mut free);
            free
        }

        _ => {
            let mut free = HashSet::new();
            for child in expr.children() {
                free.extend(free_variables(child));
            }
            free
        }
    }
}

fn restrict(
    map: &HashMap<String, Expr<()>>,
    bound: &HashSet<String>,
) -> HashMap<String, Expr<()>> {
    map.iter()
        .filter(|(name, _)| !bound.contains(*name))
        .map(|(name, expr)| (name.clone(), expr.clone()))
        .collect()
}

/// A substituted value whose free variables include names bound by the
/// binder we are descending under would change meaning; that is an error,
/// not a silent re-binding.
fn check_capture(
    map: &HashMap<String, Expr<()>>,
    bound: &HashSet<String>,
) -> Result<(), EvalError> {
    let mut captured: Vec<String> = Vec::new();
    for value in map.values() {
        for name in free_variables(value) {
            if bound.contains(&name) {
                captured.push(name);
            }
        }
    }
    if captured.is_empty() {
        Ok(())
    } else {
        captured.sort();
        captured.dedup();
        Err(EvalError::name_capture(captured))
    }
}

/// Capture-checked substitution of expressions for names.
pub fn substitute(
    map: &HashMap<String, Expr<()>>,
    expr: &Expr<()>,
) -> Result<Expr<()>, EvalError> {
    if map.is_empty() {
        return Ok(expr.clone());
    }
    match expr {
        Expr::Atom { atom, .. } => match atom {
            Atom::Name(name) => Ok(map.get(name).cloned().unwrap_or_else(|| expr.clone())),
            _ => Ok(expr.clone()),
        },

        Expr::Lambda { params, body, info } => {
            let bound: HashSet<String> =
                params.iter().flat_map(|p| p.bound_names()).collect();
            let inner = restrict(map, &bound);
            check_capture(&inner, &bound)?;
            Ok(Expr::Lambda {
                params: params.clone(),
                body: Box::new(substitute(&inner, body)?),
                info: *info,
            })
        }

        Expr::LetExpr {
            bindings,
            body,
            info,
        } => {
            let bound: HashSet<String> = bindings
                .iter()
                .flat_map(|(b, _)| b.bound_names())
                .collect();
            let inner = restrict(map, &bound);
            check_capture(&inner, &bound)?;
            let bindings = bindings
                .iter()
                .map(|(b, e)| Ok((b.clone(), substitute(&inner, e)?)))
                .collect::<Result<Vec<_>, EvalError>>()?;
            Ok(Expr::LetExpr {
                bindings,
                body: Box::new(substitute(&inner, body)?),
                info: *info,
            })
        }

        Expr::ListComp { head, quals, info } => {
            let (quals, final_map) = substitute_quals(map.clone(), quals)?;
            Ok(Expr::ListComp {
                head: Box::new(substitute(&final_map, head)?),
                quals,
                info: *info,
            })
        }

        Expr::List { items, info } => Ok(Expr::List {
            items: substitute_all(map, items)?,
            info: *info,
        }),
        Expr::NTuple { items, info } => Ok(Expr::NTuple {
            items: substitute_all(map, items)?,
            info: *info,
        }),
        Expr::Binary {
            op,
            left,
            right,
            info,
        } => Ok(Expr::Binary {
            op: op.clone(),
            left: Box::new(substitute(map, left)?),
            right: Box::new(substitute(map, right)?),
            info: *info,
        }),
        Expr::Unary { op, expr, info } => Ok(Expr::Unary {
            op: op.clone(),
            expr: Box::new(substitute(map, expr)?),
            info: *info,
        }),
        Expr::SectL { expr, op, info } => Ok(Expr::SectL {
            expr: Box::new(substitute(map, expr)?),
            op: op.clone(),
            info: *info,
        }),
        Expr::SectR { op, expr, info } => Ok(Expr::SectR {
            op: op.clone(),
            expr: Box::new(substitute(map, expr)?),
            info: *info,
        }),
        Expr::PrefixOp { .. } => Ok(expr.clone()),
        Expr::IfExpr {
            cond,
            then_branch,
            else_branch,
            info,
        } => Ok(Expr::IfExpr {
            cond: Box::new(substitute(map, cond)?),
            then_branch: Box::new(substitute(map, then_branch)?),
            else_branch: Box::new(substitute(map, else_branch)?),
            info: *info,
        }),
        Expr::ArithmSeq {
            start,
            step,
            end,
            info,
        } => Ok(Expr::ArithmSeq {
            start: Box::new(substitute(map, start)?),
            step: match step {
                Some(e) => Some(Box::new(substitute(map, e)?)),
                None => None,
            },
            end: match end {
                Some(e) => Some(Box::new(substitute(map, e)?)),
                None => None,
            },
            info: *info,
        }),
        Expr::App { func, args, info } => Ok(Expr::App {
            func: Box::new(substitute(map, func)?),
            args: substitute_all(map, args)?,
            info: *info,
        }),
    }
}

fn substitute_all(
    map: &HashMap<String, Expr<()>>,
    exprs: &[Expr<()>],
) -> Result<Vec<Expr<()>>, EvalError> {
    exprs.iter().map(|e| substitute(map, e)).collect()
}

/// Substitute through a qualifier chain. Generators and local bindings
/// shadow the map for everything after them (and, for a recursive `let`,
/// for their own right-hand side); the map that survives the chain applies
/// to the comprehension head.
fn substitute_quals(
    map: HashMap<String, Expr<()>>,
    quals: &[Qual<()>],
) -> Result<(Vec<Qual<()>>, HashMap<String, Expr<()>>), EvalError> {
    let mut current = map;
    let mut out = Vec::with_capacity(quals.len());
    for qual in quals {
        match qual {
            Qual::Gen {
                binding,
                expr,
                info,
            } => {
                let expr = substitute(&current, expr)?;
                let bound: HashSet<String> = binding.bound_names().into_iter().collect();
                current = restrict(&current, &bound);
                check_capture(&current, &bound)?;
                out.push(Qual::Gen {
                    binding: binding.clone(),
                    expr,
                    info: *info,
                });
            }
            Qual::Let {
                binding,
                expr,
                info,
            } => {
                let bound: HashSet<String> = binding.bound_names().into_iter().collect();
                current = restrict(&current, &bound);
                check_capture(&current, &bound)?;
                out.push(Qual::Let {
                    binding: binding.clone(),
                    expr: substitute(&current, expr)?,
                    info: *info,
                });
            }
            Qual::Guard { expr, info } => out.push(Qual::Guard {
                expr: substitute(&current, expr)?,
                info: *info,
            }),
        }
    }
    Ok((out, current))
}
