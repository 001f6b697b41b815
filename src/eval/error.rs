//! # Evaluation Error Definitions
//!
//! Errors produced by the small-step evaluator. A failed `step` leaves the
//! expression unchanged; the error value describes why the selected node
//! could not reduce. `MatchError` is the pattern engine's own error channel
//! and is carried inside `NoMatchingFunction` when clause dispatch fails.

use std::fmt;

use crate::ast::expression::{Expr, Op};
use crate::ast::pattern::Binding;

use super::{Path, PathStep};

/// Why a single evaluation step failed.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Navigation mismatch: the path does not fit the tree.
    PathError { path: Path, expr: Expr<()> },
    /// `Nth(i)` into a node with only `len` children.
    IndexError { index: usize, len: usize },
    /// `div` or `mod` by zero.
    DivByZero,
    /// The node is a value of the wrong shape (e.g. an `if` whose condition
    /// reduced to a non-boolean).
    EvalError { expr: Expr<()> },
    /// A primitive has no rule for these operands.
    BinaryOpError {
        op: Op,
        left: Expr<()>,
        right: Expr<()>,
    },
    UnaryOpError { op: Op, expr: Expr<()> },
    /// Substituting under a lambda would capture these names.
    NameCaptureError { names: Vec<String> },
    /// Call of a name with no definition.
    UnknownFunction { name: String },
    /// No clause of the definition accepted the arguments.
    NoMatchingFunction {
        name: String,
        errors: Vec<MatchError>,
    },
    /// The node is already in weak-head-normal form, or no rule applies.
    CannotEvaluate { expr: Expr<()> },
    /// Monoid identity for error accumulation.
    NoError,
    /// Associative concatenation of several errors.
    MoreErrors { errors: Vec<EvalError> },
}

impl EvalError {
    pub fn path_error(path: &[PathStep], expr: &Expr<()>) -> Self {
        EvalError::PathError {
            path: path.to_vec(),
            expr: expr.clone(),
        }
    }

    pub fn index_error(index: usize, len: usize) -> Self {
        EvalError::IndexError { index, len }
    }

    pub fn eval_error(expr: &Expr<()>) -> Self {
        EvalError::EvalError { expr: expr.clone() }
    }

    pub fn binary_op_error(op: &Op, left: &Expr<()>, right: &Expr<()>) -> Self {
        EvalError::BinaryOpError {
            op: op.clone(),
            left: left.clone(),
            right: right.clone(),
        }
    }

    pub fn unary_op_error(op: &Op, expr: &Expr<()>) -> Self {
        EvalError::UnaryOpError {
            op: op.clone(),
            expr: expr.clone(),
        }
    }

    pub fn name_capture(names: Vec<String>) -> Self {
        EvalError::NameCaptureError { names }
    }

    pub fn unknown_function(name: impl Into<String>) -> Self {
        EvalError::UnknownFunction { name: name.into() }
    }

    pub fn no_matching_function(name: impl Into<String>, errors: Vec<MatchError>) -> Self {
        EvalError::NoMatchingFunction {
            name: name.into(),
            errors,
        }
    }

    pub fn cannot_evaluate(expr: &Expr<()>) -> Self {
        EvalError::CannotEvaluate { expr: expr.clone() }
    }

    /// Associative combination with `NoError` as identity; nested
    /// `MoreErrors` are flattened so grouping cannot be observed.
    pub fn combine(self, other: EvalError) -> EvalError {
        let mut errors = Vec::new();
        for err in [self, other] {
            match err {
                EvalError::NoError => {}
                EvalError::MoreErrors { errors: inner } => errors.extend(inner),
                single => errors.push(single),
            }
        }
        match errors.len() {
            0 => EvalError::NoError,
            1 => errors.pop().unwrap(),
            _ => EvalError::MoreErrors { errors },
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalError::PathError { expr, .. } => {
                write!(f, "path does not lead to a sub-expression of {}", expr)
            }
            EvalError::IndexError { index, len } => {
                write!(f, "child index {} out of range (node has {} children)", index, len)
            }
            EvalError::DivByZero => write!(f, "division by zero"),
            EvalError::EvalError { expr } => write!(f, "cannot evaluate {}", expr),
            EvalError::BinaryOpError { op, left, right } => {
                write!(
                    f,
                    "operator {} is not defined for {} and {}",
                    op.symbol(),
                    left,
                    right
                )
            }
            EvalError::UnaryOpError { op, expr } => {
                write!(f, "operator {} is not defined for {}", op.symbol(), expr)
            }
            EvalError::NameCaptureError { names } => {
                write!(f, "substitution would capture: {}", names.join(", "))
            }
            EvalError::UnknownFunction { name } => write!(f, "unknown function: {}", name),
            EvalError::NoMatchingFunction { name, errors } => {
                write!(f, "no matching clause for {}", name)?;
                for err in errors {
                    write!(f, "\n  {}", err)?;
                }
                Ok(())
            }
            EvalError::CannotEvaluate { expr } => {
                write!(f, "{} cannot be reduced further", expr)
            }
            EvalError::NoError => write!(f, "no error"),
            EvalError::MoreErrors { errors } => {
                let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "{}", rendered.join("; "))
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Why a pattern failed against an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    /// The expression is a value of a different shape.
    MatchingError { binding: Binding<()>, expr: Expr<()> },
    /// The expression is not yet in weak-head-normal form; the caller would
    /// have to force it further to decide this pattern.
    StrictnessError { binding: Binding<()>, expr: Expr<()> },
    /// Fewer arguments than the clause has patterns.
    TooFewArguments {
        patterns: Vec<Binding<()>>,
        args: Vec<Expr<()>>,
    },
}

impl MatchError {
    pub fn matching(binding: &Binding<()>, expr: &Expr<()>) -> Self {
        MatchError::MatchingError {
            binding: binding.clone(),
            expr: expr.clone(),
        }
    }

    pub fn strictness(binding: &Binding<()>, expr: &Expr<()>) -> Self {
        MatchError::StrictnessError {
            binding: binding.clone(),
            expr: expr.clone(),
        }
    }

    pub fn too_few_arguments(patterns: Vec<Binding<()>>, args: Vec<Expr<()>>) -> Self {
        MatchError::TooFewArguments { patterns, args }
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchError::MatchingError { binding, expr } => {
                write!(f, "pattern {} does not match {}", binding, expr)
            }
            MatchError::StrictnessError { binding, expr } => {
                write!(f, "{} is not evaluated far enough to match {}", expr, binding)
            }
            MatchError::TooFewArguments { patterns, args } => {
                write!(
                    f,
                    "expected {} arguments, got {}",
                    patterns.len(),
                    args.len()
                )
            }
        }
    }
}

impl std::error::Error for MatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_identity() {
        let err = EvalError::DivByZero;
        assert_eq!(EvalError::NoError.combine(err.clone()), err.clone());
        assert_eq!(err.clone().combine(EvalError::NoError), err);
    }

    #[test]
    fn test_combine_associative() {
        let a = EvalError::DivByZero;
        let b = EvalError::unknown_function("f");
        let c = EvalError::index_error(3, 1);
        let left = a.clone().combine(b.clone()).combine(c.clone());
        let right = a.combine(b.combine(c));
        assert_eq!(left, right);
    }

    #[test]
    fn test_combine_flattens() {
        let nested = EvalError::DivByZero.combine(EvalError::unknown_function("g"));
        let combined = nested.combine(EvalError::DivByZero);
        match combined {
            EvalError::MoreErrors { errors } => assert_eq!(errors.len(), 3),
            other => panic!("expected MoreErrors, got {:?}", other),
        }
    }
}
