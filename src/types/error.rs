//! # Type Error Definitions
//!
//! Errors produced by the type inference phase. In the default mode they
//! abort the query; in partial-typing mode they are embedded into the tree
//! as `Type::TypeError` metas on the ancestors of the failing node, so a
//! decorated tree is always produced.
//!
//! All errors are canonically renamed (their type variables mapped to
//! `a, b, ...`) before being returned or embedded.

use std::fmt;

use crate::ast::pattern::Binding;

use super::ty::{Type, TypeVar};

/// Type error encountered during inference.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    /// Two types that should be equal cannot be unified.
    UnificationFail { expected: Type, found: Type },
    /// The occurs check fired: a variable would have to contain itself.
    InfiniteType { var: TypeVar, ty: Type },
    /// Reference to a name with no binding in the environment.
    UnboundVariable { name: String },
    /// Reference to a data constructor no `data` declaration introduces.
    UnknownDataConstructor { name: String },
    /// An arithmetic sequence over a type that is not `Int`, `Bool` or
    /// `Char`.
    NoInstanceOfEnum { ty: Type },
    /// A pattern whose shape cannot take the type it is matched at.
    PatternMismatch { binding: Binding<()>, ty: Type },
    /// Anything without a more specific shape (e.g. conflicting pattern
    /// variables in one clause head).
    UnknownError { message: String },
}

impl TypeError {
    pub fn unification_fail(expected: Type, found: Type) -> Self {
        TypeError::UnificationFail { expected, found }
    }

    pub fn infinite_type(var: TypeVar, ty: Type) -> Self {
        TypeError::InfiniteType { var, ty }
    }

    pub fn unbound_variable(name: impl Into<String>) -> Self {
        TypeError::UnboundVariable { name: name.into() }
    }

    pub fn unknown_data_constructor(name: impl Into<String>) -> Self {
        TypeError::UnknownDataConstructor { name: name.into() }
    }

    pub fn no_instance_of_enum(ty: Type) -> Self {
        TypeError::NoInstanceOfEnum { ty }
    }

    pub fn pattern_mismatch(binding: Binding<()>, ty: Type) -> Self {
        TypeError::PatternMismatch { binding, ty }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        TypeError::UnknownError {
            message: message.into(),
        }
    }

    /// The conflict reported when one clause head binds a variable twice.
    pub fn conflicting_definitions(name: &str) -> Self {
        TypeError::unknown(format!("Conflicting definitions for '{}'", name))
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeError::UnificationFail { expected, found } => {
                write!(
                    f,
                    "type mismatch: expected {}, found {}",
                    expected.pretty(),
                    found.pretty()
                )
            }
            TypeError::InfiniteType { var, ty } => {
                write!(
                    f,
                    "cannot construct infinite type: {} = {}",
                    Type::Var(var.clone()).pretty(),
                    ty.pretty()
                )
            }
            TypeError::UnboundVariable { name } => {
                write!(f, "unbound variable: {}", name)
            }
            TypeError::UnknownDataConstructor { name } => {
                write!(f, "unknown data constructor: {}", name)
            }
            TypeError::NoInstanceOfEnum { ty } => {
                write!(f, "no Enum instance for type {}", ty.pretty())
            }
            TypeError::PatternMismatch { binding, ty } => {
                write!(f, "pattern {} cannot have type {}", binding, ty.pretty())
            }
            TypeError::UnknownError { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for TypeError {}
