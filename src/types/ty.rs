//! # Core Type System Definitions
//!
//! Foundational types of the Hindley-Milner inference system: type terms,
//! type variables, and type schemes.
//!
//! ## Type terms
//!
//! - `Con(name)` - the base types `Int`, `Bool`, `Char`
//! - `Var(v)` - a type variable (polymorphism)
//! - `Arr(t1, t2)` - the function type `t1 -> t2`
//! - `List(t)` - the list type `[t]`
//! - `Tuple([t])` - tuple types `(t1, ..., tk)`
//! - `TypeCons(name, [t])` - user-declared algebraic data types
//! - `TypeError(err)` - a localised inference failure (partial typing
//!   embeds errors into the tree instead of failing outward)
//! - `Unknown` - no information; unifies with anything
//!
//! ## Type variables
//!
//! A variable is identified by an integer id; canonical renaming
//! ([`crate::types::index`]) attaches display names `a, b, ..., z, aa, ...`
//! in first-appearance order, so diagnostics are stable and readable.
//!
//! ## Type schemes
//!
//! A scheme quantifies a type over a list of variables:
//! `forall a. a -> a`. Instantiation replaces the quantified variables with
//! fresh ones at every use site.
//!
//! ## Related modules
//!
//! - [`crate::types::subst`] - substitutions over these terms
//! - [`crate::types::unify`] - the unification algorithm
//! - [`crate::types::infer`] - constraint generation

use std::collections::HashSet;
use std::fmt;

use super::error::TypeError;

/// Type variable, identified by `id`; `name` is the canonical display name
/// assigned during normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVar {
    pub id: usize,
    pub name: Option<String>,
}

impl TypeVar {
    pub fn new(id: usize) -> Self {
        Self { id, name: None }
    }

    pub fn with_name(id: usize, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// All type terms of the language.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Var(TypeVar),
    Con(String),
    Arr(Box<Type>, Box<Type>),
    List(Box<Type>),
    Tuple(Vec<Type>),
    TypeCons(String, Vec<Type>),
    TypeError(Box<TypeError>),
    Unknown,
}

impl Type {
    pub fn int() -> Self {
        Type::Con("Int".to_string())
    }

    pub fn boolean() -> Self {
        Type::Con("Bool".to_string())
    }

    pub fn character() -> Self {
        Type::Con("Char".to_string())
    }

    pub fn arr(t1: Type, t2: Type) -> Self {
        Type::Arr(Box::new(t1), Box::new(t2))
    }

    pub fn list(t: Type) -> Self {
        Type::List(Box::new(t))
    }

    /// Fold a function type over parameter types ending in `result`:
    /// `arr_chain([a, b], r)` is `a -> b -> r`.
    pub fn arr_chain(params: Vec<Type>, result: Type) -> Self {
        params
            .into_iter()
            .rev()
            .fold(result, |acc, p| Type::arr(p, acc))
    }

    /// Whether this base type supports arithmetic-sequence enumeration.
    pub fn is_enumerable(&self) -> bool {
        matches!(self, Type::Con(name) if name == "Int" || name == "Bool" || name == "Char")
    }

    /// The set of free type variables in this term. `TypeError` leaves are
    /// frozen diagnostics and contribute nothing.
    pub fn free_type_vars(&self) -> HashSet<TypeVar> {
        match self {
            Type::Con(_) | Type::Unknown | Type::TypeError(_) => HashSet::new(),
            Type::Var(v) => {
                let mut set = HashSet::new();
                set.insert(v.clone());
                set
            }
            Type::Arr(t1, t2) => {
                let mut set = t1.free_type_vars();
                set.extend(t2.free_type_vars());
                set
            }
            Type::List(t) => t.free_type_vars(),
            Type::Tuple(ts) | Type::TypeCons(_, ts) => {
                let mut set = HashSet::new();
                for t in ts {
                    set.extend(t.free_type_vars());
                }
                set
            }
        }
    }

    /// Human-readable rendering, Haskell-style.
    pub fn pretty(&self) -> String {
        match self {
            Type::Var(v) => match &v.name {
                Some(name) => name.clone(),
                None => format!("t{}", v.id),
            },
            Type::Con(name) => name.clone(),
            Type::Arr(t1, t2) => {
                let left = if matches!(**t1, Type::Arr(_, _)) {
                    format!("({})", t1.pretty())
                } else {
                    t1.pretty()
                };
                format!("{} -> {}", left, t2.pretty())
            }
            Type::List(t) => format!("[{}]", t.pretty()),
            Type::Tuple(ts) => {
                let inner: Vec<String> = ts.iter().map(|t| t.pretty()).collect();
                format!("({})", inner.join(", "))
            }
            Type::TypeCons(name, args) => {
                if args.is_empty() {
                    name.clone()
                } else {
                    let rendered: Vec<String> = args.iter().map(|t| t.pretty_atom()).collect();
                    format!("{} {}", name, rendered.join(" "))
                }
            }
            Type::TypeError(err) => format!("<{}>", err),
            Type::Unknown => "?".to_string(),
        }
    }

    fn pretty_atom(&self) -> String {
        match self {
            Type::Arr(_, _) | Type::TypeCons(_, _) if !self.is_nullary_cons() => {
                format!("({})", self.pretty())
            }
            _ => self.pretty(),
        }
    }

    fn is_nullary_cons(&self) -> bool {
        matches!(self, Type::TypeCons(_, args) if args.is_empty())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

/// Polymorphic type scheme: a type quantified over `vars`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeScheme {
    pub vars: Vec<TypeVar>,
    pub ty: Type,
}

impl TypeScheme {
    /// A scheme with no quantified variables.
    pub fn monomorphic(ty: Type) -> Self {
        TypeScheme {
            vars: Vec::new(),
            ty,
        }
    }

    pub fn polymorphic(vars: Vec<TypeVar>, ty: Type) -> Self {
        TypeScheme { vars, ty }
    }

    pub fn pretty(&self) -> String {
        self.ty.pretty()
    }
}

impl fmt::Display for TypeScheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_type_vars_concrete() {
        let ty = Type::arr(Type::int(), Type::boolean());
        assert!(ty.free_type_vars().is_empty());
    }

    #[test]
    fn test_free_type_vars_collects_both_sides() {
        let a = TypeVar::new(0);
        let b = TypeVar::new(1);
        let ty = Type::arr(Type::Var(a.clone()), Type::list(Type::Var(b.clone())));
        let free = ty.free_type_vars();
        assert_eq!(free.len(), 2);
        assert!(free.contains(&a));
        assert!(free.contains(&b));
    }

    #[test]
    fn test_arr_chain_right_nested() {
        let ty = Type::arr_chain(vec![Type::int(), Type::boolean()], Type::character());
        assert_eq!(
            ty,
            Type::arr(Type::int(), Type::arr(Type::boolean(), Type::character()))
        );
    }

    #[test]
    fn test_pretty_nested_function() {
        let ty = Type::arr(Type::arr(Type::int(), Type::int()), Type::boolean());
        assert_eq!(ty.pretty(), "(Int -> Int) -> Bool");
    }

    #[test]
    fn test_pretty_type_cons() {
        let ty = Type::TypeCons(
            "Tree".to_string(),
            vec![Type::Var(TypeVar::with_name(0, "a"))],
        );
        assert_eq!(ty.pretty(), "Tree a");
    }

    #[test]
    fn test_enumerable_base_types() {
        assert!(Type::int().is_enumerable());
        assert!(Type::character().is_enumerable());
        assert!(!Type::list(Type::int()).is_enumerable());
    }
}
