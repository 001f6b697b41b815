//! # Type Environment
//!
//! The type environment maps identifier names to type schemes. It is a
//! persistent structure: every operation returns a new environment, so a
//! scope can be extended for a sub-derivation without disturbing the
//! caller's copy.
//!
//! Looking a name up yields its *scheme*; the inferencer instantiates it
//! with fresh variables at every use site, which is what makes
//! `forall a. a -> a` usable at `Int -> Int` and `Bool -> Bool` in the same
//! expression.

use std::collections::{HashMap, HashSet};

use super::subst::{Substitutable, Substitution};
use super::ty::{TypeScheme, TypeVar};

/// Mapping from identifier name to type scheme.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeEnv {
    bindings: HashMap<String, TypeScheme>,
}

impl TypeEnv {
    pub fn empty() -> Self {
        TypeEnv {
            bindings: HashMap::new(),
        }
    }

    pub fn with_bindings(bindings: Vec<(String, TypeScheme)>) -> Self {
        TypeEnv {
            bindings: bindings.into_iter().collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeScheme> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Extend with one binding; an existing binding of the same name is
    /// shadowed.
    pub fn extend(&self, name: impl Into<String>, scheme: TypeScheme) -> TypeEnv {
        let mut bindings = self.bindings.clone();
        bindings.insert(name.into(), scheme);
        TypeEnv { bindings }
    }

    /// Extend with several bindings at once (later entries win).
    pub fn extend_many(&self, new: Vec<(String, TypeScheme)>) -> TypeEnv {
        let mut bindings = self.bindings.clone();
        for (name, scheme) in new {
            bindings.insert(name, scheme);
        }
        TypeEnv { bindings }
    }

    /// Left-biased union: bindings of `self` win over bindings of `other`.
    pub fn union(&self, other: &TypeEnv) -> TypeEnv {
        let mut bindings = other.bindings.clone();
        for (name, scheme) in &self.bindings {
            bindings.insert(name.clone(), scheme.clone());
        }
        TypeEnv { bindings }
    }
}

impl Substitutable for TypeEnv {
    fn apply(&self, subst: &Substitution) -> Self {
        TypeEnv {
            bindings: self
                .bindings
                .iter()
                .map(|(name, scheme)| (name.clone(), scheme.apply(subst)))
                .collect(),
        }
    }

    fn ftv(&self) -> HashSet<TypeVar> {
        let mut free = HashSet::new();
        for scheme in self.bindings.values() {
            free.extend(scheme.ftv());
        }
        free
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ty::Type;

    #[test]
    fn test_empty_env() {
        assert!(TypeEnv::empty().lookup("x").is_none());
    }

    #[test]
    fn test_extend_shadows() {
        let env = TypeEnv::empty()
            .extend("x", TypeScheme::monomorphic(Type::int()))
            .extend("x", TypeScheme::monomorphic(Type::boolean()));
        assert_eq!(env.lookup("x").unwrap().ty, Type::boolean());
    }

    #[test]
    fn test_union_left_biased() {
        let left = TypeEnv::empty().extend("x", TypeScheme::monomorphic(Type::int()));
        let right = TypeEnv::empty()
            .extend("x", TypeScheme::monomorphic(Type::boolean()))
            .extend("y", TypeScheme::monomorphic(Type::character()));
        let merged = left.union(&right);
        assert_eq!(merged.lookup("x").unwrap().ty, Type::int());
        assert_eq!(merged.lookup("y").unwrap().ty, Type::character());
    }

    #[test]
    fn test_free_type_vars_skip_quantified() {
        let bound = TypeVar::new(0);
        let free_var = TypeVar::new(1);
        let env = TypeEnv::empty()
            .extend(
                "id",
                TypeScheme::polymorphic(vec![bound.clone()], Type::Var(bound)),
            )
            .extend("x", TypeScheme::monomorphic(Type::Var(free_var.clone())));
        let free = env.ftv();
        assert_eq!(free.len(), 1);
        assert!(free.contains(&free_var));
    }

    #[test]
    fn test_apply_substitution() {
        let var = TypeVar::new(0);
        let env = TypeEnv::empty().extend("x", TypeScheme::monomorphic(Type::Var(var.clone())));
        let subst = Substitution::singleton(var, Type::int());
        assert_eq!(env.apply(&subst).lookup("x").unwrap().ty, Type::int());
    }
}
