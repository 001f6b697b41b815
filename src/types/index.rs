//! # Node Indexing and Canonical Renaming
//!
//! Two small services the inference pipeline needs around its edges:
//!
//! - **Indexing** assigns a unique, dense index to every node of a tree
//!   before constraint generation, so every constraint can name the node it
//!   originated from. The base index is caller-chosen: top-level definitions
//!   and a focus expression can share one continuous index space.
//! - **Canonical renaming** maps the free type variables of a result to the
//!   alphabet `a, b, ..., z, aa, ab, ...` in first-appearance order, so
//!   diagnostics are stable no matter which internal ids inference used.

use std::collections::HashMap;

use crate::ast::expression::Expr;
use crate::ast::Def;

use super::error::TypeError;
use super::ty::{Type, TypeScheme, TypeVar};

/// Index a tree's meta slots with consecutive numbers starting at `base`,
/// in pre-order. Returns the indexed tree and the next unused index.
pub fn index_expr(expr: Expr<()>, base: usize) -> (Expr<usize>, usize) {
    let mut counter = base;
    let indexed = expr.map_meta(&mut |_| {
        let index = counter;
        counter += 1;
        index
    });
    (indexed, counter)
}

/// Index one definition (patterns first, then the body), continuing from
/// `base`. The caller threads the returned counter through a whole program
/// so all definitions live in one index space.
pub fn index_def(def: Def<()>, base: usize) -> (Def<usize>, usize) {
    let mut counter = base;
    let indexed = def.map_meta(&mut |_| {
        let index = counter;
        counter += 1;
        index
    });
    (indexed, counter)
}

/// Drop the indices again. Indexing followed by removal is the identity on
/// the underlying tree.
pub fn remove_indices(expr: Expr<usize>) -> Expr<()> {
    expr.map_meta(&mut |_| ())
}

/// The closed-form display alphabet: `0 -> a`, `25 -> z`, `26 -> aa`, ...
pub fn type_var_name(mut n: usize) -> String {
    let mut name = String::new();
    loop {
        name.insert(0, (b'a' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    name
}

/// State of one renaming pass: every distinct variable gets the next
/// alphabet name the first time it appears.
#[derive(Debug, Default)]
pub struct Renamer {
    assigned: HashMap<TypeVar, TypeVar>,
    next: usize,
}

impl Renamer {
    pub fn new() -> Self {
        Renamer::default()
    }

    fn rename_var(&mut self, var: &TypeVar) -> TypeVar {
        if let Some(renamed) = self.assigned.get(var) {
            return renamed.clone();
        }
        let fresh = TypeVar::with_name(self.next, type_var_name(self.next));
        self.next += 1;
        self.assigned.insert(var.clone(), fresh.clone());
        fresh
    }

    pub fn rename_type(&mut self, ty: &Type) -> Type {
        match ty {
            Type::Var(v) => Type::Var(self.rename_var(v)),
            Type::Con(_) | Type::Unknown => ty.clone(),
            Type::Arr(t1, t2) => Type::arr(self.rename_type(t1), self.rename_type(t2)),
            Type::List(t) => Type::list(self.rename_type(t)),
            Type::Tuple(ts) => Type::Tuple(ts.iter().map(|t| self.rename_type(t)).collect()),
            Type::TypeCons(name, ts) => Type::TypeCons(
                name.clone(),
                ts.iter().map(|t| self.rename_type(t)).collect(),
            ),
            Type::TypeError(err) => Type::TypeError(Box::new(self.rename_error(err))),
        }
    }

    pub fn rename_error(&mut self, err: &TypeError) -> TypeError {
        match err {
            TypeError::UnificationFail { expected, found } => TypeError::UnificationFail {
                expected: self.rename_type(expected),
                found: self.rename_type(found),
            },
            TypeError::InfiniteType { var, ty } => TypeError::InfiniteType {
                var: self.rename_var(var),
                ty: self.rename_type(ty),
            },
            TypeError::NoInstanceOfEnum { ty } => TypeError::NoInstanceOfEnum {
                ty: self.rename_type(ty),
            },
            TypeError::PatternMismatch { binding, ty } => TypeError::PatternMismatch {
                binding: binding.clone(),
                ty: self.rename_type(ty),
            },
            TypeError::UnboundVariable { .. }
            | TypeError::UnknownDataConstructor { .. }
            | TypeError::UnknownError { .. } => err.clone(),
        }
    }
}

/// Rename one standalone type.
pub fn normalize_type(ty: &Type) -> Type {
    Renamer::new().rename_type(ty)
}

/// Rename a scheme: quantified variables and body share one pass.
pub fn normalize_scheme(scheme: &TypeScheme) -> TypeScheme {
    let mut renamer = Renamer::new();
    let ty = renamer.rename_type(&scheme.ty);
    let vars = scheme
        .vars
        .iter()
        .map(|v| renamer.rename_var(v))
        .collect();
    TypeScheme { vars, ty }
}

/// Rename a standalone error before it leaves the inferencer.
pub fn normalize_error(err: &TypeError) -> TypeError {
    Renamer::new().rename_error(err)
}

/// Rename a fully decorated tree in one pass, pre-order, so every slot
/// shares the same alphabet.
pub fn normalize_typed_expr(expr: Expr<Option<Type>>) -> Expr<Option<Type>> {
    let mut renamer = Renamer::new();
    expr.map_meta(&mut |slot| slot.map(|ty| renamer.rename_type(&ty)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expression::Op;

    #[test]
    fn test_alphabet_closed_form() {
        assert_eq!(type_var_name(0), "a");
        assert_eq!(type_var_name(25), "z");
        assert_eq!(type_var_name(26), "aa");
        assert_eq!(type_var_name(27), "ab");
        assert_eq!(type_var_name(52), "ba");
    }

    #[test]
    fn test_index_dense_from_base() {
        let expr = Expr::binary(Op::Add, Expr::int(1), Expr::int(2));
        let (indexed, next) = index_expr(expr, 10);
        // Four slots: node, operator, left, right.
        assert_eq!(next, 14);
        assert_eq!(*indexed.meta(), 10);
    }

    #[test]
    fn test_index_then_remove_is_identity() {
        let expr = Expr::app(
            Expr::name("f"),
            vec![Expr::list(vec![Expr::int(1), Expr::int(2)])],
        );
        let (indexed, _) = index_expr(expr.clone(), 0);
        assert_eq!(remove_indices(indexed), expr);
    }

    #[test]
    fn test_renaming_first_appearance_order() {
        let ty = Type::arr(
            Type::Var(TypeVar::new(7)),
            Type::arr(Type::Var(TypeVar::new(3)), Type::Var(TypeVar::new(7))),
        );
        assert_eq!(normalize_type(&ty).pretty(), "a -> b -> a");
    }

    #[test]
    fn test_renaming_deterministic() {
        let ty = Type::Tuple(vec![
            Type::Var(TypeVar::new(9)),
            Type::Var(TypeVar::new(1)),
            Type::Var(TypeVar::new(9)),
        ]);
        assert_eq!(normalize_type(&ty), normalize_type(&ty));
        assert_eq!(normalize_type(&ty).pretty(), "(a, b, a)");
    }

    #[test]
    fn test_error_renaming() {
        let err = TypeError::unification_fail(
            Type::Var(TypeVar::new(4)),
            Type::list(Type::Var(TypeVar::new(4))),
        );
        let renamed = normalize_error(&err);
        assert_eq!(
            renamed,
            TypeError::unification_fail(
                Type::Var(TypeVar::with_name(0, "a")),
                Type::list(Type::Var(TypeVar::with_name(0, "a"))),
            )
        );
    }
}
