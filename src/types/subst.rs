//! # Type Substitutions
//!
//! A substitution is a finite map from type variables to type terms,
//! discovered during unification and applied across every syntactic
//! category that can mention a type: types, schemes, environments,
//! constraints, and whole decorated trees.
//!
//! ## Composition
//!
//! `s1.compose(&s2)` is `s1 ∘ s2`: applying the result is the same as
//! applying `s2` first and `s1` to its output. Concretely, `s1` is mapped
//! over `s2`'s images and the two maps are unioned with `s1` winning on
//! collisions. A substitution produced by unifying a single constraint is
//! idempotent: applying it twice is the same as applying it once.
//!
//! ## The `Substitutable` capability
//!
//! Everything a substitution can act on implements [`Substitutable`]:
//! `apply` rewrites the value, `ftv` collects its free type variables.
//! Instances exist for type terms, optional types, schemes (quantified
//! variables are removed from the substitution before application),
//! sequences, constraints, environments, and typed expression trees
//! (applied to every meta slot, recursively).

use std::collections::{HashMap, HashSet};

use crate::ast::expression::{Expr, OpInfo, Qual};
use crate::ast::pattern::{Binding, ConstrPattern};

use super::ty::{Type, TypeScheme, TypeVar};

/// A finite map from type variables to types.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Substitution(pub HashMap<TypeVar, Type>);

impl Substitution {
    /// The empty substitution.
    pub fn empty() -> Self {
        Substitution(HashMap::new())
    }

    /// A substitution with a single mapping `var := ty`.
    pub fn singleton(var: TypeVar, ty: Type) -> Self {
        let mut map = HashMap::new();
        map.insert(var, ty);
        Substitution(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut result: HashMap<TypeVar, Type> = other
            .0
            .iter()
            .map(|(var, ty)| (var.clone(), ty.apply(self)))
            .collect();
        for (var, ty) in &self.0 {
            result.entry(var.clone()).or_insert_with(|| ty.clone());
        }
        Substitution(result)
    }
}

/// Values a substitution can act on.
pub trait Substitutable {
    fn apply(&self, subst: &Substitution) -> Self;
    fn ftv(&self) -> HashSet<TypeVar>;
}

impl Substitutable for Type {
    fn apply(&self, subst: &Substitution) -> Self {
        match self {
            Type::Con(_) | Type::Unknown | Type::TypeError(_) => self.clone(),
            Type::Var(v) => subst.0.get(v).cloned().unwrap_or_else(|| self.clone()),
            Type::Arr(t1, t2) => Type::arr(t1.apply(subst), t2.apply(subst)),
            Type::List(t) => Type::list(t.apply(subst)),
            Type::Tuple(ts) => Type::Tuple(ts.iter().map(|t| t.apply(subst)).collect()),
            Type::TypeCons(name, ts) => Type::TypeCons(
                name.clone(),
                ts.iter().map(|t| t.apply(subst)).collect(),
            ),
        }
    }

    fn ftv(&self) -> HashSet<TypeVar> {
        self.free_type_vars()
    }
}

impl Substitutable for Option<Type> {
    fn apply(&self, subst: &Substitution) -> Self {
        self.as_ref().map(|t| t.apply(subst))
    }

    fn ftv(&self) -> HashSet<TypeVar> {
        self.as_ref().map(|t| t.ftv()).unwrap_or_default()
    }
}

impl Substitutable for TypeScheme {
    /// Quantified variables are bound: they are removed from the
    /// substitution before it touches the body.
    fn apply(&self, subst: &Substitution) -> Self {
        let mut inner = subst.clone();
        for var in &self.vars {
            inner.0.remove(var);
        }
        TypeScheme {
            vars: self.vars.clone(),
            ty: self.ty.apply(&inner),
        }
    }

    fn ftv(&self) -> HashSet<TypeVar> {
        let mut free = self.ty.ftv();
        for var in &self.vars {
            free.remove(var);
        }
        free
    }
}

impl<S: Substitutable> Substitutable for Vec<S> {
    fn apply(&self, subst: &Substitution) -> Self {
        self.iter().map(|x| x.apply(subst)).collect()
    }

    fn ftv(&self) -> HashSet<TypeVar> {
        let mut free = HashSet::new();
        for x in self {
            free.extend(x.ftv());
        }
        free
    }
}

impl<A: Substitutable, B: Substitutable> Substitutable for (A, B) {
    fn apply(&self, subst: &Substitution) -> Self {
        (self.0.apply(subst), self.1.apply(subst))
    }

    fn ftv(&self) -> HashSet<TypeVar> {
        let mut free = self.0.ftv();
        free.extend(self.1.ftv());
        free
    }
}

impl Substitutable for OpInfo<Option<Type>> {
    fn apply(&self, subst: &Substitution) -> Self {
        OpInfo {
            op: self.op.clone(),
            info: self.info.apply(subst),
        }
    }

    fn ftv(&self) -> HashSet<TypeVar> {
        self.info.ftv()
    }
}

impl Substitutable for Expr<Option<Type>> {
    fn apply(&self, subst: &Substitution) -> Self {
        match self {
            Expr::Atom { atom, info } => Expr::Atom {
                atom: atom.clone(),
                info: info.apply(subst),
            },
            Expr::List { items, info } => Expr::List {
                items: items.apply(subst),
                info: info.apply(subst),
            },
            Expr::NTuple { items, info } => Expr::NTuple {
                items: items.apply(subst),
                info: info.apply(subst),
            },
            Expr::Binary {
                op,
                left,
                right,
                info,
            } => Expr::Binary {
                op: op.apply(subst),
                left: Box::new(left.apply(subst)),
                right: Box::new(right.apply(subst)),
                info: info.apply(subst),
            },
            Expr::Unary { op, expr, info } => Expr::Unary {
                op: op.apply(subst),
                expr: Box::new(expr.apply(subst)),
                info: info.apply(subst),
            },
            Expr::SectL { expr, op, info } => Expr::SectL {
                expr: Box::new(expr.apply(subst)),
                op: op.apply(subst),
                info: info.apply(subst),
            },
            Expr::SectR { op, expr, info } => Expr::SectR {
                op: op.apply(subst),
                expr: Box::new(expr.apply(subst)),
                info: info.apply(subst),
            },
            Expr::PrefixOp { op, info } => Expr::PrefixOp {
                op: op.apply(subst),
                info: info.apply(subst),
            },
            Expr::IfExpr {
                cond,
                then_branch,
                else_branch,
                info,
            } => Expr::IfExpr {
                cond: Box::new(cond.apply(subst)),
                then_branch: Box::new(then_branch.apply(subst)),
                else_branch: Box::new(else_branch.apply(subst)),
                info: info.apply(subst),
            },
            Expr::ArithmSeq {
                start,
                step,
                end,
                info,
            } => Expr::ArithmSeq {
                start: Box::new(start.apply(subst)),
                step: step.as_ref().map(|e| Box::new(e.apply(subst))),
                end: end.as_ref().map(|e| Box::new(e.apply(subst))),
                info: info.apply(subst),
            },
            Expr::LetExpr {
                bindings,
                body,
                info,
            } => Expr::LetExpr {
                bindings: bindings.apply(subst),
                body: Box::new(body.apply(subst)),
                info: info.apply(subst),
            },
            Expr::Lambda { params, body, info } => Expr::Lambda {
                params: params.apply(subst),
                body: Box::new(body.apply(subst)),
                info: info.apply(subst),
            },
            Expr::App { func, args, info } => Expr::App {
                func: Box::new(func.apply(subst)),
                args: args.apply(subst),
                info: info.apply(subst),
            },
            Expr::ListComp { head, quals, info } => Expr::ListComp {
                head: Box::new(head.apply(subst)),
                quals: quals.apply(subst),
                info: info.apply(subst),
            },
        }
    }

    fn ftv(&self) -> HashSet<TypeVar> {
        let mut free = self.meta().ftv();
        for child in self.children() {
            free.extend(child.ftv());
        }
        free
    }
}

impl Substitutable for Binding<Option<Type>> {
    fn apply(&self, subst: &Substitution) -> Self {
        match self {
            Binding::Lit { atom, info } => Binding::Lit {
                atom: atom.clone(),
                info: info.apply(subst),
            },
            Binding::ConsLit { head, tail, info } => Binding::ConsLit {
                head: Box::new(head.apply(subst)),
                tail: Box::new(tail.apply(subst)),
                info: info.apply(subst),
            },
            Binding::ListLit { items, info } => Binding::ListLit {
                items: items.apply(subst),
                info: info.apply(subst),
            },
            Binding::NTupleLit { items, info } => Binding::NTupleLit {
                items: items.apply(subst),
                info: info.apply(subst),
            },
            Binding::ConstrLit { con, info } => Binding::ConstrLit {
                con: match con {
                    ConstrPattern::Prefix { name, args } => ConstrPattern::Prefix {
                        name: name.clone(),
                        args: args.apply(subst),
                    },
                    ConstrPattern::Infix {
                        symbol,
                        left,
                        right,
                    } => ConstrPattern::Infix {
                        symbol: symbol.clone(),
                        left: Box::new(left.apply(subst)),
                        right: Box::new(right.apply(subst)),
                    },
                },
                info: info.apply(subst),
            },
        }
    }

    fn ftv(&self) -> HashSet<TypeVar> {
        let mut free = self.meta().ftv();
        match self {
            Binding::Lit { .. } => {}
            Binding::ConsLit { head, tail, .. } => {
                free.extend(head.ftv());
                free.extend(tail.ftv());
            }
            Binding::ListLit { items, .. } | Binding::NTupleLit { items, .. } => {
                free.extend(items.ftv());
            }
            Binding::ConstrLit { con, .. } => match con {
                ConstrPattern::Prefix { args, .. } => free.extend(args.ftv()),
                ConstrPattern::Infix { left, right, .. } => {
                    free.extend(left.ftv());
                    free.extend(right.ftv());
                }
            },
        }
        free
    }
}

impl Substitutable for Qual<Option<Type>> {
    fn apply(&self, subst: &Substitution) -> Self {
        match self {
            Qual::Gen {
                binding,
                expr,
                info,
            } => Qual::Gen {
                binding: binding.apply(subst),
                expr: expr.apply(subst),
                info: info.apply(subst),
            },
            Qual::Let {
                binding,
                expr,
                info,
            } => Qual::Let {
                binding: binding.apply(subst),
                expr: expr.apply(subst),
                info: info.apply(subst),
            },
            Qual::Guard { expr, info } => Qual::Guard {
                expr: expr.apply(subst),
                info: info.apply(subst),
            },
        }
    }

    fn ftv(&self) -> HashSet<TypeVar> {
        match self {
            Qual::Gen {
                binding,
                expr,
                info,
            }
            | Qual::Let {
                binding,
                expr,
                info,
            } => {
                let mut free = binding.ftv();
                free.extend(expr.ftv());
                free.extend(info.ftv());
                free
            }
            Qual::Guard { expr, info } => {
                let mut free = expr.ftv();
                free.extend(info.ftv());
                free
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(id: usize) -> TypeVar {
        TypeVar::new(id)
    }

    #[test]
    fn test_empty_substitution_is_identity() {
        let subst = Substitution::empty();
        let ty = Type::arr(Type::int(), Type::Var(var(0)));
        assert_eq!(ty.apply(&subst), ty);
    }

    #[test]
    fn test_singleton_replaces_variable() {
        let subst = Substitution::singleton(var(0), Type::int());
        assert_eq!(Type::Var(var(0)).apply(&subst), Type::int());
    }

    #[test]
    fn test_apply_recurses_into_structure() {
        let subst = Substitution::singleton(var(0), Type::int());
        let ty = Type::list(Type::Tuple(vec![Type::Var(var(0)), Type::boolean()]));
        assert_eq!(
            ty.apply(&subst),
            Type::list(Type::Tuple(vec![Type::int(), Type::boolean()]))
        );
    }

    #[test]
    fn test_compose_applies_other_first() {
        let s1 = Substitution::singleton(var(1), Type::int());
        let s2 = Substitution::singleton(var(0), Type::Var(var(1)));
        let composed = s1.compose(&s2);
        // (s1 ∘ s2)(t) = s1(s2(t))
        assert_eq!(Type::Var(var(0)).apply(&composed), Type::int());
        assert_eq!(Type::Var(var(1)).apply(&composed), Type::int());
    }

    #[test]
    fn test_compose_collision_keeps_application_order() {
        // (s1 ∘ s2)(v) must equal s1(s2(v)) even when both bind v.
        let s1 = Substitution::singleton(var(0), Type::int());
        let s2 = Substitution::singleton(var(0), Type::boolean());
        let composed = s1.compose(&s2);
        assert_eq!(Type::Var(var(0)).apply(&composed), Type::boolean());
    }

    #[test]
    fn test_compose_law_on_types() {
        let s1 = Substitution::singleton(var(0), Type::list(Type::Var(var(1))));
        let s2 = Substitution::singleton(var(1), Type::int());
        let ty = Type::Tuple(vec![Type::Var(var(0)), Type::Var(var(1))]);
        assert_eq!(
            ty.apply(&s1.compose(&s2)),
            ty.apply(&s2).apply(&s1)
        );
    }

    #[test]
    fn test_scheme_protects_quantified_vars() {
        let subst = Substitution::singleton(var(0), Type::int());
        let scheme = TypeScheme::polymorphic(
            vec![var(0)],
            Type::arr(Type::Var(var(0)), Type::Var(var(0))),
        );
        assert_eq!(scheme.apply(&subst), scheme);
    }

    #[test]
    fn test_scheme_ftv_excludes_quantified() {
        let scheme = TypeScheme::polymorphic(
            vec![var(0)],
            Type::arr(Type::Var(var(0)), Type::Var(var(1))),
        );
        let free = scheme.ftv();
        assert_eq!(free.len(), 1);
        assert!(free.contains(&var(1)));
    }
}
