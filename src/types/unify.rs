use std::collections::HashSet;

use super::error::TypeError;
use super::subst::{Substitutable, Substitution};
use super::ty::{Type, TypeVar};

/// An equality demand between two types, tagged with the index of the node
/// that produced it so failures can be traced back to the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub left: Type,
    pub right: Type,
    pub index: usize,
}

impl Constraint {
    pub fn new(left: Type, right: Type, index: usize) -> Self {
        Constraint { left, right, index }
    }
}

impl Substitutable for Constraint {
    fn apply(&self, subst: &Substitution) -> Self {
        Constraint {
            left: self.left.apply(subst),
            right: self.right.apply(subst),
            index: self.index,
        }
    }

    fn ftv(&self) -> HashSet<TypeVar> {
        let mut free = self.left.ftv();
        free.extend(self.right.ftv());
        free
    }
}

fn occurs_in(var: &TypeVar, ty: &Type) -> bool {
    match ty {
        Type::Con(_) | Type::Unknown | Type::TypeError(_) => false,
        Type::Var(v) => v == var,
        Type::Arr(t1, t2) => occurs_in(var, t1) || occurs_in(var, t2),
        Type::List(t) => occurs_in(var, t),
        Type::Tuple(ts) | Type::TypeCons(_, ts) => ts.iter().any(|t| occurs_in(var, t)),
    }
}

fn bind(var: &TypeVar, ty: &Type) -> Result<Substitution, TypeError> {
    if let Type::Var(v) = ty {
        if v == var {
            return Ok(Substitution::empty());
        }
    }
    if occurs_in(var, ty) {
        Err(TypeError::infinite_type(var.clone(), ty.clone()))
    } else {
        Ok(Substitution::singleton(var.clone(), ty.clone()))
    }
}

/// Most general unifier of two types.
pub fn unify(t1: &Type, t2: &Type) -> Result<Substitution, TypeError> {
    match (t1, t2) {
        // Unknown carries no information and constrains nothing.
        (Type::Unknown, _) | (_, Type::Unknown) => Ok(Substitution::empty()),
        (Type::TypeError(_), _) | (_, Type::TypeError(_)) => Ok(Substitution::empty()),

        (Type::Var(v), t) | (t, Type::Var(v)) => bind(v, t),

        (Type::Con(a), Type::Con(b)) if a == b => Ok(Substitution::empty()),

        (Type::Arr(l1, r1), Type::Arr(l2, r2)) => {
            let s1 = unify(l1, l2)?;
            let s2 = unify(&r1.apply(&s1), &r2.apply(&s1))?;
            Ok(s2.compose(&s1))
        }

        (Type::List(a), Type::List(b)) => unify(a, b),

        (Type::Tuple(ts1), Type::Tuple(ts2)) if ts1.len() == ts2.len() => unify_all(ts1, ts2),

        (Type::TypeCons(n1, ts1), Type::TypeCons(n2, ts2))
            if n1 == n2 && ts1.len() == ts2.len() =>
        {
            unify_all(ts1, ts2)
        }

        _ => Err(TypeError::unification_fail(t1.clone(), t2.clone())),
    }
}

fn unify_all(ts1: &[Type], ts2: &[Type]) -> Result<Substitution, TypeError> {
    let mut subst = Substitution::empty();
    for (t1, t2) in ts1.iter().zip(ts2.iter()) {
        let s = unify(&t1.apply(&subst), &t2.apply(&subst))?;
        subst = s.compose(&subst);
    }
    Ok(subst)
}

/// Solve a constraint list in order. Each substitution produced for a
/// constraint is applied to the remaining constraints before continuing.
pub fn solve(constraints: &[Constraint]) -> Result<Substitution, TypeError> {
    let mut subst = Substitution::empty();
    for constraint in constraints {
        let s = unify(
            &constraint.left.apply(&subst),
            &constraint.right.apply(&subst),
        )?;
        subst = s.compose(&subst);
    }
    Ok(subst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(id: usize) -> TypeVar {
        TypeVar::new(id)
    }

    #[test]
    fn test_unify_identical_cons() {
        assert_eq!(unify(&Type::int(), &Type::int()), Ok(Substitution::empty()));
    }

    #[test]
    fn test_unify_var_with_concrete() {
        let result = unify(&Type::Var(var(0)), &Type::int()).unwrap();
        assert_eq!(Type::Var(var(0)).apply(&result), Type::int());
    }

    #[test]
    fn test_unify_same_var_no_binding() {
        assert_eq!(
            unify(&Type::Var(var(0)), &Type::Var(var(0))),
            Ok(Substitution::empty())
        );
    }

    #[test]
    fn test_unify_unknown_with_anything() {
        assert_eq!(
            unify(&Type::Unknown, &Type::arr(Type::int(), Type::int())),
            Ok(Substitution::empty())
        );
    }

    #[test]
    fn test_occurs_check_fires() {
        let ty = Type::arr(Type::Var(var(0)), Type::int());
        let result = unify(&Type::Var(var(0)), &ty);
        assert!(matches!(result, Err(TypeError::InfiniteType { .. })));
    }

    #[test]
    fn test_unify_function_threads_substitution() {
        let t1 = Type::arr(Type::Var(var(0)), Type::Var(var(1)));
        let t2 = Type::arr(Type::int(), Type::boolean());
        let result = unify(&t1, &t2).unwrap();
        assert_eq!(Type::Var(var(0)).apply(&result), Type::int());
        assert_eq!(Type::Var(var(1)).apply(&result), Type::boolean());
    }

    #[test]
    fn test_unify_list_structural() {
        let result = unify(
            &Type::list(Type::Var(var(0))),
            &Type::list(Type::character()),
        )
        .unwrap();
        assert_eq!(Type::Var(var(0)).apply(&result), Type::character());
    }

    #[test]
    fn test_unify_tuple_arity_mismatch() {
        let t1 = Type::Tuple(vec![Type::int(), Type::int()]);
        let t2 = Type::Tuple(vec![Type::int()]);
        assert!(matches!(
            unify(&t1, &t2),
            Err(TypeError::UnificationFail { .. })
        ));
    }

    #[test]
    fn test_unify_type_cons_name_mismatch() {
        let t1 = Type::TypeCons("Maybe".to_string(), vec![Type::int()]);
        let t2 = Type::TypeCons("Either".to_string(), vec![Type::int()]);
        assert!(unify(&t1, &t2).is_err());
    }

    #[test]
    fn test_unification_output_idempotent() {
        let t1 = Type::arr(Type::Var(var(0)), Type::Var(var(1)));
        let t2 = Type::arr(Type::Var(var(1)), Type::int());
        let subst = unify(&t1, &t2).unwrap();
        let applied_once = t1.apply(&subst);
        assert_eq!(applied_once.apply(&subst), applied_once);
    }

    #[test]
    fn test_solve_in_order() {
        let constraints = vec![
            Constraint::new(Type::Var(var(0)), Type::Var(var(1)), 0),
            Constraint::new(Type::Var(var(1)), Type::int(), 1),
        ];
        let subst = solve(&constraints).unwrap();
        assert_eq!(Type::Var(var(0)).apply(&subst), Type::int());
        assert_eq!(Type::Var(var(1)).apply(&subst), Type::int());
    }

    #[test]
    fn test_solve_reports_failure() {
        let constraints = vec![
            Constraint::new(Type::Var(var(0)), Type::int(), 0),
            Constraint::new(Type::Var(var(0)), Type::boolean(), 1),
        ];
        assert!(matches!(
            solve(&constraints),
            Err(TypeError::UnificationFail { .. })
        ));
    }
}
