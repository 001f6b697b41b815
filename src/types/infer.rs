use std::collections::{HashMap, HashSet, VecDeque};

use crate::ast::expression::{Atom, Expr, Op, OpInfo, Qual};
use crate::ast::pattern::{Binding, ConstrPattern};
use crate::ast::Def;

use super::env::TypeEnv;
use super::error::TypeError;
use super::index::{
    index_def, index_expr, normalize_error, normalize_scheme, normalize_typed_expr,
};
use super::subst::{Substitutable, Substitution};
use super::ty::{Type, TypeScheme, TypeVar};
use super::unify::{solve, Constraint};

/// State threaded through one constraint-generation run: the fresh-variable
/// counter, the constraints emitted so far, the type assigned to every node
/// index, and the arithmetic-sequence element types that must be checked
/// for enumerability once the constraints are solved.
pub struct Infer {
    counter: usize,
    constraints: Vec<Constraint>,
    node_types: HashMap<usize, Type>,
    seq_checks: Vec<(usize, Type)>,
}

impl Infer {
    pub fn new() -> Self {
        Infer {
            counter: 0,
            constraints: Vec::new(),
            node_types: HashMap::new(),
            seq_checks: Vec::new(),
        }
    }

    fn fresh(&mut self) -> Type {
        let id = self.counter;
        self.counter += 1;
        Type::Var(TypeVar::new(id))
    }

    fn constrain(&mut self, left: Type, right: Type, index: usize) {
        self.constraints.push(Constraint::new(left, right, index));
    }

    fn record(&mut self, index: usize, ty: Type) {
        self.node_types.insert(index, ty);
    }

    pub fn instantiate(&mut self, scheme: &TypeScheme) -> Type {
        let mut map = HashMap::new();
        for var in &scheme.vars {
            map.insert(var.clone(), self.fresh());
        }
        scheme.ty.apply(&Substitution(map))
    }

    /// Validate the recorded arithmetic sequences against the solved
    /// substitution.
    fn check_enums(&self, subst: &Substitution) -> Result<(), TypeError> {
        for (_, elem) in &self.seq_checks {
            let solved = elem.apply(subst);
            if !solved.is_enumerable() {
                return Err(TypeError::no_instance_of_enum(solved));
            }
        }
        Ok(())
    }

    fn lookup_name(&mut self, env: &TypeEnv, name: &str) -> Result<Type, TypeError> {
        if name == "div" || name == "mod" {
            return Ok(Type::arr_chain(
                vec![Type::int(), Type::int()],
                Type::int(),
            ));
        }
        match env.lookup(name) {
            Some(scheme) => {
                let scheme = scheme.clone();
                Ok(self.instantiate(&scheme))
            }
            None => Err(TypeError::unbound_variable(name)),
        }
    }

    fn lookup_constr(&mut self, env: &TypeEnv, name: &str) -> Result<Type, TypeError> {
        match env.lookup(name) {
            Some(scheme) => {
                let scheme = scheme.clone();
                Ok(self.instantiate(&scheme))
            }
            None => Err(TypeError::unknown_data_constructor(name)),
        }
    }

    /// Type of an operator. Closed operators have fixed (possibly
    /// polymorphic) types; `InfixFunc`/`InfixConstr` are looked up.
    fn infer_op(&mut self, env: &TypeEnv, op: &OpInfo<usize>) -> Result<Type, TypeError> {
        let ty = match &op.op {
            Op::Composition => {
                let a = self.fresh();
                let b = self.fresh();
                let c = self.fresh();
                Type::arr_chain(
                    vec![
                        Type::arr(b.clone(), c.clone()),
                        Type::arr(a.clone(), b),
                    ],
                    Type::arr(a, c),
                )
            }
            Op::Power | Op::Mul | Op::Add | Op::Sub => {
                Type::arr_chain(vec![Type::int(), Type::int()], Type::int())
            }
            Op::Colon => {
                let a = self.fresh();
                Type::arr_chain(
                    vec![a.clone(), Type::list(a.clone())],
                    Type::list(a),
                )
            }
            Op::Append => {
                let a = self.fresh();
                Type::arr_chain(
                    vec![Type::list(a.clone()), Type::list(a.clone())],
                    Type::list(a),
                )
            }
            Op::Equ | Op::Neq | Op::Lt | Op::Leq | Op::Gt | Op::Geq => {
                let a = self.fresh();
                Type::arr_chain(vec![a.clone(), a], Type::boolean())
            }
            Op::And | Op::Or => {
                Type::arr_chain(vec![Type::boolean(), Type::boolean()], Type::boolean())
            }
            Op::Dollar => {
                let a = self.fresh();
                let b = self.fresh();
                Type::arr_chain(vec![Type::arr(a.clone(), b.clone()), a], b)
            }
            Op::InfixFunc(name) => self.lookup_name(env, name)?,
            Op::InfixConstr(symbol) => self.lookup_constr(env, symbol)?,
        };
        let tv = self.fresh();
        self.record(op.info, tv.clone());
        self.constrain(tv.clone(), ty, op.info);
        Ok(tv)
    }

    /// Constraint generation for one node: children first, then a fresh
    /// variable equated with the inferred type, attributed to the node's
    /// index.
    pub fn infer_expr(&mut self, env: &TypeEnv, expr: &Expr<usize>) -> Result<Type, TypeError> {
        let index = *expr.meta();
        let inferred = match expr {
            Expr::Atom { atom, .. } => match atom {
                Atom::Int(_) => Type::int(),
                Atom::Bool(_) => Type::boolean(),
                Atom::Char(_) => Type::character(),
                Atom::Name(name) => self.lookup_name(env, name)?,
                Atom::Constr(name) => self.lookup_constr(env, name)?,
            },

            Expr::List { items, .. } => {
                let elem = self.fresh();
                for item in items {
                    let ti = self.infer_expr(env, item)?;
                    self.constrain(ti, elem.clone(), *item.meta());
                }
                Type::list(elem)
            }

            Expr::NTuple { items, .. } => {
                let mut tys = Vec::new();
                for item in items {
                    tys.push(self.infer_expr(env, item)?);
                }
                Type::Tuple(tys)
            }

            Expr::Binary {
                op, left, right, ..
            } => {
                let top = self.infer_op(env, op)?;
                let tl = self.infer_expr(env, left)?;
                let tr = self.infer_expr(env, right)?;
                let tv = self.fresh();
                self.constrain(
                    top,
                    Type::arr_chain(vec![tl, tr], tv.clone()),
                    index,
                );
                tv
            }

            Expr::Unary { op, expr: inner, .. } => {
                let top = self.infer_op(env, op)?;
                let te = self.infer_expr(env, inner)?;
                let tv = self.fresh();
                self.constrain(top, Type::arr(te, tv.clone()), index);
                tv
            }

            Expr::SectL { expr: inner, op, .. } => {
                let top = self.infer_op(env, op)?;
                let te = self.infer_expr(env, inner)?;
                let tv = self.fresh();
                self.constrain(top, Type::arr(te, tv.clone()), index);
                tv
            }

            Expr::SectR { op, expr: inner, .. } => {
                let top = self.infer_op(env, op)?;
                let te = self.infer_expr(env, inner)?;
                let t1 = self.fresh();
                let tr = self.fresh();
                self.constrain(
                    top,
                    Type::arr(t1.clone(), Type::arr(te, tr.clone())),
                    index,
                );
                Type::arr(t1, tr)
            }

            Expr::PrefixOp { op, .. } => self.infer_op(env, op)?,

            Expr::IfExpr {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                let tc = self.infer_expr(env, cond)?;
                self.constrain(tc, Type::boolean(), *cond.meta());
                let tt = self.infer_expr(env, then_branch)?;
                let te = self.infer_expr(env, else_branch)?;
                let tv = self.fresh();
                self.constrain(tv.clone(), tt, index);
                self.constrain(tv.clone(), te, index);
                tv
            }

            Expr::ArithmSeq {
                start, step, end, ..
            } => {
                let ts = self.infer_expr(env, start)?;
                if let Some(step) = step {
                    let t = self.infer_expr(env, step)?;
                    self.constrain(t, ts.clone(), *step.meta());
                }
                if let Some(end) = end {
                    let t = self.infer_expr(env, end)?;
                    self.constrain(t, ts.clone(), *end.meta());
                }
                self.seq_checks.push((index, ts.clone()));
                Type::list(ts)
            }

            Expr::LetExpr {
                bindings, body, ..
            } => {
                check_overlap(bindings.iter().map(|(b, _)| b))?;
                let mut mappings = Vec::new();
                let mut pattern_tys = Vec::new();
                for (binding, _) in bindings {
                    let (m, tp) = self.extract_binding(env, binding)?;
                    mappings.extend(m);
                    pattern_tys.push((tp, *binding.meta()));
                }
                let inner_env = env.extend_many(monomorphic(mappings));
                for ((binding_ty, origin), (_, rhs)) in pattern_tys.iter().zip(bindings.iter()) {
                    let te = self.infer_expr(&inner_env, rhs)?;
                    self.constrain(binding_ty.clone(), te, *origin);
                }
                self.infer_expr(&inner_env, body)?
            }

            Expr::Lambda { params, body, .. } => {
                check_overlap(params.iter())?;
                let mut mappings = Vec::new();
                let mut param_tys = Vec::new();
                for param in params {
                    let (m, tp) = self.extract_binding(env, param)?;
                    mappings.extend(m);
                    param_tys.push(tp);
                }
                let inner_env = env.extend_many(monomorphic(mappings));
                let tb = self.infer_expr(&inner_env, body)?;
                Type::arr_chain(param_tys, tb)
            }

            Expr::App { func, args, .. } => {
                let mut t = self.infer_expr(env, func)?;
                for arg in args {
                    let ta = self.infer_expr(env, arg)?;
                    let tv = self.fresh();
                    self.constrain(t, Type::arr(ta, tv.clone()), *arg.meta());
                    t = tv;
                }
                t
            }

            Expr::ListComp { head, quals, .. } => {
                let mut inner_env = env.clone();
                for qual in quals {
                    inner_env = self.infer_qual(&inner_env, qual)?;
                }
                let th = self.infer_expr(&inner_env, head)?;
                Type::list(th)
            }
        };

        let tv = self.fresh();
        self.record(index, tv.clone());
        self.constrain(tv.clone(), inferred, index);
        Ok(tv)
    }

    /// Infer one qualifier, returning the environment later qualifiers and
    /// the head run under.
    fn infer_qual(&mut self, env: &TypeEnv, qual: &Qual<usize>) -> Result<TypeEnv, TypeError> {
        match qual {
            Qual::Gen {
                binding,
                expr,
                info,
            } => {
                let te = self.infer_expr(env, expr)?;
                let (mappings, tp) = self.extract_binding(env, binding)?;
                self.constrain(te.clone(), Type::list(tp), *info);
                self.record(*info, te);
                Ok(env.extend_many(monomorphic(mappings)))
            }
            Qual::Let {
                binding,
                expr,
                info,
            } => {
                let te = self.infer_expr(env, expr)?;
                let (mappings, tp) = self.extract_binding(env, binding)?;
                self.constrain(tp, te.clone(), *info);
                self.record(*info, te);
                Ok(env.extend_many(monomorphic(mappings)))
            }
            Qual::Guard { expr, info } => {
                let te = self.infer_expr(env, expr)?;
                self.constrain(te, Type::boolean(), *info);
                self.record(*info, Type::boolean());
                Ok(env.clone())
            }
        }
    }

    /// Derive the type-variable environment a pattern introduces: a fresh
    /// variable per name, fixed types for literals, structure unified along
    /// the pattern shape. Returns the (name, type) mappings in binding
    /// order together with the pattern's own type.
    pub fn extract_binding(
        &mut self,
        env: &TypeEnv,
        binding: &Binding<usize>,
    ) -> Result<(Vec<(String, Type)>, Type), TypeError> {
        let index = *binding.meta();
        let (mappings, ty) = match binding {
            Binding::Lit { atom, .. } => match atom {
                Atom::Int(_) => (vec![], Type::int()),
                Atom::Bool(_) => (vec![], Type::boolean()),
                Atom::Char(_) => (vec![], Type::character()),
                Atom::Name(name) if name == "_" => (vec![], self.fresh()),
                Atom::Name(name) => {
                    let tv = self.fresh();
                    (vec![(name.clone(), tv.clone())], tv)
                }
                Atom::Constr(name) => {
                    let ty = self.lookup_constr(env, name)?;
                    if matches!(ty, Type::Arr(_, _)) {
                        return Err(TypeError::pattern_mismatch(erase(binding), ty));
                    }
                    (vec![], ty)
                }
            },

            Binding::ConsLit { head, tail, .. } => {
                let (mh, th) = self.extract_binding(env, head)?;
                let (mt, tt) = self.extract_binding(env, tail)?;
                self.constrain(tt, Type::list(th.clone()), index);
                let mut mappings = mh;
                mappings.extend(mt);
                (mappings, Type::list(th))
            }

            Binding::ListLit { items, .. } => {
                let elem = self.fresh();
                let mut mappings = Vec::new();
                for item in items {
                    let (m, ti) = self.extract_binding(env, item)?;
                    mappings.extend(m);
                    self.constrain(ti, elem.clone(), *item.meta());
                }
                (mappings, Type::list(elem))
            }

            Binding::NTupleLit { items, .. } => {
                let mut mappings = Vec::new();
                let mut tys = Vec::new();
                for item in items {
                    let (m, ti) = self.extract_binding(env, item)?;
                    mappings.extend(m);
                    tys.push(ti);
                }
                (mappings, Type::Tuple(tys))
            }

            Binding::ConstrLit { con, .. } => {
                let (name, args): (&str, Vec<&Binding<usize>>) = match con {
                    ConstrPattern::Prefix { name, args } => {
                        (name.as_str(), args.iter().collect())
                    }
                    ConstrPattern::Infix { symbol, left, right } => {
                        (symbol.as_str(), vec![left.as_ref(), right.as_ref()])
                    }
                };
                let constr_ty = self.lookup_constr(env, name)?;
                if arr_spine_len(&constr_ty) != args.len() {
                    return Err(TypeError::pattern_mismatch(erase(binding), constr_ty));
                }
                let mut mappings = Vec::new();
                let mut arg_tys = Vec::new();
                for arg in args {
                    let (m, ti) = self.extract_binding(env, arg)?;
                    mappings.extend(m);
                    arg_tys.push(ti);
                }
                let tv = self.fresh();
                self.constrain(
                    constr_ty,
                    Type::arr_chain(arg_tys, tv.clone()),
                    index,
                );
                (mappings, tv)
            }
        };
        self.record(index, ty.clone());
        Ok((mappings, ty))
    }
}

impl Default for Infer {
    fn default() -> Self {
        Self::new()
    }
}

fn monomorphic(mappings: Vec<(String, Type)>) -> Vec<(String, TypeScheme)> {
    mappings
        .into_iter()
        .map(|(name, ty)| (name, TypeScheme::monomorphic(ty)))
        .collect()
}

fn erase(binding: &Binding<usize>) -> Binding<()> {
    binding.clone().map_meta(&mut |_| ())
}

fn arr_spine_len(ty: &Type) -> usize {
    match ty {
        Type::Arr(_, rest) => 1 + arr_spine_len(rest),
        _ => 0,
    }
}

/// Reject a clause head (or `let` group) that binds the same variable
/// twice.
fn check_overlap<'a, T: 'a>(
    bindings: impl Iterator<Item = &'a Binding<T>>,
) -> Result<(), TypeError> {
    let mut seen = HashSet::new();
    for binding in bindings {
        for name in binding.bound_names() {
            if !seen.insert(name.clone()) {
                return Err(TypeError::conflicting_definitions(&name));
            }
        }
    }
    Ok(())
}

/// Quantify over the variables free in `ty` but not in the environment.
pub fn generalize(env: &TypeEnv, ty: &Type) -> TypeScheme {
    let env_free = env.ftv();
    let mut vars: Vec<TypeVar> = ty
        .free_type_vars()
        .into_iter()
        .filter(|v| !env_free.contains(v))
        .collect();
    vars.sort();
    TypeScheme {
        vars,
        ty: ty.clone(),
    }
}

/// Infer the typed tree of an expression under `env`. Fails outward on the
/// first error; every node of a successful result carries `Some(type)` and
/// the whole tree shares one canonical variable alphabet.
pub fn type_tree(env: &TypeEnv, expr: &Expr<()>) -> Result<Expr<Option<Type>>, TypeError> {
    let typed = type_tree_raw(env, expr).map_err(|e| normalize_error(&e))?;
    Ok(normalize_typed_expr(typed))
}

fn type_tree_raw(env: &TypeEnv, expr: &Expr<()>) -> Result<Expr<Option<Type>>, TypeError> {
    let (indexed, _) = index_expr(expr.clone(), 0);
    let mut inf = Infer::new();
    inf.infer_expr(env, &indexed)?;
    let subst = solve(&inf.constraints)?;
    inf.check_enums(&subst)?;
    let node_types = inf.node_types;
    Ok(indexed.map_meta(&mut |idx| node_types.get(&idx).map(|t| t.apply(&subst))))
}

/// The generalised, canonically renamed scheme of an expression.
pub fn expr_scheme(env: &TypeEnv, expr: &Expr<()>) -> Result<TypeScheme, TypeError> {
    let (indexed, _) = index_expr(expr.clone(), 0);
    let mut inf = Infer::new();
    let root = inf.infer_expr(env, &indexed)?;
    let subst = solve(&inf.constraints).map_err(|e| normalize_error(&e))?;
    inf.check_enums(&subst).map_err(|e| normalize_error(&e))?;
    Ok(normalize_scheme(&generalize(env, &root.apply(&subst))))
}

/// Inference that never fails outward: a failing node's meta becomes the
/// (normalised) error while its independent subtrees are typed under the
/// same environment. Errors therefore appear only on ancestors of the code
/// that caused them.
pub fn type_tree_partial(env: &TypeEnv, expr: &Expr<()>) -> Expr<Option<Type>> {
    match type_tree_raw(env, expr) {
        Ok(typed) => normalize_typed_expr(typed),
        Err(err) => {
            let meta = Some(Type::TypeError(Box::new(normalize_error(&err))));
            rebuild_partial(env, expr, meta)
        }
    }
}

/// Rebuild a failed node: its own meta is the error, every child is
/// re-typed independently.
fn rebuild_partial(
    env: &TypeEnv,
    expr: &Expr<()>,
    meta: Option<Type>,
) -> Expr<Option<Type>> {
    match expr {
        Expr::Atom { atom, .. } => Expr::Atom {
            atom: atom.clone(),
            info: meta,
        },
        Expr::List { items, .. } => Expr::List {
            items: items.iter().map(|e| type_tree_partial(env, e)).collect(),
            info: meta,
        },
        Expr::NTuple { items, .. } => Expr::NTuple {
            items: items.iter().map(|e| type_tree_partial(env, e)).collect(),
            info: meta,
        },
        Expr::Binary {
            op, left, right, ..
        } => Expr::Binary {
            op: op.clone().map_info(&mut |_| None),
            left: Box::new(type_tree_partial(env, left)),
            right: Box::new(type_tree_partial(env, right)),
            info: meta,
        },
        Expr::Unary { op, expr, .. } => Expr::Unary {
            op: op.clone().map_info(&mut |_| None),
            expr: Box::new(type_tree_partial(env, expr)),
            info: meta,
        },
        Expr::SectL { expr, op, .. } => Expr::SectL {
            expr: Box::new(type_tree_partial(env, expr)),
            op: op.clone().map_info(&mut |_| None),
            info: meta,
        },
        Expr::SectR { op, expr, .. } => Expr::SectR {
            op: op.clone().map_info(&mut |_| None),
            expr: Box::new(type_tree_partial(env, expr)),
            info: meta,
        },
        Expr::PrefixOp { op, .. } => Expr::PrefixOp {
            op: op.clone().map_info(&mut |_| None),
            info: meta,
        },
        Expr::IfExpr {
            cond,
            then_branch,
            else_branch,
            ..
        } => Expr::IfExpr {
            cond: Box::new(type_tree_partial(env, cond)),
            then_branch: Box::new(type_tree_partial(env, then_branch)),
            else_branch: Box::new(type_tree_partial(env, else_branch)),
            info: meta,
        },
        Expr::ArithmSeq {
            start, step, end, ..
        } => Expr::ArithmSeq {
            start: Box::new(type_tree_partial(env, start)),
            step: step.as_ref().map(|e| Box::new(type_tree_partial(env, e))),
            end: end.as_ref().map(|e| Box::new(type_tree_partial(env, e))),
            info: meta,
        },
        Expr::LetExpr { bindings, body, .. } => Expr::LetExpr {
            bindings: bindings
                .iter()
                .map(|(b, e)| {
                    (
                        b.clone().map_meta(&mut |_| None),
                        type_tree_partial(env, e),
                    )
                })
                .collect(),
            body: Box::new(type_tree_partial(env, body)),
            info: meta,
        },
        Expr::Lambda { params, body, .. } => Expr::Lambda {
            params: params
                .iter()
                .map(|b| b.clone().map_meta(&mut |_| None))
                .collect(),
            body: Box::new(type_tree_partial(env, body)),
            info: meta,
        },
        Expr::App { func, args, .. } => Expr::App {
            func: Box::new(type_tree_partial(env, func)),
            args: args.iter().map(|e| type_tree_partial(env, e)).collect(),
            info: meta,
        },
        Expr::ListComp { head, quals, .. } => Expr::ListComp {
            head: Box::new(type_tree_partial(env, head)),
            quals: quals
                .iter()
                .map(|q| match q {
                    Qual::Gen { binding, expr, .. } => Qual::Gen {
                        binding: binding.clone().map_meta(&mut |_| None),
                        expr: type_tree_partial(env, expr),
                        info: None,
                    },
                    Qual::Let { binding, expr, .. } => Qual::Let {
                        binding: binding.clone().map_meta(&mut |_| None),
                        expr: type_tree_partial(env, expr),
                        info: None,
                    },
                    Qual::Guard { expr, .. } => Qual::Guard {
                        expr: type_tree_partial(env, expr),
                        info: None,
                    },
                })
                .collect(),
            info: meta,
        },
    }
}

/// Build the initial type environment from the top-level definitions.
///
/// Definitions sharing a name form one group; a group is inferred under an
/// environment that already binds its own name (recursion). When a group
/// fails with `UnboundVariable(x)` and `x` names a group still in the
/// queue, that group is rotated to the head and the failing group retried
/// after it — a demand-driven topological order. Each (group, missing
/// symbol) pair is rotated at most once; any other error propagates.
pub fn build_type_env(base: &TypeEnv, defs: &[Def<()>]) -> Result<TypeEnv, TypeError> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Def<()>>> = HashMap::new();
    for def in defs {
        if !groups.contains_key(&def.name) {
            order.push(def.name.clone());
        }
        groups.entry(def.name.clone()).or_default().push(def.clone());
    }

    let mut queue: VecDeque<String> = order.into();
    let mut rotated: HashSet<(String, String)> = HashSet::new();
    let mut env = base.clone();
    let mut base_index = 0;

    while let Some(name) = queue.pop_front() {
        match infer_group(&env, &name, &groups[&name], &mut base_index) {
            Ok(scheme) => {
                env = env.extend(name, scheme);
            }
            Err(TypeError::UnboundVariable { name: missing })
                if queue.contains(&missing)
                    && !rotated.contains(&(name.clone(), missing.clone())) =>
            {
                rotated.insert((name.clone(), missing.clone()));
                queue.retain(|n| n != &missing);
                queue.push_front(name);
                queue.push_front(missing);
            }
            Err(err) => return Err(normalize_error(&err)),
        }
    }
    Ok(env)
}

/// Infer one definition group: a single scheme variable is shared by all
/// clauses, each clause's type is unified with it, and the solved type is
/// generalised against the outer environment.
fn infer_group(
    env: &TypeEnv,
    name: &str,
    clauses: &[Def<()>],
    base_index: &mut usize,
) -> Result<TypeScheme, TypeError> {
    let mut inf = Infer::new();
    let group_ty = inf.fresh();
    let rec_env = env.extend(name, TypeScheme::monomorphic(group_ty.clone()));

    for clause in clauses {
        let (indexed, next) = index_def(clause.clone(), *base_index);
        *base_index = next;

        check_overlap(indexed.patterns.iter())?;
        let mut mappings = Vec::new();
        let mut param_tys = Vec::new();
        for pattern in &indexed.patterns {
            let (m, tp) = inf.extract_binding(env, pattern)?;
            mappings.extend(m);
            param_tys.push(tp);
        }
        let clause_env = rec_env.extend_many(monomorphic(mappings));
        let body_ty = inf.infer_expr(&clause_env, &indexed.body)?;
        let origin = *indexed.body.meta();
        let clause_ty = Type::arr_chain(param_tys, body_ty);
        inf.constrain(clause_ty, group_ty.clone(), origin);
    }

    let subst = solve(&inf.constraints)?;
    inf.check_enums(&subst)?;
    let ty = group_ty.apply(&subst);
    Ok(normalize_scheme(&generalize(env, &ty)))
}
