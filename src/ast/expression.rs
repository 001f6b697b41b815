//! # Expression Tree
//!
//! The expression tree is the single data structure shared by every phase of
//! the system: the parser produces it, the evaluator rewrites it, and the
//! type inferencer decorates it.
//!
//! ## Meta slot
//!
//! Every node carries an `info: T` slot so the same tree shape can hold
//! different per-phase information:
//!
//! - **After parsing**: `Expr<()>` (no decoration)
//! - **During inference**: `Expr<usize>` (a unique node index per node)
//! - **After inference**: `Expr<Option<Type>>` (the inferred type, or a
//!   localised type error in partial-typing mode)
//!
//! Operators carry their own meta slot ([`OpInfo`]) because an operator has
//! a type of its own (e.g. `+ : Int -> Int -> Int`) independent of the
//! node it decorates.
//!
//! ## Related modules
//!
//! - [`crate::ast::pattern`] - binding patterns with the same meta slot
//! - [`crate::eval`] - small-step reduction over `Expr<()>`
//! - [`crate::types::infer`] - constraint generation over `Expr<usize>`

use super::pattern::Binding;

/// Leaf values of the expression language.
///
/// `Name` is a variable reference (resolved against the evaluation
/// environment), `Constr` a data-constructor reference. Both compare by
/// their string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Atom {
    Int(i64),
    Bool(bool),
    Char(char),
    Name(String),
    Constr(String),
}

/// Operator associativity, also used for infix data constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    Non,
}

/// The closed operator set, plus two open variants: `InfixFunc` calls a
/// named function infix (``a `max` b``) and `InfixConstr` is an infix data
/// constructor (`a :+: b`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Composition,
    Power,
    Mul,
    Add,
    Sub,
    Colon,
    Append,
    Equ,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
    And,
    Or,
    Dollar,
    InfixFunc(String),
    InfixConstr(String),
}

impl Op {
    /// Binding strength, looser (0) to tighter (9). Shared by the
    /// expression grammar and the pretty-printer.
    pub fn precedence(&self) -> u8 {
        match self {
            Op::Dollar => 0,
            Op::Or => 2,
            Op::And => 3,
            Op::Equ | Op::Neq | Op::Lt | Op::Leq | Op::Gt | Op::Geq => 4,
            Op::Colon | Op::Append | Op::InfixConstr(_) => 5,
            Op::Add | Op::Sub => 6,
            Op::Mul => 7,
            Op::Power => 8,
            Op::Composition | Op::InfixFunc(_) => 9,
        }
    }

    pub fn assoc(&self) -> Assoc {
        match self {
            Op::Dollar
            | Op::Or
            | Op::And
            | Op::Colon
            | Op::Append
            | Op::InfixConstr(_)
            | Op::Power
            | Op::Composition => Assoc::Right,
            Op::Equ | Op::Neq | Op::Lt | Op::Leq | Op::Gt | Op::Geq => Assoc::Non,
            Op::Add | Op::Sub | Op::Mul | Op::InfixFunc(_) => Assoc::Left,
        }
    }

    /// The surface symbol, as the pretty-printer renders it.
    pub fn symbol(&self) -> String {
        match self {
            Op::Composition => ".".to_string(),
            Op::Power => "^".to_string(),
            Op::Mul => "*".to_string(),
            Op::Add => "+".to_string(),
            Op::Sub => "-".to_string(),
            Op::Colon => ":".to_string(),
            Op::Append => "++".to_string(),
            Op::Equ => "==".to_string(),
            Op::Neq => "/=".to_string(),
            Op::Lt => "<".to_string(),
            Op::Leq => "<=".to_string(),
            Op::Gt => ">".to_string(),
            Op::Geq => ">=".to_string(),
            Op::And => "&&".to_string(),
            Op::Or => "||".to_string(),
            Op::Dollar => "$".to_string(),
            Op::InfixFunc(name) => format!("`{}`", name),
            Op::InfixConstr(sym) => sym.clone(),
        }
    }
}

/// An operator together with its meta slot.
#[derive(Debug, Clone, PartialEq)]
pub struct OpInfo<T> {
    pub op: Op,
    pub info: T,
}

impl OpInfo<()> {
    pub fn plain(op: Op) -> Self {
        OpInfo { op, info: () }
    }
}

impl<T> OpInfo<T> {
    pub fn map_info<B>(self, f: &mut impl FnMut(T) -> B) -> OpInfo<B> {
        OpInfo {
            op: self.op,
            info: f(self.info),
        }
    }
}

/// Expression nodes. See the module docs for the meta-slot convention.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<T> {
    Atom {
        atom: Atom,
        info: T,
    },
    List {
        items: Vec<Expr<T>>,
        info: T,
    },
    NTuple {
        items: Vec<Expr<T>>,
        info: T,
    },
    Binary {
        op: OpInfo<T>,
        left: Box<Expr<T>>,
        right: Box<Expr<T>>,
        info: T,
    },
    Unary {
        op: OpInfo<T>,
        expr: Box<Expr<T>>,
        info: T,
    },
    /// Left operator section `(e op)`.
    SectL {
        expr: Box<Expr<T>>,
        op: OpInfo<T>,
        info: T,
    },
    /// Right operator section `(op e)`.
    SectR {
        op: OpInfo<T>,
        expr: Box<Expr<T>>,
        info: T,
    },
    /// A bare parenthesised operator `(op)`.
    PrefixOp {
        op: OpInfo<T>,
        info: T,
    },
    IfExpr {
        cond: Box<Expr<T>>,
        then_branch: Box<Expr<T>>,
        else_branch: Box<Expr<T>>,
        info: T,
    },
    /// `[start ..]`, `[start, step ..]`, `[start .. end]`, `[start, step .. end]`.
    ArithmSeq {
        start: Box<Expr<T>>,
        step: Option<Box<Expr<T>>>,
        end: Option<Box<Expr<T>>>,
        info: T,
    },
    LetExpr {
        bindings: Vec<(Binding<T>, Expr<T>)>,
        body: Box<Expr<T>>,
        info: T,
    },
    Lambda {
        params: Vec<Binding<T>>,
        body: Box<Expr<T>>,
        info: T,
    },
    App {
        func: Box<Expr<T>>,
        args: Vec<Expr<T>>,
        info: T,
    },
    ListComp {
        head: Box<Expr<T>>,
        quals: Vec<Qual<T>>,
        info: T,
    },
}

/// List-comprehension qualifiers: generators, local bindings, guards.
#[derive(Debug, Clone, PartialEq)]
pub enum Qual<T> {
    Gen {
        binding: Binding<T>,
        expr: Expr<T>,
        info: T,
    },
    Let {
        binding: Binding<T>,
        expr: Expr<T>,
        info: T,
    },
    Guard {
        expr: Expr<T>,
        info: T,
    },
}

impl<T> Expr<T> {
    /// The meta slot of this node.
    pub fn meta(&self) -> &T {
        match self {
            Expr::Atom { info, .. }
            | Expr::List { info, .. }
            | Expr::NTuple { info, .. }
            | Expr::Binary { info, .. }
            | Expr::Unary { info, .. }
            | Expr::SectL { info, .. }
            | Expr::SectR { info, .. }
            | Expr::PrefixOp { info, .. }
            | Expr::IfExpr { info, .. }
            | Expr::ArithmSeq { info, .. }
            | Expr::LetExpr { info, .. }
            | Expr::Lambda { info, .. }
            | Expr::App { info, .. }
            | Expr::ListComp { info, .. } => info,
        }
    }

    /// Replace the meta slot of this node only (children untouched).
    pub fn with_meta(self, meta: T) -> Expr<T> {
        match self {
            Expr::Atom { atom, .. } => Expr::Atom { atom, info: meta },
            Expr::List { items, .. } => Expr::List { items, info: meta },
            Expr::NTuple { items, .. } => Expr::NTuple { items, info: meta },
            Expr::Binary {
                op, left, right, ..
            } => Expr::Binary {
                op,
                left,
                right,
                info: meta,
            },
            Expr::Unary { op, expr, .. } => Expr::Unary {
                op,
                expr,
                info: meta,
            },
            Expr::SectL { expr, op, .. } => Expr::SectL {
                expr,
                op,
                info: meta,
            },
            Expr::SectR { op, expr, .. } => Expr::SectR {
                op,
                expr,
                info: meta,
            },
            Expr::PrefixOp { op, .. } => Expr::PrefixOp { op, info: meta },
            Expr::IfExpr {
                cond,
                then_branch,
                else_branch,
                ..
            } => Expr::IfExpr {
                cond,
                then_branch,
                else_branch,
                info: meta,
            },
            Expr::ArithmSeq {
                start, step, end, ..
            } => Expr::ArithmSeq {
                start,
                step,
                end,
                info: meta,
            },
            Expr::LetExpr { bindings, body, .. } => Expr::LetExpr {
                bindings,
                body,
                info: meta,
            },
            Expr::Lambda { params, body, .. } => Expr::Lambda {
                params,
                body,
                info: meta,
            },
            Expr::App { func, args, .. } => Expr::App {
                func,
                args,
                info: meta,
            },
            Expr::ListComp { head, quals, .. } => Expr::ListComp {
                head,
                quals,
                info: meta,
            },
        }
    }

    /// Direct sub-expressions in evaluation order.
    pub fn children(&self) -> Vec<&Expr<T>> {
        match self {
            Expr::Atom { .. } | Expr::PrefixOp { .. } => vec![],
            Expr::List { items, .. } | Expr::NTuple { items, .. } => items.iter().collect(),
            Expr::Binary { left, right, .. } => vec![left, right],
            Expr::Unary { expr, .. } | Expr::SectL { expr, .. } | Expr::SectR { expr, .. } => {
                vec![expr]
            }
            Expr::IfExpr {
                cond,
                then_branch,
                else_branch,
                ..
            } => vec![cond, then_branch, else_branch],
            Expr::ArithmSeq {
                start, step, end, ..
            } => {
                let mut out: Vec<&Expr<T>> = vec![start];
                out.extend(step.iter().map(|e| e.as_ref()));
                out.extend(end.iter().map(|e| e.as_ref()));
                out
            }
            Expr::LetExpr { bindings, body, .. } => {
                let mut out: Vec<&Expr<T>> = bindings.iter().map(|(_, e)| e).collect();
                out.push(body);
                out
            }
            Expr::Lambda { body, .. } => vec![body],
            Expr::App { func, args, .. } => {
                let mut out: Vec<&Expr<T>> = vec![func];
                out.extend(args.iter());
                out
            }
            Expr::ListComp { head, quals, .. } => {
                let mut out: Vec<&Expr<T>> = vec![head];
                for qual in quals {
                    match qual {
                        Qual::Gen { expr, .. }
                        | Qual::Let { expr, .. }
                        | Qual::Guard { expr, .. } => out.push(expr),
                    }
                }
                out
            }
        }
    }

    /// Rebuild this node with every direct sub-expression passed through
    /// `f`. Bindings and the meta slot are untouched.
    pub fn map_children(self, f: &mut impl FnMut(Expr<T>) -> Expr<T>) -> Expr<T> {
        match self {
            Expr::Atom { .. } | Expr::PrefixOp { .. } => self,
            Expr::List { items, info } => Expr::List {
                items: items.into_iter().map(|e| f(e)).collect(),
                info,
            },
            Expr::NTuple { items, info } => Expr::NTuple {
                items: items.into_iter().map(|e| f(e)).collect(),
                info,
            },
            Expr::Binary {
                op,
                left,
                right,
                info,
            } => Expr::Binary {
                op,
                left: Box::new(f(*left)),
                right: Box::new(f(*right)),
                info,
            },
            Expr::Unary { op, expr, info } => Expr::Unary {
                op,
                expr: Box::new(f(*expr)),
                info,
            },
            Expr::SectL { expr, op, info } => Expr::SectL {
                expr: Box::new(f(*expr)),
                op,
                info,
            },
            Expr::SectR { op, expr, info } => Expr::SectR {
                op,
                expr: Box::new(f(*expr)),
                info,
            },
            Expr::IfExpr {
                cond,
                then_branch,
                else_branch,
                info,
            } => Expr::IfExpr {
                cond: Box::new(f(*cond)),
                then_branch: Box::new(f(*then_branch)),
                else_branch: Box::new(f(*else_branch)),
                info,
            },
            Expr::ArithmSeq {
                start,
                step,
                end,
                info,
            } => Expr::ArithmSeq {
                start: Box::new(f(*start)),
                step: step.map(|e| Box::new(f(*e))),
                end: end.map(|e| Box::new(f(*e))),
                info,
            },
            Expr::LetExpr {
                bindings,
                body,
                info,
            } => Expr::LetExpr {
                bindings: bindings.into_iter().map(|(b, e)| (b, f(e))).collect(),
                body: Box::new(f(*body)),
                info,
            },
            Expr::Lambda { params, body, info } => Expr::Lambda {
                params,
                body: Box::new(f(*body)),
                info,
            },
            Expr::App { func, args, info } => Expr::App {
                func: Box::new(f(*func)),
                args: args.into_iter().map(|e| f(e)).collect(),
                info,
            },
            Expr::ListComp { head, quals, info } => Expr::ListComp {
                head: Box::new(f(*head)),
                quals: quals
                    .into_iter()
                    .map(|q| match q {
                        Qual::Gen {
                            binding,
                            expr,
                            info,
                        } => Qual::Gen {
                            binding,
                            expr: f(expr),
                            info,
                        },
                        Qual::Let {
                            binding,
                            expr,
                            info,
                        } => Qual::Let {
                            binding,
                            expr: f(expr),
                            info,
                        },
                        Qual::Guard { expr, info } => Qual::Guard { expr: f(expr), info },
                    })
                    .collect(),
                info,
            },
        }
    }

    /// Rewrite every meta slot in the tree, including operator and binding
    /// slots, preserving the shape. Slots are visited in pre-order.
    pub fn map_meta<B>(self, f: &mut impl FnMut(T) -> B) -> Expr<B> {
        match self {
            Expr::Atom { atom, info } => Expr::Atom {
                atom,
                info: f(info),
            },
            Expr::List { items, info } => Expr::List {
                info: f(info),
                items: items.into_iter().map(|e| e.map_meta(f)).collect(),
            },
            Expr::NTuple { items, info } => Expr::NTuple {
                info: f(info),
                items: items.into_iter().map(|e| e.map_meta(f)).collect(),
            },
            Expr::Binary {
                op,
                left,
                right,
                info,
            } => Expr::Binary {
                info: f(info),
                op: op.map_info(f),
                left: Box::new(left.map_meta(f)),
                right: Box::new(right.map_meta(f)),
            },
            Expr::Unary { op, expr, info } => Expr::Unary {
                info: f(info),
                op: op.map_info(f),
                expr: Box::new(expr.map_meta(f)),
            },
            Expr::SectL { expr, op, info } => Expr::SectL {
                info: f(info),
                expr: Box::new(expr.map_meta(f)),
                op: op.map_info(f),
            },
            Expr::SectR { op, expr, info } => Expr::SectR {
                info: f(info),
                op: op.map_info(f),
                expr: Box::new(expr.map_meta(f)),
            },
            Expr::PrefixOp { op, info } => Expr::PrefixOp {
                info: f(info),
                op: op.map_info(f),
            },
            Expr::IfExpr {
                cond,
                then_branch,
                else_branch,
                info,
            } => Expr::IfExpr {
                info: f(info),
                cond: Box::new(cond.map_meta(f)),
                then_branch: Box::new(then_branch.map_meta(f)),
                else_branch: Box::new(else_branch.map_meta(f)),
            },
            Expr::ArithmSeq {
                start,
                step,
                end,
                info,
            } => Expr::ArithmSeq {
                info: f(info),
                start: Box::new(start.map_meta(f)),
                step: step.map(|e| Box::new(e.map_meta(f))),
                end: end.map(|e| Box::new(e.map_meta(f))),
            },
            Expr::LetExpr {
                bindings,
                body,
                info,
            } => Expr::LetExpr {
                info: f(info),
                bindings: bindings
                    .into_iter()
                    .map(|(b, e)| (b.map_meta(f), e.map_meta(f)))
                    .collect(),
                body: Box::new(body.map_meta(f)),
            },
            Expr::Lambda { params, body, info } => Expr::Lambda {
                info: f(info),
                params: params.into_iter().map(|b| b.map_meta(f)).collect(),
                body: Box::new(body.map_meta(f)),
            },
            Expr::App { func, args, info } => Expr::App {
                info: f(info),
                func: Box::new(func.map_meta(f)),
                args: args.into_iter().map(|e| e.map_meta(f)).collect(),
            },
            Expr::ListComp { head, quals, info } => Expr::ListComp {
                info: f(info),
                head: Box::new(head.map_meta(f)),
                quals: quals.into_iter().map(|q| q.map_meta(f)).collect(),
            },
        }
    }
}

impl<T> Qual<T> {
    pub fn map_meta<B>(self, f: &mut impl FnMut(T) -> B) -> Qual<B> {
        match self {
            Qual::Gen {
                binding,
                expr,
                info,
            } => Qual::Gen {
                info: f(info),
                binding: binding.map_meta(f),
                expr: expr.map_meta(f),
            },
            Qual::Let {
                binding,
                expr,
                info,
            } => Qual::Let {
                info: f(info),
                binding: binding.map_meta(f),
                expr: expr.map_meta(f),
            },
            Qual::Guard { expr, info } => Qual::Guard {
                info: f(info),
                expr: expr.map_meta(f),
            },
        }
    }
}

/// Construction helpers for undecorated trees. These keep evaluator rewrite
/// rules and tests readable.
impl Expr<()> {
    pub fn atom(atom: Atom) -> Self {
        Expr::Atom { atom, info: () }
    }

    pub fn int(value: i64) -> Self {
        Expr::atom(Atom::Int(value))
    }

    pub fn boolean(value: bool) -> Self {
        Expr::atom(Atom::Bool(value))
    }

    pub fn character(value: char) -> Self {
        Expr::atom(Atom::Char(value))
    }

    pub fn name(name: impl Into<String>) -> Self {
        Expr::atom(Atom::Name(name.into()))
    }

    pub fn constr(name: impl Into<String>) -> Self {
        Expr::atom(Atom::Constr(name.into()))
    }

    pub fn list(items: Vec<Expr<()>>) -> Self {
        Expr::List { items, info: () }
    }

    pub fn ntuple(items: Vec<Expr<()>>) -> Self {
        Expr::NTuple { items, info: () }
    }

    pub fn binary(op: Op, left: Expr<()>, right: Expr<()>) -> Self {
        Expr::Binary {
            op: OpInfo::plain(op),
            left: Box::new(left),
            right: Box::new(right),
            info: (),
        }
    }

    pub fn unary(op: Op, expr: Expr<()>) -> Self {
        Expr::Unary {
            op: OpInfo::plain(op),
            expr: Box::new(expr),
            info: (),
        }
    }

    pub fn sect_l(expr: Expr<()>, op: Op) -> Self {
        Expr::SectL {
            expr: Box::new(expr),
            op: OpInfo::plain(op),
            info: (),
        }
    }

    pub fn sect_r(op: Op, expr: Expr<()>) -> Self {
        Expr::SectR {
            op: OpInfo::plain(op),
            expr: Box::new(expr),
            info: (),
        }
    }

    pub fn prefix_op(op: Op) -> Self {
        Expr::PrefixOp {
            op: OpInfo::plain(op),
            info: (),
        }
    }

    pub fn if_expr(cond: Expr<()>, then_branch: Expr<()>, else_branch: Expr<()>) -> Self {
        Expr::IfExpr {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            info: (),
        }
    }

    pub fn arithm_seq(start: Expr<()>, step: Option<Expr<()>>, end: Option<Expr<()>>) -> Self {
        Expr::ArithmSeq {
            start: Box::new(start),
            step: step.map(Box::new),
            end: end.map(Box::new),
            info: (),
        }
    }

    pub fn lambda(params: Vec<Binding<()>>, body: Expr<()>) -> Self {
        Expr::Lambda {
            params,
            body: Box::new(body),
            info: (),
        }
    }

    pub fn let_expr(bindings: Vec<(Binding<()>, Expr<()>)>, body: Expr<()>) -> Self {
        Expr::LetExpr {
            bindings,
            body: Box::new(body),
            info: (),
        }
    }

    pub fn app(func: Expr<()>, args: Vec<Expr<()>>) -> Self {
        Expr::App {
            func: Box::new(func),
            args,
            info: (),
        }
    }

    pub fn list_comp(head: Expr<()>, quals: Vec<Qual<()>>) -> Self {
        Expr::ListComp {
            head: Box::new(head),
            quals,
            info: (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_evaluation_order() {
        let expr = Expr::if_expr(Expr::boolean(true), Expr::int(1), Expr::int(2));
        let children = expr.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0], &Expr::boolean(true));
        assert_eq!(children[1], &Expr::int(1));
    }

    #[test]
    fn test_map_meta_round_trip() {
        let expr = Expr::binary(Op::Add, Expr::int(1), Expr::name("x"));
        let decorated = expr.clone().map_meta(&mut |_| 7u32);
        assert_eq!(decorated.meta(), &7);
        let stripped = decorated.map_meta(&mut |_| ());
        assert_eq!(stripped, expr);
    }

    #[test]
    fn test_with_meta_replaces_only_this_node() {
        let expr = Expr::list(vec![Expr::int(1)]).map_meta(&mut |_| 0u32);
        let replaced = expr.with_meta(9);
        assert_eq!(replaced.meta(), &9);
        assert_eq!(replaced.children()[0].meta(), &0);
    }

    #[test]
    fn test_app_children_head_first() {
        let expr = Expr::app(Expr::name("f"), vec![Expr::int(1), Expr::int(2)]);
        let children = expr.children();
        assert_eq!(children[0], &Expr::name("f"));
        assert_eq!(children[2], &Expr::int(2));
    }

    #[test]
    fn test_operator_precedence_table() {
        assert!(Op::Mul.precedence() > Op::Add.precedence());
        assert!(Op::Add.precedence() > Op::Colon.precedence());
        assert_eq!(Op::Dollar.precedence(), 0);
        assert_eq!(Op::Equ.assoc(), Assoc::Non);
    }
}
