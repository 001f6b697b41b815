//! Pretty printer for expressions, patterns and definitions
//!
//! Rendering is precedence-aware: a child is parenthesised exactly when its
//! operator binds looser than its context requires, using the same operator
//! table the parser uses. The output is what error messages and the
//! reduction-chain driver show.

use std::fmt::{self, Display};

use crate::ast::expression::{Assoc, Atom, Expr, Qual};
use crate::ast::pattern::{Binding, ConstrPattern};
use crate::ast::Def;

/// Application binds tighter than any operator.
const APP_PREC: u8 = 10;
/// Context passed to arguments of an application: atoms only.
const ATOM_PREC: u8 = 11;

impl Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Int(i) => write!(f, "{}", i),
            Atom::Bool(true) => write!(f, "True"),
            Atom::Bool(false) => write!(f, "False"),
            Atom::Char(c) => write!(f, "'{}'", c),
            Atom::Name(n) => write!(f, "{}", n),
            Atom::Constr(n) => write!(f, "{}", n),
        }
    }
}

impl<T> Display for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render_expr(self, 0))
    }
}

impl<T> Display for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render_binding(self, false))
    }
}

impl<T> Display for Qual<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qual::Gen { binding, expr, .. } => {
                write!(f, "{} <- {}", render_binding(binding, false), expr)
            }
            Qual::Let { binding, expr, .. } => {
                write!(f, "let {} = {}", render_binding(binding, false), expr)
            }
            Qual::Guard { expr, .. } => write!(f, "{}", expr),
        }
    }
}

impl<T> Display for Def<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for pattern in &self.patterns {
            write!(f, " {}", render_binding(pattern, true))?;
        }
        write!(f, " = {}", self.body)
    }
}

fn parens_if(wrap: bool, inner: String) -> String {
    if wrap {
        format!("({})", inner)
    } else {
        inner
    }
}

fn render_expr<T>(expr: &Expr<T>, ctx: u8) -> String {
    match expr {
        Expr::Atom { atom, .. } => atom.to_string(),

        Expr::List { items, .. } => {
            let inner: Vec<String> = items.iter().map(|e| render_expr(e, 0)).collect();
            format!("[{}]", inner.join(", "))
        }

        Expr::NTuple { items, .. } => {
            let inner: Vec<String> = items.iter().map(|e| render_expr(e, 0)).collect();
            format!("({})", inner.join(", "))
        }

        Expr::Binary {
            op, left, right, ..
        } => {
            let prec = op.op.precedence();
            let (lctx, rctx) = match op.op.assoc() {
                Assoc::Left => (prec, prec + 1),
                Assoc::Right => (prec + 1, prec),
                Assoc::Non => (prec + 1, prec + 1),
            };
            let rendered = format!(
                "{} {} {}",
                render_expr(left, lctx),
                op.op.symbol(),
                render_expr(right, rctx)
            );
            parens_if(ctx > prec, rendered)
        }

        Expr::Unary { op, expr, .. } => {
            let rendered = format!("{}{}", op.op.symbol(), render_expr(expr, ATOM_PREC));
            parens_if(ctx > 6, rendered)
        }

        Expr::SectL { expr, op, .. } => {
            format!("({} {})", render_expr(expr, op.op.precedence() + 1), op.op.symbol())
        }

        Expr::SectR { op, expr, .. } => {
            format!("({} {})", op.op.symbol(), render_expr(expr, op.op.precedence() + 1))
        }

        Expr::PrefixOp { op, .. } => format!("({})", op.op.symbol()),

        Expr::IfExpr {
            cond,
            then_branch,
            else_branch,
            ..
        } => parens_if(
            ctx > 0,
            format!(
                "if {} then {} else {}",
                render_expr(cond, 0),
                render_expr(then_branch, 0),
                render_expr(else_branch, 0)
            ),
        ),

        Expr::ArithmSeq {
            start, step, end, ..
        } => {
            let step_part = match step {
                Some(step) => format!(", {}", render_expr(step, 0)),
                None => String::new(),
            };
            let end_part = match end {
                Some(end) => render_expr(end, 0),
                None => String::new(),
            };
            format!("[{}{} .. {}]", render_expr(start, 0), step_part, end_part)
                .replace(" .. ]", " ..]")
        }

        Expr::LetExpr {
            bindings, body, ..
        } => {
            let binds: Vec<String> = bindings
                .iter()
                .map(|(b, e)| format!("{} = {}", render_binding(b, false), render_expr(e, 0)))
                .collect();
            parens_if(
                ctx > 0,
                format!("let {} in {}", binds.join("; "), render_expr(body, 0)),
            )
        }

        Expr::Lambda { params, body, .. } => {
            let rendered_params: Vec<String> =
                params.iter().map(|p| render_binding(p, true)).collect();
            parens_if(
                ctx > 0,
                format!("\\{} -> {}", rendered_params.join(" "), render_expr(body, 0)),
            )
        }

        Expr::App { func, args, .. } => {
            let mut parts = vec![render_expr(func, APP_PREC)];
            parts.extend(args.iter().map(|a| render_expr(a, ATOM_PREC)));
            parens_if(ctx > APP_PREC, parts.join(" "))
        }

        Expr::ListComp { head, quals, .. } => {
            let rendered_quals: Vec<String> = quals.iter().map(|q| q.to_string()).collect();
            format!("[{} | {}]", render_expr(head, 0), rendered_quals.join(", "))
        }
    }
}

/// `atomic` asks for parentheses around any pattern with inner structure,
/// as clause heads require (`length (x:xs) = ...`).
fn render_binding<T>(binding: &Binding<T>, atomic: bool) -> String {
    match binding {
        Binding::Lit { atom, .. } => atom.to_string(),
        Binding::ConsLit { head, tail, .. } => format!(
            "({} : {})",
            render_binding(head, false),
            render_binding(tail, false)
        ),
        Binding::ListLit { items, .. } => {
            let inner: Vec<String> = items.iter().map(|b| render_binding(b, false)).collect();
            format!("[{}]", inner.join(", "))
        }
        Binding::NTupleLit { items, .. } => {
            let inner: Vec<String> = items.iter().map(|b| render_binding(b, false)).collect();
            format!("({})", inner.join(", "))
        }
        Binding::ConstrLit { con, .. } => match con {
            ConstrPattern::Prefix { name, args } => {
                if args.is_empty() {
                    name.clone()
                } else {
                    let rendered: Vec<String> =
                        args.iter().map(|b| render_binding(b, true)).collect();
                    parens_if(atomic, format!("{} {}", name, rendered.join(" ")))
                }
            }
            ConstrPattern::Infix {
                symbol,
                left,
                right,
            } => format!(
                "({} {} {})",
                render_binding(left, false),
                symbol,
                render_binding(right, false)
            ),
        },
    }
}
