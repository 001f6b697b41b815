//! # Binding Patterns
//!
//! Binding patterns appear in clause heads, lambda parameters, `let`
//! bindings and list-comprehension generators. The same structure drives
//! both sides of the system:
//!
//! - the **evaluator** matches a pattern against an expression, forcing the
//!   expression only as far as the pattern shape demands;
//! - the **inferencer** derives a type-variable environment from a pattern
//!   (a fresh variable per name, fixed types for literals).
//!
//! A `Lit(Name "_")` pattern is the wildcard: it matches anything and binds
//! nothing.

use super::expression::Atom;

/// Binding patterns, carrying the same meta slot as expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<T> {
    /// A literal atom. `Name` binds unconditionally, `Constr` matches a
    /// nullary constructor, the rest match by equality.
    Lit { atom: Atom, info: T },
    /// `(h : t)`
    ConsLit {
        head: Box<Binding<T>>,
        tail: Box<Binding<T>>,
        info: T,
    },
    /// `[p1, ..., pk]` — matches a list of exactly `k` elements.
    ListLit { items: Vec<Binding<T>>, info: T },
    /// `(p1, ..., pk)`
    NTupleLit { items: Vec<Binding<T>>, info: T },
    /// A data-constructor pattern, prefix or infix.
    ConstrLit { con: ConstrPattern<T>, info: T },
}

/// The two shapes a data-constructor pattern can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstrPattern<T> {
    Prefix {
        name: String,
        args: Vec<Binding<T>>,
    },
    Infix {
        symbol: String,
        left: Box<Binding<T>>,
        right: Box<Binding<T>>,
    },
}

impl<T> Binding<T> {
    pub fn meta(&self) -> &T {
        match self {
            Binding::Lit { info, .. }
            | Binding::ConsLit { info, .. }
            | Binding::ListLit { info, .. }
            | Binding::NTupleLit { info, .. }
            | Binding::ConstrLit { info, .. } => info,
        }
    }

    /// The variable names this pattern binds, in left-to-right order.
    /// The wildcard `_` binds nothing.
    pub fn bound_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_bound_names(&mut names);
        names
    }

    fn collect_bound_names(&self, out: &mut Vec<String>) {
        match self {
            Binding::Lit { atom, .. } => {
                if let Atom::Name(name) = atom {
                    if name != "_" {
                        out.push(name.clone());
                    }
                }
            }
            Binding::ConsLit { head, tail, .. } => {
                head.collect_bound_names(out);
                tail.collect_bound_names(out);
            }
            Binding::ListLit { items, .. } | Binding::NTupleLit { items, .. } => {
                for item in items {
                    item.collect_bound_names(out);
                }
            }
            Binding::ConstrLit { con, .. } => match con {
                ConstrPattern::Prefix { args, .. } => {
                    for arg in args {
                        arg.collect_bound_names(out);
                    }
                }
                ConstrPattern::Infix { left, right, .. } => {
                    left.collect_bound_names(out);
                    right.collect_bound_names(out);
                }
            },
        }
    }

    /// Rewrite every meta slot, preserving the pattern shape.
    pub fn map_meta<B>(self, f: &mut impl FnMut(T) -> B) -> Binding<B> {
        match self {
            Binding::Lit { atom, info } => Binding::Lit {
                atom,
                info: f(info),
            },
            Binding::ConsLit { head, tail, info } => Binding::ConsLit {
                info: f(info),
                head: Box::new(head.map_meta(f)),
                tail: Box::new(tail.map_meta(f)),
            },
            Binding::ListLit { items, info } => Binding::ListLit {
                info: f(info),
                items: items.into_iter().map(|b| b.map_meta(f)).collect(),
            },
            Binding::NTupleLit { items, info } => Binding::NTupleLit {
                info: f(info),
                items: items.into_iter().map(|b| b.map_meta(f)).collect(),
            },
            Binding::ConstrLit { con, info } => Binding::ConstrLit {
                info: f(info),
                con: match con {
                    ConstrPattern::Prefix { name, args } => ConstrPattern::Prefix {
                        name,
                        args: args.into_iter().map(|b| b.map_meta(f)).collect(),
                    },
                    ConstrPattern::Infix {
                        symbol,
                        left,
                        right,
                    } => ConstrPattern::Infix {
                        symbol,
                        left: Box::new(left.map_meta(f)),
                        right: Box::new(right.map_meta(f)),
                    },
                },
            },
        }
    }
}

/// Construction helpers for undecorated patterns.
impl Binding<()> {
    pub fn lit(atom: Atom) -> Self {
        Binding::Lit { atom, info: () }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Binding::lit(Atom::Name(name.into()))
    }

    pub fn wildcard() -> Self {
        Binding::var("_")
    }

    pub fn cons(head: Binding<()>, tail: Binding<()>) -> Self {
        Binding::ConsLit {
            head: Box::new(head),
            tail: Box::new(tail),
            info: (),
        }
    }

    pub fn list(items: Vec<Binding<()>>) -> Self {
        Binding::ListLit { items, info: () }
    }

    pub fn tuple(items: Vec<Binding<()>>) -> Self {
        Binding::NTupleLit { items, info: () }
    }

    pub fn constr(name: impl Into<String>, args: Vec<Binding<()>>) -> Self {
        Binding::ConstrLit {
            con: ConstrPattern::Prefix {
                name: name.into(),
                args,
            },
            info: (),
        }
    }

    pub fn infix_constr(symbol: impl Into<String>, left: Binding<()>, right: Binding<()>) -> Self {
        Binding::ConstrLit {
            con: ConstrPattern::Infix {
                symbol: symbol.into(),
                left: Box::new(left),
                right: Box::new(right),
            },
            info: (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_names_in_order() {
        let pattern = Binding::cons(
            Binding::var("x"),
            Binding::tuple(vec![Binding::var("y"), Binding::var("z")]),
        );
        assert_eq!(pattern.bound_names(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_wildcard_binds_nothing() {
        let pattern = Binding::cons(Binding::wildcard(), Binding::var("xs"));
        assert_eq!(pattern.bound_names(), vec!["xs"]);
    }

    #[test]
    fn test_constr_pattern_names() {
        let pattern = Binding::constr("Just", vec![Binding::var("a")]);
        assert_eq!(pattern.bound_names(), vec!["a"]);
    }
}
