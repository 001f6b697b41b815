//! Binding-pattern parsers
//!
//! `pattern()` is the atomic form clause heads are made of; structured
//! patterns (cons, tuples, applied or infix constructors) require
//! parentheses, exactly as in clause heads like `length (x:xs) = ...`.

use crate::ast::expression::Atom;
use crate::ast::pattern::Binding;
use crate::lexer::Token;
use crate::parser::combinators::{expect_rbracket, expect_rparen, BoxedParser};
use crate::parser::{ParseResult, ParseState, Parser};

use super::literal::{constr_ident, ident, literal_atom};

/// apat := ident | literal | Constr | "[" patterns "]" | "(" pattern ")"
pub fn pattern() -> BoxedParser<Binding<()>> {
    BoxedParser::new(|state: &mut ParseState| atomic_pattern(state))
}

fn atomic_pattern(state: &mut ParseState) -> ParseResult<Binding<()>> {
    match state.peek() {
        Some(Token::Ident(_)) => {
            let name = ident().parse(state)?;
            Ok(Binding::var(name))
        }
        Some(Token::ConstrIdent(_)) => {
            let name = constr_ident().parse(state)?;
            Ok(Binding::constr(name, vec![]))
        }
        Some(Token::LBracket(_)) => {
            state.advance();
            let mut items = Vec::new();
            if matches!(state.peek(), Some(Token::RBracket(_))) {
                state.advance();
                return Ok(Binding::list(items));
            }
            loop {
                items.push(full_pattern(state)?);
                match state.peek() {
                    Some(Token::Comma(_)) => {
                        state.advance();
                    }
                    _ => break,
                }
            }
            expect_rbracket().parse(state)?;
            Ok(Binding::list(items))
        }
        Some(Token::LParen(_)) => {
            state.advance();
            let inner = full_pattern(state)?;
            // A comma continues into a tuple pattern.
            if matches!(state.peek(), Some(Token::Comma(_))) {
                let mut items = vec![inner];
                while matches!(state.peek(), Some(Token::Comma(_))) {
                    state.advance();
                    items.push(full_pattern(state)?);
                }
                expect_rparen().parse(state)?;
                return Ok(Binding::tuple(items));
            }
            expect_rparen().parse(state)?;
            Ok(inner)
        }
        _ => {
            let atom = literal_atom().parse(state).map_err(|e| {
                let err = e.expected("pattern");
                state.record_error(err.clone());
                err
            })?;
            Ok(Binding::lit(atom))
        }
    }
}

/// Full pattern grammar, used inside brackets and parentheses:
/// constructor application, then right-associative cons/infix-constructor
/// chains.
fn full_pattern(state: &mut ParseState) -> ParseResult<Binding<()>> {
    let lhs = applied_pattern(state)?;
    match state.peek() {
        Some(Token::Colon(_)) => {
            state.advance();
            let rhs = full_pattern(state)?;
            Ok(Binding::cons(lhs, rhs))
        }
        Some(Token::ConstrOp(_)) => {
            let symbol = if let Some(Token::ConstrOp(inner)) = state.advance() {
                inner.value
            } else {
                unreachable!()
            };
            let rhs = full_pattern(state)?;
            Ok(Binding::infix_constr(symbol, lhs, rhs))
        }
        _ => Ok(lhs),
    }
}

/// An applied constructor pattern (`Just x`, `Node l v r`) or a plain
/// atomic pattern.
fn applied_pattern(state: &mut ParseState) -> ParseResult<Binding<()>> {
    if matches!(state.peek(), Some(Token::ConstrIdent(_))) {
        let name = constr_ident().parse(state)?;
        let mut args = Vec::new();
        loop {
            let pos = state.position();
            match atomic_pattern(state) {
                Ok(arg) => args.push(arg),
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }
        return Ok(Binding::constr(name, args));
    }
    atomic_pattern(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{strip_comments, Token};

    fn parse(source: &str) -> Binding<()> {
        let tokens = Token::lex(&strip_comments(source)).unwrap();
        let mut state = ParseState::new(tokens);
        pattern().parse(&mut state).unwrap()
    }

    #[test]
    fn parses_variables_and_wildcards() {
        assert_eq!(parse("xs"), Binding::var("xs"));
        assert_eq!(parse("_"), Binding::wildcard());
    }

    #[test]
    fn parses_cons_in_parens() {
        assert_eq!(
            parse("(x:xs)"),
            Binding::cons(Binding::var("x"), Binding::var("xs"))
        );
        assert_eq!(
            parse("(x:y:rest)"),
            Binding::cons(
                Binding::var("x"),
                Binding::cons(Binding::var("y"), Binding::var("rest"))
            )
        );
    }

    #[test]
    fn parses_list_and_tuple_patterns() {
        assert_eq!(parse("[]"), Binding::list(vec![]));
        assert_eq!(
            parse("[a, b]"),
            Binding::list(vec![Binding::var("a"), Binding::var("b")])
        );
        assert_eq!(
            parse("(a, b)"),
            Binding::tuple(vec![Binding::var("a"), Binding::var("b")])
        );
    }

    #[test]
    fn parses_constructor_patterns() {
        assert_eq!(parse("Nothing"), Binding::constr("Nothing", vec![]));
        assert_eq!(
            parse("(Just x)"),
            Binding::constr("Just", vec![Binding::var("x")])
        );
        assert_eq!(
            parse("(l :+: r)"),
            Binding::infix_constr(":+:", Binding::var("l"), Binding::var("r"))
        );
    }
}
