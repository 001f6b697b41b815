//! Literal and identifier parsers

use crate::ast::expression::Atom;
use crate::lexer::Token;
use crate::parser::combinators::BoxedParser;
use crate::parser::{ParseError, ParseState, Parser};

/// Parse a lowercase identifier (including the wildcard `_`).
pub fn ident() -> BoxedParser<String> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token::Ident(_)) => {
            if let Some(Token::Ident(inner)) = state.advance() {
                Ok(inner.value)
            } else {
                unreachable!()
            }
        }
        _ => {
            let err = state.error_here("unexpected token").expected("identifier");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// Parse an uppercase constructor identifier.
pub fn constr_ident() -> BoxedParser<String> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token::ConstrIdent(_)) => {
            if let Some(Token::ConstrIdent(inner)) = state.advance() {
                Ok(inner.value)
            } else {
                unreachable!()
            }
        }
        _ => {
            let err = state
                .error_here("unexpected token")
                .expected("constructor name");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// Parse an integer literal.
pub fn integer() -> BoxedParser<i64> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token::Integer(_)) => {
            if let Some(Token::Integer(inner)) = state.advance() {
                inner.value.parse().map_err(|_| {
                    ParseError::new(format!("integer literal '{}' out of range", inner.value))
                        .at(inner.position)
                })
            } else {
                unreachable!()
            }
        }
        _ => {
            let err = state.error_here("unexpected token").expected("integer");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

fn unescape(ch: char) -> char {
    match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}

/// Parse a character literal, resolving escapes.
pub fn char_literal() -> BoxedParser<char> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token::CharLiteral(_)) => {
            if let Some(Token::CharLiteral(inner)) = state.advance() {
                // Strip exactly the two delimiting quotes.
                let body: Vec<char> = inner.value[1..inner.value.len() - 1].chars().collect();
                match body.as_slice() {
                    [c] => Ok(*c),
                    ['\\', c] => Ok(unescape(*c)),
                    _ => Err(ParseError::new(format!(
                        "malformed character literal {}",
                        inner.value
                    ))
                    .at(inner.position)),
                }
            } else {
                unreachable!()
            }
        }
        _ => {
            let err = state
                .error_here("unexpected token")
                .expected("character literal");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// Parse any literal atom: integer, character, `True`, `False`.
pub fn literal_atom() -> BoxedParser<Atom> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token::True(_)) => {
            state.advance();
            Ok(Atom::Bool(true))
        }
        Some(Token::False(_)) => {
            state.advance();
            Ok(Atom::Bool(false))
        }
        Some(Token::Integer(_)) => integer().parse(state).map(Atom::Int),
        Some(Token::CharLiteral(_)) => char_literal().parse(state).map(Atom::Char),
        _ => {
            let err = state.error_here("unexpected token").expected("literal");
            state.record_error(err.clone());
            Err(err)
        }
    })
}
