//! Top-level grammar: programs, definitions, data declarations
//!
//! A program is a `;`-separated sequence of definitions and `data`
//! declarations:
//!
//! ```text
//! data Maybe a = Nothing | Just a;
//! length [] = 0;
//! length (_:xs) = 1 + length xs
//! ```

pub mod expression;
pub mod literal;
pub mod pattern;

use crate::ast::expression::Assoc;
use crate::ast::{AdtDef, DataConstr, Def, Program};
use crate::types::adt::adt_param_var;
use crate::types::ty::Type;

use crate::lexer::Token;

use super::combinators::{expect_data, expect_equals};
use super::{ParseResult, ParseState, Parser};

use expression::expression;
use literal::{constr_ident, ident};
use pattern::pattern;

/// Parse a whole program, consuming every token.
pub fn parse_program(state: &mut ParseState) -> ParseResult<Program> {
    let mut program = Program::default();

    // Leading separators are harmless.
    while matches!(state.peek(), Some(Token::Semicolon(_))) {
        state.advance();
    }

    while state.has_next() {
        if matches!(state.peek(), Some(Token::Data(_))) {
            program.adts.push(data_decl(state)?);
        } else {
            program.defs.push(definition(state)?);
        }

        if !state.has_next() {
            break;
        }
        match state.peek() {
            Some(Token::Semicolon(_)) => {
                while matches!(state.peek(), Some(Token::Semicolon(_))) {
                    state.advance();
                }
            }
            _ => {
                let err = state
                    .error_here("unexpected token after definition")
                    .expected("';'");
                state.record_error(err.clone());
                return Err(err);
            }
        }
    }
    Ok(program)
}

/// Parse a single expression, consuming every token.
pub fn parse_expression(state: &mut ParseState) -> ParseResult<crate::ast::Expr<()>> {
    let expr = expression().parse(state)?;
    if state.has_next() {
        let err = state
            .error_here("unexpected token after expression")
            .expected("end of input");
        state.record_error(err.clone());
        return Err(err);
    }
    Ok(expr)
}

/// def := ident pattern* "=" expression
fn definition(state: &mut ParseState) -> ParseResult<Def<()>> {
    let name = ident().parse(state)?;
    let mut patterns = Vec::new();
    loop {
        let pos = state.position();
        match pattern().parse(state) {
            Ok(p) => patterns.push(p),
            Err(_) => {
                state.restore(pos);
                break;
            }
        }
    }
    expect_equals().parse(state)?;
    let body = expression().parse(state)?;
    Ok(Def {
        name,
        patterns,
        body,
    })
}

/// data_decl := "data" Constr ident* "=" alt ("|" alt)*
fn data_decl(state: &mut ParseState) -> ParseResult<AdtDef> {
    expect_data().parse(state)?;
    let name = constr_ident().parse(state)?;
    let mut params = Vec::new();
    while matches!(state.peek(), Some(Token::Ident(_))) {
        params.push(ident().parse(state)?);
    }
    expect_equals().parse(state)?;

    let mut constructors = vec![constr_alt(state)?];
    while matches!(state.peek(), Some(Token::Pipe(_))) {
        state.advance();
        constructors.push(constr_alt(state)?);
    }

    Ok(AdtDef {
        name,
        params,
        constructors,
    })
}

/// alt := type_atom consop type_atom | Constr type_atom*
fn constr_alt(state: &mut ParseState) -> ParseResult<DataConstr> {
    // Try the infix form first; it can start with any type atom.
    let pos = state.position();
    if let Ok(left) = type_atom(state) {
        if let Some(Token::ConstrOp(_)) = state.peek() {
            let symbol = match state.advance() {
                Some(Token::ConstrOp(inner)) => inner.value,
                _ => unreachable!(),
            };
            let right = type_atom(state)?;
            return Ok(DataConstr::Infix {
                symbol,
                assoc: Assoc::Right,
                precedence: 5,
                left,
                right,
            });
        }
    }
    state.restore(pos);

    let name = constr_ident().parse(state)?;
    let mut params = Vec::new();
    loop {
        let pos = state.position();
        match type_atom(state) {
            Ok(ty) => params.push(ty),
            Err(_) => {
                state.restore(pos);
                break;
            }
        }
    }
    Ok(DataConstr::Prefix { name, params })
}

fn base_or_type_cons(name: String, args: Vec<Type>) -> Type {
    if args.is_empty() && matches!(name.as_str(), "Int" | "Bool" | "Char") {
        Type::Con(name)
    } else {
        Type::TypeCons(name, args)
    }
}

/// type := btype ("->" type)?
fn type_expr(state: &mut ParseState) -> ParseResult<Type> {
    let left = btype(state)?;
    if matches!(state.peek(), Some(Token::Arrow(_))) {
        state.advance();
        let right = type_expr(state)?;
        return Ok(Type::arr(left, right));
    }
    Ok(left)
}

/// btype := Constr type_atom* | type_atom
fn btype(state: &mut ParseState) -> ParseResult<Type> {
    if matches!(state.peek(), Some(Token::ConstrIdent(_))) {
        let name = constr_ident().parse(state)?;
        let mut args = Vec::new();
        loop {
            let pos = state.position();
            match type_atom(state) {
                Ok(ty) => args.push(ty),
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }
        return Ok(base_or_type_cons(name, args));
    }
    type_atom(state)
}

/// type_atom := Constr | ident | "[" type "]" | "(" type ("," type)* ")"
fn type_atom(state: &mut ParseState) -> ParseResult<Type> {
    match state.peek() {
        Some(Token::ConstrIdent(_)) => {
            let name = constr_ident().parse(state)?;
            Ok(base_or_type_cons(name, vec![]))
        }
        Some(Token::Ident(_)) => {
            let name = ident().parse(state)?;
            Ok(Type::Var(adt_param_var(&name)))
        }
        Some(Token::LBracket(_)) => {
            state.advance();
            let inner = type_expr(state)?;
            match state.peek() {
                Some(Token::RBracket(_)) => {
                    state.advance();
                    Ok(Type::list(inner))
                }
                _ => {
                    let err = state.error_here("unexpected token").expected("']'");
                    state.record_error(err.clone());
                    Err(err)
                }
            }
        }
        Some(Token::LParen(_)) => {
            state.advance();
            let first = type_expr(state)?;
            let mut items = vec![first];
            while matches!(state.peek(), Some(Token::Comma(_))) {
                state.advance();
                items.push(type_expr(state)?);
            }
            match state.peek() {
                Some(Token::RParen(_)) => {
                    state.advance();
                    if items.len() == 1 {
                        Ok(items.pop().unwrap())
                    } else {
                        Ok(Type::Tuple(items))
                    }
                }
                _ => {
                    let err = state.error_here("unexpected token").expected("')'");
                    state.record_error(err.clone());
                    Err(err)
                }
            }
        }
        _ => {
            let err = state.error_here("unexpected token").expected("type");
            state.record_error(err.clone());
            Err(err)
        }
    }
}

/// Convenience wrapper used by tests and the library surface.
pub fn parse(state: &mut ParseState) -> ParseResult<Program> {
    parse_program(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::pattern::Binding;
    use crate::ast::Expr;
    use crate::lexer::strip_comments;

    fn parse_source(source: &str) -> Program {
        let tokens = Token::lex(&strip_comments(source)).unwrap();
        let mut state = ParseState::new(tokens);
        parse_program(&mut state).unwrap()
    }

    #[test]
    fn parses_multi_clause_definition() {
        let program = parse_source("length [] = 0;\nlength (_:xs) = 1 + length xs");
        assert_eq!(program.defs.len(), 2);
        assert_eq!(program.defs[0].name, "length");
        assert_eq!(program.defs[0].patterns, vec![Binding::list(vec![])]);
        assert_eq!(
            program.defs[1].patterns,
            vec![Binding::cons(Binding::wildcard(), Binding::var("xs"))]
        );
    }

    #[test]
    fn parses_data_declaration() {
        let program = parse_source("data Maybe a = Nothing | Just a");
        assert_eq!(program.adts.len(), 1);
        let adt = &program.adts[0];
        assert_eq!(adt.name, "Maybe");
        assert_eq!(adt.params, vec!["a"]);
        assert_eq!(adt.constructors.len(), 2);
        assert_eq!(adt.constructors[1].name(), "Just");
        assert_eq!(adt.constructors[1].arity(), 1);
    }

    #[test]
    fn parses_infix_constructor_declaration() {
        let program = parse_source("data Pair a b = a :*: b");
        match &program.adts[0].constructors[0] {
            DataConstr::Infix { symbol, .. } => assert_eq!(symbol, ":*:"),
            other => panic!("expected infix constructor, got {:?}", other),
        }
    }

    #[test]
    fn parses_constructor_field_types() {
        let program = parse_source("data Tree = Leaf Int | Node Tree Tree");
        match &program.adts[0].constructors[0] {
            DataConstr::Prefix { params, .. } => {
                assert_eq!(params, &vec![Type::Con("Int".to_string())]);
            }
            other => panic!("expected prefix constructor, got {:?}", other),
        }
        match &program.adts[0].constructors[1] {
            DataConstr::Prefix { params, .. } => {
                assert_eq!(params.len(), 2);
                assert_eq!(params[0], Type::TypeCons("Tree".to_string(), vec![]));
            }
            other => panic!("expected prefix constructor, got {:?}", other),
        }
    }

    #[test]
    fn comments_are_ignored() {
        let program = parse_source("-- prelude\nid x = x {- inline -} ");
        assert_eq!(program.defs.len(), 1);
        assert_eq!(program.defs[0].body, Expr::name("x"));
    }

    #[test]
    fn zero_argument_definition() {
        let program = parse_source("answer = 42");
        assert!(program.defs[0].patterns.is_empty());
        assert_eq!(program.defs[0].body, Expr::int(42));
    }
}
