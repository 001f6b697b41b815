//! Expression parsers
//!
//! The grammar has three layers: a precedence climber over the operator
//! table, application chains by juxtaposition, and atomic expressions
//! (literals, brackets, parenthesised forms including operator sections).

use crate::ast::expression::{Assoc, Atom, Expr, Op, Qual};
use crate::lexer::Token;
use crate::parser::combinators::{
    expect_arrow, expect_backslash, expect_comma, expect_dot_dot, expect_else, expect_equals,
    expect_if, expect_in, expect_left_arrow, expect_let, expect_rbracket, expect_rparen,
    expect_then, many1, optional, sep_by1, BoxedParser,
};
use crate::parser::{ParseResult, ParseState, Parser};

use super::literal::{literal_atom, constr_ident, ident};
use super::pattern::pattern;

pub fn expression() -> BoxedParser<Expr<()>> {
    BoxedParser::new(|state: &mut ParseState| op_expr(state, 0))
}

fn op_from_token(token: &Token) -> Option<Op> {
    match token {
        Token::Dot(_) => Some(Op::Composition),
        Token::Caret(_) => Some(Op::Power),
        Token::Star(_) => Some(Op::Mul),
        Token::Plus(_) => Some(Op::Add),
        Token::Minus(_) => Some(Op::Sub),
        Token::PlusPlus(_) => Some(Op::Append),
        Token::Colon(_) => Some(Op::Colon),
        Token::ConstrOp(inner) => Some(Op::InfixConstr(inner.value.clone())),
        Token::EqEq(_) => Some(Op::Equ),
        Token::NotEq(_) => Some(Op::Neq),
        Token::Lt(_) => Some(Op::Lt),
        Token::LtEq(_) => Some(Op::Leq),
        Token::Gt(_) => Some(Op::Gt),
        Token::GtEq(_) => Some(Op::Geq),
        Token::AndAnd(_) => Some(Op::And),
        Token::OrOr(_) => Some(Op::Or),
        Token::DollarSign(_) => Some(Op::Dollar),
        _ => None,
    }
}

/// The operator starting at the cursor, with how many tokens it spans
/// (3 for a backticked function). Nothing is consumed.
fn peek_operator(state: &ParseState) -> Option<(Op, usize)> {
    match state.peek()? {
        Token::Backtick(_) => match (state.peek_at(1), state.peek_at(2)) {
            (Some(Token::Ident(inner)), Some(Token::Backtick(_))) => {
                Some((Op::InfixFunc(inner.value.clone()), 3))
            }
            _ => None,
        },
        token => op_from_token(token).map(|op| (op, 1)),
    }
}

/// Precedence climbing over the operator table.
fn op_expr(state: &mut ParseState, min_prec: u8) -> ParseResult<Expr<()>> {
    let mut lhs = operand(state, min_prec)?;
    loop {
        let (op, width) = match peek_operator(state) {
            Some(found) => found,
            None => break,
        };
        let prec = op.precedence();
        if prec < min_prec {
            break;
        }
        for _ in 0..width {
            state.advance();
        }
        let next_min = match op.assoc() {
            Assoc::Right => prec,
            _ => prec + 1,
        };
        let rhs = op_expr(state, next_min)?;
        lhs = Expr::binary(op, lhs, rhs);
    }
    Ok(lhs)
}

/// An operand of the climber: a unary minus (which binds like the additive
/// level, so `- x * y` negates the product) or an application chain.
fn operand(state: &mut ParseState, _min_prec: u8) -> ParseResult<Expr<()>> {
    if matches!(state.peek(), Some(Token::Minus(_))) {
        state.advance();
        let inner = op_expr(state, 7)?;
        return Ok(Expr::unary(Op::Sub, inner));
    }
    app_chain(state)
}

/// Application by juxtaposition: `f x y`.
fn app_chain(state: &mut ParseState) -> ParseResult<Expr<()>> {
    let func = atomic_expr(state)?;
    let mut args = Vec::new();
    loop {
        let pos = state.position();
        match atomic_expr(state) {
            Ok(arg) => args.push(arg),
            Err(_) => {
                state.restore(pos);
                break;
            }
        }
    }
    if args.is_empty() {
        Ok(func)
    } else {
        Ok(Expr::app(func, args))
    }
}

fn atomic_expr(state: &mut ParseState) -> ParseResult<Expr<()>> {
    match state.peek() {
        Some(Token::Ident(_)) => {
            let name = ident().parse(state)?;
            Ok(Expr::name(name))
        }
        Some(Token::ConstrIdent(_)) => {
            let name = constr_ident().parse(state)?;
            Ok(Expr::constr(name))
        }
        Some(Token::Integer(_) | Token::CharLiteral(_) | Token::True(_) | Token::False(_)) => {
            let atom = literal_atom().parse(state)?;
            Ok(Expr::atom(atom))
        }
        Some(Token::Backslash(_)) => lambda(state),
        Some(Token::If(_)) => if_expr(state),
        Some(Token::Let(_)) => let_expr(state),
        Some(Token::LBracket(_)) => bracket_expr(state),
        Some(Token::LParen(_)) => paren_expr(state),
        _ => {
            let err = state.error_here("unexpected token").expected("expression");
            state.record_error(err.clone());
            Err(err)
        }
    }
}

/// lambda := "\" pattern+ "->" expression
fn lambda(state: &mut ParseState) -> ParseResult<Expr<()>> {
    expect_backslash().parse(state)?;
    let params = many1(pattern()).parse(state)?;
    expect_arrow().parse(state)?;
    let body = op_expr(state, 0)?;
    Ok(Expr::lambda(params, body))
}

fn if_expr(state: &mut ParseState) -> ParseResult<Expr<()>> {
    expect_if().parse(state)?;
    let cond = op_expr(state, 0)?;
    expect_then().parse(state)?;
    let then_branch = op_expr(state, 0)?;
    expect_else().parse(state)?;
    let else_branch = op_expr(state, 0)?;
    Ok(Expr::if_expr(cond, then_branch, else_branch))
}

/// let := "let" pattern "=" expr (";" pattern "=" expr)* "in" expr
fn let_expr(state: &mut ParseState) -> ParseResult<Expr<()>> {
    expect_let().parse(state)?;
    let mut bindings = vec![let_binding(state)?];
    loop {
        let pos = state.position();
        if !matches!(state.peek(), Some(Token::Semicolon(_))) {
            break;
        }
        state.advance();
        match let_binding(state) {
            Ok(binding) => bindings.push(binding),
            Err(_) => {
                state.restore(pos);
                break;
            }
        }
    }
    expect_in().parse(state)?;
    let body = op_expr(state, 0)?;
    Ok(Expr::let_expr(bindings, body))
}

fn let_binding(state: &mut ParseState) -> ParseResult<(crate::ast::pattern::Binding<()>, Expr<()>)> {
    (pattern() - expect_equals() + expression()).parse(state)
}

/// Everything `[` can open: list literals, arithmetic sequences, list
/// comprehensions.
fn bracket_expr(state: &mut ParseState) -> ParseResult<Expr<()>> {
    state.advance();
    if matches!(state.peek(), Some(Token::RBracket(_))) {
        state.advance();
        return Ok(Expr::list(vec![]));
    }

    let first = op_expr(state, 0)?;
    match state.peek() {
        Some(Token::DotDot(_)) => {
            let end = (expect_dot_dot() * optional(expression())).parse(state)?;
            expect_rbracket().parse(state)?;
            Ok(Expr::arithm_seq(first, None, end))
        }
        Some(Token::Comma(_)) => {
            state.advance();
            let second = op_expr(state, 0)?;
            match state.peek() {
                Some(Token::DotDot(_)) => {
                    let end = (expect_dot_dot() * optional(expression())).parse(state)?;
                    expect_rbracket().parse(state)?;
                    Ok(Expr::arithm_seq(first, Some(second), end))
                }
                _ => {
                    let mut items = vec![first, second];
                    while matches!(state.peek(), Some(Token::Comma(_))) {
                        state.advance();
                        items.push(op_expr(state, 0)?);
                    }
                    expect_rbracket().parse(state)?;
                    Ok(Expr::list(items))
                }
            }
        }
        Some(Token::Pipe(_)) => {
            state.advance();
            let quals =
                (sep_by1(qualifier(), expect_comma()) - expect_rbracket()).parse(state)?;
            Ok(Expr::list_comp(first, quals))
        }
        _ => {
            expect_rbracket().parse(state)?;
            Ok(Expr::list(vec![first]))
        }
    }
}

/// qual := "let" pattern "=" expr | pattern "<-" expr | expr
fn qualifier() -> BoxedParser<Qual<()>> {
    // `let p = e in ...` is a guard expression, not a local binding.
    let let_qual = BoxedParser::new(|state: &mut ParseState| {
        expect_let().parse(state)?;
        let (binding, rhs) = (pattern() - expect_equals() + expression()).parse(state)?;
        if matches!(state.peek(), Some(Token::In(_))) {
            let err = state.error_here("expected a qualifier");
            state.record_error(err.clone());
            return Err(err);
        }
        Ok(Qual::Let {
            binding,
            expr: rhs,
            info: (),
        })
    });

    let gen_qual = (pattern() - expect_left_arrow() + expression())
        >> |(binding, expr)| Qual::Gen {
            binding,
            expr,
            info: (),
        };

    let guard_qual = expression() >> |expr| Qual::Guard { expr, info: () };

    let_qual | gen_qual | guard_qual
}

/// Everything `(` can open: parenthesised expressions, tuples, operator
/// sections, bare operators. `(-` always starts a negation, never a right
/// section.
fn paren_expr(state: &mut ParseState) -> ParseResult<Expr<()>> {
    state.advance();

    // (-)
    if matches!(state.peek(), Some(Token::Minus(_)))
        && matches!(state.peek_at(1), Some(Token::RParen(_)))
    {
        state.advance();
        state.advance();
        return Ok(Expr::prefix_op(Op::Sub));
    }

    // (op) and (op e)
    if !matches!(state.peek(), Some(Token::Minus(_))) {
        if let Some(op) = state.peek().and_then(op_from_token) {
            state.advance();
            if matches!(state.peek(), Some(Token::RParen(_))) {
                state.advance();
                return Ok(Expr::prefix_op(op));
            }
            let operand = op_expr(state, 0)?;
            expect_rparen().parse(state)?;
            return Ok(Expr::sect_r(op, operand));
        }
    }

    let first = op_expr(state, 0)?;
    match state.peek() {
        Some(Token::RParen(_)) => {
            state.advance();
            Ok(first)
        }
        Some(Token::Comma(_)) => {
            let mut items = vec![first];
            while matches!(state.peek(), Some(Token::Comma(_))) {
                state.advance();
                items.push(op_expr(state, 0)?);
            }
            expect_rparen().parse(state)?;
            Ok(Expr::ntuple(items))
        }
        Some(token) => match op_from_token(token) {
            Some(op) => {
                state.advance();
                expect_rparen().parse(state)?;
                Ok(Expr::sect_l(first, op))
            }
            None => {
                let err = state
                    .error_here("unexpected token")
                    .expected("')'")
                    .expected("','")
                    .expected("operator");
                state.record_error(err.clone());
                Err(err)
            }
        },
        None => {
            let err = state.error_here("unexpected end of input").expected("')'");
            state.record_error(err.clone());
            Err(err)
        }
    }
}
