//! Redex - a step-wise evaluator and type inferencer for a small lazy
//! functional expression language
//!
//! The library parses a Haskell-flavored program, builds an evaluation
//! environment and a Hindley-Milner type environment from it, and then lets
//! a host reduce any sub-expression *one step at a time* — building the
//! visible reduction chain the system exists for — or decorate an
//! expression tree with inferred types (localising type errors into the
//! tree instead of failing, when asked to).

pub mod ast;
pub mod eval;
pub mod fmt;
pub mod lexer;
pub mod parser;
pub mod types;

use ast::{Expr, Program};
use parser::{ParseError, ParseState};

pub use eval::{defs_to_env, eval_all, step, EvalEnv, EvalError, Path, PathStep};
pub use types::{
    build_type_env, expr_scheme, type_tree, type_tree_partial, TypeEnv, TypeError,
};

fn lex(source: &str) -> Result<Vec<lexer::Token>, ParseError> {
    let stripped = lexer::strip_comments(source);
    lexer::Token::lex(&stripped).map_err(|e| ParseError::new(format!("{}", e)))
}

/// Parse a `;`-separated program of definitions and `data` declarations.
pub fn parse_defs(source: &str) -> Result<Program, ParseError> {
    let mut state = ParseState::new(lex(source)?);
    parser::grammar::parse_program(&mut state)
}

/// Parse a single expression.
pub fn parse_expr(source: &str) -> Result<Expr<()>, ParseError> {
    let mut state = ParseState::new(lex(source)?);
    parser::grammar::parse_expression(&mut state)
}

/// Build both environments of a parsed program: data constructors are
/// compiled into definitions and schemes, the definitions grouped for the
/// evaluator, and the type environment inferred group by group.
pub fn program_envs(program: &Program) -> Result<(EvalEnv, TypeEnv), TypeError> {
    let (constr_defs, schemes) = types::adt::compile_adts(&program.adts)?;
    let mut defs = constr_defs;
    defs.extend(program.defs.iter().cloned());
    let eval_env = defs_to_env(&defs);
    let base = TypeEnv::with_bindings(schemes);
    let type_env = build_type_env(&base, &program.defs)?;
    Ok((eval_env, type_env))
}
