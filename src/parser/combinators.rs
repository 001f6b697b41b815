//! Parser combinator kit: a clonable boxed parser with method and operator
//! composition. `a + b` sequences, `a - b` keeps the left result, `a * b`
//! keeps the right, `a | b` tries alternatives, `p >> f` maps.

use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::rc::Rc;

use crate::lexer::Token;

use super::{ParseError, ParseResult, ParseState, Parser};

pub struct BoxedParser<T> {
    parser: Rc<dyn Fn(&mut ParseState) -> ParseResult<T>>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |state| parser.parse(state)),
        }
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        (self.parser)(state)
    }
}

impl<T: 'static> BoxedParser<T> {
    /// Sequence: parse self then other, return both results.
    pub fn seq<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<(T, U)> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            let b = other.parse(state)?;
            Ok((a, b))
        })
    }

    /// Parse self then other, keep self's result.
    pub fn skip<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            let _ = other.parse(state)?;
            Ok(a)
        })
    }

    /// Parse self then other, keep other's result.
    pub fn skip_left<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            let _ = self.parse(state)?;
            other.parse(state)
        })
    }

    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            Ok(f(a))
        })
    }

    /// Try self; on failure restore the position and try other.
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let pos = state.position();
            match self.parse(state) {
                Ok(a) => Ok(a),
                Err(_) => {
                    state.restore(pos);
                    other.parse(state)
                }
            }
        })
    }
}

impl<T: 'static, U: 'static> Add<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<(T, U)>;

    fn add(self, rhs: BoxedParser<U>) -> Self::Output {
        self.seq(rhs)
    }
}

impl<T: 'static, U: 'static> Sub<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn sub(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip(rhs)
    }
}

impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip_left(rhs)
    }
}

impl<T: 'static> BitOr<BoxedParser<T>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn bitor(self, rhs: BoxedParser<T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `parser >> f` maps the parsed value.
impl<T: 'static, U: 'static, F: Fn(T) -> U + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

/// Zero or more repetitions.
pub fn many<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut results = Vec::new();
        loop {
            let pos = state.position();
            match parser.parse(state) {
                Ok(value) => results.push(value),
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }
        Ok(results)
    })
}

/// One or more repetitions.
pub fn many1<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    let repeated = many(parser.clone());
    BoxedParser::new(move |state: &mut ParseState| {
        let first = parser.parse(state)?;
        let mut rest = repeated.parse(state)?;
        rest.insert(0, first);
        Ok(rest)
    })
}

/// Zero or one occurrence.
pub fn optional<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let pos = state.position();
        match parser.parse(state) {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                state.restore(pos);
                Ok(None)
            }
        }
    })
}

/// One or more occurrences of `parser`, separated by `sep`.
pub fn sep_by1<T: 'static, S: 'static>(
    parser: BoxedParser<T>,
    sep: BoxedParser<S>,
) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut results = vec![parser.parse(state)?];
        loop {
            let pos = state.position();
            if sep.parse(state).is_err() {
                state.restore(pos);
                break;
            }
            match parser.parse(state) {
                Ok(value) => results.push(value),
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }
        Ok(results)
    })
}

macro_rules! expect_fn {
    ($name:ident, $variant:ident, $describe:expr) => {
        pub fn $name() -> BoxedParser<Token> {
            BoxedParser::new(move |state: &mut ParseState| match state.peek() {
                Some(Token::$variant(_)) => Ok(state.advance().unwrap()),
                Some(token) => {
                    let err = ParseError::new("unexpected token")
                        .expected($describe)
                        .found(token.describe())
                        .at(token.pos());
                    state.record_error(err.clone());
                    Err(err)
                }
                None => {
                    let err = ParseError::new("unexpected end of input").expected($describe);
                    state.record_error(err.clone());
                    Err(err)
                }
            })
        }
    };
}

expect_fn!(expect_data, Data, "'data'");
expect_fn!(expect_let, Let, "'let'");
expect_fn!(expect_in, In, "'in'");
expect_fn!(expect_if, If, "'if'");
expect_fn!(expect_then, Then, "'then'");
expect_fn!(expect_else, Else, "'else'");
expect_fn!(expect_left_arrow, LeftArrow, "'<-'");
expect_fn!(expect_arrow, Arrow, "'->'");
expect_fn!(expect_dot_dot, DotDot, "'..'");
expect_fn!(expect_backslash, Backslash, "'\\'");
expect_fn!(expect_equals, Equals, "'='");
expect_fn!(expect_comma, Comma, "','");
expect_fn!(expect_rparen, RParen, "')'");
expect_fn!(expect_rbracket, RBracket, "']'");
