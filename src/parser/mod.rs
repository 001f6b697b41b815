//! # Parser Infrastructure
//!
//! Combinator machinery for the surface grammar:
//!
//! - [`ParseState`] - token stream position with backtracking and
//!   furthest-error tracking
//! - [`ParseError`] - structured failure with "expected/found" context and
//!   a 0-based source position
//! - [`Parser`] - the interface every parser (closure or combinator)
//!   implements
//!
//! Backtracking parsers save a position, try an alternative, and restore on
//! failure. Because the error from the *furthest* position reached is
//! usually the one the user wants to see, the state records it across
//! alternatives and merges "expected" lists for errors at the same spot.

pub mod combinators;
pub mod grammar;

use lachs::Span;

use crate::lexer::Token;

/// Structured parse error with source context.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Option<Box<Span>>,
    pub expected: Vec<String>,
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            span: None,
            expected: vec![],
            found: None,
        }
    }

    /// Add something to the "expected" list (chainable).
    pub fn expected(mut self, what: impl Into<String>) -> Self {
        self.expected.push(what.into());
        self
    }

    /// Record what was actually found (chainable).
    pub fn found(mut self, what: impl Into<String>) -> Self {
        self.found = Some(what.into());
        self
    }

    /// Attach the source span (chainable).
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(Box::new(span));
        self
    }

    /// 0-based line of the error, when position information survived.
    pub fn line(&self) -> Option<usize> {
        self.span.as_ref().map(|s| s.start.0)
    }

    /// 0-based column of the error.
    pub fn column(&self) -> Option<usize> {
        self.span.as_ref().map(|s| s.start.1)
    }

    /// Merge the "expected" list of another error at the same position, so
    /// failed alternatives report "expected A or B".
    pub fn merge_expected(mut self, other: &ParseError) -> Self {
        for exp in &other.expected {
            if !self.expected.contains(exp) {
                self.expected.push(exp.clone());
            }
        }
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = if !self.expected.is_empty() {
            let expected = if self.expected.len() == 1 {
                self.expected[0].clone()
            } else {
                let (last, rest) = self.expected.split_last().unwrap();
                format!("{} or {}", rest.join(", "), last)
            };
            match &self.found {
                Some(found) => format!("expected {}, found {}", expected, found),
                None => format!("expected {}", expected),
            }
        } else {
            self.message.clone()
        };

        if let Some(span) = &self.span {
            write!(f, "{}", span.to_string(&msg))
        } else {
            write!(f, "Parse error: {}", msg)
        }
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Token stream, cursor, and error bookkeeping for one parse.
pub struct ParseState {
    tokens: Vec<Token>,
    index: usize,
    furthest_error: Option<(usize, ParseError)>,
}

impl ParseState {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            furthest_error: None,
        }
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> Option<Token> {
        if self.has_next() {
            let token = self.tokens[self.index].clone();
            self.index += 1;
            Some(token)
        } else {
            None
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset)
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    /// Current position, for [`restore`](Self::restore)-based backtracking.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn restore(&mut self, position: usize) {
        self.index = position;
    }

    /// Record an error, keeping the one at the furthest position; same
    /// position merges the "expected" lists.
    pub fn record_error(&mut self, error: ParseError) {
        match &self.furthest_error {
            Some((pos, _)) if *pos > self.index => {}
            Some((pos, existing)) if *pos == self.index => {
                let merged = existing.clone().merge_expected(&error);
                self.furthest_error = Some((self.index, merged));
            }
            _ => {
                self.furthest_error = Some((self.index, error));
            }
        }
    }

    pub fn take_furthest_error(&mut self) -> Option<ParseError> {
        self.furthest_error.take().map(|(_, e)| e)
    }

    /// Build an error at the current token with span and "found" context.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        let msg = message.into();
        match self.peek() {
            Some(token) => ParseError::new(msg).at(token.pos()).found(token.describe()),
            None => ParseError::new(msg).found("end of input"),
        }
    }
}

/// Anything that can parse a `T` from the state.
pub trait Parser<T>: Sized {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T>;
}

impl<T, F: Fn(&mut ParseState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        self(state)
    }
}
