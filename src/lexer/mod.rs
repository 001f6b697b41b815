use lachs::Span;

/// Strip `-- line` and (nested) `{- block -}` comments, replacing them with
/// spaces so every surviving token keeps its line and column.
pub fn strip_comments(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    let mut block_depth = 0usize;
    let mut line_comment = false;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if line_comment {
            if c == '\n' {
                line_comment = false;
                out.push('\n');
            } else {
                out.push(' ');
            }
            i += 1;
        } else if block_depth > 0 {
            if c == '{' && next == Some('-') {
                block_depth += 1;
                out.push_str("  ");
                i += 2;
            } else if c == '-' && next == Some('}') {
                block_depth -= 1;
                out.push_str("  ");
                i += 2;
            } else {
                out.push(if c == '\n' { '\n' } else { ' ' });
                i += 1;
            }
        } else if c == '-' && next == Some('-') {
            line_comment = true;
            out.push_str("  ");
            i += 2;
        } else if c == '{' && next == Some('-') {
            block_depth = 1;
            out.push_str("  ");
            i += 2;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

#[lachs::token]
pub enum Token {
    #[terminal("data")]
    Data,
    #[terminal("let")]
    Let,
    #[terminal("in")]
    In,
    #[terminal("if")]
    If,
    #[terminal("then")]
    Then,
    #[terminal("else")]
    Else,
    #[terminal("True")]
    True,
    #[terminal("False")]
    False,
    #[literal("[a-z_][a-zA-Z0-9_']*")]
    Ident,
    #[literal("[A-Z][a-zA-Z0-9_']*")]
    ConstrIdent,
    #[literal("[0-9]+")]
    Integer,
    #[literal(r"'([^'\\]|\\.)'")]
    CharLiteral,
    #[terminal("<-")]
    LeftArrow,
    #[terminal("->")]
    Arrow,
    #[terminal("..")]
    DotDot,
    #[terminal("\\")]
    Backslash,
    #[terminal("=")]
    Equals,
    #[terminal("|")]
    Pipe,
    #[terminal(",")]
    Comma,
    #[terminal(";")]
    Semicolon,
    #[terminal("(")]
    LParen,
    #[terminal(")")]
    RParen,
    #[terminal("[")]
    LBracket,
    #[terminal("]")]
    RBracket,
    #[terminal("`")]
    Backtick,
    #[terminal(".")]
    Dot,
    #[terminal("^")]
    Caret,
    #[terminal("*")]
    Star,
    #[terminal("+")]
    Plus,
    #[terminal("-")]
    Minus,
    #[terminal("++")]
    PlusPlus,
    #[terminal(":")]
    Colon,
    #[literal(":[!#$%&*+./<=>?@^|~:-]+")]
    ConstrOp,
    #[terminal("==")]
    EqEq,
    #[terminal("/=")]
    NotEq,
    #[terminal("<")]
    Lt,
    #[terminal("<=")]
    LtEq,
    #[terminal(">")]
    Gt,
    #[terminal(">=")]
    GtEq,
    #[terminal("&&")]
    AndAnd,
    #[terminal("||")]
    OrOr,
    #[terminal("$")]
    DollarSign,
}

impl Token {
    pub fn pos(&self) -> Span {
        match self {
            Token::Data(inner) => inner.position.clone(),
            Token::Let(inner) => inner.position.clone(),
            Token::In(inner) => inner.position.clone(),
            Token::If(inner) => inner.position.clone(),
            Token::Then(inner) => inner.position.clone(),
            Token::Else(inner) => inner.position.clone(),
            Token::True(inner) => inner.position.clone(),
            Token::False(inner) => inner.position.clone(),
            Token::Ident(inner) => inner.position.clone(),
            Token::ConstrIdent(inner) => inner.position.clone(),
            Token::Integer(inner) => inner.position.clone(),
            Token::CharLiteral(inner) => inner.position.clone(),
            Token::LeftArrow(inner) => inner.position.clone(),
            Token::Arrow(inner) => inner.position.clone(),
            Token::DotDot(inner) => inner.position.clone(),
            Token::Backslash(inner) => inner.position.clone(),
            Token::Equals(inner) => inner.position.clone(),
            Token::Pipe(inner) => inner.position.clone(),
            Token::Comma(inner) => inner.position.clone(),
            Token::Semicolon(inner) => inner.position.clone(),
            Token::LParen(inner) => inner.position.clone(),
            Token::RParen(inner) => inner.position.clone(),
            Token::LBracket(inner) => inner.position.clone(),
            Token::RBracket(inner) => inner.position.clone(),
            Token::Backtick(inner) => inner.position.clone(),
            Token::Dot(inner) => inner.position.clone(),
            Token::Caret(inner) => inner.position.clone(),
            Token::Star(inner) => inner.position.clone(),
            Token::Plus(inner) => inner.position.clone(),
            Token::Minus(inner) => inner.position.clone(),
            Token::PlusPlus(inner) => inner.position.clone(),
            Token::Colon(inner) => inner.position.clone(),
            Token::ConstrOp(inner) => inner.position.clone(),
            Token::EqEq(inner) => inner.position.clone(),
            Token::NotEq(inner) => inner.position.clone(),
            Token::Lt(inner) => inner.position.clone(),
            Token::LtEq(inner) => inner.position.clone(),
            Token::Gt(inner) => inner.position.clone(),
            Token::GtEq(inner) => inner.position.clone(),
            Token::AndAnd(inner) => inner.position.clone(),
            Token::OrOr(inner) => inner.position.clone(),
            Token::DollarSign(inner) => inner.position.clone(),
        }
    }

    /// A human-readable description of the token for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Data(_) => "'data'".to_string(),
            Token::Let(_) => "'let'".to_string(),
            Token::In(_) => "'in'".to_string(),
            Token::If(_) => "'if'".to_string(),
            Token::Then(_) => "'then'".to_string(),
            Token::Else(_) => "'else'".to_string(),
            Token::True(_) => "'True'".to_string(),
            Token::False(_) => "'False'".to_string(),
            Token::Ident(inner) => format!("identifier '{}'", inner.value),
            Token::ConstrIdent(inner) => format!("constructor '{}'", inner.value),
            Token::Integer(inner) => format!("integer '{}'", inner.value),
            Token::CharLiteral(inner) => format!("character {}", inner.value),
            Token::LeftArrow(_) => "'<-'".to_string(),
            Token::Arrow(_) => "'->'".to_string(),
            Token::DotDot(_) => "'..'".to_string(),
            Token::Backslash(_) => "'\\'".to_string(),
            Token::Equals(_) => "'='".to_string(),
            Token::Pipe(_) => "'|'".to_string(),
            Token::Comma(_) => "','".to_string(),
            Token::Semicolon(_) => "';'".to_string(),
            Token::LParen(_) => "'('".to_string(),
            Token::RParen(_) => "')'".to_string(),
            Token::LBracket(_) => "'['".to_string(),
            Token::RBracket(_) => "']'".to_string(),
            Token::Backtick(_) => "'`'".to_string(),
            Token::Dot(_) => "'.'".to_string(),
            Token::Caret(_) => "'^'".to_string(),
            Token::Star(_) => "'*'".to_string(),
            Token::Plus(_) => "'+'".to_string(),
            Token::Minus(_) => "'-'".to_string(),
            Token::PlusPlus(_) => "'++'".to_string(),
            Token::Colon(_) => "':'".to_string(),
            Token::ConstrOp(inner) => format!("operator '{}'", inner.value),
            Token::EqEq(_) => "'=='".to_string(),
            Token::NotEq(_) => "'/='".to_string(),
            Token::Lt(_) => "'<'".to_string(),
            Token::LtEq(_) => "'<='".to_string(),
            Token::Gt(_) => "'>'".to_string(),
            Token::GtEq(_) => "'>='".to_string(),
            Token::AndAnd(_) => "'&&'".to_string(),
            Token::OrOr(_) => "'||'".to_string(),
            Token::DollarSign(_) => "'$'".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_comments() {
        let stripped = strip_comments("x = 1 -- the one\ny = 2");
        assert!(!stripped.contains("the one"));
        assert!(stripped.contains("x = 1"));
        assert!(stripped.contains("y = 2"));
    }

    #[test]
    fn strips_nested_block_comments() {
        let stripped = strip_comments("a {- outer {- inner -} still -} b");
        assert!(!stripped.contains("outer"));
        assert!(!stripped.contains("inner"));
        assert!(stripped.starts_with('a'));
        assert!(stripped.trim_end().ends_with('b'));
    }

    #[test]
    fn comment_stripping_preserves_lines() {
        let source = "one\n{- two\nthree -}\nfour";
        let stripped = strip_comments(source);
        assert_eq!(source.lines().count(), stripped.lines().count());
    }
}
