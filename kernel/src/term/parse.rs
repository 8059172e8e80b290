//! Recursive-descent parser for the textual term syntax.
//!
//! ```text
//! expr  := '?' ident | ident | ident '(' [expr (',' expr)*] ')'
//! ident := [A-Za-z0-9_.']+
//! ```

use super::expr::Expr;

/// Deepest application nesting accepted by [`Expr::parse`].
pub const MAX_DEPTH: usize = 256;

/// Failure to parse an expression. Offsets are byte positions in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input was empty or whitespace only.
    Empty,
    /// A character that cannot start or continue the current production.
    UnexpectedChar { offset: usize, found: char },
    /// Input ended inside an expression.
    UnexpectedEnd { expected: &'static str },
    /// A complete expression was followed by more input.
    TrailingInput { offset: usize },
    /// Applications nest deeper than [`MAX_DEPTH`].
    TooDeep { offset: usize },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty expression"),
            Self::UnexpectedChar { offset, found } => {
                write!(f, "unexpected character {found:?} at offset {offset}")
            }
            Self::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            Self::TrailingInput { offset } => {
                write!(f, "trailing input at offset {offset}")
            }
            Self::TooDeep { offset } => {
                write!(f, "nesting deeper than {MAX_DEPTH} at offset {offset}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl Expr {
    /// Parse an expression from its textual form.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] describing the first problem found.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut parser = Parser {
            text,
            pos: 0,
            depth: 0,
        };
        parser.skip_ws();
        if parser.peek().is_none() {
            return Err(ParseError::Empty);
        }
        let expr = parser.expr()?;
        parser.skip_ws();
        if parser.pos < text.len() {
            return Err(ParseError::TrailingInput { offset: parser.pos });
        }
        Ok(expr)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '\'')
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    /// Open application parentheses.
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if self.pos == start {
            return Err(match self.peek() {
                Some(found) => ParseError::UnexpectedChar {
                    offset: self.pos,
                    found,
                },
                None => ParseError::UnexpectedEnd {
                    expected: "identifier",
                },
            });
        }
        Ok(self.text[start..self.pos].to_string())
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        self.skip_ws();
        if self.peek() == Some('?') {
            self.bump();
            return Ok(Expr::Var(self.ident()?));
        }
        let name = self.ident()?;
        self.skip_ws();
        if self.peek() != Some('(') {
            return Ok(Expr::Atom(name));
        }
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep { offset: self.pos });
        }
        self.bump();
        self.depth += 1;
        let args = self.args()?;
        self.depth -= 1;
        Ok(Expr::App(name, args))
    }

    /// Arguments after an opening `(`, through the closing `)`.
    fn args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        self.skip_ws();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.bump(),
                Some(')') => {
                    self.bump();
                    return Ok(args);
                }
                Some(found) => {
                    return Err(ParseError::UnexpectedChar {
                        offset: self.pos,
                        found,
                    })
                }
                None => {
                    return Err(ParseError::UnexpectedEnd {
                        expected: "',' or ')'",
                    })
                }
            }
        }
    }
}
