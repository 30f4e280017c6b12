//! Tokens produced by the lexer.

use cbasic_ast::TokenKind;
use cbasic_core::Position;
use serde::Serialize;
use std::fmt;

/// A lexical token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. Identifiers and keywords are upper-cased,
    /// string bodies are unquoted, and `Error` tokens carry the message.
    pub lexeme: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column, counted in characters.
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// The token as it reads in a diagnostic: the lexeme for words and
    /// literals, the description otherwise.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Ident | TokenKind::Number => format!("'{}'", self.lexeme),
            TokenKind::String => format!("\"{}\"", self.lexeme),
            kind => kind.describe(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {:?}", self.line, self.column, self.kind)?;
        match self.kind {
            TokenKind::Newline | TokenKind::Eof => Ok(()),
            _ => write!(f, " {:?}", self.lexeme),
        }
    }
}
