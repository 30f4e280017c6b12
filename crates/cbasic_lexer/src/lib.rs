//! cbasic_lexer: Lexer for BASIC source text.
//!
//! Converts program text into a finite token vector that always ends in
//! exactly one `Eof` token. The lexer never fails: anything it cannot
//! classify becomes an `Error` token for the parser to report.

mod char_codes;
mod lexer;
mod token;

pub use lexer::{lex, Lexer};
pub use token::Token;
