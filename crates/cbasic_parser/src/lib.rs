//! cbasic_parser: Recursive descent parser for BASIC.
//!
//! Consumes the lexer's token vector and builds an owned `Program`.
//! Statements are parsed by recursive descent, expressions by one method
//! per precedence level. Problems are recorded in the caller's
//! `Diagnostics`; `parse()` always returns a (possibly partial) tree.

mod declarations;
mod dialect;
mod expressions;
mod options;
mod parser;
mod precedence;
mod state_machine;
mod statements;
mod utilities;

pub use dialect::{Dialect, ParseDialectError, Pragmas};
pub use options::ParserOptions;
pub use parser::{parse_source, Parser};
