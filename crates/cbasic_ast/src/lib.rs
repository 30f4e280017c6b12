//! cbasic_ast: Token kinds and the abstract syntax tree.
//!
//! Defines the closed set of token kinds produced by the lexer, and the
//! expression and statement sum types the parser builds. A `Program` owns
//! its whole tree; no node is shared and no node refers back to its parent.

pub mod node;
pub mod token_kind;
pub mod visit;

pub use node::*;
pub use token_kind::TokenKind;
pub use visit::Visitor;
