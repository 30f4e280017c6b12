//! cbasic_core: Core utilities for the cbasic front end.
//!
//! Provides source positions, line indexing, and source file loading
//! used throughout the lexer, parser, and CLI.

pub mod source;
pub mod text;

// Re-export commonly used types
pub use source::{SourceError, SourceFile};
pub use text::{LineIndex, Position, TextSpan};
