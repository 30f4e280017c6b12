//! Parser configuration.

use crate::dialect::Dialect;

/// Default bound on combined statement and expression nesting.
pub const DEFAULT_MAX_DEPTH: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    pub dialect: Dialect,
    /// Nesting beyond this depth is reported once and the offending
    /// construct is replaced by a placeholder.
    pub max_depth: u32,
}

impl ParserOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}
