//! Binary operator precedence levels.

use cbasic_ast::{BinaryOp, TokenKind};
use cbasic_lexer::Token;

/// Binary precedence levels, lowest to highest. Each level is
/// left-associative, `^` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Or,
    Xor,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Power,
}

impl Precedence {
    pub const LOWEST: Precedence = Precedence::Or;

    /// The next tighter level, or `None` above `Power` (unary follows).
    pub fn next(self) -> Option<Precedence> {
        match self {
            Precedence::Or => Some(Precedence::Xor),
            Precedence::Xor => Some(Precedence::And),
            Precedence::And => Some(Precedence::Equality),
            Precedence::Equality => Some(Precedence::Comparison),
            Precedence::Comparison => Some(Precedence::Term),
            Precedence::Term => Some(Precedence::Factor),
            Precedence::Factor => Some(Precedence::Power),
            Precedence::Power => None,
        }
    }
}

/// The operator `token` spells at `level`, if it belongs there.
pub fn binary_operator(token: &Token, level: Precedence) -> Option<BinaryOp> {
    let op = match (level, token.kind) {
        (Precedence::Or, TokenKind::Or) => BinaryOp::Or,
        (Precedence::Xor, TokenKind::Xor) => BinaryOp::Xor,
        (Precedence::And, TokenKind::And) => BinaryOp::And,
        (Precedence::Equality, TokenKind::Eq) => BinaryOp::Eq,
        // `==` lexes as the type-infer token but compares in expressions.
        (Precedence::Equality, TokenKind::TypeInfer) if token.lexeme == "==" => BinaryOp::Eq,
        (Precedence::Equality, TokenKind::Neq) => BinaryOp::Neq,
        (Precedence::Comparison, TokenKind::Lt) => BinaryOp::Lt,
        (Precedence::Comparison, TokenKind::Lte) => BinaryOp::Lte,
        (Precedence::Comparison, TokenKind::Gt) => BinaryOp::Gt,
        (Precedence::Comparison, TokenKind::Gte) => BinaryOp::Gte,
        (Precedence::Term, TokenKind::Plus) => BinaryOp::Add,
        (Precedence::Term, TokenKind::Minus) => BinaryOp::Sub,
        (Precedence::Factor, TokenKind::Star) => BinaryOp::Mul,
        (Precedence::Factor, TokenKind::Slash) => BinaryOp::Div,
        (Precedence::Factor, TokenKind::Mod) => BinaryOp::Mod,
        (Precedence::Factor, TokenKind::Backslash) => BinaryOp::IntDiv,
        (Precedence::Power, TokenKind::Caret) => BinaryOp::Pow,
        _ => return None,
    };
    Some(op)
}

/// Relational operator after `CASE IS`.
pub fn relational_operator(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Eq => Some(BinaryOp::Eq),
        TokenKind::Neq => Some(BinaryOp::Neq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::Lte => Some(BinaryOp::Lte),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::Gte => Some(BinaryOp::Gte),
        _ => None,
    }
}

/// Operators that `OPERATOR <op> FOR Type` may overload.
pub fn overloadable_operator(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Backslash => Some(BinaryOp::IntDiv),
        TokenKind::Caret => Some(BinaryOp::Pow),
        TokenKind::Mod => Some(BinaryOp::Mod),
        other => relational_operator(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, 1, 1)
    }

    #[test]
    fn test_levels_are_ordered() {
        let mut level = Precedence::LOWEST;
        let mut count = 1;
        while let Some(next) = level.next() {
            assert!(next > level);
            level = next;
            count += 1;
        }
        assert_eq!(count, 8);
        assert_eq!(level, Precedence::Power);
    }

    #[test]
    fn test_operator_belongs_to_one_level() {
        let star = tok(TokenKind::Star, "*");
        assert_eq!(binary_operator(&star, Precedence::Factor), Some(BinaryOp::Mul));
        assert_eq!(binary_operator(&star, Precedence::Term), None);
    }

    #[test]
    fn test_double_equals_compares() {
        let eq = tok(TokenKind::TypeInfer, "==");
        let infer = tok(TokenKind::TypeInfer, ":=");
        assert_eq!(binary_operator(&eq, Precedence::Equality), Some(BinaryOp::Eq));
        assert_eq!(binary_operator(&infer, Precedence::Equality), None);
    }

    #[test]
    fn test_overloadable() {
        assert_eq!(overloadable_operator(TokenKind::Plus), Some(BinaryOp::Add));
        assert_eq!(overloadable_operator(TokenKind::Lte), Some(BinaryOp::Lte));
        assert_eq!(overloadable_operator(TokenKind::And), None);
    }
}
