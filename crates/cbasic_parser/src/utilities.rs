//! Parser utility functions.

use cbasic_ast::TokenKind;

/// The fused closer that `END <kind>` spells, e.g. `END IF` is `ENDIF`.
pub fn fused_closer(kind: TokenKind) -> Option<TokenKind> {
    let closer = match kind {
        TokenKind::If => TokenKind::EndIf,
        TokenKind::While => TokenKind::Wend,
        TokenKind::Sub => TokenKind::EndSub,
        TokenKind::Function => TokenKind::EndFunction,
        TokenKind::Select => TokenKind::EndSelect,
        TokenKind::Type => TokenKind::EndType,
        TokenKind::Module => TokenKind::EndModule,
        TokenKind::Operator => TokenKind::EndOperator,
        TokenKind::Lambda => TokenKind::EndLambda,
        TokenKind::Using => TokenKind::EndUsing,
        TokenKind::Match => TokenKind::EndMatch,
        TokenKind::Enum => TokenKind::EndEnum,
        TokenKind::Union => TokenKind::EndUnion,
        TokenKind::Try => TokenKind::EndTry,
        TokenKind::State => TokenKind::EndState,
        TokenKind::Parallel => TokenKind::EndParallel,
        TokenKind::Group => TokenKind::EndGroup,
        TokenKind::System => TokenKind::EndSystem,
        TokenKind::On => TokenKind::EndOn,
        _ => return None,
    };
    Some(closer)
}

/// Check if a token kind ends (or splits) an enclosing block. Statement
/// lists stop at any of these so a misplaced closer is never parsed as
/// the start of a statement.
pub fn is_block_closer(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::EndIf
            | TokenKind::Else
            | TokenKind::ElseIf
            | TokenKind::Wend
            | TokenKind::Next
            | TokenKind::Loop
            | TokenKind::Until
            | TokenKind::EndSub
            | TokenKind::EndFunction
            | TokenKind::EndSelect
            | TokenKind::Case
            | TokenKind::EndType
            | TokenKind::EndModule
            | TokenKind::EndOperator
            | TokenKind::EndLambda
            | TokenKind::EndUsing
            | TokenKind::EndMatch
            | TokenKind::EndEnum
            | TokenKind::EndUnion
            | TokenKind::EndTry
            | TokenKind::Catch
            | TokenKind::Finally
            | TokenKind::EndState
            | TokenKind::EndParallel
            | TokenKind::EndGroup
            | TokenKind::EndSystem
            | TokenKind::EndOn
    )
}

/// The construct a closer belongs to, for "X without matching Y".
pub fn opener_of(closer: TokenKind) -> &'static str {
    match closer {
        TokenKind::EndIf | TokenKind::Else | TokenKind::ElseIf => "IF",
        TokenKind::Wend => "WHILE",
        TokenKind::Next => "FOR",
        TokenKind::Loop => "DO",
        TokenKind::Until => "REPEAT",
        TokenKind::EndSub => "SUB",
        TokenKind::EndFunction => "FUNCTION",
        TokenKind::EndSelect | TokenKind::Case => "SELECT CASE",
        TokenKind::EndType => "TYPE",
        TokenKind::EndModule => "MODULE",
        TokenKind::EndOperator => "OPERATOR",
        TokenKind::EndLambda => "LAMBDA",
        TokenKind::EndUsing => "USING",
        TokenKind::EndMatch => "MATCH",
        TokenKind::EndEnum => "ENUM",
        TokenKind::EndUnion => "UNION",
        TokenKind::EndTry | TokenKind::Catch | TokenKind::Finally => "TRY",
        TokenKind::EndState => "STATE",
        TokenKind::EndParallel => "PARALLEL",
        TokenKind::EndGroup => "GROUP",
        TokenKind::EndSystem => "DEFINE STATE SYSTEM",
        TokenKind::EndOn => "ON",
        _ => "block",
    }
}

/// Check if a token kind can begin an argument of a call written without
/// parentheses (`PLAYSOUND "boom", 2`). Unary `+`/`-`, `(` and `[` are
/// left out: `X - 1`, `F (A)` and `A[1] = 2` read as something else.
pub fn can_start_bare_argument(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Number
            | TokenKind::String
            | TokenKind::FString
            | TokenKind::Ident
            | TokenKind::LBrace
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Nil
            | TokenKind::Not
            | TokenKind::Lambda
            | TokenKind::Match
            | TokenKind::Super
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fused_closers_are_closers() {
        for kind in [TokenKind::If, TokenKind::Sub, TokenKind::Try, TokenKind::On, TokenKind::While] {
            let closer = fused_closer(kind).unwrap();
            assert!(is_block_closer(closer), "{:?}", closer);
        }
        assert_eq!(fused_closer(TokenKind::Print), None);
    }

    #[test]
    fn test_openers() {
        assert_eq!(opener_of(TokenKind::Wend), "WHILE");
        assert_eq!(opener_of(TokenKind::Catch), "TRY");
        assert_eq!(opener_of(TokenKind::EndOn), "ON");
    }

    #[test]
    fn test_bare_arguments() {
        assert!(can_start_bare_argument(TokenKind::String));
        assert!(!can_start_bare_argument(TokenKind::Minus));
        assert!(!can_start_bare_argument(TokenKind::LParen));
        assert!(!can_start_bare_argument(TokenKind::LBracket));
        assert!(!can_start_bare_argument(TokenKind::Colon));
    }
}
