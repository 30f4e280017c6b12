//! Property-based tests for the lexer.
//!
//! 1. **Lexer never panics** on arbitrary input
//! 2. **Exactly one Eof**, and it is last
//! 3. **Positions are monotonic**
//! 4. **Lexer is deterministic**
//! 5. **Keywords are case-insensitive**

use cbasic_ast::TokenKind;
use cbasic_lexer::lex;
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

const KEYWORDS: &[&str] = &[
    "print", "let", "if", "then", "endif", "while", "wend", "for", "next", "sub", "function",
    "select", "case", "do", "loop", "repeat", "until", "continue", "mod", "and", "not",
];

const FRAGMENTS: &[&str] = &[
    "PRINT 1", "x = 2", "IF a THEN", "ENDIF", "\"str\"", "f\"{x}\"", "' c", "/* b */", "(", ")",
    "[", "]", ",", ":", "\n", "..", "?.", "??", "<>", "@", "\"open", "REM x", "1.5", "#",
];

fn keyword() -> impl Strategy<Value = String> {
    prop::sample::select(KEYWORDS).prop_map(std::string::ToString::to_string)
}

fn fragment_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..40).prop_map(|parts| parts.join(" "))
}

/// Flip the case of letters at positions chosen by `mask`.
fn mixed_case(word: &str, mask: u32) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| {
            if mask & (1 << (i % 32)) != 0 {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Property 1: arbitrary input always lexes.
    #[test]
    fn lexer_never_panics(input in "\\PC{0,300}") {
        let _ = lex(&input);
    }

    /// Property 2: exactly one Eof, at the end.
    #[test]
    fn single_trailing_eof(input in "\\PC{0,300}") {
        let tokens = lex(&input);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        prop_assert_eq!(eofs, 1);
    }

    /// Property 2b: the same holds for token-shaped soups.
    #[test]
    fn soup_single_trailing_eof(input in fragment_soup()) {
        let tokens = lex(&input);
        prop_assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    }

    /// Property 3: token positions never move backwards.
    #[test]
    fn positions_are_monotonic(input in fragment_soup()) {
        let tokens = lex(&input);
        for window in tokens.windows(2) {
            let (prev, next) = (&window[0], &window[1]);
            prop_assert!(
                (next.line, next.column) > (prev.line, prev.column),
                "{:?} then {:?} for input {:?}", prev, next, input
            );
        }
    }

    /// Property 4: same input, same tokens.
    #[test]
    fn lexer_deterministic(input in "\\PC{0,200}") {
        prop_assert_eq!(lex(&input), lex(&input));
    }

    /// Property 5: keyword kind does not depend on letter case.
    #[test]
    fn keywords_case_insensitive(word in keyword(), mask in any::<u32>()) {
        let upper = lex(&word.to_ascii_uppercase());
        let mixed = lex(&mixed_case(&word, mask));
        prop_assert_eq!(upper[0].kind, mixed[0].kind);
        prop_assert!(upper[0].kind.is_keyword());
    }
}
