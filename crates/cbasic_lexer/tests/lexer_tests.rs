//! Lexer integration tests.
//!
//! Verifies tokenization of BASIC constructs, comments, literals and
//! case folding.

use cbasic_ast::TokenKind;
use cbasic_lexer::{lex, Lexer, Token};

/// Helper: lex source and return (kind, lexeme) pairs without the trailing Eof.
fn lex_all(source: &str) -> Vec<(TokenKind, String)> {
    let mut tokens = lex(source);
    assert_eq!(tokens.pop().map(|t| t.kind), Some(TokenKind::Eof));
    tokens.into_iter().map(|t| (t.kind, t.lexeme)).collect()
}

/// Helper: lex source and return kinds without the trailing Eof.
fn lex_kinds(source: &str) -> Vec<TokenKind> {
    lex_all(source).into_iter().map(|(k, _)| k).collect()
}

#[test]
fn test_whitespace_only() {
    assert!(lex_kinds("   \t \r ").is_empty());
}

#[test]
fn test_newlines_are_tokens() {
    assert_eq!(
        lex_kinds("\n\n"),
        vec![TokenKind::Newline, TokenKind::Newline]
    );
}

#[test]
fn test_case_insensitive_keywords() {
    for source in ["print", "PRINT", "Print", "pRiNt"] {
        assert_eq!(lex_kinds(source), vec![TokenKind::Print], "source: {}", source);
    }
}

#[test]
fn test_identifiers_are_upper_cased() {
    let tokens = lex_all("score name$ _tmp $legacy");
    assert_eq!(
        tokens,
        vec![
            (TokenKind::Ident, "SCORE".to_string()),
            (TokenKind::Ident, "NAME$".to_string()),
            (TokenKind::Ident, "_TMP".to_string()),
            (TokenKind::Ident, "$LEGACY".to_string()),
        ]
    );
}

#[test]
fn test_numbers() {
    assert_eq!(lex_all("42"), vec![(TokenKind::Number, "42".to_string())]);
    assert_eq!(lex_all("3.14"), vec![(TokenKind::Number, "3.14".to_string())]);
    assert_eq!(lex_all("7."), vec![(TokenKind::Number, "7.".to_string())]);
}

#[test]
fn test_number_followed_by_range() {
    assert_eq!(
        lex_all("1..10"),
        vec![
            (TokenKind::Number, "1".to_string()),
            (TokenKind::Spread, "..".to_string()),
            (TokenKind::Number, "10".to_string()),
        ]
    );
}

#[test]
fn test_number_with_two_dots_splits() {
    assert_eq!(
        lex_kinds("1.2.3"),
        vec![TokenKind::Number, TokenKind::Dot, TokenKind::Number]
    );
}

#[test]
fn test_strings() {
    assert_eq!(
        lex_all(r#""hello world""#),
        vec![(TokenKind::String, "hello world".to_string())]
    );
}

#[test]
fn test_doubled_quote_escape() {
    assert_eq!(
        lex_all(r#""say ""hi""""#),
        vec![(TokenKind::String, r#"say "hi""#.to_string())]
    );
}

#[test]
fn test_backslash_is_literal_in_strings() {
    assert_eq!(
        lex_all(r#""C:\temp\n""#),
        vec![(TokenKind::String, r"C:\temp\n".to_string())]
    );
}

#[test]
fn test_unterminated_string() {
    let tokens = lex("PRINT \"oops\nPRINT 2");
    assert_eq!(tokens[1].kind, TokenKind::Error);
    assert_eq!(tokens[1].lexeme, "Unterminated string literal");
    assert_eq!(tokens[2].kind, TokenKind::Newline);
    assert_eq!(tokens[3].kind, TokenKind::Print);
}

#[test]
fn test_fstrings() {
    assert_eq!(
        lex_all(r#"f"hi {name}" F"x""#),
        vec![
            (TokenKind::FString, "hi {name}".to_string()),
            (TokenKind::FString, "x".to_string()),
        ]
    );
}

#[test]
fn test_f_identifier_is_not_fstring() {
    assert_eq!(
        lex_all(r#"f "x""#),
        vec![
            (TokenKind::Ident, "F".to_string()),
            (TokenKind::String, "x".to_string()),
        ]
    );
}

#[test]
fn test_line_comments() {
    assert_eq!(
        lex_kinds("PRINT 1 ' note\nPRINT 2 // note\n# note\nPRINT 3"),
        vec![
            TokenKind::Print,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Print,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Newline,
            TokenKind::Print,
            TokenKind::Number,
        ]
    );
}

#[test]
fn test_block_comment() {
    assert_eq!(
        lex_kinds("x /* skip\nall of this */ y"),
        vec![TokenKind::Ident, TokenKind::Ident]
    );
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(lex_kinds("x /* never closed"), vec![TokenKind::Ident]);
}

#[test]
fn test_division_is_not_comment() {
    assert_eq!(
        lex_kinds("a / b \\ c ^ d"),
        vec![
            TokenKind::Ident,
            TokenKind::Slash,
            TokenKind::Ident,
            TokenKind::Backslash,
            TokenKind::Ident,
            TokenKind::Caret,
            TokenKind::Ident,
        ]
    );
}

#[test]
fn test_double_equals_aliases_type_infer() {
    let tokens = lex_all("a == b := c");
    assert_eq!(tokens[1], (TokenKind::TypeInfer, "==".to_string()));
    assert_eq!(tokens[3], (TokenKind::TypeInfer, ":=".to_string()));
}

#[test]
fn test_block_closers() {
    assert_eq!(
        lex_kinds("EndIf endsub ENDFUNCTION wend next"),
        vec![
            TokenKind::EndIf,
            TokenKind::EndSub,
            TokenKind::EndFunction,
            TokenKind::Wend,
            TokenKind::Next,
        ]
    );
}

#[test]
fn test_nil_spellings() {
    assert_eq!(
        lex_kinds("nil none null"),
        vec![TokenKind::Nil, TokenKind::Nil, TokenKind::Nil]
    );
}

#[test]
fn test_program_fragment() {
    let source = "FOR i = 1 TO 10 STEP 2\n  PRINT i\nNEXT i";
    assert_eq!(
        lex_kinds(source),
        vec![
            TokenKind::For,
            TokenKind::Ident,
            TokenKind::Eq,
            TokenKind::Number,
            TokenKind::To,
            TokenKind::Number,
            TokenKind::Step,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Print,
            TokenKind::Ident,
            TokenKind::Newline,
            TokenKind::Next,
            TokenKind::Ident,
        ]
    );
}

#[test]
fn test_error_tokens_do_not_stop_lexing() {
    let tokens = lex("a ! b ~ c");
    let errors = tokens.iter().filter(|t| t.kind == TokenKind::Error).count();
    assert_eq!(errors, 2);
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
}

#[test]
fn test_eof_position_after_last_line() {
    let tokens = lex("PRINT 1\n");
    assert_eq!(tokens.last(), Some(&Token::new(TokenKind::Eof, "", 2, 1)));
}

#[test]
fn test_columns_count_characters() {
    let tokens = Lexer::new("PRINT \"é\" x").lex();
    assert_eq!(tokens[2].column, 11);
}
