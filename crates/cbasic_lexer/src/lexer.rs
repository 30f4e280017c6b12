//! The BASIC lexer.
//!
//! A single forward pass over the source characters. Positions are tracked
//! as 1-based line/column pairs; columns count characters. The lexer is
//! consumed by `lex()`, so a lexer can only ever run once.

use crate::char_codes::*;
use crate::token::Token;
use cbasic_ast::TokenKind;
use tracing::{debug, trace};

/// Lex a whole program. Always ends with exactly one `Eof` token.
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).lex()
}

pub struct Lexer {
    /// The source text being lexed.
    text: Vec<char>,
    /// Current position in the text.
    pos: usize,
    /// Line of the current position.
    line: u32,
    /// Column of the current position.
    column: u32,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Run the lexer to completion.
    pub fn lex(mut self) -> Vec<Token> {
        loop {
            self.skip_trivia();
            let (line, column) = (self.line, self.column);
            let Some(ch) = self.current_char() else {
                self.tokens.push(Token::new(TokenKind::Eof, "", line, column));
                break;
            };
            let token = self.scan(ch, line, column);
            trace!(kind = ?token.kind, line, column, "token");
            self.tokens.push(token);
        }
        debug!(tokens = self.tokens.len(), lines = self.line, "lexed source");
        self.tokens
    }

    // ========================================================================
    // Character cursor
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text.get(self.pos).copied()
    }

    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(self.pos + offset).copied()
    }

    /// Advance one character, keeping line and column in step.
    #[inline]
    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.pos += 1;
            if ch == LINE_FEED {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    #[inline]
    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn skip_to_line_end(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == LINE_FEED {
                break;
            }
            self.advance();
        }
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.text[start..end].iter().collect()
    }

    // ========================================================================
    // Trivia
    // ========================================================================

    /// Skip whitespace and comments. Line feeds are tokens and stop the skip.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.current_char() {
            match ch {
                c if is_inline_whitespace(c) => self.advance(),
                SINGLE_QUOTE | HASH => self.skip_to_line_end(),
                SLASH if self.char_at(1) == Some(SLASH) => self.skip_to_line_end(),
                SLASH if self.char_at(1) == Some(ASTERISK) => {
                    self.advance_by(2);
                    while let Some(c) = self.current_char() {
                        if c == ASTERISK && self.char_at(1) == Some(SLASH) {
                            self.advance_by(2);
                            break;
                        }
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    // ========================================================================
    // Token scanning
    // ========================================================================

    fn scan(&mut self, ch: char, line: u32, column: u32) -> Token {
        let simple = |kind: TokenKind, len: usize, lexer: &mut Self| {
            let lexeme = lexer.slice(lexer.pos, lexer.pos + len);
            lexer.advance_by(len);
            Token::new(kind, lexeme, line, column)
        };

        match ch {
            LINE_FEED => simple(TokenKind::Newline, 1, self),
            DOUBLE_QUOTE => self.scan_string(TokenKind::String, line, column),
            'f' | 'F' if self.char_at(1) == Some(DOUBLE_QUOTE) => {
                self.advance();
                self.scan_string(TokenKind::FString, line, column)
            }
            c if is_digit(c) => self.scan_number(line, column),
            c if is_identifier_start(c) => self.scan_identifier(line, column),

            '(' => simple(TokenKind::LParen, 1, self),
            ')' => simple(TokenKind::RParen, 1, self),
            '[' => simple(TokenKind::LBracket, 1, self),
            ']' => simple(TokenKind::RBracket, 1, self),
            '{' => simple(TokenKind::LBrace, 1, self),
            '}' => simple(TokenKind::RBrace, 1, self),
            ',' => simple(TokenKind::Comma, 1, self),
            ';' => simple(TokenKind::Semicolon, 1, self),
            '+' => simple(TokenKind::Plus, 1, self),
            '-' => simple(TokenKind::Minus, 1, self),
            '*' => simple(TokenKind::Star, 1, self),
            '/' => simple(TokenKind::Slash, 1, self),
            '\\' => simple(TokenKind::Backslash, 1, self),
            '^' => simple(TokenKind::Caret, 1, self),

            '<' => match self.char_at(1) {
                Some('>') => simple(TokenKind::Neq, 2, self),
                Some('=') => simple(TokenKind::Lte, 2, self),
                _ => simple(TokenKind::Lt, 1, self),
            },
            '>' => match self.char_at(1) {
                Some('=') => simple(TokenKind::Gte, 2, self),
                _ => simple(TokenKind::Gt, 1, self),
            },
            '=' => match self.char_at(1) {
                Some('=') => simple(TokenKind::TypeInfer, 2, self),
                _ => simple(TokenKind::Eq, 1, self),
            },
            ':' => match self.char_at(1) {
                Some('=') => simple(TokenKind::TypeInfer, 2, self),
                _ => simple(TokenKind::Colon, 1, self),
            },
            DOT => match self.char_at(1) {
                Some(DOT) => simple(TokenKind::Spread, 2, self),
                _ => simple(TokenKind::Dot, 1, self),
            },
            '?' => match self.char_at(1) {
                Some(DOT) => simple(TokenKind::NullSafeDot, 2, self),
                Some('[') => simple(TokenKind::NullSafeIndex, 2, self),
                Some('?') => simple(TokenKind::NullCoalesce, 2, self),
                _ => self.unexpected(ch, line, column),
            },

            _ => self.unexpected(ch, line, column),
        }
    }

    fn unexpected(&mut self, ch: char, line: u32, column: u32) -> Token {
        self.advance();
        Token::new(TokenKind::Error, format!("Unexpected character: {}", ch), line, column)
    }

    /// Scan a double-quoted string starting at the opening quote. `""`
    /// inside the literal is one quote character. Strings end at the line.
    fn scan_string(&mut self, kind: TokenKind, line: u32, column: u32) -> Token {
        self.advance(); // skip opening quote
        let mut value = String::new();
        loop {
            match self.current_char() {
                None | Some(LINE_FEED) => {
                    return Token::new(TokenKind::Error, "Unterminated string literal", line, column);
                }
                Some(DOUBLE_QUOTE) => {
                    if self.char_at(1) == Some(DOUBLE_QUOTE) {
                        value.push(DOUBLE_QUOTE);
                        self.advance_by(2);
                    } else {
                        self.advance();
                        return Token::new(kind, value, line, column);
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Digits with at most one `.`. A `.` followed by another `.` starts a
    /// range operator and is left alone.
    fn scan_number(&mut self, line: u32, column: u32) -> Token {
        let start = self.pos;
        self.scan_digits();
        if self.current_char() == Some(DOT) && self.char_at(1) != Some(DOT) {
            self.advance();
            self.scan_digits();
        }
        Token::new(TokenKind::Number, self.slice(start, self.pos), line, column)
    }

    fn scan_digits(&mut self) {
        while self.current_char().is_some_and(is_digit) {
            self.advance();
        }
    }

    fn scan_identifier(&mut self, line: u32, column: u32) -> Token {
        let start = self.pos;
        self.advance();
        while self.current_char().is_some_and(is_identifier_part) {
            self.advance();
        }
        let text = self.slice(start, self.pos).to_ascii_uppercase();

        if text == "REM" {
            // Remark: the rest of the line is commentary.
            self.skip_to_line_end();
            return Token::new(TokenKind::Newline, "\n", line, column);
        }

        let kind = TokenKind::from_keyword(&text).unwrap_or(TokenKind::Ident);
        Token::new(kind, text, line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_source() {
        let tokens = lex("");
        assert_eq!(tokens, vec![Token::new(TokenKind::Eof, "", 1, 1)]);
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("( ) [ ] { } , ; :"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_two_character_operators() {
        assert_eq!(
            kinds("<> <= >= == .. ?. ?[ ?? := < > = ."),
            vec![
                TokenKind::Neq,
                TokenKind::Lte,
                TokenKind::Gte,
                TokenKind::TypeInfer,
                TokenKind::Spread,
                TokenKind::NullSafeDot,
                TokenKind::NullSafeIndex,
                TokenKind::NullCoalesce,
                TokenKind::TypeInfer,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eq,
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = lex("LET x = 1\n  PRINT x");
        let positions: Vec<_> = tokens.iter().map(|t| (t.line, t.column)).collect();
        assert_eq!(
            positions,
            vec![(1, 1), (1, 5), (1, 7), (1, 9), (1, 10), (2, 3), (2, 9), (2, 10)]
        );
    }

    #[test]
    fn test_rem_becomes_newline() {
        let tokens = lex("REM this is ignored\nPRINT 1");
        assert_eq!(tokens[0].kind, TokenKind::Newline);
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[2].kind, TokenKind::Print);
    }

    #[test]
    fn test_rem_prefix_is_identifier() {
        let tokens = lex("REMAINING = 1");
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].lexeme, "REMAINING");
    }

    #[test]
    fn test_unexpected_character() {
        let tokens = lex("x @ y");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].lexeme, "Unexpected character: @");
        assert_eq!(tokens[2].kind, TokenKind::Ident);
    }

    #[test]
    fn test_lone_question_mark() {
        let tokens = lex("?");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens.len(), 2);
    }
}
