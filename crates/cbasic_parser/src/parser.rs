//! The BASIC parser core: token cursor, statement lists, recovery and
//! error reporting.
//!
//! Statement parsers live in `statements.rs`, declarations in
//! `declarations.rs`, state machines in `state_machine.rs` and
//! expressions in `expressions.rs`; all of them extend `Parser` with
//! further `impl` blocks.

use std::collections::VecDeque;

use cbasic_ast::{Program, Stmt, TokenKind};
use cbasic_diagnostics::messages::*;
use cbasic_diagnostics::{Diagnostic, DiagnosticMessage, Diagnostics};
use cbasic_lexer::Token;
use tracing::{debug, trace};

use crate::dialect::Dialect;
use crate::options::ParserOptions;
use crate::utilities::{fused_closer, is_block_closer, opener_of};

/// Lex and parse `source` in one step.
pub fn parse_source(source: &str, diag: &mut Diagnostics, dialect: Dialect) -> Program {
    Parser::new(cbasic_lexer::lex(source), diag, dialect).parse()
}

/// Parses a token vector into a `Program`, reporting into a caller-owned
/// `Diagnostics`.
pub struct Parser<'d> {
    tokens: Vec<Token>,
    /// Index of the current token. Never moves past the final `Eof`.
    current: usize,
    pub(crate) diag: &'d mut Diagnostics,
    pub(crate) options: ParserOptions,
    /// Counter for hidden variable names introduced by desugaring.
    gensym: u32,
    /// Statements synthesized while parsing the current statement. They
    /// are emitted ahead of it in the enclosing list.
    pending: VecDeque<Stmt>,
    /// Current combined statement and expression nesting.
    depth: u32,
    depth_reported: bool,
    /// Token index of the last reported error.
    last_error_at: Option<usize>,
}

impl<'d> Parser<'d> {
    pub fn new(tokens: Vec<Token>, diag: &'d mut Diagnostics, dialect: Dialect) -> Self {
        Self::with_options(tokens, diag, ParserOptions::new(dialect))
    }

    pub fn with_options(mut tokens: Vec<Token>, diag: &'d mut Diagnostics, options: ParserOptions) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token::new(TokenKind::Eof, "", line, column));
        }
        Self {
            tokens,
            current: 0,
            diag,
            options,
            gensym: 0,
            pending: VecDeque::new(),
            depth: 0,
            depth_reported: false,
            last_error_at: None,
        }
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.options.dialect
    }

    /// Parse the whole token vector. Always returns a program; problems
    /// are recorded in the diagnostics.
    pub fn parse(mut self) -> Program {
        debug!(tokens = self.tokens.len(), dialect = %self.options.dialect, "parsing");
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if self.check(TokenKind::Eof) {
                break;
            }
            if let Some(closer) = self.closer_at_current() {
                self.stray_closer(closer);
                continue;
            }
            let start = self.current;
            if self.statement_into(&mut statements) {
                self.finish_statement();
            } else {
                self.synchronize(start);
            }
        }
        debug!(
            statements = statements.len(),
            errors = self.diag.error_count(),
            "parsed program"
        );
        Program::new(statements)
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current]
    }

    #[inline]
    pub(crate) fn kind(&self) -> TokenKind {
        self.tokens[self.current].kind
    }

    /// Kind of the token `offset` places ahead; `Eof` past the end.
    #[inline]
    pub(crate) fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.current + offset)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    pub(crate) fn peek_lexeme(&self, offset: usize) -> Option<&str> {
        self.tokens.get(self.current + offset).map(|t| t.lexeme.as_str())
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Consume the current token and return it. Stays put on `Eof`.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if token.kind != TokenKind::Eof {
            self.current += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn optional_token(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume `kind` or report `expected <kind>`.
    pub(crate) fn expect_token(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            return Some(self.advance());
        }
        self.error(&_0_EXPECTED, &[&kind.describe()]);
        None
    }

    /// Consume `kind` or report `expected <kind> after <after>`.
    pub(crate) fn expect_after(&mut self, kind: TokenKind, after: &str) -> Option<Token> {
        if self.check(kind) {
            return Some(self.advance());
        }
        self.error(&_0_EXPECTED_AFTER_1, &[&kind.describe(), after]);
        None
    }

    /// Consume an identifier and return its (upper-cased) name.
    pub(crate) fn expect_ident(&mut self, after: &str) -> Option<String> {
        if self.check(TokenKind::Ident) {
            return Some(self.advance().lexeme);
        }
        self.error(&IDENTIFIER_EXPECTED_AFTER_0, &[after]);
        None
    }

    /// A name after `.`: identifiers and keywords both qualify, so
    /// `sprite.Update()` and `list.Next` parse.
    pub(crate) fn member_name(&mut self) -> Option<String> {
        let kind = self.kind();
        if kind == TokenKind::Ident || kind.is_keyword() {
            return Some(self.advance().lexeme);
        }
        self.error(&IDENTIFIER_EXPECTED_AFTER_0, &["'.'"]);
        None
    }

    /// At a statement separator or the end of input.
    #[inline]
    pub(crate) fn at_line_end(&self) -> bool {
        let kind = self.kind();
        kind.is_separator() || kind == TokenKind::Eof
    }

    /// At a point where the current statement must end.
    pub(crate) fn at_statement_end(&self) -> bool {
        self.at_line_end() || self.closer_at_current().is_some()
    }

    pub(crate) fn skip_separators(&mut self) {
        while self.kind().is_separator() {
            self.advance();
        }
    }

    /// Skip newlines inside bracketed literals and argument lists.
    pub(crate) fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Skip newlines only when one of `kinds` follows them. An unclosed
    /// bracket then leaves the line break in place to end its statement.
    pub(crate) fn skip_newlines_before(&mut self, kinds: &[TokenKind]) {
        let mut ahead = self.current;
        while self.tokens[ahead].kind == TokenKind::Newline {
            ahead += 1;
        }
        if kinds.contains(&self.tokens[ahead].kind) {
            self.current = ahead;
        }
    }

    pub(crate) fn next_gensym(&mut self) -> u32 {
        let id = self.gensym;
        self.gensym += 1;
        id
    }

    pub(crate) fn enqueue(&mut self, stmt: Stmt) {
        self.pending.push_back(stmt);
    }

    // ========================================================================
    // Block closers
    // ========================================================================

    /// The closer at the cursor, resolving two-word `END X` forms to their
    /// fused kind.
    pub(crate) fn closer_at_current(&self) -> Option<TokenKind> {
        let kind = self.kind();
        if is_block_closer(kind) {
            return Some(kind);
        }
        if kind == TokenKind::End {
            return fused_closer(self.peek_kind(1));
        }
        None
    }

    #[inline]
    pub(crate) fn at_closer(&self, closer: TokenKind) -> bool {
        self.closer_at_current() == Some(closer)
    }

    /// Consume `closer` in either spelling.
    pub(crate) fn eat_closer(&mut self, closer: TokenKind) -> bool {
        if !self.at_closer(closer) {
            return false;
        }
        if self.check(TokenKind::End) {
            self.advance();
        }
        self.advance();
        true
    }

    /// Consume `closer` or report that the `opener` block is unclosed.
    pub(crate) fn expect_closer(&mut self, closer: TokenKind, opener: &str) -> bool {
        if self.eat_closer(closer) {
            return true;
        }
        let closer_text = closer.describe();
        if let Some(d) = self.error(&_0_BLOCK_NOT_CLOSED, &[opener, &closer_text]) {
            d.with_suggestion(format!("add {} to close the {} block", closer_text, opener));
        }
        false
    }

    /// Report and skip a closer with no open block.
    fn stray_closer(&mut self, closer: TokenKind) {
        let closer_text = closer.describe();
        self.error(&_0_WITHOUT_1, &[&closer_text, opener_of(closer)]);
        self.eat_closer(closer);
        self.skip_to_separator();
    }

    // ========================================================================
    // Statement lists
    // ========================================================================

    /// Parse statements until one of `terminators` (or any block closer)
    /// is reached. The terminator itself is left for the caller.
    pub(crate) fn block_until(&mut self, terminators: &[TokenKind]) -> Vec<Stmt> {
        let mut body = Vec::new();
        loop {
            self.skip_separators();
            if self.check(TokenKind::Eof)
                || terminators.contains(&self.kind())
                || self.closer_at_current().is_some()
            {
                break;
            }
            let start = self.current;
            if self.statement_into(&mut body) {
                self.finish_statement();
            } else {
                self.synchronize(start);
            }
        }
        body
    }

    /// Parse one statement into `out`, preceded by any helpers its parse
    /// queued. Returns false if the statement failed.
    pub(crate) fn statement_into(&mut self, out: &mut Vec<Stmt>) -> bool {
        match self.statement() {
            Some(stmt) => {
                out.extend(self.pending.drain(..));
                out.push(stmt);
                true
            }
            None => {
                self.pending.clear();
                false
            }
        }
    }

    /// A statement must be followed by a separator, the end of input or a
    /// block closer. Anything else is reported and skipped.
    pub(crate) fn finish_statement(&mut self) {
        if self.at_statement_end() {
            return;
        }
        let found = self.current_token().describe();
        self.error(&UNEXPECTED_TRAILING_0, &[&found]);
        self.skip_to_separator();
    }

    // ========================================================================
    // Error recovery
    // ========================================================================

    /// Skip the remainder of a failed statement that began at `start`.
    /// Stops at a separator or a block closer so the enclosing block can
    /// still find its end.
    pub(crate) fn synchronize(&mut self, start: usize) {
        if self.current == start && !self.at_line_end() {
            self.advance();
        }
        let from = self.current;
        while !self.at_statement_end() {
            self.advance();
        }
        trace!(skipped = self.current - from, line = self.current_token().line, "recovered");
    }

    pub(crate) fn skip_to_separator(&mut self) {
        while !self.at_line_end() {
            self.advance();
        }
    }

    // ========================================================================
    // Nesting guard
    // ========================================================================

    /// Enter one nesting level. Returns false (after reporting once per
    /// parse) when the configured depth is exceeded; the caller must still
    /// call `leave`.
    pub(crate) fn enter(&mut self) -> bool {
        self.depth += 1;
        if self.depth <= self.options.max_depth {
            return true;
        }
        if !self.depth_reported {
            self.depth_reported = true;
            let limit = self.options.max_depth.to_string();
            self.error(&NESTING_TOO_DEEP, &[&limit]);
        }
        false
    }

    #[inline]
    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Enter one level for a link of a left-deep chain such as `a + b + c`
    /// or `a.b.c`. The level is held until `leave_links` ends the chain.
    pub(crate) fn enter_link(&mut self, links: &mut u32) -> bool {
        *links += 1;
        self.enter()
    }

    #[inline]
    pub(crate) fn leave_links(&mut self, links: u32) {
        self.depth -= links;
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Report `message` at the current token.
    pub(crate) fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) -> Option<&mut Diagnostic> {
        self.error_at(self.current, message, args)
    }

    /// Report `message` at the token with index `index`. A second error at
    /// the same token is dropped.
    pub(crate) fn error_at(
        &mut self,
        index: usize,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Option<&mut Diagnostic> {
        if self.last_error_at == Some(index) {
            return None;
        }
        self.last_error_at = Some(index);
        let (line, column) = {
            let token = &self.tokens[index];
            (token.line, token.column)
        };
        let context = self.line_context(line);
        let diagnostic = self.diag.report(line, column, message, args);
        if !context.is_empty() {
            diagnostic.with_context(context);
        }
        Some(diagnostic)
    }

    /// Report `message` at `index` with a corrective suggestion.
    pub(crate) fn error_hint(&mut self, index: usize, message: &DiagnosticMessage, args: &[&str], hint: &str) {
        if let Some(d) = self.error_at(index, message, args) {
            d.with_suggestion(hint);
        }
    }

    /// Report a non-error catalogue message (a warning) at `index`.
    pub(crate) fn warn_at(&mut self, index: usize, message: &DiagnosticMessage, args: &[&str]) {
        let token = &self.tokens[index];
        let (line, column) = (token.line, token.column);
        self.diag.report(line, column, message, args);
    }

    /// Index of the current token, for reporting after further parsing.
    #[inline]
    pub(crate) fn mark(&self) -> usize {
        self.current
    }

    /// Report an `Error` token at the cursor using its message, and skip it.
    pub(crate) fn invalid_token(&mut self) {
        let message = self.current_token().lexeme.clone();
        self.error(&INVALID_TOKEN, &[&message]);
        self.advance();
    }

    /// Rebuild the text of `line` from its tokens, for diagnostic context.
    fn line_context(&self, line: u32) -> String {
        let start = self.tokens.partition_point(|t| t.line < line);
        self.tokens[start..]
            .iter()
            .take_while(|t| t.line == line)
            .filter_map(|t| match t.kind {
                TokenKind::Newline | TokenKind::Eof | TokenKind::Error => None,
                TokenKind::String => Some(format!("\"{}\"", t.lexeme.replace('"', "\"\""))),
                TokenKind::FString => Some(format!("f\"{}\"", t.lexeme.replace('"', "\"\""))),
                _ => Some(t.lexeme.clone()),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// A parser over `tokens` that reports into the same diagnostics and
    /// inherits the dialect and remaining depth budget. Used for the
    /// expressions embedded in f-strings.
    pub(crate) fn sub_parser(&mut self, tokens: Vec<Token>) -> Parser<'_> {
        let mut sub = Parser::with_options(tokens, &mut *self.diag, self.options);
        sub.depth = self.depth;
        sub.depth_reported = self.depth_reported;
        sub
    }
}
