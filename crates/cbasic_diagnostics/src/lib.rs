//! cbasic_diagnostics: Leveled diagnostics and the message catalogue.
//!
//! The lexer never fails and the parser never throws; every problem found
//! in a program is recorded here instead. A caller constructs one
//! `Diagnostics` per parse, hands it to the parser by mutable reference,
//! and inspects `has_errors()` afterwards to decide whether the tree is
//! usable.

use cbasic_core::Position;
use serde::Serialize;
use std::fmt;

/// Severity of a diagnostic. Ordered so that `level >= Error` selects the
/// diagnostics that make a program unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
    Fatal,
}

impl DiagnosticLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticLevel::Info => "INFO",
            DiagnosticLevel::Warning => "WARNING",
            DiagnosticLevel::Error => "ERROR",
            DiagnosticLevel::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic message template with a code and level.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code, rendered as `BAS<code>`.
    pub code: u32,
    /// The level this message is reported at.
    pub level: DiagnosticLevel,
    /// The message template. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A single recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub line: u32,
    pub column: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            level,
            line,
            column,
            message: message.into(),
            suggestion: None,
            context: None,
            code: None,
        }
    }

    /// Create a diagnostic from a catalogue entry.
    pub fn from_message(line: u32, column: u32, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            code: Some(message.code),
            ..Self::new(message.level, line, column, format_message(message.message, args))
        }
    }

    /// Attach a corrective suggestion.
    pub fn with_suggestion(&mut self, suggestion: impl Into<String>) -> &mut Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach a source-context string (usually the offending line).
    pub fn with_context(&mut self, context: impl Into<String>) -> &mut Self {
        self.context = Some(context.into());
        self
    }

    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Whether this diagnostic makes the program unusable.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.level >= DiagnosticLevel::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}, column {}", self.level, self.line, self.column)?;
        if let Some(code) = self.code {
            write!(f, " [BAS{}]", code)?;
        }
        writeln!(f, ":")?;
        if let Some(ref context) = self.context {
            writeln!(f, "  Context: {}", context)?;
        }
        write!(f, "  {}", self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// An append-only collection of diagnostics for one parse.
///
/// Not synchronised: concurrent parses each need their own instance.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    /// Append a diagnostic and return it for further decoration.
    pub fn add(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        let idx = self.diagnostics.len();
        self.diagnostics.push(diagnostic);
        &mut self.diagnostics[idx]
    }

    /// Record a catalogue message.
    pub fn report(
        &mut self,
        line: u32,
        column: u32,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> &mut Diagnostic {
        self.add(Diagnostic::from_message(line, column, message, args))
    }

    pub fn info(&mut self, line: u32, column: u32, message: impl Into<String>) -> &mut Diagnostic {
        self.add(Diagnostic::new(DiagnosticLevel::Info, line, column, message))
    }

    pub fn warning(&mut self, line: u32, column: u32, message: impl Into<String>) -> &mut Diagnostic {
        self.add(Diagnostic::new(DiagnosticLevel::Warning, line, column, message))
    }

    pub fn err(&mut self, line: u32, column: u32, message: impl Into<String>) -> &mut Diagnostic {
        self.add(Diagnostic::new(DiagnosticLevel::Error, line, column, message))
    }

    pub fn fatal(&mut self, line: u32, column: u32, message: impl Into<String>) -> &mut Diagnostic {
        self.add(Diagnostic::new(DiagnosticLevel::Fatal, line, column, message))
    }

    /// True if any diagnostic is at `Error` level or above.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Fatal)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.count_level(DiagnosticLevel::Warning)
    }

    fn count_level(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }

    /// Diagnostics at exactly `level`, in recording order.
    pub fn filter(&self, level: DiagnosticLevel) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics.iter().filter(move |d| d.level == level)
    }

    /// Errors and fatals, in recording order.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Sort diagnostics by position. Stable, so diagnostics at the same
    /// position keep their recording order.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by_key(Diagnostic::position);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Info, $msg:expr) => {
            DiagnosticMessage { code: $code, level: DiagnosticLevel::Info, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, level: DiagnosticLevel::Warning, message: $msg }
        };
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, level: DiagnosticLevel::Error, message: $msg }
        };
        ($code:expr, Fatal, $msg:expr) => {
            DiagnosticMessage { code: $code, level: DiagnosticLevel::Fatal, message: $msg }
        };
    }

    // ========================================================================
    // Lexical errors (1000-1099)
    // ========================================================================
    pub const INVALID_TOKEN: DiagnosticMessage = diag!(1001, Error, "{0}");
    pub const UNTERMINATED_INTERPOLATION: DiagnosticMessage = diag!(1002, Error, "unmatched '{' in interpolated string");
    pub const UNMATCHED_CLOSING_BRACE: DiagnosticMessage = diag!(1003, Error, "unmatched '}' in interpolated string");
    pub const EMPTY_INTERPOLATION: DiagnosticMessage = diag!(1004, Error, "empty expression in interpolated string");

    // ========================================================================
    // Syntax errors (1100-1299)
    // ========================================================================
    pub const _0_EXPECTED: DiagnosticMessage = diag!(1101, Error, "expected {0}");
    pub const _0_EXPECTED_AFTER_1: DiagnosticMessage = diag!(1102, Error, "expected {0} after {1}");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = diag!(1103, Error, "expected expression");
    pub const IDENTIFIER_EXPECTED_AFTER_0: DiagnosticMessage = diag!(1104, Error, "expected identifier after {0}");
    pub const UNEXPECTED_STATEMENT: DiagnosticMessage = diag!(1105, Error, "unexpected statement");
    pub const _0_WITHOUT_1: DiagnosticMessage = diag!(1106, Error, "{0} without matching {1}");
    pub const _0_BLOCK_NOT_CLOSED: DiagnosticMessage = diag!(1107, Error, "{0} block is missing {1}");
    pub const EMPTY_PARENTHESES: DiagnosticMessage = diag!(1108, Error, "empty parentheses are not an expression");
    pub const INVALID_ASSIGNMENT_TARGET: DiagnosticMessage = diag!(1109, Error, "cannot assign to this expression");
    pub const INVALID_EXIT_TARGET: DiagnosticMessage = diag!(1110, Error, "{0} must be followed by {1}");
    pub const CASE_EXPECTED: DiagnosticMessage = diag!(1111, Error, "expected CASE inside SELECT CASE, found {0}");
    pub const OPERATOR_EXPECTED: DiagnosticMessage = diag!(1112, Error, "expected an overloadable operator, found {0}");
    pub const UNEXPECTED_IN_0: DiagnosticMessage = diag!(1113, Error, "unexpected {0} in {1}");
    pub const UNEXPECTED_TRAILING_0: DiagnosticMessage = diag!(1114, Error, "unexpected {0} after statement");
    pub const NESTING_TOO_DEEP: DiagnosticMessage = diag!(1115, Error, "nesting too deep (limit is {0} levels)");

    // ========================================================================
    // Dialect errors (1300-1399)
    // ========================================================================
    pub const _0_REQUIRES_PERMISSIVE_DIALECT: DiagnosticMessage = diag!(1301, Error, "{0} is only allowed in the permissive dialect");

    // ========================================================================
    // Warnings (2000-2099)
    // ========================================================================
    pub const UNREACHABLE_CASE: DiagnosticMessage = diag!(2001, Warning, "CASE after CASE ELSE can never match");
    pub const DUPLICATE_CASE_ELSE: DiagnosticMessage = diag!(2002, Warning, "duplicate CASE ELSE; only the first one is used");
    pub const DEPRECATED_FLAG_0: DiagnosticMessage = diag!(2003, Warning, "{0} is deprecated; use {1}");

    // ========================================================================
    // Notes (9000-9099)
    // ========================================================================
    pub const DIALECT_DEFAULTED: DiagnosticMessage = diag!(9001, Info, "no dialect selected, defaulting to {0}");
    pub const DIALECT_FROM_PRAGMA: DiagnosticMessage = diag!(9002, Info, "dialect set to {0} by source pragma");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let result = format_message("expected {0} after {1}", &["')'", "argument list"]);
        assert_eq!(result, "expected ')' after argument list");
    }

    #[test]
    fn test_level_ordering() {
        assert!(DiagnosticLevel::Info < DiagnosticLevel::Warning);
        assert!(DiagnosticLevel::Warning < DiagnosticLevel::Error);
        assert!(DiagnosticLevel::Error < DiagnosticLevel::Fatal);
    }

    #[test]
    fn test_has_errors_ignores_warnings() {
        let mut diags = Diagnostics::new();
        diags.info(1, 1, "note");
        diags.warning(2, 1, "careful");
        assert!(!diags.has_errors());
        assert!(!diags.has_fatal());
        assert_eq!(diags.warning_count(), 1);

        diags.err(3, 4, "broken");
        assert!(diags.has_errors());
        assert!(!diags.has_fatal());
        assert_eq!(diags.error_count(), 1);

        diags.fatal(4, 1, "gave up");
        assert!(diags.has_fatal());
        assert_eq!(diags.error_count(), 2);
    }

    #[test]
    fn test_suggestion_and_context_chain() {
        let mut diags = Diagnostics::new();
        diags
            .err(3, 7, "expected WEND")
            .with_suggestion("close the loop with WEND")
            .with_context("WHILE x < 10");
        let d = &diags.diagnostics()[0];
        assert_eq!(d.suggestion.as_deref(), Some("close the loop with WEND"));
        assert_eq!(d.context.as_deref(), Some("WHILE x < 10"));
    }

    #[test]
    fn test_report_uses_catalogue() {
        let mut diags = Diagnostics::new();
        diags.report(2, 5, &messages::_0_EXPECTED, &["')'"]);
        let d = &diags.diagnostics()[0];
        assert_eq!(d.code, Some(1101));
        assert_eq!(d.level, DiagnosticLevel::Error);
        assert_eq!(d.message, "expected ')'");
    }

    #[test]
    fn test_display_layout() {
        let mut d = Diagnostic::new(DiagnosticLevel::Warning, 3, 1, "CASE after CASE ELSE can never match");
        d.with_context("CASE 4").with_suggestion("move CASE ELSE last");
        let text = d.to_string();
        assert_eq!(
            text,
            "WARNING at line 3, column 1:\n  Context: CASE 4\n  CASE after CASE ELSE can never match\n  Suggestion: move CASE ELSE last"
        );
    }

    #[test]
    fn test_display_with_code() {
        let d = Diagnostic::from_message(1, 2, &messages::EXPRESSION_EXPECTED, &[]);
        assert!(d.to_string().starts_with("ERROR at line 1, column 2 [BAS1103]:"));
    }

    #[test]
    fn test_sort_is_stable() {
        let mut diags = Diagnostics::new();
        diags.err(5, 1, "later");
        diags.err(2, 3, "first");
        diags.warning(2, 3, "second");
        diags.sort();
        let messages: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "later"]);
    }

    #[test]
    fn test_filter_by_level() {
        let mut diags = Diagnostics::new();
        diags.info(1, 1, "a");
        diags.err(1, 2, "b");
        diags.info(1, 3, "c");
        assert_eq!(diags.filter(DiagnosticLevel::Info).count(), 2);
        assert_eq!(diags.errors().count(), 1);
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let mut diags = Diagnostics::new();
        diags.err(1, 1, "oops");
        let json = serde_json::to_string(&diags.diagnostics()[0]).unwrap();
        assert_eq!(json, r#"{"level":"error","line":1,"column":1,"message":"oops"}"#);
    }
}
