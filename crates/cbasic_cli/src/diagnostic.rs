//! miette rendering for parser diagnostics.
//!
//! Wraps a `cbasic_diagnostics::Diagnostic` together with its source text so
//! the graphical handler can draw a labelled snippet under the message.

use cbasic_core::{LineIndex, Position};
use cbasic_diagnostics::{Diagnostic, DiagnosticLevel};
use miette::{LabeledSpan, NamedSource, Severity, SourceSpan};
use std::fmt;

/// A diagnostic bound to the file it was reported against.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SourceDiagnostic {
    message: String,
    code: Option<String>,
    severity: Severity,
    help: Option<String>,
    label: String,
    src: NamedSource<String>,
    span: SourceSpan,
}

impl SourceDiagnostic {
    pub fn from_core_diagnostic(diagnostic: &Diagnostic, name: &str, source: &str) -> Self {
        let index = LineIndex::new(source);
        let position = Position::new(diagnostic.line.max(1), diagnostic.column.max(1));
        let span = index.span_of(position, 1);

        Self {
            message: diagnostic.message.clone(),
            code: diagnostic.code.map(|code| format!("BAS{:04}", code)),
            severity: severity_of(diagnostic.level),
            help: diagnostic.suggestion.clone(),
            label: label_of(diagnostic.level).to_string(),
            src: NamedSource::new(name, source.to_string()),
            span: SourceSpan::new(span.start.into(), span.length),
        }
    }
}

fn severity_of(level: DiagnosticLevel) -> Severity {
    match level {
        DiagnosticLevel::Info => Severity::Advice,
        DiagnosticLevel::Warning => Severity::Warning,
        DiagnosticLevel::Error | DiagnosticLevel::Fatal => Severity::Error,
    }
}

fn label_of(level: DiagnosticLevel) -> &'static str {
    match level {
        DiagnosticLevel::Info => "note",
        DiagnosticLevel::Warning => "warning",
        DiagnosticLevel::Error | DiagnosticLevel::Fatal => "here",
    }
}

impl miette::Diagnostic for SourceDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code
            .as_ref()
            .map(|code| Box::new(code) as Box<dyn fmt::Display + 'a>)
    }

    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.label.clone()),
            self.span,
        ))))
    }
}

/// Render every diagnostic for one file to stderr through the installed hook.
pub fn emit_all<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>, name: &str, source: &str) {
    for diagnostic in diagnostics {
        let report = miette::Report::new(SourceDiagnostic::from_core_diagnostic(diagnostic, name, source));
        eprintln!("{:?}", report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbasic_diagnostics::messages;
    use miette::Diagnostic as _;

    const SOURCE: &str = "PRINT 1\nPRINT 2 +\n";

    fn core_error() -> Diagnostic {
        let mut diagnostic = Diagnostic::from_message(2, 9, &messages::EXPRESSION_EXPECTED, &[]);
        diagnostic.with_suggestion("add an operand after '+'");
        diagnostic
    }

    #[test]
    fn test_span_points_at_column() {
        let diag = SourceDiagnostic::from_core_diagnostic(&core_error(), "main.bas", SOURCE);
        // "PRINT 1\n" is 8 bytes; column 9 of line 2 is the '+'.
        assert_eq!(diag.span.offset(), 16);
        assert_eq!(diag.span.len(), 1);
        assert_eq!(diag.to_string(), "expected expression");
    }

    #[test]
    fn test_code_and_help() {
        let diag = SourceDiagnostic::from_core_diagnostic(&core_error(), "main.bas", SOURCE);
        assert_eq!(diag.code().map(|c| c.to_string()), Some("BAS1103".to_string()));
        assert_eq!(diag.help().map(|h| h.to_string()), Some("add an operand after '+'".to_string()));
        assert_eq!(diag.severity(), Some(Severity::Error));
    }

    #[test]
    fn test_levels_map_to_severity() {
        let note = Diagnostic::from_message(1, 1, &messages::DIALECT_DEFAULTED, &["permissive"]);
        let diag = SourceDiagnostic::from_core_diagnostic(&note, "main.bas", SOURCE);
        assert_eq!(diag.severity(), Some(Severity::Advice));
        assert_eq!(diag.code().map(|c| c.to_string()), Some("BAS9001".to_string()));

        let warning = Diagnostic::from_message(1, 1, &messages::UNREACHABLE_CASE, &[]);
        let diag = SourceDiagnostic::from_core_diagnostic(&warning, "main.bas", SOURCE);
        assert_eq!(diag.severity(), Some(Severity::Warning));
    }

    #[test]
    fn test_position_past_end_is_clamped() {
        let diag = Diagnostic::new(DiagnosticLevel::Error, 40, 80, "unexpected end of input");
        let rendered = SourceDiagnostic::from_core_diagnostic(&diag, "main.bas", SOURCE);
        assert!(rendered.span.offset() <= SOURCE.len());
        assert!(rendered.source_code().is_some());
        assert_eq!(rendered.labels().map(|labels| labels.count()), Some(1));
    }
}
