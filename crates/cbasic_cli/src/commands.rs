//! Subcommand implementations.
//!
//! Each command loads its sources, resolves the dialect per file, runs the
//! lexer and parser, and reports through the miette hook. Commands return
//! the process exit status rather than exiting themselves.

use std::path::{Path, PathBuf};

use cbasic_ast::Program;
use cbasic_core::{SourceError, SourceFile};
use cbasic_diagnostics::{messages, Diagnostic, Diagnostics};
use cbasic_lexer::lex;
use cbasic_options::{
    find_config, parse_config_file, resolve_dialect, ConfigError, DialectSource, ProjectConfig,
    ResolvedDialect,
};
use cbasic_parser::{Dialect, Parser, ParserOptions, Pragmas};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::diagnostic::emit_all;
use crate::stats::ProgramStats;

// ============================================================================
// Exit statuses
// ============================================================================

/// Process exit statuses, following sysexits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok = 0,
    SyntaxErrors = 1,
    Usage = 64,
    EmptyInput = 65,
    NoInput = 66,
}

impl Status {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Failures that stop a command before any parsing happens.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(code(cbasic::source))]
    Source(#[from] SourceError),

    #[error(transparent)]
    #[diagnostic(code(cbasic::project), help("check the cbasic.json project file"))]
    Config(#[from] ConfigError),

    #[error("no input files")]
    #[diagnostic(
        code(cbasic::usage),
        help("pass files to check, or list them under \"files\" in cbasic.json")
    )]
    NoFiles,
}

impl CliError {
    pub fn status(&self) -> Status {
        match self {
            CliError::Source(SourceError::Io { .. }) | CliError::Config(ConfigError::Io { .. }) => Status::NoInput,
            CliError::Source(SourceError::Empty { .. }) => Status::EmptyInput,
            CliError::Config(_) | CliError::NoFiles => Status::Usage,
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Settings shared by every file a command touches.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub dialect: Option<Dialect>,
    pub config: Option<ProjectConfig>,
    /// Directory relative to which project `files` are resolved.
    pub project_dir: PathBuf,
}

/// One parsed file with everything reported against it.
#[derive(Debug)]
pub struct Analysis {
    pub file: SourceFile,
    pub resolved: ResolvedDialect,
    pub program: Program,
    pub diagnostics: Diagnostics,
}

impl Session {
    /// Load the project file named by `--project`, or `cbasic.json` from the
    /// working directory if there is one.
    pub fn load(dialect: Option<Dialect>, project: Option<&Path>) -> Result<Self, CliError> {
        let (config, project_dir) = match project {
            Some(path) => {
                let config = parse_config_file(path)?;
                let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                (Some(config), dir)
            }
            None => {
                let dir = std::env::current_dir().unwrap_or_default();
                (find_config(&dir)?, dir)
            }
        };
        Ok(Self {
            dialect,
            config,
            project_dir,
        })
    }

    fn resolve(&self, pragmas: &Pragmas) -> ResolvedDialect {
        resolve_dialect(self.dialect, self.config.as_ref(), pragmas)
    }

    fn parser_options(&self, dialect: Dialect) -> ParserOptions {
        match &self.config {
            Some(config) => config.parser_options(dialect),
            None => ParserOptions::new(dialect),
        }
    }

    /// Lex and parse one file into its own `Diagnostics`.
    pub fn analyze(&self, file: SourceFile) -> Analysis {
        let pragmas = Pragmas::scan(&file.text);
        let resolved = self.resolve(&pragmas);
        let mut diagnostics = Diagnostics::new();

        match resolved.source {
            DialectSource::Pragma { line } => {
                diagnostics.report(line, 1, &messages::DIALECT_FROM_PRAGMA, &[resolved.dialect.as_str()]);
            }
            DialectSource::Default if resolved.should_note_default(&pragmas) => {
                diagnostics
                    .report(1, 1, &messages::DIALECT_DEFAULTED, &[resolved.dialect.as_str()])
                    .with_suggestion("add '#PRAGMA DIALECT CLASSIC' or '#PRAGMA NOWARN DIALECT' to the file");
            }
            _ => {}
        }

        let options = self.parser_options(resolved.dialect);
        let program = Parser::with_options(lex(&file.text), &mut diagnostics, options).parse();
        diagnostics.sort();
        debug!(
            file = %file.name(),
            dialect = %resolved.dialect,
            statements = program.statements.len(),
            errors = diagnostics.error_count(),
            "analyzed"
        );

        Analysis {
            file,
            resolved,
            program,
            diagnostics,
        }
    }

    /// `files` when given, otherwise the project's file list.
    fn inputs(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
        if !files.is_empty() {
            return Ok(files.to_vec());
        }
        let listed = self
            .config
            .as_ref()
            .map(|config| config.source_paths(&self.project_dir))
            .unwrap_or_default();
        if listed.is_empty() {
            return Err(CliError::NoFiles);
        }
        Ok(listed)
    }
}

fn status_of(diagnostics: &Diagnostics) -> Status {
    if diagnostics.has_errors() {
        Status::SyntaxErrors
    } else {
        Status::Ok
    }
}

// ============================================================================
// cbasic tokens
// ============================================================================

pub fn tokens(path: &Path) -> Result<Status, CliError> {
    let file = SourceFile::read(path)?;
    let tokens = lex(&file.text);
    let mut status = Status::Ok;
    for token in &tokens {
        println!(
            "{}:{} {:?} {}",
            token.line,
            token.column,
            token.kind,
            token.lexeme.escape_debug()
        );
        if token.kind == cbasic_ast::TokenKind::Error {
            status = Status::SyntaxErrors;
        }
    }
    info!(count = tokens.len(), "lexed");
    Ok(status)
}

// ============================================================================
// cbasic parse
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Rust debug tree.
    #[default]
    Debug,
    /// JSON document holding the program and its diagnostics.
    Json,
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    file: String,
    dialect: Dialect,
    program: &'a Program,
    diagnostics: &'a [Diagnostic],
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<ProgramStats>,
}

pub fn parse(session: &Session, path: &Path, format: Format, stats: bool) -> Result<Status, CliError> {
    let analysis = session.analyze(SourceFile::read(path)?);
    let stats = stats.then(|| ProgramStats::collect(&analysis.program));

    match format {
        Format::Debug => {
            emit_all(&analysis.diagnostics, &analysis.file.name(), &analysis.file.text);
            println!("{:#?}", analysis.program);
            if let Some(stats) = &stats {
                println!("{}", stats);
            }
        }
        Format::Json => {
            let output = ParseOutput {
                file: analysis.file.name(),
                dialect: analysis.resolved.dialect,
                program: &analysis.program,
                diagnostics: analysis.diagnostics.diagnostics(),
                stats,
            };
            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{}", json),
                Err(err) => tracing::error!(%err, "cannot serialize program"),
            }
        }
    }

    Ok(status_of(&analysis.diagnostics))
}

// ============================================================================
// cbasic check
// ============================================================================

pub fn check(session: &Session, files: &[PathBuf]) -> Result<Status, CliError> {
    let inputs = session.inputs(files)?;
    debug!(files = inputs.len(), "checking");

    // Each file gets a private Diagnostics; collect() keeps input order.
    let results: Vec<Result<Analysis, SourceError>> = inputs
        .par_iter()
        .map(|path| SourceFile::read(path).map(|file| session.analyze(file)))
        .collect();

    let mut worst = Status::Ok;
    for result in results {
        let status = match result {
            Ok(analysis) => {
                let name = analysis.file.name();
                emit_all(&analysis.diagnostics, &name, &analysis.file.text);
                let errors = analysis.diagnostics.error_count();
                let warnings = analysis.diagnostics.warning_count();
                if errors == 0 {
                    println!("{}: ok ({} dialect, {} warning(s))", name, analysis.resolved.dialect, warnings);
                } else {
                    println!("{}: {} error(s), {} warning(s)", name, errors, warnings);
                }
                status_of(&analysis.diagnostics)
            }
            Err(err) => {
                let err = CliError::from(err);
                let status = err.status();
                eprintln!("{:?}", miette::Report::new(err));
                status
            }
        };
        worst = worst.max(status);
    }
    Ok(worst)
}
