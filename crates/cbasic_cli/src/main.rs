//! cbasic: command-line front end for the BASIC lexer and parser.
//!
//! Usage:
//!   cbasic tokens main.bas
//!   cbasic parse main.bas --format json --stats
//!   cbasic --dialect classic check a.bas b.bas

mod commands;
mod diagnostic;
mod stats;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use cbasic_diagnostics::{format_message, messages};
use cbasic_parser::Dialect;
use clap::{Parser, Subcommand, ValueEnum};
use miette::Severity;
use tracing_subscriber::EnvFilter;

use crate::commands::{CliError, Format, Session, Status};

/// Environment variable holding an `EnvFilter` directive.
const LOG_ENV: &str = "CBASIC_LOG";

#[derive(Parser, Debug)]
#[command(name = "cbasic", version, about = "Lex, parse and check BASIC programs")]
struct Cli {
    /// Grammar dialect (overrides cbasic.json and source pragmas)
    #[arg(long, global = true, value_name = "DIALECT")]
    dialect: Option<Dialect>,

    /// Deprecated alias for --dialect permissive
    #[arg(long, global = true, conflicts_with = "dialect")]
    agk: bool,

    /// Project file to load instead of ./cbasic.json
    #[arg(long, global = true, value_name = "FILE")]
    project: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// When to use colors in diagnostics
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the token stream, one token per line
    Tokens {
        /// Source file
        file: PathBuf,
    },
    /// Parse a file and print its syntax tree
    Parse {
        /// Source file
        file: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Debug)]
        format: Format,
        /// Print a summary of the program
        #[arg(long)]
        stats: bool,
    },
    /// Parse files in parallel and report their diagnostics
    Check {
        /// Source files (defaults to the project's file list)
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal(),
        }
    }
}

impl Cli {
    fn effective_dialect(&self) -> Option<Dialect> {
        if self.agk {
            Some(Dialect::Permissive)
        } else {
            self.dialect
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version land here too
            return if err.use_stderr() {
                ExitCode::from(Status::Usage.code())
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let color = cli.color.enabled();
    init_tracing(cli.verbose, color);
    install_report_hook(color);

    match run(&cli) {
        Ok(status) => ExitCode::from(status.code()),
        Err(report) => {
            let status = report
                .downcast_ref::<CliError>()
                .map_or(Status::Usage, CliError::status);
            eprintln!("{:?}", report);
            ExitCode::from(status.code())
        }
    }
}

fn run(cli: &Cli) -> miette::Result<Status> {
    if cli.agk {
        warn_deprecated_agk();
    }

    let status = match &cli.command {
        Command::Tokens { file } => commands::tokens(file)?,
        Command::Parse { file, format, stats } => {
            let session = Session::load(cli.effective_dialect(), cli.project.as_deref())?;
            commands::parse(&session, file, *format, *stats)?
        }
        Command::Check { files } => {
            let session = Session::load(cli.effective_dialect(), cli.project.as_deref())?;
            commands::check(&session, files)?
        }
    };
    Ok(status)
}

fn warn_deprecated_agk() {
    let message = &messages::DEPRECATED_FLAG_0;
    let text = format_message(message.message, &["--agk", "--dialect permissive"]);
    let code = format!("BAS{:04}", message.code);
    eprintln!("{:?}", miette::miette!(severity = Severity::Warning, code = code, "{}", text));
}

// ============================================================================
// Logging and report setup
// ============================================================================

/// Map the `-v` count to an `EnvFilter` directive.
fn directive_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `CBASIC_LOG` wins over `-v`. Logs go to stderr so stdout stays parseable.
fn init_tracing(verbose: u8, color: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(verbose >= 2)
        .init();
}

fn install_report_hook(color: bool) {
    let installed = miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .color(color)
                .unicode(color)
                .context_lines(1)
                .build(),
        )
    }));
    if installed.is_err() {
        tracing::debug!("miette hook already installed");
    }
}
