//! cbasic_options: cbasic.json parsing and dialect resolution.
//!
//! Parses project configuration files and decides which dialect and
//! parser options apply to a source file, combining the command line, the
//! project file and the file's own pragmas.

use std::path::{Path, PathBuf};

use cbasic_parser::{Dialect, ParserOptions, Pragmas};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// The project file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "cbasic.json";

/// The cbasic.json file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub dialect: Option<Dialect>,
    pub max_nesting_depth: Option<u32>,
    pub files: Option<Vec<String>>,
    pub include: Option<Vec<String>>,
}

impl ProjectConfig {
    /// Parser options for `dialect`, with this project's nesting limit.
    pub fn parser_options(&self, dialect: Dialect) -> ParserOptions {
        let options = ParserOptions::new(dialect);
        match self.max_nesting_depth {
            Some(depth) => options.with_max_depth(depth),
            None => options,
        }
    }

    /// The source files this project names: `files` first, then `include`,
    /// each relative to `base`.
    pub fn source_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.files
            .iter()
            .chain(self.include.iter())
            .flatten()
            .map(|file| base.join(file))
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid project file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("maxNestingDepth must be at least 1")]
    ZeroDepth,
}

/// Parse a cbasic.json file from a string.
pub fn parse_config(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = serde_json::from_str(content)?;
    if config.max_nesting_depth == Some(0) {
        return Err(ConfigError::ZeroDepth);
    }
    Ok(config)
}

/// Parse a cbasic.json file from a path.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<ProjectConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content)?;
    debug!(path = %path.display(), ?config, "loaded project file");
    Ok(config)
}

/// Load `dir/cbasic.json` if it exists.
pub fn find_config(dir: impl AsRef<Path>) -> Result<Option<ProjectConfig>, ConfigError> {
    let path = dir.as_ref().join(CONFIG_FILE_NAME);
    if !path.is_file() {
        return Ok(None);
    }
    parse_config_file(path).map(Some)
}

// ============================================================================
// Dialect resolution
// ============================================================================

/// Where the dialect in effect came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectSource {
    CommandLine,
    ProjectFile,
    Pragma { line: u32 },
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDialect {
    pub dialect: Dialect,
    pub source: DialectSource,
}

impl ResolvedDialect {
    /// The CLI notes a defaulted dialect unless the file opted out.
    pub fn should_note_default(&self, pragmas: &Pragmas) -> bool {
        self.source == DialectSource::Default && !pragmas.nowarn_dialect
    }
}

/// Pick the dialect for one file: the command line wins, then the project
/// file, then the file's first dialect pragma, then the default.
pub fn resolve_dialect(
    cli: Option<Dialect>,
    config: Option<&ProjectConfig>,
    pragmas: &Pragmas,
) -> ResolvedDialect {
    let (dialect, source) = if let Some(dialect) = cli {
        (dialect, DialectSource::CommandLine)
    } else if let Some(dialect) = config.and_then(|c| c.dialect) {
        (dialect, DialectSource::ProjectFile)
    } else if let Some(dialect) = pragmas.dialect {
        let line = pragmas.dialect_line.unwrap_or(1);
        (dialect, DialectSource::Pragma { line })
    } else {
        (Dialect::default(), DialectSource::Default)
    };
    ResolvedDialect { dialect, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case() {
        let config = parse_config(r#"{ "dialect": "classic", "maxNestingDepth": 64, "files": ["main.bas"] }"#).unwrap();
        assert_eq!(config.dialect, Some(Dialect::Classic));
        assert_eq!(config.max_nesting_depth, Some(64));
        assert_eq!(config.files, Some(vec!["main.bas".to_string()]));
        assert_eq!(config.include, None);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(parse_config("{}").unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_rejects_unknown_dialect() {
        let err = parse_config(r#"{ "dialect": "qbasic" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_rejects_zero_depth() {
        let err = parse_config(r#"{ "maxNestingDepth": 0 }"#).unwrap_err();
        assert_eq!(err.to_string(), "maxNestingDepth must be at least 1");
    }

    #[test]
    fn test_parser_options_use_depth() {
        let config = ProjectConfig {
            max_nesting_depth: Some(32),
            ..ProjectConfig::default()
        };
        let options = config.parser_options(Dialect::Classic);
        assert_eq!(options.max_depth, 32);
        assert_eq!(options.dialect, Dialect::Classic);
        assert_eq!(ProjectConfig::default().parser_options(Dialect::Permissive), ParserOptions::default());
    }

    #[test]
    fn test_source_paths_order() {
        let config = ProjectConfig {
            files: Some(vec!["a.bas".into()]),
            include: Some(vec!["lib/b.bas".into()]),
            ..ProjectConfig::default()
        };
        assert_eq!(
            config.source_paths(Path::new("proj")),
            vec![PathBuf::from("proj/a.bas"), PathBuf::from("proj/lib/b.bas")]
        );
    }

    #[test]
    fn test_resolution_order() {
        let config = ProjectConfig {
            dialect: Some(Dialect::Classic),
            ..ProjectConfig::default()
        };
        let pragmas = Pragmas::scan("PRINT 1\n#PRAGMA DIALECT PERMISSIVE");

        let resolved = resolve_dialect(Some(Dialect::Permissive), Some(&config), &pragmas);
        assert_eq!(resolved.source, DialectSource::CommandLine);

        let resolved = resolve_dialect(None, Some(&config), &pragmas);
        assert_eq!(resolved.dialect, Dialect::Classic);
        assert_eq!(resolved.source, DialectSource::ProjectFile);

        let resolved = resolve_dialect(None, None, &pragmas);
        assert_eq!(resolved.dialect, Dialect::Permissive);
        assert_eq!(resolved.source, DialectSource::Pragma { line: 2 });

        let resolved = resolve_dialect(None, Some(&ProjectConfig::default()), &Pragmas::default());
        assert_eq!(resolved.source, DialectSource::Default);
        assert_eq!(resolved.dialect, Dialect::Permissive);
    }

    #[test]
    fn test_default_note_respects_nowarn() {
        let resolved = resolve_dialect(None, None, &Pragmas::default());
        assert!(resolved.should_note_default(&Pragmas::default()));
        let quiet = Pragmas::scan("#PRAGMA NOWARN DIALECT");
        assert!(!resolve_dialect(None, None, &quiet).should_note_default(&quiet));
    }
}
