//! Source file loading.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to obtain program text.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}' is empty")]
    Empty { path: PathBuf },
}

/// A loaded program text and the path it came from.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Read a source file from disk. A file holding only whitespace counts
    /// as empty.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if text.trim().is_empty() {
            return Err(SourceError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(Self::new(path, text))
    }

    /// The path as displayed in diagnostics.
    pub fn name(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_file() {
        let err = SourceFile::read("/definitely/not/here.bas").unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("cannot open"));
    }

    #[test]
    fn test_read_empty_file() {
        let dir = std::env::temp_dir().join("cbasic_core_empty_test.bas");
        std::fs::write(&dir, "  \n\t\n").unwrap();
        let err = SourceFile::read(&dir).unwrap_err();
        assert!(matches!(err, SourceError::Empty { .. }));
        let _ = std::fs::remove_file(&dir);
    }

    #[test]
    fn test_read_file() {
        let dir = std::env::temp_dir().join("cbasic_core_read_test.bas");
        std::fs::write(&dir, "PRINT 1\n").unwrap();
        let file = SourceFile::read(&dir).unwrap();
        assert_eq!(file.text, "PRINT 1\n");
        assert!(file.name().ends_with("cbasic_core_read_test.bas"));
        let _ = std::fs::remove_file(&dir);
    }
}
