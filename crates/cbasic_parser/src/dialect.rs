//! Language dialects and source pragma detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which grammar extensions the parser accepts.
///
/// `Classic` rejects single-line `IF`, THEN-less `IF`, `DO...LOOP`,
/// `REPEAT...UNTIL` and bare `CONTINUE`; `Permissive` accepts them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Classic,
    #[default]
    Permissive,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Classic => "classic",
            Dialect::Permissive => "permissive",
        }
    }

    #[inline]
    pub fn is_permissive(self) -> bool {
        self == Dialect::Permissive
    }

    /// The dialect selected by a `#PRAGMA` line in `source`, if any.
    pub fn detect(source: &str) -> Option<Dialect> {
        Pragmas::scan(source).dialect
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect '{0}' (expected 'classic' or 'permissive')")]
pub struct ParseDialectError(pub String);

impl FromStr for Dialect {
    type Err = ParseDialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "strict" => Ok(Dialect::Classic),
            "permissive" | "agk" | "agklite" | "agklike" => Ok(Dialect::Permissive),
            _ => Err(ParseDialectError(s.to_string())),
        }
    }
}

/// Settings found in `#PRAGMA` comment lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pragmas {
    /// The first dialect pragma in the file.
    pub dialect: Option<Dialect>,
    /// Line of the pragma that set `dialect`.
    pub dialect_line: Option<u32>,
    /// `#PRAGMA NOWARN DIALECT` was present.
    pub nowarn_dialect: bool,
}

impl Pragmas {
    /// Scan raw source text for pragma lines. Pragmas are comments to the
    /// lexer, so this works on the text rather than the token stream.
    pub fn scan(source: &str) -> Self {
        let mut pragmas = Pragmas::default();
        for (index, line) in source.lines().enumerate() {
            let Some(rest) = line.trim_start().strip_prefix('#') else {
                continue;
            };
            let words: Vec<String> = rest.split_whitespace().map(str::to_ascii_uppercase).collect();
            let words: Vec<&str> = words.iter().map(String::as_str).collect();
            let selected = match words.as_slice() {
                ["PRAGMA", "DIALECT", "AGKLITE" | "AGKLIKE" | "PERMISSIVE", ..] => Some(Dialect::Permissive),
                ["PRAGMA", "AGK", "ON", ..] => Some(Dialect::Permissive),
                ["PRAGMA", "DIALECT", "CLASSIC", ..] => Some(Dialect::Classic),
                ["PRAGMA", "STRICT", "CLASSIC", ..] => Some(Dialect::Classic),
                ["PRAGMA", "CLASSIC", "ON", ..] => Some(Dialect::Classic),
                ["PRAGMA", "NOWARN", "DIALECT", ..] => {
                    pragmas.nowarn_dialect = true;
                    None
                }
                _ => None,
            };
            if let (Some(dialect), None) = (selected, pragmas.dialect) {
                pragmas.dialect = Some(dialect);
                pragmas.dialect_line = Some(index as u32 + 1);
            }
        }
        pragmas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_permissive() {
        assert_eq!(Dialect::default(), Dialect::Permissive);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Classic".parse::<Dialect>(), Ok(Dialect::Classic));
        assert_eq!("agklite".parse::<Dialect>(), Ok(Dialect::Permissive));
        assert!("fortran".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_detect_pragmas() {
        assert_eq!(Dialect::detect("#pragma dialect classic\nPRINT 1"), Some(Dialect::Classic));
        assert_eq!(Dialect::detect("  #PRAGMA AGK ON"), Some(Dialect::Permissive));
        assert_eq!(Dialect::detect("#Pragma Strict Classic"), Some(Dialect::Classic));
        assert_eq!(Dialect::detect("# just a comment\nPRINT 1"), None);
        assert_eq!(Dialect::detect("PRINT \"#PRAGMA CLASSIC ON\""), None);
    }

    #[test]
    fn test_first_pragma_wins() {
        let pragmas = Pragmas::scan("PRINT 1\n#PRAGMA CLASSIC ON\n#PRAGMA DIALECT PERMISSIVE\n");
        assert_eq!(pragmas.dialect, Some(Dialect::Classic));
        assert_eq!(pragmas.dialect_line, Some(2));
    }

    #[test]
    fn test_nowarn() {
        let pragmas = Pragmas::scan("#PRAGMA NOWARN DIALECT");
        assert!(pragmas.nowarn_dialect);
        assert_eq!(pragmas.dialect, None);
    }
}
