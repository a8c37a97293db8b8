//! Error types for linklang-core

use thiserror::Error;

/// Result type alias for linklang-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in linklang-core
#[derive(Error, Debug)]
pub enum Error {
    /// No lexer rule matched the remaining input
    #[error("unexpected character '{character}' at line {line}, column {column}")]
    Lex {
        /// The offending character
        character: char,
        /// 1-based line
        line: usize,
        /// 1-based column
        column: usize,
    },

    /// Token stream did not match the grammar
    #[error("expected {expected}, found {found} at line {line}, column {column}")]
    Parse {
        /// Construct the parser was looking for
        expected: String,
        /// Description of the token actually seen
        found: String,
        /// 1-based line of the offending token
        line: usize,
        /// 1-based column of the offending token
        column: usize,
    },

    /// Configuration file could not be found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse YAML configuration
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Source position (line, column) for lexer and parser errors
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Error::Lex { line, column, .. } | Error::Parse { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_error_message() {
        let err = Error::Lex {
            character: '$',
            line: 3,
            column: 7,
        };
        assert_eq!(
            err.to_string(),
            "unexpected character '$' at line 3, column 7"
        );
        assert_eq!(err.position(), Some((3, 7)));
    }

    #[test]
    fn test_parse_error_message() {
        let err = Error::Parse {
            expected: "'='".to_string(),
            found: "identifier 'x'".to_string(),
            line: 1,
            column: 9,
        };
        assert!(err.to_string().contains("expected '='"));
        assert!(err.to_string().contains("identifier 'x'"));
    }

    #[test]
    fn test_config_error_has_no_position() {
        let err = Error::ConfigInvalid {
            message: "bad".to_string(),
        };
        assert!(err.position().is_none());
    }
}
