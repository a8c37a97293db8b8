//! Structured compile diagnostics
//!
//! A [`Diagnostic`] is the single observable result of a failed compilation:
//! the originating stage, a message and the source position when known.

use serde::Serialize;
use std::fmt;

use crate::error::Error;

/// Compiler stage that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Tokenization
    Lex,
    /// Parsing
    Parse,
    /// Code generation
    Codegen,
    /// Project configuration or I/O; never produced by the compiler stages
    Config,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
            Stage::Codegen => "codegen",
            Stage::Config => "config",
        })
    }
}

/// A single compile failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Originating stage
    pub stage: Stage,
    /// Error description without position
    pub message: String,
    /// 1-based line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 1-based column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Diagnostic {
    /// Render as a single-line JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
    }
}

impl From<&Error> for Diagnostic {
    fn from(err: &Error) -> Self {
        use linklang_core::Error as Core;

        match err {
            Error::Syntax(Core::Lex {
                character,
                line,
                column,
            }) => Self {
                stage: Stage::Lex,
                message: format!("unexpected character '{character}'"),
                line: Some(*line),
                column: Some(*column),
            },
            Error::Syntax(Core::Parse {
                expected,
                found,
                line,
                column,
            }) => Self {
                stage: Stage::Parse,
                message: format!("expected {expected}, found {found}"),
                line: Some(*line),
                column: Some(*column),
            },
            Error::Syntax(other) => Self {
                stage: Stage::Config,
                message: other.to_string(),
                line: None,
                column: None,
            },
            Error::Lowering {
                context,
                line,
                message,
            } => Self {
                stage: Stage::Codegen,
                message: format!("cannot lower {context}: {message}"),
                line: Some(*line),
                column: None,
            },
            Error::InvalidTemplate(e) => Self {
                stage: Stage::Codegen,
                message: e.to_string(),
                line: None,
                column: None,
            },
        }
    }
}

impl From<Error> for Diagnostic {
    fn from(err: Error) -> Self {
        Diagnostic::from(&err)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error", self.stage)?;
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, " at line {line}, column {column}")?,
            (Some(line), None) => write!(f, " at line {line}")?,
            _ => {}
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
