//! Error types for code generation

use thiserror::Error;

/// Result type for codegen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compiling a chain program
#[derive(Error, Debug)]
pub enum Error {
    /// Lexing or parsing failed
    #[error(transparent)]
    Syntax(#[from] linklang_core::Error),

    /// A well-formed construct has no known lowering
    #[error("cannot lower {context} (line {line}): {message}")]
    Lowering {
        /// Statement being lowered, e.g. `def 'llm'`
        context: String,
        /// Line of the statement
        line: usize,
        /// Error description
        message: String,
    },

    /// Module layout template failed to render
    #[error("invalid template: {0}")]
    InvalidTemplate(#[from] minijinja::Error),
}
