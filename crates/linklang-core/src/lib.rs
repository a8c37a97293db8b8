//! LinkLang Core Library
//!
//! This crate provides the front half of the LinkLang compiler:
//! - Token model and lexer
//! - Abstract syntax tree
//! - Recursive-descent parser
//! - Project configuration (`linklang.yaml`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│    Lexer    │────▶│   Parser    │────▶ Program (AST)
//! │  (.chain)   │     │  (Tokens)   │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use linklang_core::parse_source;
//!
//! let program = parse_source("chain Main = Input >> llm >> StringOutput")?;
//! assert_eq!(program.statements.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Program;
pub use config::{Config, ProjectConfig, TargetConfig};
pub use error::{Error, Result};
pub use lexer::{Lexer, tokenize};
pub use parser::{Parser, parse_source};
pub use token::{Keyword, Token, TokenKind};
