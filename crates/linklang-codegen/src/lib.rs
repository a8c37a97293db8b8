//! LinkLang Code Generation
//!
//! This crate lowers parsed chain programs to JavaScript ES modules that run
//! on the tinychain runtime.
//!
//! # Pipeline Overview
//!
//! ```text
//! ┌─────────┐     ┌─────────┐     ┌─────────┐     ┌─────────┐
//! │ Source  │────▶│ Program │────▶│ Emission│────▶│ Module  │
//! │ (.chain)│     │  (AST)  │     │  Tree   │     │  (.js)  │
//! └─────────┘     └─────────┘     └─────────┘     └─────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use linklang_codegen::{CompileOptions, Compiler};
//!
//! let compiler = Compiler::new(CompileOptions::default());
//! let module = compiler.compile("main.chain", "def llm = Model()")?;
//! println!("{}", module.code);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod components;
pub mod compiler;
pub mod diagnostic;
pub mod error;
pub mod generator;
pub mod ir;
pub mod render;

pub use compiler::{CompileOptions, CompiledModule, Compiler, compile_str};
pub use diagnostic::{Diagnostic, Stage};
pub use error::{Error, Result};
pub use generator::Generator;
