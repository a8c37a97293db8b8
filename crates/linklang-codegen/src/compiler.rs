//! Compilation driver
//!
//! Runs source text through lex, parse and generate. The first failing stage
//! ends the compilation; nothing is produced on failure.

use sha2::{Digest, Sha256};

use linklang_core::{Parser, Program, TargetConfig, tokenize};

use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::generator::Generator;

/// Options for the compiler
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Module specifier used by the generated import line
    pub runtime_module: String,

    /// Method the invocation helpers call on each chain
    pub invoke_method: String,

    /// Whether to emit source-line comments
    pub debug: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::from_target(&TargetConfig::default())
    }
}

impl CompileOptions {
    /// Options for a project's `target` settings
    pub fn from_target(target: &TargetConfig) -> Self {
        Self {
            runtime_module: target.runtime_module.clone(),
            invoke_method: target.invoke_method.clone(),
            debug: false,
        }
    }
}

/// Chain program compiler
#[derive(Debug, Clone)]
pub struct Compiler {
    options: CompileOptions,
    generator: Generator,
}

impl Compiler {
    /// Create a new compiler with the given options
    pub fn new(options: CompileOptions) -> Self {
        let generator = Generator::new()
            .with_runtime_module(options.runtime_module.clone())
            .with_invoke_method(options.invoke_method.clone());

        Self {
            generator: if options.debug {
                generator.with_debug_comments()
            } else {
                generator
            },
            options,
        }
    }

    /// Options this compiler was built with
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Lex and parse without generating code
    pub fn check(&self, source: &str) -> Result<Program> {
        let tokens = tokenize(source)?;
        let program = Parser::new(tokens).parse_program()?;
        Ok(program)
    }

    /// Compile one source unit; `name` labels logs and the module header
    pub fn compile(&self, name: &str, source: &str) -> Result<CompiledModule> {
        tracing::info!("Compiling {}", name);

        let program = self.check(source)?;
        tracing::debug!(
            statements = program.statements.len(),
            "parsed {}",
            name
        );

        let code = self.generator.generate(name, &program)?;
        let hash = hex::encode(Sha256::digest(code.as_bytes()));

        tracing::info!("Compiled {}: {} bytes", name, code.len());
        Ok(CompiledModule {
            name: name.to_string(),
            code,
            hash,
        })
    }
}

/// Compile with default options, reporting failure as a [`Diagnostic`]
pub fn compile_str(name: &str, source: &str) -> std::result::Result<CompiledModule, Diagnostic> {
    Compiler::new(CompileOptions::default())
        .compile(name, source)
        .map_err(Diagnostic::from)
}

/// A generated module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledModule {
    /// Source name the module was compiled from
    pub name: String,

    /// Generated module text
    pub code: String,

    /// SHA-256 of `code`, hex encoded
    pub hash: String,
}

impl CompiledModule {
    /// Generated size in bytes
    pub fn size(&self) -> usize {
        self.code.len()
    }
}
