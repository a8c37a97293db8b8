//! CLI command implementations

pub mod check;
pub mod compile;
pub mod init;

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use linklang_codegen::{CompileOptions, Diagnostic};
use linklang_core::Config;

/// Extension of chain source files
pub const SOURCE_EXTENSION: &str = "chain";

/// How diagnostics and results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// All `.chain` files under `dir`, sorted by path
pub fn discover_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Sources directory not found: {}", dir.display());
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
        {
            sources.push(path.to_path_buf());
        }
    }
    Ok(sources)
}

/// Compile options from the project file when present, defaults otherwise
pub fn options_for(config_path: &str) -> Result<CompileOptions> {
    if !Path::new(config_path).exists() {
        tracing::debug!("No project file at {}, using default target", config_path);
        return Ok(CompileOptions::default());
    }
    let config = Config::load(config_path).context("Failed to load configuration")?;
    Ok(CompileOptions::from_target(&config.project.target))
}

/// Print a diagnostic for `path` to stdout
pub fn report(path: &Path, diagnostic: &Diagnostic, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}: {}", path.display(), diagnostic),
        OutputFormat::Json => {
            let mut value = serde_json::to_value(diagnostic)?;
            value["file"] = serde_json::Value::String(path.display().to_string());
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
