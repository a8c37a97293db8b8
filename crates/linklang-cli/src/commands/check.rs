//! Check chain files for syntax errors

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use linklang_codegen::{CompileOptions, Compiler, Diagnostic};
use linklang_core::Config;

use super::{OutputFormat, discover_sources, report};

/// Run the check command
pub async fn run(config_path: &str, source: Option<&str>, format: OutputFormat) -> Result<()> {
    let sources = match source {
        Some(source) => vec![PathBuf::from(source)],
        None => {
            let config = Config::load(config_path).context("Failed to load configuration")?;
            discover_sources(&config.sources_dir())?
        }
    };

    let compiler = Compiler::new(CompileOptions::default());
    let mut failures = 0;
    for path in &sources {
        if !check_one(&compiler, path, format).await? {
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files have errors", failures, sources.len());
    }

    tracing::info!("✓ {} files checked", sources.len());
    Ok(())
}

async fn check_one(compiler: &Compiler, path: &Path, format: OutputFormat) -> Result<bool> {
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match compiler.check(&source) {
        Ok(program) => {
            let statements = program.statements.len();
            match format {
                OutputFormat::Text => println!("{}: ok ({} statements)", path.display(), statements),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "file": path.display().to_string(),
                        "ok": true,
                        "statements": statements,
                    })
                ),
            }
            Ok(true)
        }
        Err(err) => {
            report(path, &Diagnostic::from(&err), format)?;
            Ok(false)
        }
    }
}
