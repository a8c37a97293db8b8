//! Compile chain files to JavaScript modules

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use linklang_codegen::{CompileOptions, CompiledModule, Compiler, Diagnostic};
use linklang_core::Config;

use super::{OutputFormat, discover_sources, options_for, report};

/// Run the compile command
pub async fn run(
    config_path: &str,
    source: Option<&str>,
    output: Option<&str>,
    debug: bool,
    format: OutputFormat,
) -> Result<()> {
    match source {
        Some(source) => compile_file(config_path, Path::new(source), output, debug, format).await,
        None => compile_project(config_path, debug, format).await,
    }
}

async fn compile_file(
    config_path: &str,
    path: &Path,
    output: Option<&str>,
    debug: bool,
    format: OutputFormat,
) -> Result<()> {
    let options = CompileOptions {
        debug,
        ..options_for(config_path)?
    };
    let compiler = Compiler::new(options);

    let target = output
        .map(PathBuf::from)
        .unwrap_or_else(|| path.with_extension("js"));

    match compile_one(&compiler, path).await? {
        Ok(module) => {
            write_module(&target, &module).await?;
            tracing::info!(
                "✓ {} -> {} ({} bytes, hash: {}...)",
                path.display(),
                target.display(),
                module.size(),
                &module.hash[..8]
            );
            Ok(())
        }
        Err(diagnostic) => {
            report(path, &diagnostic, format)?;
            anyhow::bail!("Compilation failed: {}", path.display())
        }
    }
}

async fn compile_project(config_path: &str, debug: bool, format: OutputFormat) -> Result<()> {
    tracing::info!("Loading configuration from {}", config_path);

    let config = Config::load(config_path).context("Failed to load configuration")?;
    let options = CompileOptions {
        debug,
        ..CompileOptions::from_target(&config.project.target)
    };
    let compiler = Compiler::new(options);

    let sources_dir = config.sources_dir();
    let output_dir = config.output_dir();
    let sources = discover_sources(&sources_dir)?;
    if sources.is_empty() {
        tracing::warn!("No .chain files found in {}", sources_dir.display());
        return Ok(());
    }

    tracing::info!("Compiling {} files in {}", sources.len(), sources_dir.display());

    // Compile everything before writing anything
    let mut modules = Vec::with_capacity(sources.len());
    let mut failures = 0;
    for path in &sources {
        match compile_one(&compiler, path).await? {
            Ok(module) => modules.push((path, module)),
            Err(diagnostic) => {
                failures += 1;
                report(path, &diagnostic, format)?;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!(
            "{} of {} files failed to compile; nothing was written",
            failures,
            sources.len()
        );
    }

    for (path, module) in &modules {
        let relative = path.strip_prefix(&sources_dir).unwrap_or(path.as_path());
        let target = output_dir.join(relative).with_extension("js");
        write_module(&target, module).await?;
        tracing::info!(
            "  ✓ {} ({} bytes, hash: {}...)",
            target.display(),
            module.size(),
            &module.hash[..8]
        );
    }

    tracing::info!("Compilation complete");
    Ok(())
}

/// Read and compile one file; the inner result carries compile failures
async fn compile_one(
    compiler: &Compiler,
    path: &Path,
) -> Result<std::result::Result<CompiledModule, Diagnostic>> {
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(compiler.compile(&name, &source).map_err(Diagnostic::from))
}

async fn write_module(target: &Path, module: &CompiledModule) -> Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(target, &module.code)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;
    tracing::debug!("Saved generated module: {}", target.display());
    Ok(())
}
