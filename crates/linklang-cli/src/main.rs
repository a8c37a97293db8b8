//! LinkLang CLI
//!
//! Compiles `.chain` programs to runtime modules and manages projects.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::OutputFormat;

/// LinkLang - chain DSL compiler
#[derive(Parser)]
#[command(name = "linklang")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "linklang.yaml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new LinkLang project
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Project name (defaults to directory name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Compile chain files to JavaScript modules
    Compile {
        /// Compile a single file instead of the whole project
        source: Option<String>,

        /// Output path for a single file (defaults to the source with a .js extension)
        #[arg(short, long, requires = "source")]
        output: Option<String>,

        /// Emit a source-line comment before each statement
        #[arg(long)]
        debug: bool,

        /// Diagnostic output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Lex and parse chain files without generating code
    Check {
        /// Check a single file instead of the whole project
        source: Option<String>,

        /// Diagnostic output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout stays reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init { path, name } => {
            commands::init::run(&path, name.as_deref()).await?;
        }
        Commands::Compile {
            source,
            output,
            debug,
            format,
        } => {
            commands::compile::run(
                &cli.config,
                source.as_deref(),
                output.as_deref(),
                debug,
                format,
            )
            .await?;
        }
        Commands::Check { source, format } => {
            commands::check::run(&cli.config, source.as_deref(), format).await?;
        }
    }

    Ok(())
}
