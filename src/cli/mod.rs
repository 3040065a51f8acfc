//! Command-line interface for repo-context

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod export;

/// Convert a Git repository into a single LLM-friendly context document
#[derive(Parser)]
#[command(name = "repo-context")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    export: export::ExportArgs,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors: no progress bars, no summary
    #[arg(short, long)]
    quiet: bool,

    /// Print shell completions for SHELL and exit
    #[arg(long, value_name = "SHELL", value_enum)]
    completions: Option<clap_complete::Shell>,
}

pub fn run() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence over the flags.
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match &dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(err) if err.not_found() => debug!("No .env file found"),
        Err(err) => tracing::warn!("Ignoring unreadable .env file: {err}"),
    }

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    export::run(cli.export, cli.quiet)
}
