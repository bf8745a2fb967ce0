//! erudita CLI entry point.
//!
//! Parses the command line, initializes logging, and dispatches to the
//! command implementations in [`commands`]. All cache and network logic
//! lives in `erudita-core`; this binary only orchestrates it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use erudita_core::Config;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;
    execute_command(cli).await
}

fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    // The MCP server owns stdout for JSON-RPC frames; logs go to stderr.
    if matches!(cli.command, Commands::Mcp) {
        tracing::subscriber::set_global_default(builder.with_writer(std::io::stderr).finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}

async fn execute_command(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(dir) = cli.cache_dir {
        config.cache_root = dir;
    }
    let quiet = cli.quiet;

    match cli.command {
        Commands::Install {
            specs,
            deps,
            mode,
            force,
            concurrency,
            project_dir,
        } => {
            if let Some(n) = concurrency {
                config.concurrency = n;
            }
            let options = commands::InstallOptions {
                specs,
                deps: deps.map(Into::into),
                mode: mode.into(),
                force,
                project_dir: resolve_project_dir(project_dir)?,
            };
            commands::install(&config, options, quiet).await
        },

        Commands::Update { specs, concurrency } => {
            if let Some(n) = concurrency {
                config.concurrency = n;
            }
            commands::update_packages(&config, &specs, quiet).await
        },

        Commands::List { json } => commands::list_packages(&config, json),

        Commands::Show { spec, doc } => commands::show_package(&config, &spec, doc.as_deref()),

        Commands::Remove { specs } => commands::remove_packages(&config, &specs, quiet),

        Commands::Clean { yes } => commands::clean_cache(&config, yes),

        Commands::Mcp => commands::serve_mcp(&config).await,
    }
}

fn resolve_project_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}
