//! Command-line interface definition.
//!
//! Declarative clap setup: [`Cli`] carries the global flags, [`Commands`]
//! has one variant per subcommand. Argument types stay CLI-shaped here and
//! convert into `erudita-core` types at the dispatch boundary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use erudita_core::{DependencyFilter, LinkMode};

/// Offline llms.txt documentation for your project's dependencies.
#[derive(Parser, Debug)]
#[command(name = "erudita")]
#[command(version)]
#[command(about = "Offline llms.txt documentation for your dependencies", long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational output (errors still print)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Cache directory override
    #[arg(
        long = "cache-dir",
        global = true,
        value_name = "DIR",
        env = "ERUDITA_CACHE_DIR"
    )]
    pub cache_dir: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and cache documentation, then link it into the project
    ///
    /// With package specs, installs exactly those packages. With --deps,
    /// installs everything listed in the project's package.json. With no
    /// arguments, reconciles the project against its erudita.json manifest:
    /// missing packages are fetched and stale links are pruned.
    Install {
        /// Package specs to install, e.g. `react@18.2.0` or `@types/node`
        #[arg(value_name = "SPEC")]
        specs: Vec<String>,

        /// Install the project's package.json dependencies instead of specs
        #[arg(long, value_enum, value_name = "FILTER", conflicts_with = "specs")]
        deps: Option<DepsFilter>,

        /// How to materialize documentation inside the project
        #[arg(long, value_enum, default_value = "link")]
        mode: LinkModeArg,

        /// Re-fetch even when the package is already cached
        #[arg(short = 'f', long)]
        force: bool,

        /// Maximum concurrent document downloads
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,

        /// Project directory (defaults to the current directory)
        #[arg(long = "project-dir", value_name = "DIR")]
        project_dir: Option<PathBuf>,
    },

    /// Re-fetch cached documentation from its recorded origin
    Update {
        /// Package specs to update (all cached packages when omitted)
        #[arg(value_name = "SPEC")]
        specs: Vec<String>,

        /// Maximum concurrent document downloads
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,
    },

    /// List cached packages
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print cached documentation for a package
    Show {
        /// Package spec, e.g. `react@18.2.0`
        #[arg(value_name = "SPEC")]
        spec: String,

        /// Print a single document instead of the index, e.g. `docs/hooks.md`
        #[arg(long, value_name = "PATH")]
        doc: Option<String>,
    },

    /// Remove packages from the cache
    #[command(visible_alias = "rm")]
    Remove {
        /// Package specs to remove
        #[arg(value_name = "SPEC", required = true)]
        specs: Vec<String>,
    },

    /// Delete every cached package
    Clean {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Run the MCP server over stdio
    Mcp,
}

/// Dependency sections of package.json to install from.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DepsFilter {
    /// dependencies and devDependencies
    All,
    /// dependencies only
    Prod,
    /// devDependencies only
    Dev,
}

impl From<DepsFilter> for DependencyFilter {
    fn from(value: DepsFilter) -> Self {
        match value {
            DepsFilter::All => Self::All,
            DepsFilter::Prod => Self::Prod,
            DepsFilter::Dev => Self::Dev,
        }
    }
}

/// Link strategy flag for `install --mode`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LinkModeArg {
    /// Symlink into the shared cache
    Link,
    /// Deep copy of the cache entry
    Copy,
}

impl From<LinkModeArg> for LinkMode {
    fn from(value: LinkModeArg) -> Self {
        match value {
            LinkModeArg::Link => Self::Link,
            LinkModeArg::Copy => Self::Copy,
        }
    }
}
