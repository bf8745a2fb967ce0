//! Cache cleaning command implementation

use anyhow::Result;
use colored::Colorize;
use erudita_core::{Config, DocStore};
use inquire::Confirm;
use is_terminal::IsTerminal;
use std::io::{self, Write};

/// Abstraction over the store operations needed by the clean command.
pub trait CleanStore {
    fn package_names(&self) -> Result<Vec<String>>;
    fn clear(&self) -> Result<()>;
}

impl CleanStore for DocStore {
    fn package_names(&self) -> Result<Vec<String>> {
        Ok(self.list()?.into_iter().map(|meta| meta.name).collect())
    }

    fn clear(&self) -> Result<()> {
        self.clear_all().map_err(anyhow::Error::from)
    }
}

/// High-level outcome produced by [`execute_clean`]. Useful for assertions in tests.
#[derive(Debug, PartialEq, Eq)]
pub enum CleanOutcome {
    /// No packages were cached to begin with.
    AlreadyEmpty,
    /// User declined the confirmation prompt.
    Cancelled,
    /// Cache cleaned with the number of packages removed.
    Cleaned { removed: usize },
}

/// Core clean implementation with injectable dependencies to enable deterministic tests.
///
/// # Errors
///
/// Returns an error if listing packages, confirmation, or deletion fails.
pub fn execute_clean<S, W, C>(
    store: &S,
    mut writer: W,
    assume_yes: bool,
    mut confirm: C,
) -> Result<CleanOutcome>
where
    S: CleanStore,
    W: Write,
    C: FnMut(&[String]) -> Result<bool>,
{
    let packages = store.package_names()?;

    if packages.is_empty() {
        writeln!(writer, "{} Cache is already empty", "ℹ".blue())?;
        return Ok(CleanOutcome::AlreadyEmpty);
    }

    writeln!(
        writer,
        "{} This will permanently delete cached documentation for {} package(s):",
        "⚠".yellow(),
        packages.len()
    )?;
    for package in &packages {
        writeln!(writer, "  • {package}")?;
    }
    writeln!(writer)?;

    if !assume_yes && !confirm(&packages)? {
        writeln!(writer, "{} Cancelled", "✗".red())?;
        return Ok(CleanOutcome::Cancelled);
    }

    store.clear()?;

    writeln!(writer, "{} Cache cleaned successfully", "✓".green())?;
    writeln!(writer)?;
    writeln!(writer, "To fetch documentation again, use:")?;
    writeln!(writer, "  erudita install <package>")?;

    Ok(CleanOutcome::Cleaned {
        removed: packages.len(),
    })
}

/// Cleans the entire cache using the real store and terminal IO.
///
/// # Errors
///
/// Returns an error if store access, user confirmation, or deletion fails.
pub fn run(config: &Config, yes: bool) -> Result<()> {
    let store = DocStore::new(&config.cache_root)?;
    let stdout = io::stdout();
    let mut stdout_lock = stdout.lock();

    // Treat an explicit --yes or the absence of a TTY as approval.
    let assume_yes = yes || !io::stdin().is_terminal();

    execute_clean(&store, &mut stdout_lock, assume_yes, |_packages| {
        Ok(Confirm::new("Delete all cached documentation?")
            .with_default(false)
            .prompt()?)
    })?;

    Ok(())
}
