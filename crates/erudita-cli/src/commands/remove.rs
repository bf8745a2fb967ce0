//! Remove command: delete packages from the cache.

use anyhow::Result;
use colored::Colorize;
use erudita_core::{Config, DocStore, PackageKey};

/// Removes each spec from the cache. A spec that is not cached prints a
/// notice rather than failing, so batch removals run to completion.
pub fn execute(config: &Config, specs: &[String], quiet: bool) -> Result<()> {
    let store = DocStore::new(&config.cache_root)?;

    for spec in specs {
        let key = PackageKey::parse(spec)?;
        if store.remove(&key)? {
            if !quiet {
                println!("{} {}", "✓ Removed".green(), key.to_string().green());
            }
        } else if !quiet {
            println!("Package '{key}' is not cached");
        }
    }

    Ok(())
}
