//! Update command: re-fetch cached documentation from its recorded origin.

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use erudita_core::{Config, FetchPhase, PackageKey, Pipeline, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;

/// Executes the update command for the given specs, or for every cached
/// package when `specs` is empty.
pub async fn execute(config: &Config, specs: &[String], quiet: bool) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;

    let keys: Vec<PackageKey> = if specs.is_empty() {
        pipeline
            .store()
            .list()?
            .iter()
            .filter_map(|meta| PackageKey::parse(&meta.name).ok())
            .collect()
    } else {
        specs
            .iter()
            .map(|spec| PackageKey::parse(spec))
            .collect::<erudita_core::Result<_>>()?
    };

    if keys.is_empty() {
        if !quiet {
            println!("No documentation cached. Use 'erudita install' to add packages.");
        }
        return Ok(());
    }

    let mut updated = 0usize;
    let mut failed = 0usize;

    for key in &keys {
        match update_one(&pipeline, key, quiet).await {
            Ok(()) => updated += 1,
            Err(e) => {
                eprintln!("{} {}: {e}", "✗".red(), key.to_string().red());
                failed += 1;
            },
        }
    }

    if !quiet && keys.len() > 1 {
        let failures = if failed > 0 {
            failed.to_string().red()
        } else {
            failed.to_string().normal()
        };
        println!(
            "\nSummary: {} updated, {failures} failed",
            updated.to_string().green()
        );
    }

    if failed > 0 && updated == 0 {
        anyhow::bail!("no packages could be updated");
    }
    Ok(())
}

/// Re-fetches one package. The cache metadata remembers where the
/// documentation came from, so no registry round trip is needed.
async fn update_one(pipeline: &Pipeline, key: &PackageKey, quiet: bool) -> Result<()> {
    let Some(meta) = pipeline.store().meta(key)? else {
        let versions = pipeline.store().cached_versions(&key.name)?;
        if versions.is_empty() {
            anyhow::bail!("'{key}' is not cached. Use 'erudita install {key}' first.");
        }
        anyhow::bail!(
            "'{key}' is not cached. Cached versions: {}",
            versions.join(", ")
        );
    };

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        create_spinner(&format!("Updating {key}..."))
    };

    let report = pipeline
        .cache_package_from(key, &meta.source_url, Some(progress_for(&spinner)))
        .await?;
    spinner.finish_and_clear();

    if !quiet {
        let tail = if report.failures > 0 {
            format!("({} documents, {} failed)", report.documents, report.failures)
        } else {
            format!("({} documents)", report.documents)
        };
        println!("{} {} {tail}", "✓ Updated".green(), key.to_string().green());
    }
    Ok(())
}

fn progress_for(spinner: &ProgressBar) -> ProgressCallback {
    let pb = spinner.clone();
    Arc::new(move |phase, done, total, errors| match phase {
        FetchPhase::Index => pb.set_message("Parsing index..."),
        FetchPhase::Documents => {
            if errors > 0 {
                pb.set_message(format!("Fetching documents ({done}/{total}, {errors} failed)"));
            } else {
                pb.set_message(format!("Fetching documents ({done}/{total})"));
            }
        },
    })
}

fn create_spinner(message: &str) -> ProgressBar {
    if !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb
}
