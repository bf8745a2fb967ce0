//! Install command: fetch, cache, and link documentation.
//!
//! Three entry shapes share one code path. Explicit specs resolve through
//! the registry, `--deps` reads the project's package.json, and a bare
//! `erudita install` reconciles the project against its erudita.json
//! manifest, pruning links for packages that were removed from it.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use erudita_core::{
    read_package_dependencies, Config, DependencyFilter, FetchPhase, LinkManager, LinkMode,
    PackageKey, Pipeline, ProgressCallback, ProjectManifest, MANIFEST_NAME,
};
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;

/// Options collected from the install command line.
pub struct InstallOptions {
    /// Explicit package specs, empty for `--deps` or manifest runs.
    pub specs: Vec<String>,
    /// package.json sections to install from, when `--deps` was given.
    pub deps: Option<DependencyFilter>,
    /// Link strategy for materializing documentation in the project.
    pub mode: LinkMode,
    /// Re-fetch packages that are already cached.
    pub force: bool,
    /// Directory holding the project manifest and link directory.
    pub project_dir: PathBuf,
}

/// One unit of install work. `known_origin` is set when the manifest
/// already records where this package's documentation lives.
struct InstallJob {
    key: PackageKey,
    known_origin: Option<String>,
}

struct InstallOutcome {
    origin: String,
    fetched: bool,
    documents: usize,
    failures: usize,
}

/// Executes the install command.
pub async fn execute(config: &Config, options: InstallOptions, quiet: bool) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let mut manifest = ProjectManifest::load(&options.project_dir);
    let reconcile = options.specs.is_empty() && options.deps.is_none();

    let jobs = collect_jobs(&options, &manifest)?;
    if jobs.is_empty() {
        if !quiet {
            println!(
                "Nothing to install. Pass package specs, use --deps to scan package.json, \
                 or record packages in {MANIFEST_NAME}."
            );
        }
        return Ok(());
    }

    let links = LinkManager::new(&options.project_dir);
    let mut installed = 0usize;
    let mut reused = 0usize;
    let mut failed = 0usize;

    for job in &jobs {
        match install_one(&pipeline, &links, job, &options, quiet).await {
            Ok(outcome) => {
                manifest.insert(job.key.to_string(), outcome.origin);
                if outcome.fetched {
                    installed += 1;
                } else {
                    reused += 1;
                }
            },
            Err(e) => {
                eprintln!("{} {}: {e}", "✗".red(), job.key.to_string().red());
                failed += 1;
            },
        }
    }

    manifest.save(&options.project_dir)?;

    if reconcile {
        let keep: HashSet<String> = manifest.packages.keys().cloned().collect();
        for name in links.prune(&keep)? {
            if !quiet {
                println!("{} {name} (no longer in manifest)", "− Unlinked".yellow());
            }
        }
    }

    if !quiet && jobs.len() > 1 {
        let failures = if failed > 0 {
            failed.to_string().red()
        } else {
            failed.to_string().normal()
        };
        println!(
            "\nSummary: {} installed, {reused} already cached, {failures} failed",
            installed.to_string().green()
        );
    }

    if failed > 0 && installed == 0 && reused == 0 {
        anyhow::bail!("no packages could be installed");
    }
    Ok(())
}

/// Turns the command-line shape into a flat job list.
fn collect_jobs(options: &InstallOptions, manifest: &ProjectManifest) -> Result<Vec<InstallJob>> {
    if !options.specs.is_empty() {
        return options
            .specs
            .iter()
            .map(|spec| {
                let key = PackageKey::parse(spec)?;
                Ok(InstallJob {
                    key,
                    known_origin: None,
                })
            })
            .collect();
    }

    if let Some(filter) = options.deps {
        let names = read_package_dependencies(&options.project_dir, filter)?;
        return names
            .iter()
            .map(|name| {
                let key = PackageKey::parse(name)?;
                Ok(InstallJob {
                    key,
                    known_origin: None,
                })
            })
            .collect();
    }

    // Bare install: the manifest is the authority.
    let mut jobs = Vec::new();
    for (spec, entry) in &manifest.packages {
        match PackageKey::parse(spec) {
            Ok(key) => jobs.push(InstallJob {
                key,
                known_origin: Some(entry.url.clone()),
            }),
            Err(e) => tracing::warn!(spec = %spec, error = %e, "skipping unparsable manifest key"),
        }
    }
    Ok(jobs)
}

async fn install_one(
    pipeline: &Pipeline,
    links: &LinkManager,
    job: &InstallJob,
    options: &InstallOptions,
    quiet: bool,
) -> Result<InstallOutcome> {
    let key = &job.key;
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        create_spinner(&format!("Resolving {key}..."))
    };

    // A readable meta file marks a reusable cache entry; a missing or
    // damaged one falls through to a fresh fetch.
    let reusable = if options.force {
        None
    } else {
        pipeline.store().meta(key)?.map(|meta| meta.source_url)
    };

    let outcome = match reusable {
        Some(origin) => InstallOutcome {
            origin,
            fetched: false,
            documents: pipeline.store().document_names(key)?.len(),
            failures: 0,
        },
        None => {
            let report = match &job.known_origin {
                Some(origin) => {
                    spinner.set_message(format!("Fetching {key} from {origin}..."));
                    pipeline
                        .cache_package_from(key, origin, Some(progress_for(&spinner)))
                        .await?
                },
                None => {
                    pipeline
                        .cache_package(key, Some(progress_for(&spinner)))
                        .await?
                },
            };
            InstallOutcome {
                origin: report.origin,
                fetched: true,
                documents: report.documents,
                failures: report.failures,
            }
        },
    };

    spinner.set_message(format!("Linking {key}..."));
    links.create(key, &pipeline.store().package_dir(key), options.mode)?;
    spinner.finish_and_clear();

    if !quiet {
        if outcome.fetched {
            let tail = if outcome.failures > 0 {
                format!("({} documents, {} failed)", outcome.documents, outcome.failures)
            } else {
                format!("({} documents)", outcome.documents)
            };
            println!("{} {} {tail}", "✓ Installed".green(), key.to_string().green());
        } else {
            println!(
                "{} {} (already cached, {} documents)",
                "✓".green(),
                key.to_string().green(),
                outcome.documents
            );
        }
    }

    Ok(outcome)
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
