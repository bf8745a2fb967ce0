//! List command: show cached packages as text or JSON.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use erudita_core::{Config, DocStore, PackageKey};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PackageRow {
    name: String,
    version: Option<String>,
    source_url: String,
    fetched_at: DateTime<Utc>,
    documents: usize,
}

/// Executes the list command.
pub fn execute(config: &Config, json: bool) -> Result<()> {
    let store = DocStore::new(&config.cache_root)?;
    let metas = store.list()?;

    if metas.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("No documentation cached. Use 'erudita install' to add packages.");
        }
        return Ok(());
    }

    let mut rows = Vec::with_capacity(metas.len());
    for meta in metas {
        let (name, version, documents) = match PackageKey::parse(&meta.name) {
            Ok(key) => {
                let documents = store.document_names(&key)?.len();
                (key.name, key.version, documents)
            },
            // Entries written by hand or by other tools still list.
            Err(_) => (meta.name.clone(), None, 0),
        };
        rows.push(PackageRow {
            name,
            version,
            source_url: meta.source_url,
            fetched_at: meta.fetched_at,
            documents,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            let title = match &row.version {
                Some(version) => format!("{}@{version}", row.name),
                None => row.name.clone(),
            };
            println!("{} - {}", title.green(), row.source_url.bright_black());
            println!(
                "  {} documents, fetched {}",
                row.documents,
                row.fetched_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }

    Ok(())
}
