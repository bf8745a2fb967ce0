mod common;

use common::{erudita_cmd, mount_docs_site, mount_registry};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;
use wiremock::MockServer;

#[tokio::test]
async fn install_then_list_json_reports_the_package() -> anyhow::Result<()> {
    let cache = tempdir()?;
    let project = tempdir()?;
    let server = MockServer::start().await;
    mount_registry(&server, "/react/18.2.0").await;
    mount_docs_site(&server, "React").await;

    erudita_cmd(cache.path())
        .env("ERUDITA_REGISTRY_URL", server.uri())
        .args(["install", "react@18.2.0", "--project-dir"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Installed react@18.2.0"));

    let out = erudita_cmd(cache.path())
        .args(["list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let rows: Value = serde_json::from_slice(&out)?;
    let rows = rows.as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 1, "expected exactly one cached package");
    let row = &rows[0];
    for key in ["name", "version", "sourceUrl", "fetchedAt", "documents"] {
        assert!(row.get(key).is_some(), "missing key: {key}");
    }
    assert_eq!(row["name"], "react");
    assert_eq!(row["version"], "18.2.0");
    assert_eq!(row["sourceUrl"], server.uri().as_str());
    assert_eq!(row["documents"], 2);
    Ok(())
}

#[tokio::test]
async fn unresolvable_package_fails_with_its_name_in_the_error() -> anyhow::Result<()> {
    let cache = tempdir()?;
    let project = tempdir()?;
    // No routes mounted: every registry lookup misses.
    let server = MockServer::start().await;

    erudita_cmd(cache.path())
        .env("ERUDITA_REGISTRY_URL", server.uri())
        .args(["install", "ghost@1.0.0", "--project-dir"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost@1.0.0"));
    Ok(())
}

#[test]
fn list_of_an_empty_cache_prints_a_hint() -> anyhow::Result<()> {
    let cache = tempdir()?;
    erudita_cmd(cache.path())
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No documentation cached"));

    let out = erudita_cmd(cache.path())
        .args(["list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let rows: Value = serde_json::from_slice(&out)?;
    assert_eq!(rows, Value::Array(Vec::new()));
    Ok(())
}
