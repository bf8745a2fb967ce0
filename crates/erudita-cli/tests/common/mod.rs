#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Create a configured `erudita` command rooted at the given cache dir.
#[allow(dead_code)]
pub fn erudita_cmd(cache_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("erudita").expect("erudita binary builds");
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("ERUDITA_CACHE_DIR", cache_dir);
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Serves npm-style metadata at `route` whose homepage points back at the
/// mock server itself, keeping index fetches on the same host.
#[allow(dead_code)]
pub async fn mount_registry(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "homepage": server.uri(),
        })))
        .mount(server)
        .await;
}

/// Serves an llms.txt index with two linked documents.
#[allow(dead_code)]
pub async fn mount_docs_site(server: &MockServer, title: &str) {
    let index = format!(
        "# {title}\n\n> JavaScript UI library.\n\n## Docs\n\n\
         - [Introduction](/docs/intro.md): Getting started\n\
         - [Hooks](/docs/hooks.md): Built-in hooks reference\n"
    );
    Mock::given(method("GET"))
        .and(path("/llms.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/intro.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "# Introduction\n\n{title} renders things.\n"
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/hooks.md"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("# Hooks\n\nuseState and friends.\n"),
        )
        .mount(server)
        .await;
}
