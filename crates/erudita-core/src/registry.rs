//! Package-registry lookup for documentation origins.
//!
//! Given a package key, [`RegistryClient::resolve_origin`] asks an
//! npm-style registry for the package's metadata and derives a website
//! base URL from it: the `homepage` field when usable, otherwise the
//! `repository` URL rewritten to its web form. Every failure mode here
//! (network trouble, unknown package, unusable metadata) resolves to
//! `None`; callers decide whether a missing origin is an error.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::Result;
use crate::types::PackageKey;

/// Public npm registry used when no override is configured.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

const REGISTRY_TIMEOUT: Duration = Duration::from_secs(15);

/// The slice of registry metadata this crate cares about.
#[derive(Debug, Deserialize)]
struct RegistryMetadata {
    homepage: Option<String>,
    repository: Option<RepositoryField>,
}

/// npm allows `repository` to be either a bare URL string or an object
/// with a `url` member.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RepositoryField {
    Url(String),
    Object { url: Option<String> },
}

impl RepositoryField {
    fn into_url(self) -> Option<String> {
        match self {
            Self::Url(url) => Some(url),
            Self::Object { url } => url,
        }
    }
}

/// Client for resolving documentation origins through a package registry.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    /// Creates a client against the public npm registry.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_REGISTRY_URL)
    }

    /// Creates a client against a custom registry base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REGISTRY_TIMEOUT)
            .user_agent(concat!("erudita/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolves the documentation origin URL for a package, or `None`
    /// when the registry lookup yields nothing usable.
    #[instrument(skip(self), fields(package = %key))]
    pub async fn resolve_origin(&self, key: &PackageKey) -> Option<String> {
        let url = self.metadata_url(key);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "registry request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(status = %response.status(), "registry lookup miss");
            return None;
        }
        let metadata: RegistryMetadata = match response.json().await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(error = %e, "registry metadata unparsable");
                return None;
            }
        };

        if let Some(origin) = metadata.homepage.as_deref().and_then(normalize_origin) {
            debug!(%origin, "resolved origin from homepage");
            return Some(origin);
        }
        let origin = metadata
            .repository
            .and_then(RepositoryField::into_url)
            .as_deref()
            .and_then(repository_to_website);
        match &origin {
            Some(origin) => debug!(%origin, "resolved origin from repository"),
            None => debug!("registry metadata has no usable origin"),
        }
        origin
    }

    /// Metadata URL for a package; scope separators are kept encoded the
    /// way npm expects, and a version narrows the lookup to one release.
    fn metadata_url(&self, key: &PackageKey) -> String {
        let name = key.name.replace('/', "%2F");
        match &key.version {
            Some(version) => format!("{}/{name}/{version}", self.base_url),
            None => format!("{}/{name}", self.base_url),
        }
    }
}

/// Normalizes a homepage-style URL into an origin base: upgrades http to
/// https (loopback hosts excepted), requires a well-formed URL with a
/// host, drops query and fragment, and strips a single trailing slash.
fn normalize_origin(raw: &str) -> Option<String> {
    let mut parsed = Url::parse(raw.trim()).ok()?;
    match parsed.scheme() {
        "https" => {}
        "http" => {
            let host = parsed.host_str()?;
            if !is_loopback(host) {
                parsed.set_scheme("https").ok()?;
            }
        }
        _ => return None,
    }
    parsed.host_str()?;
    parsed.set_query(None);
    parsed.set_fragment(None);

    let mut origin = parsed.to_string();
    if origin.ends_with('/') {
        origin.pop();
    }
    Some(origin)
}

/// Loopback hosts are left on plain http; docs served there are local
/// development servers without TLS.
fn is_loopback(host: &str) -> bool {
    host == "localhost" || host == "127.0.0.1" || host == "::1" || host == "[::1]"
}

/// Rewrites a repository locator into a browsable website URL: strips the
/// `git+` prefix and `.git` suffix, maps `git://` to `https://`, and
/// expands SSH-style `user@host:path` shorthand.
fn repository_to_website(raw: &str) -> Option<String> {
    let mut url = raw.trim().to_string();

    if let Some(rest) = url.strip_prefix("git+") {
        url = rest.to_string();
    }
    if let Some(rest) = url.strip_prefix("git://") {
        url = format!("https://{rest}");
    }
    if !url.contains("://") {
        if let Some((user_host, repo_path)) = url.split_once(':') {
            if let Some((_, host)) = user_host.split_once('@') {
                url = format!("https://{host}/{}", repo_path.trim_start_matches('/'));
            }
        }
    }
    if let Some(stripped) = url.strip_suffix(".git") {
        url = stripped.to_string();
    }

    normalize_origin(&url)
}
