//! Runtime configuration: cache location, registry URL, concurrency, and
//! link mode.
//!
//! Values resolve in precedence order: environment variables
//! (`ERUDITA_CACHE_DIR`, `ERUDITA_REGISTRY_URL`), then `config.toml` in
//! the platform config directory, then built-in defaults. The config
//! file is optional and every field in it is optional.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::links::LinkMode;
use crate::pool::DEFAULT_CONCURRENCY;
use crate::registry::DEFAULT_REGISTRY_URL;

/// Environment variable overriding the cache root directory.
pub const CACHE_DIR_ENV: &str = "ERUDITA_CACHE_DIR";

/// Environment variable overriding the registry base URL.
pub const REGISTRY_URL_ENV: &str = "ERUDITA_REGISTRY_URL";

const CONFIG_FILE: &str = "config.toml";

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory of the shared documentation cache.
    pub cache_root: PathBuf,
    /// Registry base URL for origin resolution.
    pub registry_url: String,
    /// Concurrent document fetches per package.
    pub concurrency: usize,
    /// Default link mode for installs.
    pub link_mode: LinkMode,
}

/// Shape of the optional `config.toml`. Unknown fields are ignored so
/// older binaries keep working against newer config files.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    cache_dir: Option<PathBuf>,
    registry: Option<String>,
    concurrency: Option<usize>,
    link_mode: Option<LinkMode>,
}

impl Config {
    /// Loads configuration from the environment, the optional config
    /// file, and built-in defaults.
    pub fn load() -> Result<Self> {
        let file = read_config_file()?;

        let cache_root = match env_cache_dir().or(file.cache_dir) {
            Some(dir) => dir,
            None => default_cache_root()?,
        };

        Ok(Self {
            cache_root,
            registry_url: env_registry_url()
                .or(file.registry)
                .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string()),
            concurrency: file.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            link_mode: file.link_mode.unwrap_or_default(),
        })
    }
}

fn read_config_file() -> Result<ConfigFile> {
    let Some(dirs) = project_dirs() else {
        return Ok(ConfigFile::default());
    };
    let path = dirs.config_dir().join(CONFIG_FILE);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ConfigFile::default()),
        Err(e) => {
            return Err(Error::Config(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };
    let parsed = toml::from_str(&raw)
        .map_err(|e| Error::Config(format!("invalid {}: {e}", path.display())))?;
    debug!(path = %path.display(), "loaded configuration file");
    Ok(parsed)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "erudita", "erudita")
}

fn env_cache_dir() -> Option<PathBuf> {
    let dir = env::var(CACHE_DIR_ENV).ok()?;
    let trimmed = dir.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

fn env_registry_url() -> Option<String> {
    let url = env::var(REGISTRY_URL_ENV).ok()?;
    let trimmed = url.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn default_cache_root() -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .ok_or_else(|| {
            Error::Config("cannot determine a cache directory for this platform".to_string())
        })
}
