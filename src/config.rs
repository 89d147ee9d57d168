//! Settings for the front-end itself (not the LibMan manifest).
//!
//! Values resolve in priority order:
//! 1. CLI flags (`--tool-dir`)
//! 2. Environment (`LIBMAN_FRONT_TOOL_DIR`, `LIBMAN_FRONT_DOTNET`,
//!    `LIBMAN_FRONT_REGISTRY_URL`)
//! 3. The JSON config file (`--config`, else `<config_dir>/libman-front/config.json`)
//! 4. Built-in defaults
use crate::registry::DEFAULT_REGISTRY_URL;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR_NAME: &str = "libman-front";
pub const TOOL_DIR_ENV: &str = "LIBMAN_FRONT_TOOL_DIR";
pub const DOTNET_ENV: &str = "LIBMAN_FRONT_DOTNET";
pub const REGISTRY_URL_ENV: &str = "LIBMAN_FRONT_REGISTRY_URL";

const DEFAULT_SEARCH_CACHE_CAPACITY: usize = 64;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// On-disk config; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub tool_dir: Option<PathBuf>,
    pub dotnet: Option<PathBuf>,
    pub registry_url: Option<String>,
    pub search_cache_capacity: Option<usize>,
    pub http_timeout_secs: Option<u64>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tool_dir: PathBuf,
    pub dotnet: PathBuf,
    pub registry_url: String,
    pub search_cache_capacity: usize,
    pub http_timeout: Duration,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub tool_dir: Option<PathBuf>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.json"))
}

pub fn default_tool_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(".libman"))
        .ok_or_else(|| anyhow!("no local data directory; pass --tool-dir"))
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse config {}", path.display()))
}

/// Load settings from the process environment and the config file.
pub fn load(cli: &CliOverrides) -> Result<Settings> {
    let file = match &cli.config {
        Some(path) => load_file_config(path)?,
        None => match default_config_path().filter(|path| path.is_file()) {
            Some(path) => load_file_config(&path)?,
            None => FileConfig::default(),
        },
    };
    let settings = resolve(cli, file, |key| std::env::var(key).ok())?;
    validate(&settings)?;
    Ok(settings)
}

/// Merge CLI, environment, and file values over the defaults.
pub fn resolve(
    cli: &CliOverrides,
    file: FileConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let env_value = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    let tool_dir = match cli
        .tool_dir
        .clone()
        .or_else(|| env_value(TOOL_DIR_ENV).map(PathBuf::from))
        .or(file.tool_dir)
    {
        Some(dir) => dir,
        None => default_tool_dir()?,
    };
    // Manifest-scoped runs change directory, so the tool path must not be relative.
    let tool_dir = std::path::absolute(&tool_dir)
        .with_context(|| format!("resolve tool directory {}", tool_dir.display()))?;
    let dotnet = env_value(DOTNET_ENV)
        .map(PathBuf::from)
        .or(file.dotnet)
        .unwrap_or_else(|| PathBuf::from("dotnet"));
    let registry_url = env_value(REGISTRY_URL_ENV)
        .or(file.registry_url)
        .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());

    Ok(Settings {
        tool_dir,
        dotnet,
        registry_url,
        search_cache_capacity: file
            .search_cache_capacity
            .unwrap_or(DEFAULT_SEARCH_CACHE_CAPACITY),
        http_timeout: Duration::from_secs(
            file.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        ),
    })
}

pub fn validate(settings: &Settings) -> Result<()> {
    if settings.search_cache_capacity == 0 {
        return Err(anyhow!("search_cache_capacity must be greater than 0"));
    }
    if settings.http_timeout.is_zero() {
        return Err(anyhow!("http_timeout_secs must be greater than 0"));
    }
    let url = settings.registry_url.as_str();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(anyhow!(
            "registry_url must be an http(s) URL (got {url:?})"
        ));
    }
    Ok(())
}
