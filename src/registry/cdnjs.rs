//! HTTP client for the cdnjs metadata API.
//!
//! `GET /libraries?search=<term>` returns `{results: [{name, latest}], total}`
//! and `GET /libraries/<name>?fields=assets` returns
//! `{name, latest, assets: [{version, files}]}`.
use super::{is_valid_package_name, LibrarySummary, PackageRegistry};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_REGISTRY_URL: &str = "https://api.cdnjs.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<LibrarySummary>,
    #[serde(default)]
    #[allow(dead_code)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct AssetsResponse {
    #[serde(default)]
    assets: Vec<AssetGroup>,
}

#[derive(Debug, Deserialize)]
struct AssetGroup {
    version: String,
    #[serde(default)]
    #[allow(dead_code)]
    files: Vec<String>,
}

pub struct CdnjsRegistry {
    agent: ureq::Agent,
    base_url: String,
}

impl CdnjsRegistry {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: (&str, &str)) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let mut response = self
            .agent
            .get(&url)
            .query(query.0, query.1)
            .call()
            .with_context(|| format!("GET {url}"))?;
        response
            .body_mut()
            .read_json::<T>()
            .with_context(|| format!("parse response from {url}"))
    }
}

impl PackageRegistry for CdnjsRegistry {
    fn search(&self, term: &str) -> Result<Vec<LibrarySummary>> {
        let response: SearchResponse = self.get_json("/libraries", ("search", term))?;
        tracing::debug!(term, results = response.results.len(), "cdnjs search");
        Ok(response.results)
    }

    fn versions(&self, name: &str) -> Result<Vec<String>> {
        if !is_valid_package_name(name) {
            return Err(anyhow!("invalid library name {name:?}"));
        }
        let response: AssetsResponse =
            self.get_json(&format!("/libraries/{name}"), ("fields", "assets"))?;
        tracing::debug!(name, versions = response.assets.len(), "cdnjs assets");
        Ok(response
            .assets
            .into_iter()
            .map(|group| group.version)
            .collect())
    }
}
