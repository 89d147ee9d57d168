//! Package search for the install prompt.
//!
//! A [`PackageSearch`] session turns raw, incrementally typed queries into
//! suggestion entries. `name` queries search the registry; `name@` queries
//! list the versions published for `name`. Results are memoized per raw query
//! for the lifetime of the session.
mod cache;
mod cdnjs;

pub use cache::SuggestionCache;
pub use cdnjs::{CdnjsRegistry, DEFAULT_REGISTRY_URL};

use anyhow::Result;
use serde::Deserialize;

/// Separator between package name and version in a LibMan identifier.
pub const VERSION_SEPARATOR: char = '@';

/// One selectable entry in the install prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSuggestion {
    pub label: String,
    pub package_name: String,
    pub package_version: Option<String>,
}

impl SearchSuggestion {
    pub fn package(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            package_name: name,
            package_version: None,
        }
    }

    pub fn versioned(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let version = version.into();
        Self {
            label: format!("{name}{VERSION_SEPARATOR}{version}"),
            package_name: name,
            package_version: Some(version),
        }
    }

    /// Parse text typed by the user (`name` or `name@version`).
    pub fn from_identifier(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.split_once(VERSION_SEPARATOR) {
            Some((name, version)) => {
                let (name, version) = (name.trim(), version.trim());
                if !is_valid_package_name(name) {
                    return None;
                }
                if version.is_empty() {
                    Some(Self::package(name))
                } else {
                    Some(Self::versioned(name, version))
                }
            }
            None => is_valid_package_name(raw).then(|| Self::package(raw)),
        }
    }

    /// Identifier passed to `libman install`.
    pub fn identifier(&self) -> String {
        match &self.package_version {
            Some(version) => format!("{}{VERSION_SEPARATOR}{version}", self.package_name),
            None => self.package_name.clone(),
        }
    }
}

/// One hit from the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LibrarySummary {
    pub name: String,
    /// URL of the latest default file, not a version string.
    #[serde(default)]
    #[allow(dead_code)]
    pub latest: Option<String>,
}

/// Remote metadata source behind the search session.
pub trait PackageRegistry {
    /// Libraries whose name matches `term`.
    fn search(&self, term: &str) -> Result<Vec<LibrarySummary>>;

    /// Versions with published assets for library `name`.
    fn versions(&self, name: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup<'q> {
    Search(&'q str),
    Versions(&'q str),
}

fn classify(query: &str) -> Option<Lookup<'_>> {
    if let Some((name, _)) = query.split_once(VERSION_SEPARATOR) {
        let name = name.trim();
        return is_valid_package_name(name).then_some(Lookup::Versions(name));
    }
    let term = query.trim();
    is_valid_package_name(term).then_some(Lookup::Search(term))
}

/// Registry names are used as a URL path segment, so only plain names pass.
pub fn is_valid_package_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'))
}

/// Search state for one install prompt.
pub struct PackageSearch<'a> {
    registry: &'a dyn PackageRegistry,
    cache: SuggestionCache,
}

impl<'a> PackageSearch<'a> {
    pub fn new(registry: &'a dyn PackageRegistry, capacity: usize) -> Self {
        Self {
            registry,
            cache: SuggestionCache::new(capacity),
        }
    }

    /// Suggestions for the exact raw `query`, hitting the registry at most
    /// once per distinct query while it stays cached.
    pub fn suggest(&mut self, query: &str) -> Result<Vec<SearchSuggestion>> {
        if let Some(cached) = self.cache.get(query) {
            tracing::debug!(query, hits = cached.len(), "suggestion cache hit");
            return Ok(cached.to_vec());
        }
        let Some(lookup) = classify(query) else {
            return Ok(Vec::new());
        };
        let suggestions = match lookup {
            Lookup::Search(term) => self
                .registry
                .search(term)?
                .into_iter()
                .map(|library| SearchSuggestion::package(library.name))
                .collect::<Vec<_>>(),
            Lookup::Versions(name) => self
                .registry
                .versions(name)?
                .into_iter()
                .map(|version| SearchSuggestion::versioned(name, version))
                .collect::<Vec<_>>(),
        };
        self.cache.insert(query.to_string(), suggestions.clone());
        tracing::debug!(query, cached = self.cache.len(), "suggestions cached");
        Ok(suggestions)
    }

    /// Like [`suggest`](Self::suggest), but a failed lookup is logged and
    /// shown as no suggestions. Failures are not cached.
    pub fn suggest_or_empty(&mut self, query: &str) -> Vec<SearchSuggestion> {
        match self.suggest(query) {
            Ok(suggestions) => suggestions,
            Err(err) => {
                tracing::warn!(query, error = %format!("{err:#}"), "package lookup failed");
                Vec::new()
            }
        }
    }

    #[cfg(test)]
    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }
}
