//! Manifest reader for `libman.json`.
//!
//! The manifest is read fresh at the start of each operation and never
//! written here; the LibMan tool owns its contents.
use crate::error::{required, LibmanError};
use crate::interaction::UserInteraction;
use crate::util::display_path;
use crate::workspace::Workspace;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "libman.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub default_provider: String,
    #[serde(default)]
    pub default_destination: Option<String>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(skip)]
    pub source_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LibraryEntry {
    pub library: String,
    #[serde(default)]
    pub destination: Option<String>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read manifest {}", path.display()))?;
        let mut manifest: Manifest = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse manifest {}", path.display()))?;
        manifest.source_path = path.to_path_buf();
        tracing::debug!(
            path = %path.display(),
            version = %manifest.version,
            provider = %manifest.default_provider,
            libraries = manifest.libraries.len(),
            "manifest loaded"
        );
        Ok(manifest)
    }

    /// Directory holding the manifest; the tool runs from here.
    pub fn directory(&self) -> &Path {
        self.source_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// `defaultDestination`, ignoring a blank value.
    pub fn default_destination(&self) -> Option<&str> {
        self.default_destination
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn library_names(&self) -> Vec<String> {
        self.libraries
            .iter()
            .map(|entry| entry.library.clone())
            .collect()
    }
}

/// Pick the manifest to operate on.
///
/// No match fails, one match is used as-is, and several matches ask the user.
pub fn select_manifest_path(
    workspace: &dyn Workspace,
    ui: &mut dyn UserInteraction,
) -> Result<PathBuf> {
    let mut candidates = workspace.find_files(MANIFEST_FILE_NAME)?;
    match candidates.len() {
        0 => Err(LibmanError::ManifestNotFound {
            root: workspace.root().to_path_buf(),
        }
        .into()),
        1 => Ok(candidates.remove(0)),
        _ => {
            let labels: Vec<String> = candidates
                .iter()
                .map(|path| display_path(path, Some(workspace.root())))
                .collect();
            let picked = ui.pick_one("Select libman.json", &labels)?;
            let index = required(picked.filter(|index| *index < labels.len()))?;
            tracing::debug!(manifest = %labels[index], "manifest selected");
            Ok(candidates.swap_remove(index))
        }
    }
}

/// Select and parse the manifest for one operation.
pub fn load_manifest(workspace: &dyn Workspace, ui: &mut dyn UserInteraction) -> Result<Manifest> {
    let path = select_manifest_path(workspace, ui)?;
    Manifest::load(&path)
}
