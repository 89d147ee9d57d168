//! Workspace capability: the directory tree the operations act on.
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories never searched for manifests.
const EXCLUDED_DIRS: &[&str] = &[".git", ".hg", ".svn", "CVS", "node_modules"];

pub trait Workspace {
    fn root(&self) -> &Path;

    /// Every file named `file_name` below the root, in a stable order.
    fn find_files(&self, file_name: &str) -> Result<Vec<PathBuf>>;
}

/// Workspace backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    pub fn new(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(anyhow!("workspace {} is not a directory", root.display()));
        }
        let root = root
            .canonicalize()
            .with_context(|| format!("resolve workspace {}", root.display()))?;
        Ok(Self { root })
    }
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

impl Workspace for FsWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    fn find_files(&self, file_name: &str) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| !is_excluded(entry))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(error = %err, "skip unreadable workspace entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && entry.file_name() == file_name {
                found.push(entry.into_path());
            }
        }
        found.sort();
        Ok(found)
    }
}
