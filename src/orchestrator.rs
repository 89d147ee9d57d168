//! LibMan operations: init, install, uninstall, restore, clean.
//!
//! Each operation gathers what it needs from the manifest and the user, then
//! runs exactly one tool invocation. A dismissed prompt aborts before any
//! process is spawned.
use crate::error::required;
use crate::interaction::UserInteraction;
use crate::manifest::{load_manifest, Manifest};
use crate::process::{CommandInvocation, CommandRunner, ProcessOutcome};
use crate::registry::{PackageRegistry, PackageSearch, SearchSuggestion};
use crate::workspace::Workspace;
use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// The only provider offered by `init`.
pub const DEFAULT_PROVIDER: &str = "cdnjs";

/// Values that skip the matching `init` prompt.
#[derive(Debug, Clone, Default)]
pub struct InitRequest {
    pub directory: Option<PathBuf>,
    pub destination: Option<String>,
}

/// Values that skip the matching `install` prompt.
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    pub package: Option<String>,
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UninstallRequest {
    pub library: Option<String>,
}

pub struct Orchestrator<'a> {
    tool: PathBuf,
    workspace: &'a dyn Workspace,
    runner: &'a dyn CommandRunner,
    registry: &'a dyn PackageRegistry,
    search_capacity: usize,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        tool: PathBuf,
        workspace: &'a dyn Workspace,
        runner: &'a dyn CommandRunner,
        registry: &'a dyn PackageRegistry,
        search_capacity: usize,
    ) -> Self {
        Self {
            tool,
            workspace,
            runner,
            registry,
            search_capacity,
        }
    }

    fn action(&self, action: &str) -> CommandInvocation {
        CommandInvocation::new(&self.tool).arg(action)
    }

    fn execute(&self, invocation: CommandInvocation) -> Result<ProcessOutcome> {
        tracing::info!(command = %invocation.command_line(), "running libman");
        self.runner.run(&invocation)
    }

    /// Create a manifest in a chosen directory.
    pub fn init(
        &self,
        ui: &mut dyn UserInteraction,
        request: InitRequest,
    ) -> Result<ProcessOutcome> {
        let directory = match request.directory {
            Some(directory) => directory,
            None => required(ui.pick_folder("Select the folder for libman.json")?)?,
        };
        if !directory.is_dir() {
            return Err(anyhow!("{} is not a directory", directory.display()));
        }

        let providers = vec![DEFAULT_PROVIDER.to_string()];
        let picked = ui.pick_one("Default provider", &providers)?;
        let provider = required(picked.and_then(|index| providers.get(index)))?;

        let destination = match request.destination {
            Some(destination) => destination,
            None => required(ui.input("Default destination", "wwwroot/lib")?)?,
        };

        let mut invocation = self
            .action("init")
            .option("--default-provider", provider.as_str())
            .current_dir(directory);
        let destination = destination.trim();
        if !destination.is_empty() {
            invocation.add_option("--default-destination", destination);
        }
        self.execute(invocation)
    }

    /// Search for a package and add it to the manifest.
    pub fn install(
        &self,
        ui: &mut dyn UserInteraction,
        request: InstallRequest,
    ) -> Result<ProcessOutcome> {
        let manifest = load_manifest(self.workspace, ui)?;

        let package = match request.package.as_deref() {
            Some(raw) => SearchSuggestion::from_identifier(raw)
                .ok_or_else(|| anyhow!("invalid package identifier {raw:?}"))?,
            None => self.search_package(ui)?,
        };

        let mut invocation = self
            .action("install")
            .arg(package.identifier())
            .current_dir(manifest.directory());
        if let Some(destination) = self.install_destination(ui, &manifest, request.destination)? {
            invocation.add_option("--destination", destination);
        }
        self.execute(invocation)
    }

    fn search_package(&self, ui: &mut dyn UserInteraction) -> Result<SearchSuggestion> {
        let mut session = PackageSearch::new(self.registry, self.search_capacity);
        let chosen = ui.search("Package name", &mut |query: &str| {
            session.suggest_or_empty(query)
        })?;
        Ok(required(chosen)?)
    }

    /// Destination for `install`: an explicit value wins; otherwise one is
    /// required only when the manifest has no default.
    fn install_destination(
        &self,
        ui: &mut dyn UserInteraction,
        manifest: &Manifest,
        explicit: Option<String>,
    ) -> Result<Option<String>> {
        if let Some(destination) = explicit.filter(|value| !value.trim().is_empty()) {
            return Ok(Some(destination.trim().to_string()));
        }
        if manifest.default_destination().is_some() {
            return Ok(None);
        }
        let answer = ui.input("Destination", "wwwroot/lib")?;
        let destination = answer
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Ok(Some(required(destination)?))
    }

    /// Remove one library listed in the manifest.
    pub fn uninstall(
        &self,
        ui: &mut dyn UserInteraction,
        request: UninstallRequest,
    ) -> Result<ProcessOutcome> {
        let manifest = load_manifest(self.workspace, ui)?;
        let names = manifest.library_names();
        if names.is_empty() {
            return Err(anyhow!(
                "no libraries installed in {}",
                manifest.source_path.display()
            ));
        }

        let library = match request.library {
            Some(library) => {
                if !names.contains(&library) {
                    return Err(anyhow!(
                        "{library} is not listed in {}",
                        manifest.source_path.display()
                    ));
                }
                library
            }
            None => {
                let picked = ui.pick_one("Select library to uninstall", &names)?;
                required(picked.and_then(|index| names.get(index)))?.clone()
            }
        };

        let invocation = self
            .action("uninstall")
            .arg(library)
            .current_dir(manifest.directory());
        self.execute(invocation)
    }

    /// Download every library listed in the manifest.
    pub fn restore(&self, ui: &mut dyn UserInteraction) -> Result<ProcessOutcome> {
        self.manifest_action(ui, "restore")
    }

    /// Delete the files restored for the manifest.
    pub fn clean(&self, ui: &mut dyn UserInteraction) -> Result<ProcessOutcome> {
        self.manifest_action(ui, "clean")
    }

    fn manifest_action(&self, ui: &mut dyn UserInteraction, action: &str) -> Result<ProcessOutcome> {
        let manifest = load_manifest(self.workspace, ui)?;
        let invocation = self.action(action).current_dir(manifest.directory());
        self.execute(invocation)
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
