//! Activation: locate the .NET runtime and bootstrap the LibMan CLI.
use crate::error::LibmanError;
use crate::process::{CommandInvocation, CommandRunner};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// NuGet package id of the LibMan global tool.
pub const TOOL_PACKAGE: &str = "Microsoft.Web.LibraryManager.Cli";

pub const RUNTIME_MISSING: &str = "dotnet not found; install the .NET SDK first";

/// LibMan tool installed under a private `--tool-path` directory.
#[derive(Debug, Clone)]
pub struct LibmanTool {
    tool_dir: PathBuf,
}

impl LibmanTool {
    pub fn new(tool_dir: PathBuf) -> Self {
        Self { tool_dir }
    }

    pub fn tool_dir(&self) -> &Path {
        &self.tool_dir
    }

    pub fn executable(&self) -> PathBuf {
        self.tool_dir
            .join(format!("libman{}", std::env::consts::EXE_SUFFIX))
    }

    pub fn is_installed(&self) -> bool {
        self.executable().is_file()
    }

    pub fn install_invocation(&self, dotnet: &Path) -> CommandInvocation {
        CommandInvocation::new(dotnet)
            .arg("tool")
            .arg("install")
            .arg(TOOL_PACKAGE)
            .option("--tool-path", self.tool_dir.display().to_string())
    }

    /// Install the tool when its executable is absent. Returns whether an
    /// install ran.
    pub fn ensure_installed(&self, runner: &dyn CommandRunner, dotnet: &Path) -> Result<bool> {
        if self.is_installed() {
            return Ok(false);
        }
        tracing::info!(tool_dir = %self.tool_dir.display(), "installing libman tool");
        runner.run(&self.install_invocation(dotnet))?;
        if !self.is_installed() {
            return Err(LibmanError::ToolNotFound(format!(
                "libman was not found at {} after install",
                self.executable().display()
            ))
            .into());
        }
        Ok(true)
    }
}

/// Check that the runtime answers `dotnet --version`.
pub fn probe_runtime(runner: &dyn CommandRunner, dotnet: &Path) -> Result<String> {
    let probe = CommandInvocation::new(dotnet).option("--version", "");
    match runner.run(&probe) {
        Ok(outcome) => {
            let version = outcome.stdout.trim().to_string();
            tracing::debug!(version = %version, "dotnet runtime found");
            Ok(version)
        }
        Err(err) => {
            tracing::debug!(error = %format!("{err:#}"), "dotnet probe failed");
            Err(LibmanError::ToolNotFound(RUNTIME_MISSING.to_string()).into())
        }
    }
}
