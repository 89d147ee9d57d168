//! CLI argument parsing for the LibMan front-end.
//!
//! Every subcommand maps to one orchestrator operation; optional arguments
//! only pre-answer the prompts the operation would otherwise show.
use crate::config::CliOverrides;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "libman-front",
    version,
    about = "Interactive front-end for the LibMan client-side library manager",
    after_help = "Examples:\n  libman-front init --directory ./web\n  libman-front install\n  libman-front install jquery@3.7.1 --destination wwwroot/lib/jquery\n  libman-front uninstall jquery\n  libman-front restore --workspace ./src\n\nSet LIBMAN_FRONT_LOG=debug for a diagnostic trace.",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Workspace searched for libman.json files
    #[arg(long, value_name = "DIR", global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Directory holding the LibMan tool (installed there when missing)
    #[arg(long, value_name = "DIR", global = true)]
    pub tool_dir: Option<PathBuf>,

    /// Path to a libman-front config.json
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log diagnostic detail to stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config: self.config.clone(),
            tool_dir: self.tool_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a libman.json in a chosen folder
    Init(InitArgs),
    /// Search cdnjs and install a library
    Install(InstallArgs),
    /// Remove a library listed in libman.json
    Uninstall(UninstallArgs),
    /// Restore every library listed in libman.json
    Restore,
    /// Delete restored library files
    Clean,
    /// Check the .NET runtime and install the LibMan tool if missing
    Setup,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Folder for the new libman.json
    #[arg(long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Default destination written to libman.json
    #[arg(long, value_name = "DIR")]
    pub destination: Option<String>,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Library identifier (`name` or `name@version`); prompts when omitted
    #[arg(value_name = "PACKAGE")]
    pub package: Option<String>,

    /// Install destination, overriding defaultDestination
    #[arg(long, value_name = "DIR")]
    pub destination: Option<String>,
}

#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Library as listed in libman.json; prompts when omitted
    #[arg(value_name = "LIBRARY")]
    pub library: Option<String>,
}
