use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod error;
mod interaction;
mod manifest;
mod orchestrator;
mod process;
mod registry;
mod tool;
mod util;
mod workspace;

#[cfg(test)]
mod testing;

use cli::{Command, RootArgs};
use config::Settings;
use error::LibmanError;
use interaction::{Notice, TerminalInteraction, UserInteraction};
use orchestrator::{InitRequest, InstallRequest, Orchestrator, UninstallRequest};
use process::{CommandRunner, ProcessOutcome, SystemRunner};
use registry::CdnjsRegistry;
use tool::LibmanTool;
use workspace::FsWorkspace;

const LOG_ENV: &str = "LIBMAN_FRONT_LOG";

/// Exit status for an operation the user dismissed.
const EXIT_CANCELLED: u8 = 130;
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    let args = RootArgs::parse();
    init_tracing(args.global.verbose);

    let mut ui = TerminalInteraction;
    match run(args, &mut ui) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(exit_status(&err, &mut ui)),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Command boundary: cancellation is silent, everything else is shown.
fn exit_status(err: &anyhow::Error, ui: &mut dyn UserInteraction) -> u8 {
    if LibmanError::is_cancelled(err) {
        tracing::debug!("operation cancelled");
        return EXIT_CANCELLED;
    }
    ui.notify(Notice::Error, &format!("{err:#}"));
    EXIT_FAILURE
}

fn run(args: RootArgs, ui: &mut dyn UserInteraction) -> Result<()> {
    let settings = config::load(&args.global.overrides())?;
    let runner = SystemRunner;
    let tool = activate(&settings, &runner)?;

    let workspace = FsWorkspace::new(&args.global.workspace)?;
    let registry = CdnjsRegistry::new(&settings.registry_url, settings.http_timeout);
    let orchestrator = Orchestrator::new(
        tool.executable(),
        &workspace,
        &runner,
        &registry,
        settings.search_cache_capacity,
    );
    let (action, outcome) = dispatch(&orchestrator, args.command, ui)?;
    report_outcome(ui, action, &outcome);
    Ok(())
}

fn dispatch(
    orchestrator: &Orchestrator<'_>,
    command: Command,
    ui: &mut dyn UserInteraction,
) -> Result<(&'static str, ProcessOutcome)> {
    let result = match command {
        Command::Init(args) => (
            "init",
            orchestrator.init(
                ui,
                InitRequest {
                    directory: args.directory,
                    destination: args.destination,
                },
            )?,
        ),
        Command::Install(args) => (
            "install",
            orchestrator.install(
                ui,
                InstallRequest {
                    package: args.package,
                    destination: args.destination,
                },
            )?,
        ),
        Command::Uninstall(args) => (
            "uninstall",
            orchestrator.uninstall(
                ui,
                UninstallRequest {
                    library: args.library,
                },
            )?,
        ),
        Command::Restore => ("restore", orchestrator.restore(ui)?),
        Command::Clean => ("clean", orchestrator.clean(ui)?),
        Command::Setup => ("setup", ProcessOutcome::default()),
    };
    Ok(result)
}

/// Probe the runtime and make sure the LibMan tool is present.
fn activate(settings: &Settings, runner: &dyn CommandRunner) -> Result<LibmanTool> {
    tool::probe_runtime(runner, &settings.dotnet)?;
    let tool = LibmanTool::new(settings.tool_dir.clone());
    let installed = tool
        .ensure_installed(runner, &settings.dotnet)
        .with_context(|| format!("install libman into {}", tool.tool_dir().display()))?;
    if installed {
        tracing::info!(path = %tool.executable().display(), "libman installed");
    }
    Ok(tool)
}

fn report_outcome(ui: &mut dyn UserInteraction, action: &str, outcome: &ProcessOutcome) {
    let stdout = outcome.stdout.trim();
    if !stdout.is_empty() {
        ui.notify(Notice::Info, stdout);
    }
    match outcome.warnings() {
        Some(warnings) => ui.notify(Notice::Warning, warnings),
        None => ui.notify(Notice::Success, &format!("libman {action} finished")),
    }
}
