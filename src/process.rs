//! Process runner for the LibMan tool and its installer.
//!
//! Invocations are executed from an argument vector, never a shell string, so
//! package names and paths reach the tool verbatim.
use crate::error::LibmanError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

/// A `--flag value` pair appended after the positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedOption {
    pub name: String,
    pub value: String,
}

/// One execution of an external program.
///
/// Built up by an orchestrator operation, then handed to a [`CommandRunner`]
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    program: PathBuf,
    positional: Vec<String>,
    options: Vec<NamedOption>,
    cwd: Option<PathBuf>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            positional: Vec::new(),
            options: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_option(name, value);
        self
    }

    pub fn add_option(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.options.push(NamedOption {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn options(&self) -> &[NamedOption] {
        &self.options
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Arguments after the program: positionals in order, then each option as
    /// `name value`. An empty value contributes only the flag.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.positional.clone();
        for option in &self.options {
            argv.push(option.name.clone());
            if !option.value.is_empty() {
                argv.push(option.value.clone());
            }
        }
        argv
    }

    /// Shell-quoted rendering for logs and messages.
    pub fn command_line(&self) -> String {
        let mut words = Vec::with_capacity(self.positional.len() + 1);
        words.push(self.program.display().to_string());
        words.extend(self.argv());
        shell_words::join(words)
    }
}

/// Captured streams of a process that exited zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    /// Standard-error text of a successful run, if any was written.
    pub fn warnings(&self) -> Option<&str> {
        let text = self.stderr.trim();
        (!text.is_empty()).then_some(text)
    }
}

/// Seam between building invocations and spawning processes.
pub trait CommandRunner {
    fn run(&self, invocation: &CommandInvocation) -> Result<ProcessOutcome>;
}

/// Spawns one OS process per invocation and waits for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &CommandInvocation) -> Result<ProcessOutcome> {
        let program = resolve_program(invocation.program())?;
        let mut command = Command::new(&program);
        command
            .args(invocation.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = invocation.cwd() {
            command.current_dir(cwd);
        }

        let start = Instant::now();
        let output = command
            .output()
            .with_context(|| format!("spawn {}", program.display()))?;
        let elapsed_ms = start.elapsed().as_millis();

        tracing::info!(
            elapsed_ms,
            command = %invocation.command_line(),
            exit_code = ?output.status.code(),
            stderr_bytes = output.stderr.len(),
            "process complete"
        );

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            let message = failure_message(&program, &output.status, &stdout, &stderr);
            return Err(LibmanError::Process { message }.into());
        }
        Ok(ProcessOutcome { stdout, stderr })
    }
}

/// Existence probe run before spawning.
///
/// A program given as a path must be a file; a bare name must resolve on
/// `PATH`. The returned path is absolute, so it stays valid when the process
/// runs in another directory. The check is not atomic with the spawn.
pub fn resolve_program(program: &Path) -> Result<PathBuf, LibmanError> {
    let is_path = program.is_absolute() || program.components().count() > 1;
    if is_path {
        if program.is_file() {
            return std::path::absolute(program).map_err(|err| {
                LibmanError::ToolNotFound(format!("{}: {err}", program.display()))
            });
        }
        return Err(LibmanError::ToolNotFound(format!(
            "{} not found",
            program.display()
        )));
    }
    which::which(program)
        .map_err(|_| LibmanError::ToolNotFound(format!("{} not found", program.display())))
}

fn failure_message(
    program: &Path,
    status: &std::process::ExitStatus,
    stdout: &str,
    stderr: &str,
) -> String {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    let name = program
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string());
    match status.code() {
        Some(code) => format!("{name} exited with status {code}"),
        None => format!("{name} was terminated by a signal"),
    }
}
