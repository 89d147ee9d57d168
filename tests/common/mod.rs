//! Shared fixture for binary integration tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const FAKE_DOTNET: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "8.0.100"
  exit 0
fi
if [ "$1" = "tool" ] && [ "$2" = "install" ]; then
  tool_path=""
  while [ $# -gt 0 ]; do
    if [ "$1" = "--tool-path" ]; then
      tool_path="$2"
    fi
    shift
  done
  mkdir -p "$tool_path"
  cat > "$tool_path/libman" <<'SCRIPT'
#!/bin/sh
echo "$*" >> "$PWD/libman-calls.log"
SCRIPT
  chmod 755 "$tool_path/libman"
  echo "Tool 'microsoft.web.librarymanager.cli' was successfully installed."
  exit 0
fi
echo "unsupported: $*" >&2
exit 1
"#;

/// Temporary layout: `workspace/`, `tools/`, a fake `dotnet` and an empty
/// config file.
pub struct Sandbox {
    dir: TempDir,
}

/// Exit code and captured streams of one binary run.
#[derive(Debug)]
pub struct RunOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }

    pub fn assert_success(&self) {
        assert_eq!(self.code, Some(0), "run failed:\n{}", self.combined());
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(dir.path().join("workspace")).expect("create workspace");
        fs::write(dir.path().join("config.json"), "{}").expect("write config");
        write_script(&dir.path().join("dotnet"), FAKE_DOTNET);
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn workspace(&self) -> PathBuf {
        self.root().join("workspace")
    }

    pub fn tool_dir(&self) -> PathBuf {
        self.root().join("tools")
    }

    pub fn tool_executable(&self) -> PathBuf {
        self.tool_dir().join("libman")
    }

    pub fn write_manifest(&self, rel_dir: &str, contents: &str) {
        let dir = self.workspace().join(rel_dir);
        fs::create_dir_all(&dir).expect("create manifest dir");
        fs::write(dir.join("libman.json"), contents).expect("write manifest");
    }

    /// Pre-install a `libman` with the given script body.
    pub fn install_tool_script(&self, body: &str) {
        fs::create_dir_all(self.tool_dir()).expect("create tool dir");
        write_script(&self.tool_executable(), &format!("#!/bin/sh\n{body}"));
    }

    /// Argument lines the fake `libman` recorded in `rel_dir`.
    pub fn libman_calls(&self, rel_dir: &str) -> Vec<String> {
        let log = self.workspace().join(rel_dir).join("libman-calls.log");
        fs::read_to_string(&log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn run(&self, args: &[&str]) -> RunOutput {
        self.run_with_dotnet(&self.root().join("dotnet"), args)
    }

    pub fn run_with_dotnet(&self, dotnet: &Path, args: &[&str]) -> RunOutput {
        self.run_from(self.root(), &self.tool_dir(), dotnet, args)
    }

    /// Run from the sandbox root with `--tool-dir tools`.
    pub fn run_with_relative_tool_dir(&self, args: &[&str]) -> RunOutput {
        self.run_from(self.root(), Path::new("tools"), &self.root().join("dotnet"), args)
    }

    fn run_from(&self, cwd: &Path, tool_dir: &Path, dotnet: &Path, args: &[&str]) -> RunOutput {
        let output = Command::new(env!("CARGO_BIN_EXE_libman-front"))
            .current_dir(cwd)
            .args(args)
            .arg("--workspace")
            .arg(self.workspace())
            .arg("--tool-dir")
            .arg(tool_dir)
            .arg("--config")
            .arg(self.root().join("config.json"))
            .env("LIBMAN_FRONT_DOTNET", dotnet)
            .env_remove("LIBMAN_FRONT_TOOL_DIR")
            .env_remove("LIBMAN_FRONT_REGISTRY_URL")
            .env_remove("LIBMAN_FRONT_LOG")
            .output()
            .expect("run libman-front");
        RunOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).expect("write script");
    let mut perms = fs::metadata(path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod script");
}
