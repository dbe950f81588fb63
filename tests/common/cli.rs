//! CLI test harness: isolated temp workspaces and captured `qm` runs.

use std::path::PathBuf;
use std::process::ExitStatus;

use tempfile::TempDir;

/// An isolated workspace with its own database path.
pub struct QmWorkspace {
    pub dir: TempDir,
    pub db: PathBuf,
}

impl QmWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp workspace");
        let db = dir.path().join("forum.db");
        Self { dir, db }
    }
}

pub struct CmdOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `qm` with the workspace's database, capturing output. `label`
/// identifies the step in panic messages.
pub fn run_qm<I, S>(workspace: &QmWorkspace, args: I, label: &str) -> CmdOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let output = assert_cmd::Command::cargo_bin("qm")
        .expect("qm binary")
        .args(args)
        .arg("--db")
        .arg(&workspace.db)
        .output()
        .unwrap_or_else(|err| panic!("{label}: failed to run qm: {err}"));

    CmdOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
