//! Access to the system `git` executable.
//!
//! Every operation shells out to `git`, so the user's own config, hooks,
//! signing setup and credential helpers apply unchanged.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::GitError;

/// Operations gitwise needs from the version-control tool.
#[cfg_attr(test, mockall::automock)]
pub trait Git {
    /// Run git with `args`, wiring stdin/stdout/stderr straight through.
    /// Returns git's exit code.
    fn passthrough(&self, args: &[String]) -> Result<i32, GitError>;

    /// `git diff --cached`
    fn staged_diff(&self) -> Result<String, GitError>;

    /// `git diff --cached --name-only`
    fn staged_files(&self) -> Result<String, GitError>;

    /// `git status`
    fn status(&self) -> Result<String, GitError>;

    /// Whether the current directory is inside a work tree.
    fn is_work_tree(&self) -> bool;

    /// `git commit -m <message>` with inherited streams.
    fn commit(&self, message: &str) -> Result<(), GitError>;
}

/// `Git` backed by the `git` binary found on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: PathBuf,
}

impl SystemGit {
    pub fn new() -> Result<Self, GitError> {
        let program = which::which("git").map_err(GitError::NotInstalled)?;
        debug!(program = %program.display(), "located git");
        Ok(Self { program })
    }

    fn capture(&self, args: &[&str]) -> Result<String, GitError> {
        let command = args.join(" ");
        debug!(%command, "capturing git output");
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::Failed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn inherit(&self, args: &[String]) -> Result<i32, GitError> {
        let command = args.join(" ");
        debug!(%command, "running git with inherited streams");
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|source| GitError::Spawn { command, source })?;

        // Killed by a signal: report a generic failure.
        Ok(status.code().unwrap_or(1))
    }
}

impl Git for SystemGit {
    fn passthrough(&self, args: &[String]) -> Result<i32, GitError> {
        self.inherit(args)
    }

    fn staged_diff(&self) -> Result<String, GitError> {
        self.capture(&["diff", "--cached"])
    }

    fn staged_files(&self) -> Result<String, GitError> {
        self.capture(&["diff", "--cached", "--name-only"])
    }

    fn status(&self) -> Result<String, GitError> {
        self.capture(&["status"])
    }

    fn is_work_tree(&self) -> bool {
        self.capture(&["rev-parse", "--is-inside-work-tree"])
            .map(|out| out.trim() == "true")
            .unwrap_or(false)
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        let args = ["commit".to_string(), "-m".to_string(), message.to_string()];
        let code = self.inherit(&args)?;
        if code != 0 {
            return Err(GitError::Failed {
                command: "commit".to_string(),
                code: Some(code),
                stderr: "see output above".to_string(),
            });
        }
        Ok(())
    }
}
