//! Error types for gitwise modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a suggestion backend.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A required credential is absent. The commit flow matches on this
    /// variant to offer the fallback menu, so it is never raised for
    /// anything other than missing configuration.
    #[error("{provider} is not configured (missing: {})", .missing.join(", "))]
    NotConfigured {
        provider: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("{provider} request failed")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error: HTTP {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("no completions returned from {provider}")]
    EmptyResult { provider: &'static str },
}

impl ProviderError {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, ProviderError::NotConfigured { .. })
    }
}

/// Errors from invoking the git executable.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git not found in PATH")]
    NotInstalled(#[source] which::Error),

    #[error("Failed to run git {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {command} failed{}: {stderr}", exit_suffix(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" with code {c}")).unwrap_or_default()
}

/// Errors from reading or writing the configuration document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to determine a user config directory")]
    NoConfigDir,

    #[error("Failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write config file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration")]
    Serialize(#[source] serde_yaml::Error),
}

/// Errors surfaced by the enhanced commands.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("no staged changes detected")]
    NoStagedChanges,

    #[error("commit message cannot be empty")]
    EmptyMessage,

    /// An interactive prompt ended without a usable answer.
    #[error("{0}")]
    Cancelled(&'static str),

    #[error("setup completed, please try committing again")]
    SetupCompleted,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal I/O failed")]
    Terminal(#[from] std::io::Error),
}
