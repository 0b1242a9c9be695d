pub mod commit;
pub mod status;

use crate::config::{ConfigKey, ProviderConfig};

/// Prompt templates, one per AI-backed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRegistry {
    pub commit: String,
    pub status: String,
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self {
            commit: commit::COMMIT_PROMPT.to_string(),
            status: status::STATUS_PROMPT.to_string(),
        }
    }
}

impl PromptRegistry {
    /// Create a new registry with `commit_prompt` / `status_prompt` overrides applied
    pub fn with_overrides(&self, config: &ProviderConfig) -> Self {
        let mut registry = self.clone();

        if let Some(prompt) = config.get(ConfigKey::CommitPrompt) {
            registry.commit = prompt.to_string();
        }

        if let Some(prompt) = config.get(ConfigKey::StatusPrompt) {
            registry.status = prompt.to_string();
        }

        registry
    }

    /// Commit-message prompt for the given staged files and diff.
    pub fn commit_prompt(&self, staged_files: &str, diff: &str) -> String {
        render(&self.commit, &file_list(staged_files), diff)
    }

    /// Status-insight prompt for the given diff.
    pub fn status_prompt(&self, diff: &str) -> String {
        render(&self.status, "", diff)
    }
}

/// `git diff --name-only` output as a comma-separated list.
fn file_list(staged_files: &str) -> String {
    staged_files
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

// `{diff}` is substituted last so placeholders inside the diff text stay literal.
fn render(template: &str, files: &str, diff: &str) -> String {
    template.replace("{files}", files).replace("{diff}", diff)
}
