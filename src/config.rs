use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Provider used when `ai_provider` is unset or unknown.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Prefix for environment variable overrides, e.g. `GITWISE_AI_KEY`.
pub const ENV_PREFIX: &str = "GITWISE_";

const REPO_CONFIG_FILE: &str = ".gitwise.yaml";

const DEFAULT_TEMPLATE: &str = r#"# gitwise configuration file
#
# ai_provider: the AI backend used for suggestions. Options:
#    - openai (default)
#    - azure_openai
#
# For OpenAI, configure:
#   ai_key: your OpenAI API key.
#
# For Azure OpenAI, configure:
#   azure_endpoint: the endpoint of your Azure OpenAI resource
#                   (e.g. https://your-resource-name.openai.azure.com/)
#   azure_deployment_id: the deployment serving the chat model.
#   azure_api_key: your Azure OpenAI API key.
#   azure_api_version: the API version (e.g. 2024-02-01).
#
# Optional prompt overrides. {files} and {diff} are substituted:
#   commit_prompt: "Write a one-line commit message for {files}. Diff:\n{diff}"
#   status_prompt: "Summarize these staged changes:\n{diff}"
#
# Every key can be overridden by an environment variable named
# GITWISE_<KEY>, for example GITWISE_AI_KEY.
#
# Example configuration for OpenAI:
#
#   ai_provider: openai
#   ai_key: your-openai-api-key
#
# Example configuration for Azure OpenAI:
#
#   ai_provider: azure_openai
#   azure_endpoint: https://your-resource-name.openai.azure.com/
#   azure_deployment_id: your-deployment-id
#   azure_api_key: your-azure-api-key
#   azure_api_version: 2024-02-01
"#;

/// Recognized configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    AiProvider,
    AiKey,
    AzureEndpoint,
    AzureDeploymentId,
    AzureApiKey,
    AzureApiVersion,
    CommitPrompt,
    StatusPrompt,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 8] = [
        ConfigKey::AiProvider,
        ConfigKey::AiKey,
        ConfigKey::AzureEndpoint,
        ConfigKey::AzureDeploymentId,
        ConfigKey::AzureApiKey,
        ConfigKey::AzureApiVersion,
        ConfigKey::CommitPrompt,
        ConfigKey::StatusPrompt,
    ];

    /// Key name as written in the YAML document.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::AiProvider => "ai_provider",
            ConfigKey::AiKey => "ai_key",
            ConfigKey::AzureEndpoint => "azure_endpoint",
            ConfigKey::AzureDeploymentId => "azure_deployment_id",
            ConfigKey::AzureApiKey => "azure_api_key",
            ConfigKey::AzureApiVersion => "azure_api_version",
            ConfigKey::CommitPrompt => "commit_prompt",
            ConfigKey::StatusPrompt => "status_prompt",
        }
    }

    pub fn env_var(&self) -> String {
        format!("{}{}", ENV_PREFIX, self.as_str().to_uppercase())
    }
}

/// Provider selection, credentials, and prompt overrides for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider")]
    pub ai_provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_deployment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_prompt: Option<String>,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ai_provider: default_provider(),
            ai_key: None,
            azure_endpoint: None,
            azure_deployment_id: None,
            azure_api_key: None,
            azure_api_version: None,
            commit_prompt: None,
            status_prompt: None,
        }
    }
}

impl ProviderConfig {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            ai_provider: provider.into(),
            ..Self::default()
        }
    }

    /// Value for `key`, treating blank strings as absent.
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        let value = match key {
            ConfigKey::AiProvider => Some(&self.ai_provider),
            ConfigKey::AiKey => self.ai_key.as_ref(),
            ConfigKey::AzureEndpoint => self.azure_endpoint.as_ref(),
            ConfigKey::AzureDeploymentId => self.azure_deployment_id.as_ref(),
            ConfigKey::AzureApiKey => self.azure_api_key.as_ref(),
            ConfigKey::AzureApiVersion => self.azure_api_version.as_ref(),
            ConfigKey::CommitPrompt => self.commit_prompt.as_ref(),
            ConfigKey::StatusPrompt => self.status_prompt.as_ref(),
        };
        value.map(String::as_str).filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        let value = value.into();
        match key {
            ConfigKey::AiProvider => self.ai_provider = value,
            ConfigKey::AiKey => self.ai_key = Some(value),
            ConfigKey::AzureEndpoint => self.azure_endpoint = Some(value),
            ConfigKey::AzureDeploymentId => self.azure_deployment_id = Some(value),
            ConfigKey::AzureApiKey => self.azure_api_key = Some(value),
            ConfigKey::AzureApiVersion => self.azure_api_version = Some(value),
            ConfigKey::CommitPrompt => self.commit_prompt = Some(value),
            ConfigKey::StatusPrompt => self.status_prompt = Some(value),
        }
    }

    /// Load configuration from the standard paths, then apply
    /// `GITWISE_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let search = Self::search_paths();
        let fallback = Self::user_config_path();
        let env = |name: &str| std::env::var(name).ok();
        Self::load_with(&search, fallback.as_deref(), env)
    }

    /// Load from the first existing path in `search`. When none exists the
    /// default template is written to `template_path`; a failed write is
    /// logged and otherwise ignored.
    pub fn load_with<F>(
        search: &[PathBuf],
        template_path: Option<&Path>,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match search.iter().find(|p| p.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::load_from_path(path)?
            }
            None => {
                if let Some(path) = template_path {
                    if let Err(e) = write_default_template(path) {
                        warn!("could not write default config template: {e}");
                    }
                }
                Self::default()
            }
        };

        config.apply_env(env);
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let read_err = |source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        };
        let parse_err = |source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let content = std::fs::read_to_string(path).map_err(read_err)?;
        // A template with only comments parses as null.
        let config: Option<Self> = serde_yaml::from_str(&content).map_err(parse_err)?;

        Ok(config.unwrap_or_default())
    }

    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ConfigKey::ALL {
            if let Some(value) = env(&key.env_var()).filter(|v| !v.trim().is_empty()) {
                debug!(key = key.as_str(), "config value overridden from environment");
                self.set(key, value);
            }
        }
    }

    /// Candidate config files, most specific first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(REPO_CONFIG_FILE)];
        if let Some(user) = Self::user_config_path() {
            paths.push(user);
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".gitwise").join("config.yaml"));
        }
        paths
    }

    /// Get the user configuration path
    pub fn user_config_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("gitwise").join("config.yaml"))
        } else {
            let home = dirs::home_dir()?;
            Some(home.join(".config").join("gitwise").join("config.yaml"))
        }
    }

    /// YAML document holding the provider selection plus only the
    /// credentials listed in `keys`.
    pub fn to_yaml(&self, keys: &[ConfigKey]) -> Result<String, ConfigError> {
        let mut doc = ProviderConfig::new(self.ai_provider.clone());
        for key in keys {
            if let Some(value) = self.get(*key) {
                doc.set(*key, value);
            }
        }
        serde_yaml::to_string(&doc).map_err(ConfigError::Serialize)
    }
}

fn write_default_template(path: &Path) -> Result<(), ConfigError> {
    write_file(path, DEFAULT_TEMPLATE)
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, content).map_err(write_err)
}

/// Persists a configuration produced by `setup`.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigStore {
    /// Write the provider and the credential `keys`, returning the path written.
    fn save(&self, config: &ProviderConfig, keys: &[ConfigKey]) -> Result<PathBuf, ConfigError>;
}

/// Stores configuration as YAML at a fixed path.
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store writing to the user config path.
    pub fn user() -> Result<Self, ConfigError> {
        ProviderConfig::user_config_path()
            .map(Self::new)
            .ok_or(ConfigError::NoConfigDir)
    }
}

impl ConfigStore for FileConfigStore {
    fn save(&self, config: &ProviderConfig, keys: &[ConfigKey]) -> Result<PathBuf, ConfigError> {
        let yaml = config.to_yaml(keys)?;
        write_file(&self.path, &yaml)?;
        debug!(path = %self.path.display(), "configuration saved");
        Ok(self.path.clone())
    }
}
