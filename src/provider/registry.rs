//! Backend registry keyed by provider name.

use crate::config::{ConfigKey, ProviderConfig, DEFAULT_PROVIDER};

use super::azure::AzureOpenAiBackend;
use super::openai::OpenAiBackend;
use super::wire::{ChatCompletionRequest, ChatCompletionResponse};

/// One credential the setup wizard asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialField {
    /// Label shown in the wizard; answers are keyed by it.
    pub label: &'static str,
    pub key: ConfigKey,
}

/// Static description of a backend.
#[derive(Debug, PartialEq, Eq)]
pub struct ProviderSpec {
    /// Value of `ai_provider` selecting this backend.
    pub name: &'static str,
    pub display_name: &'static str,
    /// Required credentials, in the order the wizard collects them.
    pub fields: &'static [CredentialField],
}

impl ProviderSpec {
    /// Labels of required fields that are absent or blank in `config`.
    pub fn missing(&self, config: &ProviderConfig) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|field| config.get(field.key).is_none())
            .map(|field| field.label)
            .collect()
    }

    pub fn keys(&self) -> Vec<ConfigKey> {
        self.fields.iter().map(|field| field.key).collect()
    }
}

/// A chat-completion backend: required fields, request builder, and
/// response parser.
pub trait Backend: Send + Sync {
    fn spec(&self) -> &'static ProviderSpec;

    /// Model requested from the backend.
    fn model(&self) -> &str;

    /// Build the HTTP request. Only called once every required field in
    /// `spec().fields` is present.
    fn build_request(
        &self,
        http: &reqwest::Client,
        config: &ProviderConfig,
        body: &ChatCompletionRequest,
    ) -> reqwest::RequestBuilder;

    fn parse_response(&self, response: ChatCompletionResponse) -> Vec<String> {
        response.texts()
    }
}

pub struct BackendRegistry {
    backends: Vec<Box<dyn Backend>>,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new(vec![
            Box::new(OpenAiBackend::default()),
            Box::new(AzureOpenAiBackend::default()),
        ])
    }
}

impl BackendRegistry {
    /// The first backend is used for unknown provider names unless one is
    /// registered under the default provider name.
    pub fn new(backends: Vec<Box<dyn Backend>>) -> Self {
        assert!(!backends.is_empty(), "registry needs at least one backend");
        Self { backends }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Backend> {
        let name = name.trim();
        self.backends
            .iter()
            .find(|b| b.spec().name.eq_ignore_ascii_case(name))
            .map(|b| b.as_ref())
    }

    /// Backend for `name`, falling back to the default provider.
    pub fn resolve(&self, name: &str) -> &dyn Backend {
        self.get(name)
            .or_else(|| self.get(DEFAULT_PROVIDER))
            .unwrap_or_else(|| self.backends[0].as_ref())
    }

    /// Specs in registration order; the wizard numbers them from 1.
    pub fn specs(&self) -> Vec<&'static ProviderSpec> {
        self.backends.iter().map(|b| b.spec()).collect()
    }
}
