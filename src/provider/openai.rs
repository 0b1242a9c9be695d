use crate::config::{ConfigKey, ProviderConfig};

use super::registry::{Backend, CredentialField, ProviderSpec};
use super::wire::ChatCompletionRequest;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub static SPEC: ProviderSpec = ProviderSpec {
    name: "openai",
    display_name: "OpenAI",
    fields: &[CredentialField {
        label: "OpenAI API Key",
        key: ConfigKey::AiKey,
    }],
};

/// OpenAI chat completions with bearer-token auth.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    api_base: String,
    model: String,
}

impl Default for OpenAiBackend {
    fn default() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }
}

impl OpenAiBackend {
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

impl Backend for OpenAiBackend {
    fn spec(&self) -> &'static ProviderSpec {
        &SPEC
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn build_request(
        &self,
        http: &reqwest::Client,
        config: &ProviderConfig,
        body: &ChatCompletionRequest,
    ) -> reqwest::RequestBuilder {
        let key = config.get(ConfigKey::AiKey).unwrap_or_default();
        http.post(self.url()).bearer_auth(key).json(body)
    }
}
