use crate::config::{ConfigKey, ProviderConfig};

use super::registry::{Backend, CredentialField, ProviderSpec};
use super::wire::ChatCompletionRequest;

const DEFAULT_MODEL: &str = "gpt-4o";

pub static SPEC: ProviderSpec = ProviderSpec {
    name: "azure_openai",
    display_name: "Azure OpenAI",
    fields: &[
        CredentialField {
            label: "Azure Endpoint",
            key: ConfigKey::AzureEndpoint,
        },
        CredentialField {
            label: "Azure Deployment ID",
            key: ConfigKey::AzureDeploymentId,
        },
        CredentialField {
            label: "Azure API Key",
            key: ConfigKey::AzureApiKey,
        },
        CredentialField {
            label: "Azure API Version",
            key: ConfigKey::AzureApiVersion,
        },
    ],
};

/// Azure OpenAI: the model is served by a caller-configured deployment and
/// auth goes through the `api-key` header.
#[derive(Debug, Clone)]
pub struct AzureOpenAiBackend {
    model: String,
}

impl Default for AzureOpenAiBackend {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl AzureOpenAiBackend {
    /// Deployment serving `model`. Every model maps to the single
    /// configured deployment.
    fn deployment_for<'c>(&self, _model: &str, config: &'c ProviderConfig) -> &'c str {
        config.get(ConfigKey::AzureDeploymentId).unwrap_or_default()
    }

    fn url(&self, config: &ProviderConfig, model: &str) -> String {
        let endpoint = config
            .get(ConfigKey::AzureEndpoint)
            .unwrap_or_default()
            .trim_end_matches('/');
        format!(
            "{}/openai/deployments/{}/chat/completions",
            endpoint,
            self.deployment_for(model, config)
        )
    }
}

impl Backend for AzureOpenAiBackend {
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
        let version = config.get(ConfigKey::AzureApiVersion).unwrap_or_default();
        let key = config.get(ConfigKey::AzureApiKey).unwrap_or_default();
        http.post(self.url(config, &body.model))
            .query(&[("api-version", version)])
            .header("api-key", key)
            .json(body)
    }
}
