//! Turns a prompt into ranked text suggestions via a chat-completion backend.

pub mod azure;
pub mod openai;
pub mod registry;
pub mod wire;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
pub use registry::{BackendRegistry, ProviderSpec};
use wire::{ChatCompletionRequest, ChatCompletionResponse};

const COMMIT_SUGGESTIONS: u32 = 3;
const COMMIT_MAX_TOKENS: u32 = 64;
const STATUS_MAX_TOKENS: u32 = 128;

/// A prompt plus how many completions to ask for and how long each may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub prompt: String,
    pub count: u32,
    pub max_tokens: u32,
}

impl SuggestionRequest {
    /// Three short single-line candidates.
    pub fn commit_messages(prompt: String) -> Self {
        Self {
            prompt,
            count: COMMIT_SUGGESTIONS,
            max_tokens: COMMIT_MAX_TOKENS,
        }
    }

    /// One longer summary.
    pub fn status_insight(prompt: String) -> Self {
        Self {
            prompt,
            count: 1,
            max_tokens: STATUS_MAX_TOKENS,
        }
    }
}

/// Non-empty, ordered, whitespace-trimmed suggestions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionSet(Vec<String>);

impl SuggestionSet {
    /// Trims every entry and drops blank ones. `None` when nothing is left.
    pub fn new<I, S>(texts: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items: Vec<String> = texts
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        (!items.is_empty()).then_some(Self(items))
    }

    pub fn first(&self) -> &str {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    async fn generate(
        &self,
        config: &ProviderConfig,
        request: &SuggestionRequest,
    ) -> Result<SuggestionSet, ProviderError>;
}

/// `SuggestionProvider` that talks HTTP to the backend named by
/// `ai_provider`.
pub struct HttpSuggestionProvider {
    http: reqwest::Client,
    registry: BackendRegistry,
}

impl HttpSuggestionProvider {
    pub fn new(http: reqwest::Client, registry: BackendRegistry) -> Self {
        Self { http, registry }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }
}

#[async_trait]
impl SuggestionProvider for HttpSuggestionProvider {
    async fn generate(
        &self,
        config: &ProviderConfig,
        request: &SuggestionRequest,
    ) -> Result<SuggestionSet, ProviderError> {
        let backend = self.registry.resolve(&config.ai_provider);
        let spec = backend.spec();

        let missing = spec.missing(config);
        if !missing.is_empty() {
            return Err(ProviderError::NotConfigured {
                provider: spec.display_name,
                missing,
            });
        }

        debug!(
            provider = spec.name,
            n = request.count,
            max_tokens = request.max_tokens,
            "requesting suggestions"
        );

        let body = ChatCompletionRequest::from_suggestion(backend.model(), request);
        let transport = |source| ProviderError::Request {
            provider: spec.display_name,
            source,
        };

        let response = backend
            .build_request(&self.http, config, &body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: spec.display_name,
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(transport)?;
        SuggestionSet::new(backend.parse_response(parsed)).ok_or(ProviderError::EmptyResult {
            provider: spec.display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigKey;
    use azure::AzureOpenAiBackend;
    use openai::OpenAiBackend;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> HttpSuggestionProvider {
        let registry = BackendRegistry::new(vec![
            Box::new(OpenAiBackend::with_api_base(format!("{}/v1", server.uri()))),
            Box::new(AzureOpenAiBackend::default()),
        ]);
        HttpSuggestionProvider::new(reqwest::Client::new(), registry)
    }

    fn openai_config() -> ProviderConfig {
        let mut config = ProviderConfig::new("openai");
        config.set(ConfigKey::AiKey, "sk-test");
        config
    }

    fn azure_config(endpoint: &str) -> ProviderConfig {
        let mut config = ProviderConfig::new("azure_openai");
        config.set(ConfigKey::AzureEndpoint, endpoint);
        config.set(ConfigKey::AzureDeploymentId, "commit-writer");
        config.set(ConfigKey::AzureApiKey, "az-key");
        config.set(ConfigKey::AzureApiVersion, "2024-02-01");
        config
    }

    fn completion(texts: &[&str]) -> serde_json::Value {
        let choices: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| json!({"index": i, "message": {"role": "assistant", "content": t}}))
            .collect();
        json!({ "choices": choices })
    }

    #[test]
    fn test_suggestion_set_trims_and_rejects_empty() {
        let set = SuggestionSet::new(["  feat: add x \n", "", "   ", "fix: y"]).unwrap();
        assert_eq!(set.first(), "feat: add x");
        assert_eq!(
            set.into_vec(),
            vec!["feat: add x".to_string(), "fix: y".to_string()]
        );
        assert!(SuggestionSet::new(Vec::<String>::new()).is_none());
        assert!(SuggestionSet::new([" ", "\n"]).is_none());
    }

    #[test]
    fn test_request_presets() {
        let commit = SuggestionRequest::commit_messages("p".into());
        assert_eq!((commit.count, commit.max_tokens), (3, 64));
        let status = SuggestionRequest::status_insight("p".into());
        assert_eq!((status.count, status.max_tokens), (1, 128));
    }

    #[tokio::test]
    async fn test_openai_request_shape_and_trimmed_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "describe the diff"}],
                "temperature": 0.5,
                "max_tokens": 64,
                "n": 3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&[
                "  feat: add parser\n",
                "fix: handle empty input",
                "\trefactor: split module ",
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let set = provider
            .generate(
                &openai_config(),
                &SuggestionRequest::commit_messages("describe the diff".into()),
            )
            .await
            .unwrap();

        assert_eq!(
            set.into_vec(),
            vec![
                "feat: add parser".to_string(),
                "fix: handle empty input".to_string(),
                "refactor: split module".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_fewer_choices_than_requested_is_still_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&["only one"])))
            .mount(&server)
            .await;

        let set = provider_for(&server)
            .generate(
                &openai_config(),
                &SuggestionRequest::commit_messages("p".into()),
            )
            .await
            .unwrap();
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_azure_routes_to_deployment_with_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/commit-writer/chat/completions"))
            .and(query_param("api-version", "2024-02-01"))
            .and(header("api-key", "az-key"))
            .and(body_partial_json(json!({"n": 1, "max_tokens": 128})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion(&["Adds a parser."])),
            )
            .expect(1)
            .mount(&server)
            .await;

        // Provider name matching is case-insensitive.
        let mut config = azure_config(&format!("{}/", server.uri()));
        config.ai_provider = "Azure_OpenAI".to_string();

        let set = provider_for(&server)
            .generate(&config, &SuggestionRequest::status_insight("p".into()))
            .await
            .unwrap();
        assert_eq!(set.first(), "Adds a parser.");
    }

    #[tokio::test]
    async fn test_missing_openai_key_never_touches_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&["x"])))
            .expect(0)
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate(
                &ProviderConfig::new("openai"),
                &SuggestionRequest::commit_messages("p".into()),
            )
            .await
            .unwrap_err();

        assert!(err.is_not_configured());
        assert!(err.to_string().contains("OpenAI API Key"));
    }

    #[tokio::test]
    async fn test_any_missing_azure_field_never_touches_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&["x"])))
            .expect(0)
            .mount(&server)
            .await;
        let provider = provider_for(&server);

        for field in azure::SPEC.fields {
            let mut config = azure_config(&server.uri());
            config.set(field.key, "");
            let err = provider
                .generate(&config, &SuggestionRequest::commit_messages("p".into()))
                .await
                .unwrap_err();
            match err {
                ProviderError::NotConfigured { provider, missing } => {
                    assert_eq!(provider, "Azure OpenAI");
                    assert_eq!(missing, vec![field.label]);
                }
                other => panic!("expected NotConfigured, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_http_error_status_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate(
                &openai_config(),
                &SuggestionRequest::commit_messages("p".into()),
            )
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { status, body, .. } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_choices_is_an_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&[])))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate(
                &openai_config(),
                &SuggestionRequest::commit_messages("p".into()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResult { provider: "OpenAI" }));
    }
}
