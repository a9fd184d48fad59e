//! OpenAI transport for both completion schemas.

use async_trait::async_trait;

use crate::completions;
use crate::core::{CompletionProvider, HttpClient, HttpClientConfig, InspectorConfig, LlmError};
use crate::provider::constants::openai;
use crate::responses;

use super::schema::{ApiRequest, ApiResponse, ApiSchema};

/// Connection settings for [`OpenAiClient`]. The API key is not part of it;
/// it is read from configuration on every call.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub http_config: HttpClientConfig,
    pub inspector_config: Option<InspectorConfig>,
    pub user_agent: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: openai::API_BASE.to_string(),
            organization: None,
            project: None,
            http_config: HttpClientConfig::default(),
            inspector_config: None,
            user_agent: None,
        }
    }
}

impl OpenAiConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    pub fn with_inspector(mut self, inspector: InspectorConfig) -> Self {
        self.inspector_config = Some(inspector);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    fn endpoint(&self, schema: ApiSchema) -> &'static str {
        match schema {
            ApiSchema::Responses => openai::RESPONSES_ENDPOINT,
            ApiSchema::ChatCompletions => openai::CHAT_COMPLETIONS_ENDPOINT,
        }
    }

    fn headers(&self, api_key: &str) -> Vec<(String, String)> {
        let mut headers = vec![("Authorization".to_string(), format!("Bearer {api_key}"))];

        if let Some(organization) = &self.organization {
            headers.push(("OpenAI-Organization".to_string(), organization.clone()));
        }

        if let Some(project) = &self.project {
            headers.push(("OpenAI-Project".to_string(), project.clone()));
        }

        headers
    }
}

pub struct OpenAiClient {
    config: OpenAiConfig,
    http: HttpClient,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let http = HttpClient::new(
            config.http_config.clone(),
            config.user_agent.as_deref(),
            config.inspector_config.clone(),
        )?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    #[tracing::instrument(
        name = "openai_send",
        skip(self, api_key, request),
        fields(model = %request.model(), schema = ?request.schema()),
        err
    )]
    async fn send(&self, api_key: &str, request: &ApiRequest) -> Result<ApiResponse, LlmError> {
        let url = format!(
            "{}{}",
            self.config.base_url,
            self.config.endpoint(request.schema())
        );
        let headers = self.config.headers(api_key);

        match request {
            ApiRequest::Responses(body) => self
                .http
                .post_json::<_, responses::Response>(&url, &headers, body)
                .await
                .map(ApiResponse::Responses),
            ApiRequest::Chat(body) => self
                .http
                .post_json::<_, completions::Response>(&url, &headers, body)
                .await
                .map(ApiResponse::Chat),
        }
    }
}
