use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::client::ChatClient;
use crate::error::AiClientError;
use crate::types::{ChatRequest, ChatResponse};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Client for the OpenAI API directly (same wire format as [`OpenRouterClient`],
/// kept for parity and for pointing the core at a non-gateway provider in tests).
///
/// [`OpenRouterClient`]: crate::openrouter::OpenRouterClient
pub struct OpenAiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: reqwest::Client::new(),
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, AiClientError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AiClientError::MissingEnvVar("OPENAI_API_KEY"))?;
        Ok(Self::new(api_key))
    }

    /// Point at a different OpenAI-compatible base URL (self-hosted gateway, proxy, ...).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn headers(&self) -> Result<HeaderMap, AiClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AiClientError> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %request.model, "OpenAI chat request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await
            .map_err(|source| AiClientError::Request {
                provider: "openai",
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiClientError::Api {
                provider: "openai",
                status,
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|source| AiClientError::Request {
                provider: "openai",
                source,
            })
    }

    fn provider(&self) -> &'static str {
        "openai"
    }
}
