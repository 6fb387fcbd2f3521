use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::client::ChatClient;
use crate::error::AiClientError;
use crate::types::{ChatRequest, ChatResponse};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

/// Client for OpenRouter's model-routing gateway (OpenAI-compatible wire format).
pub struct OpenRouterClient {
    api_key: String,
    http: reqwest::Client,
    app_name: Option<String>,
    site_url: Option<String>,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: reqwest::Client::new(),
            app_name: None,
            site_url: None,
        }
    }

    /// Build from `OPEN_ROUTER_API_KEY` in the process environment.
    pub fn from_env() -> Result<Self, AiClientError> {
        let api_key = std::env::var("OPEN_ROUTER_API_KEY")
            .map_err(|_| AiClientError::MissingEnvVar("OPEN_ROUTER_API_KEY"))?;
        Ok(Self::new(api_key))
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    fn headers(&self) -> Result<HeaderMap, AiClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref url) = self.site_url {
            if let Ok(val) = HeaderValue::from_str(url) {
                headers.insert("HTTP-Referer", val);
            }
        }
        if let Some(ref name) = self.app_name {
            if let Ok(val) = HeaderValue::from_str(name) {
                headers.insert("X-Title", val);
            }
        }

        Ok(headers)
    }
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AiClientError> {
        let url = format!("{OPENROUTER_API_URL}/chat/completions");

        debug!(model = %request.model, "OpenRouter chat request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await
            .map_err(|source| AiClientError::Request {
                provider: "openrouter",
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiClientError::Api {
                provider: "openrouter",
                status,
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|source| AiClientError::Request {
                provider: "openrouter",
                source,
            })
    }

    fn provider(&self) -> &'static str {
        "openrouter"
    }
}
