//! Gemini `generateContent` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerationError, Generator};
use crate::config::Config;
use crate::utils::{with_retry, HttpClient, RetryConfig};

/// Client for the Gemini REST endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: HttpClient,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiClient {
    /// Create a client for `model` under `endpoint`
    pub fn new(
        client: HttpClient,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            retry: RetryConfig::default(),
        }
    }

    /// Create from application configuration
    pub fn from_config(config: &Config, client: HttpClient) -> Self {
        Self::new(
            client,
            &config.generation.endpoint,
            &config.generation.model,
            config.gemini_api_key().map(str::to_string),
        )
        .with_retry(config.retry.to_retry_config())
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of the generateContent method, without the key
    pub fn url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    fn extract_text(response: GenerateResponse) -> Result<String, GenerationError> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                GenerationError::MalformedResponse(
                    "missing candidates[0].content.parts[0].text".to_string(),
                )
            })
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        let url = self.url();
        let body = GenerateRequest::from_prompt(prompt);
        tracing::debug!("Calling {} ({} prompt chars)", url, prompt.chars().count());

        let client = &self.client;
        let url = url.as_str();
        let body = &body;
        let response: GenerateResponse = with_retry(self.retry, || async move {
            let response = client
                .post(url)
                .query(&[("key", api_key)])
                .json(body)
                .send()
                .await
                .map_err(|e| GenerationError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(GenerationError::UpstreamUnavailable {
                    status: status.as_u16(),
                });
            }

            let text = response
                .text()
                .await
                .map_err(|e| GenerationError::Network(e.to_string()))?;

            serde_json::from_str(&text).map_err(|e| GenerationError::MalformedResponse(e.to_string()))
        })
        .await?;

        Self::extract_text(response)
    }
}

// ===== Gemini API Types =====

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

impl GenerateRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}
