//! Gemini REST client implementing the classify, embed and generate capabilities.

use std::time::Duration;

use ambel_core::config::LlmConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::{DecisionOracle, Embedder, LlmError, TextGenerator};

const API_VERSION: &str = "v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME_TYPE: &str = "application/json";

pub struct GeminiClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
    chat_model: String,
    embedding_model: String,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|error| LlmError::Transport(format!("failed to build http client: {error}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/{API_VERSION}/models/{model}:{method}", self.base_url)
    }

    async fn generate_content(
        &self,
        prompt: &str,
        response_mime_type: Option<&'static str>,
    ) -> Result<String, LlmError> {
        let request = GenerateContentRequest {
            contents: vec![Content { role: Some("user"), parts: vec![Part { text: prompt }] }],
            generation_config: response_mime_type
                .map(|mime| GenerationConfig { response_mime_type: mime }),
        };

        let response: GenerateContentResponse = self
            .post(&self.model_url(&self.chat_model, "generateContent"), &request)
            .await?;
        response.into_text()
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, LlmError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Transport(error.to_string())
                }
            })?;

        let status = response.status();
        let payload = response.text().await.map_err(|error| {
            if error.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Transport(format!("failed to read response body: {error}"))
            }
        })?;
        debug!(event_name = "llm.response", url, status = status.as_u16(), "gemini call finished");

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&payload)
                .map(|parsed| parsed.error.message)
                .unwrap_or(payload);
            return Err(LlmError::Provider { status: status.as_u16(), message });
        }

        serde_json::from_str(&payload)
            .map_err(|error| LlmError::InvalidPayload(format!("unexpected response shape: {error}")))
    }
}

#[async_trait]
impl DecisionOracle for GeminiClient {
    async fn classify(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_content(prompt, Some(JSON_MIME_TYPE)).await
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_content(prompt, None).await
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request = EmbedContentRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content { role: None, parts: vec![Part { text }] },
        };

        let response: EmbedContentResponse =
            self.post(&self.model_url(&self.embedding_model, "embedContent"), &request).await?;
        if response.embedding.values.is_empty() {
            return Err(LlmError::InvalidPayload("embedding has no values".to_string()));
        }
        Ok(response.embedding.values)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, LlmError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidPayload("no candidates in response".to_string()))?;

        let text = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect::<String>())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(LlmError::InvalidPayload("candidate has no text parts".to_string()));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
