use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("llm request timed out")]
    Timeout,
    #[error("llm transport failure: {0}")]
    Transport(String),
    #[error("llm provider returned status {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("llm returned an unusable payload: {0}")]
    InvalidPayload(String),
}

/// Returns the raw decision text for a fully built classification prompt.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn classify(&self, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
