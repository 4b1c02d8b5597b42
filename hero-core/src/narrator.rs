//! The narrative model seam.
//!
//! The engine talks to whatever implements [`NarrativeModel`]; the
//! production implementation wraps the Groq chat API, tests substitute
//! a scripted mock.

use async_trait::async_trait;
use groq::{ChatMessage, ChatRequest, Groq};
use std::sync::Arc;
use thiserror::Error;

/// Failures surfaced by a narrative model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Narrator unavailable: {0}")]
    Unavailable(String),
    #[error("Authentication failed: {0}")]
    AuthFailure(String),
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

impl From<groq::Error> for ModelError {
    fn from(err: groq::Error) -> Self {
        if err.is_auth_failure() {
            ModelError::AuthFailure(err.to_string())
        } else if err.is_rate_limited() {
            ModelError::RateLimited(err.to_string())
        } else {
            match err {
                groq::Error::Timeout(_) => ModelError::Timeout,
                groq::Error::Parse(msg) => ModelError::MalformedResponse(msg),
                other => ModelError::Unavailable(other.to_string()),
            }
        }
    }
}

/// Sampling parameters for narrative generation.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Overrides the client's default model when set.
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.85,
            max_tokens: 1500,
            top_p: 0.9,
        }
    }
}

/// A source of narrative completions.
#[async_trait]
pub trait NarrativeModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, ModelError>;
}

#[async_trait]
impl<T: NarrativeModel> NarrativeModel for Arc<T> {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, ModelError> {
        (**self).complete(messages, params).await
    }
}

/// Production narrator backed by the Groq chat API, always requesting
/// JSON mode.
pub struct GroqNarrator {
    client: Groq,
}

impl GroqNarrator {
    pub fn new(client: Groq) -> Self {
        Self { client }
    }

    /// Build a narrator from the `GROQ_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, groq::Error> {
        Ok(Self::new(Groq::from_env()?))
    }
}

#[async_trait]
impl NarrativeModel for GroqNarrator {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, ModelError> {
        let mut request = ChatRequest::new(messages.to_vec())
            .with_temperature(params.temperature)
            .with_max_tokens(params.max_tokens as usize)
            .with_top_p(params.top_p)
            .json_mode();
        if let Some(model) = &params.model {
            request = request.with_model(model);
        }

        let response = self.client.chat(request).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or_else(|| ModelError::MalformedResponse("empty choices".to_string()))
    }
}
