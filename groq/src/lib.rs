//! Minimal Groq API client.
//!
//! This crate provides a focused client for Groq's OpenAI-compatible
//! endpoints with:
//! - Chat completions, including forced-JSON output mode
//! - Whisper audio transcription
//! - A typed error enum with rate-limit / auth classification

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_WHISPER_MODEL: &str = "whisper-large-v3";

/// Audio payloads below this size cannot plausibly contain speech and
/// are rejected locally without a network call.
pub const MIN_AUDIO_BYTES: usize = 1000;

/// Errors that can occur when using the Groq client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error is the API refusing for rate-limit reasons.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Api { status: 429, .. })
    }

    /// Whether this error indicates a bad or missing credential.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::NoApiKey | Error::Api { status: 401, .. } | Error::Api { status: 403, .. }
        )
    }
}

/// Groq API client.
#[derive(Clone)]
pub struct Groq {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl Groq {
    /// Create a new Groq client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a Groq client from the GROQ_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| Error::NoApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Set the default chat model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send a chat completion request and return the full response.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, Error> {
        let api_request = self.build_api_request(&request);
        let headers = self.build_headers()?;

        let response = self
            .client
            .post(format!("{API_BASE}/chat/completions"))
            .headers(headers)
            .json(&api_request)
            .send()
            .await
            .map_err(classify_transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let api_response: ApiChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(ChatResponse::from(api_response))
    }

    /// Transcribe an audio payload with Whisper.
    ///
    /// Payloads shorter than [`MIN_AUDIO_BYTES`] are rejected before any
    /// network traffic happens.
    pub async fn transcribe(&self, request: TranscriptionRequest) -> Result<String, Error> {
        if request.audio.len() < MIN_AUDIO_BYTES {
            return Err(Error::Config(format!(
                "Audio too short to contain speech ({} bytes)",
                request.audio.len()
            )));
        }

        let part = reqwest::multipart::Part::bytes(request.audio)
            .file_name(request.file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| Error::Config(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", request.model)
            .text("response_format", "text");

        if let Some(language) = request.language {
            form = form.text("language", language);
        }

        let response = self
            .client
            .post(format!("{API_BASE}/audio/transcriptions"))
            .header(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                    .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
            )
            .multipart(form)
            .send()
            .await
            .map_err(classify_transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(text.trim().to_string())
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }

    fn build_api_request(&self, request: &ChatRequest) -> ApiChatRequest {
        ApiChatRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: request.messages.clone(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
            response_format: if request.json_mode {
                Some(ApiResponseFormat {
                    r#type: "json_object".to_string(),
                })
            } else {
                None
            },
        }
    }
}

fn classify_transport(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Network(e.to_string())
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A chat completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub top_p: Option<f32>,
    pub json_mode: bool,
}

impl ChatRequest {
    /// Create a new request with the given messages.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: None,
            messages,
            temperature: None,
            max_tokens: None,
            top_p: None,
            json_mode: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Ask the API to force a single well-formed JSON object as output.
    pub fn json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// A role-tagged message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system instruction message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl ChatResponse {
    /// Get the text content of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// One completion choice.
#[derive(Debug, Clone)]
pub struct Choice {
    pub message: ChatMessage,
    pub finish_reason: FinishReason,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    Other,
}

/// Token usage information.
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

/// An audio transcription request.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio: Vec<u8>,
    pub file_name: String,
    pub model: String,
    pub language: Option<String>,
}

impl TranscriptionRequest {
    /// Create a transcription request for the given audio bytes.
    pub fn new(audio: Vec<u8>) -> Self {
        Self {
            audio,
            file_name: "audio.webm".to_string(),
            model: DEFAULT_WHISPER_MODEL.to_string(),
            language: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ApiResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ApiResponseFormat {
    r#type: String,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    id: String,
    model: String,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

impl From<ApiChatResponse> for ChatResponse {
    fn from(api: ApiChatResponse) -> Self {
        let choices = api
            .choices
            .into_iter()
            .map(|c| Choice {
                message: c.message,
                finish_reason: match c.finish_reason.as_deref() {
                    Some("stop") => FinishReason::Stop,
                    Some("length") => FinishReason::Length,
                    _ => FinishReason::Other,
                },
            })
            .collect();

        let usage = api
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        ChatResponse {
            id: api.id,
            model: api.model,
            choices,
            usage,
        }
    }
}
