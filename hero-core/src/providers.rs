//! Optional media providers: speech, transcription and illustration.
//!
//! These sit beside the turn engine rather than inside it. A game is
//! fully playable with none of them configured; [`Capabilities::probe`]
//! reports which ones the environment supports.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Narration shorter than this is not worth synthesizing.
pub const MIN_SPEECH_CHARS: usize = 3;

/// Prompts shorter than this are not worth illustrating.
pub const MIN_IMAGE_PROMPT_CHARS: usize = 5;

const FLUX_ENDPOINT: &str =
    "https://router.huggingface.co/hf-inference/models/black-forest-labs/FLUX.1-schnell";

/// Failures surfaced by a media provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
    #[error("Authentication failed: {0}")]
    AuthFailure(String),
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
    #[error("Input rejected: {0}")]
    InputRejected(String),
}

impl From<groq::Error> for ProviderError {
    fn from(err: groq::Error) -> Self {
        if err.is_auth_failure() {
            ProviderError::AuthFailure(err.to_string())
        } else if err.is_rate_limited() {
            ProviderError::RateLimited(err.to_string())
        } else {
            match err {
                groq::Error::Timeout(_) => ProviderError::Timeout,
                groq::Error::Parse(msg) => ProviderError::MalformedResponse(msg),
                other => ProviderError::Unavailable(other.to_string()),
            }
        }
    }
}

/// Turns narration text into audio bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Turns recorded player audio into an action string.
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, ProviderError>;
}

/// Turns an image prompt into image bytes.
#[async_trait]
pub trait SceneIllustrator: Send + Sync {
    async fn illustrate(&self, prompt: &str, style: ImageStyle) -> Result<Vec<u8>, ProviderError>;
}

/// Strip markup and emoji from narration before speech synthesis.
///
/// Removes `<...>` tags, emoji-plane codepoints and markdown markers,
/// then collapses whitespace.
pub fn sanitize_narration(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '\u{1F000}'..='\u{1FFFF}' => {}
            '*' | '_' | '#' => {}
            _ => cleaned.push(c),
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanitize narration and gate it for speech synthesis. Text that
/// cleans down to fewer than [`MIN_SPEECH_CHARS`] characters is not
/// worth a provider round-trip.
pub fn prepare_speech(text: &str) -> Result<String, ProviderError> {
    let cleaned = sanitize_narration(text);
    if cleaned.chars().count() < MIN_SPEECH_CHARS {
        return Err(ProviderError::InputRejected(
            "narration too short to speak".to_string(),
        ));
    }
    Ok(cleaned)
}

/// Player-speech transcription backed by Whisper on Groq.
pub struct WhisperTranscriber {
    client: groq::Groq,
}

impl WhisperTranscriber {
    pub fn new(client: groq::Groq) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self, groq::Error> {
        Ok(Self::new(groq::Groq::from_env()?))
    }
}

#[async_trait]
impl SpeechTranscriber for WhisperTranscriber {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, ProviderError> {
        if audio.len() < groq::MIN_AUDIO_BYTES {
            return Err(ProviderError::InputRejected(format!(
                "recording too short ({} bytes)",
                audio.len()
            )));
        }
        let request = groq::TranscriptionRequest::new(audio).with_file_name(filename);
        Ok(self.client.transcribe(request).await?)
    }
}

/// Visual style appended to every image prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStyle {
    Fantasy,
    Ancient,
    Space,
    Victorian,
    Jungle,
    Dark,
}

impl ImageStyle {
    /// The style suffix appended to the scene prompt.
    pub fn suffix(&self) -> &'static str {
        match self {
            ImageStyle::Fantasy => {
                "fantasy art style, detailed digital painting, dramatic lighting"
            }
            ImageStyle::Ancient => {
                "ancient egypt, golden hour, cinematic, highly detailed"
            }
            ImageStyle::Space => {
                "science fiction, space, neon lighting, cinematic, highly detailed"
            }
            ImageStyle::Victorian => {
                "victorian era, gothic atmosphere, oil painting style, moody lighting"
            }
            ImageStyle::Jungle => {
                "lush jungle, adventure, cinematic lighting, highly detailed"
            }
            ImageStyle::Dark => {
                "deep ocean, bioluminescence, dark atmosphere, cinematic"
            }
        }
    }

    /// Pick the style matching a theme id.
    pub fn for_theme(theme_id: &str) -> ImageStyle {
        match theme_id {
            "egypt" => ImageStyle::Ancient,
            "space" => ImageStyle::Space,
            "manor" | "orient_express" => ImageStyle::Victorian,
            "jungle" => ImageStyle::Jungle,
            "submarine" => ImageStyle::Dark,
            _ => ImageStyle::Fantasy,
        }
    }
}

/// Scene illustration backed by FLUX.1-schnell on Hugging Face.
pub struct FluxIllustrator {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl FluxIllustrator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: FLUX_ENDPOINT.to_string(),
        }
    }

    /// Build an illustrator from the `HUGGINGFACE_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self, ProviderError> {
        let key = std::env::var("HUGGINGFACE_API_KEY")
            .map_err(|_| ProviderError::AuthFailure("HUGGINGFACE_API_KEY is not set".to_string()))?;
        Ok(Self::new(key))
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SceneIllustrator for FluxIllustrator {
    async fn illustrate(&self, prompt: &str, style: ImageStyle) -> Result<Vec<u8>, ProviderError> {
        let prompt = prompt.trim();
        if prompt.len() < MIN_IMAGE_PROMPT_CHARS {
            return Err(ProviderError::InputRejected(
                "image prompt too short".to_string(),
            ));
        }

        let body = json!({ "inputs": format!("{}, {}", prompt, style.suffix()) });
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Unavailable(e.to_string())
                }
            })?;

        match response.status().as_u16() {
            503 => {
                return Err(ProviderError::Unavailable(
                    "model is warming up, retry in a moment".to_string(),
                ))
            }
            429 => return Err(ProviderError::RateLimited("image quota reached".to_string())),
            401 | 403 => {
                return Err(ProviderError::AuthFailure(
                    "image provider rejected the API key".to_string(),
                ))
            }
            status if status >= 400 => {
                return Err(ProviderError::Unavailable(format!("HTTP {status}")))
            }
            _ => {}
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        // An error payload instead of image bytes comes back as JSON or
        // HTML with a 200 status on some provider paths.
        match bytes.first() {
            Some(b'{') | Some(b'<') => Err(ProviderError::MalformedResponse(
                "provider returned text instead of an image".to_string(),
            )),
            Some(_) => Ok(bytes.to_vec()),
            None => Err(ProviderError::MalformedResponse("empty body".to_string())),
        }
    }
}

/// Which optional features the current environment supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub narration: bool,
    pub transcription: bool,
    pub illustration: bool,
}

impl Capabilities {
    /// Probe environment variables for configured providers.
    pub fn probe() -> Self {
        let groq = std::env::var("GROQ_API_KEY").is_ok_and(|v| !v.trim().is_empty());
        let hf = std::env::var("HUGGINGFACE_API_KEY").is_ok_and(|v| !v.trim().is_empty());
        Self {
            narration: groq,
            transcription: groq,
            illustration: hf,
        }
    }
}
