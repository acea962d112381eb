//! OpenAI-compatible speech adapters (transcription and synthesis).

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::ports::{AiError, AudioStream, SpeechSynthesizer, SpeechTranscriber};

/// Voices available on the OpenAI speech endpoint.
const OPENAI_VOICES: [&str; 6] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

/// Configuration for the speech client.
#[derive(Debug, Clone)]
pub struct OpenAiSpeechConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Transcription model (default: whisper-1).
    pub transcription_model: String,
    /// Synthesis model (default: tts-1).
    pub speech_model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAiSpeechConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            transcription_model: "whisper-1".to_string(),
            speech_model: "tts-1".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the transcription model.
    pub fn with_transcription_model(mut self, model: impl Into<String>) -> Self {
        self.transcription_model = model.into();
        self
    }

    /// Sets the synthesis model.
    pub fn with_speech_model(mut self, model: impl Into<String>) -> Self {
        self.speech_model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible speech client implementing both speech ports.
pub struct OpenAiSpeechClient {
    config: OpenAiSpeechConfig,
    client: Client,
}

impl OpenAiSpeechClient {
    /// Creates a new speech client with the given configuration.
    pub fn new(config: OpenAiSpeechConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn map_send_error(&self, e: reqwest::Error) -> AiError {
        if e.is_timeout() {
            AiError::Timeout {
                timeout_secs: self.config.timeout.as_secs() as u32,
            }
        } else if e.is_connect() {
            AiError::network(format!("Connection failed: {}", e))
        } else {
            AiError::network(e.to_string())
        }
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, AiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(AiError::AuthenticationFailed),
            429 => Err(AiError::RateLimited {
                retry_after_secs: None,
            }),
            code => Err(AiError::Provider {
                status: code,
                message: error_body,
            }),
        }
    }
}

#[async_trait]
impl SpeechTranscriber for OpenAiSpeechClient {
    async fn transcribe(
        &self,
        filename: &str,
        mime_type: &str,
        audio: Bytes,
    ) -> Result<String, AiError> {
        let part = Part::bytes(audio.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime_type)
            .map_err(|e| AiError::invalid_response(format!("Bad mime type: {}", e)))?;

        let form = Form::new()
            .part("file", part)
            .text("model", self.config.transcription_model.clone());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let response = self.handle_response_status(response).await?;
        let transcription: TranscriptionBody = response
            .json()
            .await
            .map_err(|e| AiError::invalid_response(e.to_string()))?;

        Ok(transcription.text)
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeechClient {
    async fn voices(&self) -> Result<Vec<String>, AiError> {
        Ok(OPENAI_VOICES.iter().map(|v| v.to_string()).collect())
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioStream, AiError> {
        let response = self
            .client
            .post(format!("{}/audio/speech", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&serde_json::json!({
                "model": self.config.speech_model,
                "input": text,
                "voice": voice,
                "response_format": "mp3",
            }))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let response = self.handle_response_status(response).await?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| AiError::network(e.to_string())));

        Ok(Box::pin(stream))
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionBody {
    text: String,
}
