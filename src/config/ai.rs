//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
///
/// A single OpenAI-compatible endpoint serves suggestion generation,
/// audio transcription, and speech synthesis.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key for the provider
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for suggested-question generation
    #[serde(default = "default_suggestion_model")]
    pub suggestion_model: String,

    /// Model used for audio transcription
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,

    /// Model used for speech synthesis
    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::NoAiProviderConfigured);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            suggestion_model: default_suggestion_model(),
            transcription_model: default_transcription_model(),
            speech_model: default_speech_model(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_suggestion_model() -> String {
    "gpt-4-turbo".to_string()
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_speech_model() -> String {
    "tts-1".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}
