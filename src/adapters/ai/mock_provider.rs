//! Mock AI providers for testing.
//!
//! Implement the `SuggestionGenerator`, `SpeechTranscriber`, and
//! `SpeechSynthesizer` ports without network access.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;

use crate::ports::{
    AiError, AudioStream, SpeechSynthesizer, SpeechTranscriber, SuggestionContext,
    SuggestionGenerator,
};

/// Mock suggestion generator returning fixed questions.
pub struct MockSuggestionGenerator {
    result: Result<Vec<String>, AiError>,
    /// Last context seen, for assertions.
    pub last_context: Mutex<Option<SuggestionContext>>,
}

impl MockSuggestionGenerator {
    /// Creates a generator that returns the given questions.
    pub fn with_questions(questions: Vec<&str>) -> Self {
        Self {
            result: Ok(questions.into_iter().map(String::from).collect()),
            last_context: Mutex::new(None),
        }
    }

    /// Creates a generator that fails with the given error.
    pub fn failing(error: AiError) -> Self {
        Self {
            result: Err(error),
            last_context: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SuggestionGenerator for MockSuggestionGenerator {
    async fn suggest(&self, context: &SuggestionContext) -> Result<Vec<String>, AiError> {
        *self.last_context.lock().unwrap() = Some(context.clone());
        self.result.clone()
    }
}

/// Mock speech provider with a fixed transcript and audio payload.
pub struct MockSpeechProvider {
    transcript: String,
    voices: Vec<String>,
    audio: Bytes,
}

impl MockSpeechProvider {
    /// Creates a provider with sensible defaults.
    pub fn new() -> Self {
        Self {
            transcript: "mock transcript".to_string(),
            voices: vec!["alloy".to_string()],
            audio: Bytes::from_static(b"mock-mpeg-audio"),
        }
    }

    /// Sets the transcript returned by `transcribe`.
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = transcript.into();
        self
    }

    /// Sets the available voices.
    pub fn with_voices(mut self, voices: Vec<&str>) -> Self {
        self.voices = voices.into_iter().map(String::from).collect();
        self
    }
}

impl Default for MockSpeechProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechTranscriber for MockSpeechProvider {
    async fn transcribe(
        &self,
        _filename: &str,
        _mime_type: &str,
        _audio: Bytes,
    ) -> Result<String, AiError> {
        Ok(self.transcript.clone())
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeechProvider {
    async fn voices(&self) -> Result<Vec<String>, AiError> {
        Ok(self.voices.clone())
    }

    async fn synthesize(&self, _text: &str, _voice: &str) -> Result<AudioStream, AiError> {
        let chunks = vec![Ok(self.audio.clone())];
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}
