//! SynthesizeSpeechHandler - turn text or a stored answer into audio.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, EndUser, ErrorCode, MessageId, ServiceApp};
use crate::ports::{AudioStream, MessageReader, SpeechSynthesizer};

/// Command to synthesize speech.
///
/// Exactly one of `message_id` (speak a stored answer) or `text` (speak
/// free text) is expected; `message_id` wins when both are present.
#[derive(Debug, Clone)]
pub struct SynthesizeSpeechCommand {
    pub message_id: Option<MessageId>,
    pub text: Option<String>,
    pub voice: Option<String>,
}

/// Result of a synthesis request.
pub enum SpeechOutput {
    /// MPEG audio chunks.
    Stream(AudioStream),

    /// The referenced message has nothing to speak yet.
    Empty,
}

impl std::fmt::Debug for SpeechOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeechOutput::Stream(_) => f.write_str("Stream(..)"),
            SpeechOutput::Empty => f.write_str("Empty"),
        }
    }
}

/// Handler for the speech synthesis operation.
pub struct SynthesizeSpeechHandler {
    messages: Arc<dyn MessageReader>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl SynthesizeSpeechHandler {
    pub fn new(messages: Arc<dyn MessageReader>, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            messages,
            synthesizer,
        }
    }

    pub async fn handle(
        &self,
        app: &ServiceApp,
        end_user: &EndUser,
        command: SynthesizeSpeechCommand,
    ) -> Result<SpeechOutput, DomainError> {
        if !app.features.text_to_speech.enabled {
            return Err(DomainError::new(
                ErrorCode::TextToSpeechDisabled,
                "Text to speech is not enabled.",
            ));
        }

        let text = match command.message_id {
            Some(message_id) => {
                let message = self
                    .messages
                    .get_for_user(&app.id, &end_user.id, &message_id)
                    .await?
                    .ok_or_else(|| {
                        DomainError::new(ErrorCode::MessageNotFound, "Message Not Exists.")
                    })?;

                // Still streaming: no answer text to speak yet.
                if !message.has_answer() {
                    return Ok(SpeechOutput::Empty);
                }
                message.answer
            }
            None => match command.text {
                Some(text) if !text.trim().is_empty() => text,
                _ => {
                    return Err(DomainError::new(
                        ErrorCode::InvalidRequest,
                        "Text is required.",
                    ))
                }
            },
        };

        let voice = self
            .resolve_voice(app, command.voice)
            .await?;

        let stream = self
            .synthesizer
            .synthesize(text.trim(), &voice)
            .await
            .map_err(|e| DomainError::provider(e.to_string()))?;

        tracing::debug!(
            app_id = %app.id,
            end_user = %end_user.external_id,
            voice = %voice,
            "Synthesizing speech"
        );

        Ok(SpeechOutput::Stream(stream))
    }

    /// Request voice, then the app's configured voice, then the
    /// provider's first available voice.
    async fn resolve_voice(
        &self,
        app: &ServiceApp,
        requested: Option<String>,
    ) -> Result<String, DomainError> {
        if let Some(voice) = requested.filter(|v| !v.is_empty()) {
            return Ok(voice);
        }
        if let Some(voice) = app.features.text_to_speech.voice.clone() {
            return Ok(voice);
        }

        let voices = self
            .synthesizer
            .voices()
            .await
            .map_err(|e| DomainError::provider(e.to_string()))?;
        voices.into_iter().next().ok_or_else(|| {
            DomainError::new(ErrorCode::NoVoiceAvailable, "No voice available.")
        })
    }
}
