//! TranscribeAudioHandler - turn an uploaded audio file into text.

use bytes::Bytes;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EndUser, ErrorCode, ServiceApp};
use crate::ports::SpeechTranscriber;

/// Upload size cap: 30 MB.
pub const MAX_AUDIO_BYTES: usize = 30 * 1024 * 1024;

/// Audio container extensions the transcriber accepts.
static AUDIO_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["mp3", "mp4", "mpeg", "mpga", "m4a", "wav", "webm", "amr"]
        .into_iter()
        .collect()
});

/// An uploaded audio file.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub filename: String,
    pub mime_type: String,
    pub data: Bytes,
}

/// Handler for the audio transcription operation.
pub struct TranscribeAudioHandler {
    transcriber: Arc<dyn SpeechTranscriber>,
}

impl TranscribeAudioHandler {
    pub fn new(transcriber: Arc<dyn SpeechTranscriber>) -> Self {
        Self { transcriber }
    }

    pub async fn handle(
        &self,
        app: &ServiceApp,
        end_user: &EndUser,
        upload: Option<AudioUpload>,
    ) -> Result<String, DomainError> {
        if !app.features.speech_to_text {
            return Err(DomainError::new(
                ErrorCode::SpeechToTextDisabled,
                "Speech to text is not enabled.",
            ));
        }

        let upload = upload.ok_or_else(|| {
            DomainError::new(ErrorCode::NoAudioUploaded, "No audio file uploaded.")
        })?;

        let extension = upload
            .mime_type
            .strip_prefix("audio/")
            .filter(|ext| AUDIO_EXTENSIONS.contains(ext));
        if extension.is_none() {
            return Err(DomainError::new(
                ErrorCode::UnsupportedAudioType,
                "Audio type not supported.",
            )
            .with_detail("mime_type", upload.mime_type.clone()));
        }

        if upload.data.len() > MAX_AUDIO_BYTES {
            return Err(DomainError::new(
                ErrorCode::AudioTooLarge,
                "Audio size larger than 30 mb.",
            ));
        }

        let text = self
            .transcriber
            .transcribe(&upload.filename, &upload.mime_type, upload.data)
            .await
            .map_err(|e| DomainError::provider(e.to_string()))?;

        tracing::debug!(
            app_id = %app.id,
            end_user = %end_user.external_id,
            chars = text.len(),
            "Transcribed audio upload"
        );

        Ok(text)
    }
}
