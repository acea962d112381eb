//! Speech provider ports (audio transcription and synthesis).

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use super::AiError;

/// Streamed audio returned by the synthesizer.
pub type AudioStream = Pin<Box<dyn Stream<Item = Result<Bytes, AiError>> + Send>>;

/// Transcriber port turning uploaded audio into text.
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// Transcribe an audio file.
    ///
    /// `filename` and `mime_type` describe the upload; validation of
    /// size and type happens before this call.
    async fn transcribe(
        &self,
        filename: &str,
        mime_type: &str,
        audio: Bytes,
    ) -> Result<String, AiError>;
}

/// Synthesizer port turning text into streamed audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// List the provider's available voices, preferred first.
    async fn voices(&self) -> Result<Vec<String>, AiError>;

    /// Synthesize speech for the given text, streaming MPEG audio.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioStream, AiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety tests
    #[test]
    fn speech_ports_are_object_safe() {
        fn _accepts_transcriber(_t: &dyn SpeechTranscriber) {}
        fn _accepts_synthesizer(_s: &dyn SpeechSynthesizer) {}
    }
}
