//! Audio operations: transcription and speech synthesis.

mod synthesize_speech;
mod transcribe_audio;

pub use synthesize_speech::{SpeechOutput, SynthesizeSpeechCommand, SynthesizeSpeechHandler};
pub use transcribe_audio::{AudioUpload, TranscribeAudioHandler, MAX_AUDIO_BYTES};
