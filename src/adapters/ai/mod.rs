//! AI adapters - OpenAI-compatible providers and test mocks.

mod mock_provider;
mod openai_speech;
mod openai_suggestions;

pub use mock_provider::{MockSpeechProvider, MockSuggestionGenerator};
pub use openai_speech::{OpenAiSpeechClient, OpenAiSpeechConfig};
pub use openai_suggestions::{OpenAiSuggestionConfig, OpenAiSuggestionGenerator};
