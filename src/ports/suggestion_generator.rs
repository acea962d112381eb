//! Suggestion generator port and AI provider error taxonomy.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::InvokeFrom;

/// Errors from AI provider adapters.
#[derive(Debug, Clone, Error)]
pub enum AiError {
    /// The provider rejected our credentials.
    #[error("Authentication with the AI provider failed")]
    AuthenticationFailed,

    /// The provider rate limited the request.
    #[error("AI provider rate limited the request")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The request timed out.
    #[error("AI provider request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// The provider could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered with something we could not use.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Any other provider-side failure.
    #[error("Provider error (status {status}): {message}")]
    Provider { status: u16, message: String },
}

impl AiError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        AiError::Network(message.into())
    }

    /// Creates an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        AiError::InvalidResponse(message.into())
    }
}

/// One completed exchange handed to the generator as context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTurn {
    pub query: String,
    pub answer: String,
}

/// Context for generating follow-up questions after an answer.
#[derive(Debug, Clone)]
pub struct SuggestionContext {
    /// Recent exchanges, oldest first; the last turn is the one being
    /// followed up on.
    pub history: Vec<HistoryTurn>,

    /// Which surface triggered the generation.
    pub invoke_from: InvokeFrom,

    /// External id of the requesting end user, for provider attribution.
    pub end_user: String,
}

/// Generator port for suggested follow-up questions.
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Generate follow-up questions for the given conversation context.
    async fn suggest(&self, context: &SuggestionContext) -> Result<Vec<String>, AiError>;
}
