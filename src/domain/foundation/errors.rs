//! Error types for the domain layer.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidRequest,

    // Not found errors
    ConversationNotFound,
    MessageNotFound,
    FirstMessageNotFound,
    AppNotFound,

    // Applicability errors
    NotChatApp,
    SuggestedQuestionsDisabled,
    SpeechToTextDisabled,
    TextToSpeechDisabled,

    // Audio errors
    NoAudioUploaded,
    UnsupportedAudioType,
    AudioTooLarge,
    NoVoiceAvailable,

    // Authorization errors
    Unauthorized,
    RateLimited,

    // Infrastructure errors
    ProviderError,
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::ConversationNotFound => "CONVERSATION_NOT_FOUND",
            ErrorCode::MessageNotFound => "MESSAGE_NOT_FOUND",
            ErrorCode::FirstMessageNotFound => "FIRST_MESSAGE_NOT_FOUND",
            ErrorCode::AppNotFound => "APP_NOT_FOUND",
            ErrorCode::NotChatApp => "NOT_CHAT_APP",
            ErrorCode::SuggestedQuestionsDisabled => "SUGGESTED_QUESTIONS_DISABLED",
            ErrorCode::SpeechToTextDisabled => "SPEECH_TO_TEXT_DISABLED",
            ErrorCode::TextToSpeechDisabled => "TEXT_TO_SPEECH_DISABLED",
            ErrorCode::NoAudioUploaded => "NO_AUDIO_UPLOADED",
            ErrorCode::UnsupportedAudioType => "UNSUPPORTED_AUDIO_TYPE",
            ErrorCode::AudioTooLarge => "AUDIO_TOO_LARGE",
            ErrorCode::NoVoiceAvailable => "NO_VOICE_AVAILABLE",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::ProviderError => "PROVIDER_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a database error wrapping an adapter failure.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Creates a provider error wrapping an AI adapter failure.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns true if the error denotes a missing domain entity.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ConversationNotFound
                | ErrorCode::MessageNotFound
                | ErrorCode::FirstMessageNotFound
                | ErrorCode::AppNotFound
        )
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::new(ErrorCode::ValidationFailed, err.to_string())
    }
}
