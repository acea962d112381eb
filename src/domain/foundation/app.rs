//! Application entity and mode classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{AppId, TenantId, ValidationError};

/// Classification of an application, gating which endpoints apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppMode {
    Chat,
    AgentChat,
    AdvancedChat,
    Completion,
    Workflow,
}

impl AppMode {
    /// Returns the wire representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Chat => "chat",
            AppMode::AgentChat => "agent-chat",
            AppMode::AdvancedChat => "advanced-chat",
            AppMode::Completion => "completion",
            AppMode::Workflow => "workflow",
        }
    }

    /// Returns true for modes that carry conversations and messages.
    ///
    /// Message listing and suggested-question endpoints are only valid
    /// for chat-based apps.
    pub fn is_chat_based(&self) -> bool {
        matches!(
            self,
            AppMode::Chat | AppMode::AgentChat | AppMode::AdvancedChat
        )
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AppMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(AppMode::Chat),
            "agent-chat" => Ok(AppMode::AgentChat),
            "advanced-chat" => Ok(AppMode::AdvancedChat),
            "completion" => Ok(AppMode::Completion),
            "workflow" => Ok(AppMode::Workflow),
            other => Err(ValidationError::invalid_format(
                "mode",
                format!("unknown app mode '{}'", other),
            )),
        }
    }
}

/// Text-to-speech settings for an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtsSettings {
    /// Whether speech synthesis is enabled.
    pub enabled: bool,

    /// Default voice; falls back to the provider's first voice when absent.
    pub voice: Option<String>,
}

/// Per-app feature switches carried alongside the app record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppFeatures {
    /// Whether follow-up questions are generated after an answer.
    pub suggested_questions_after_answer: bool,

    /// Whether audio transcription is enabled.
    pub speech_to_text: bool,

    /// Speech synthesis settings.
    pub text_to_speech: TtsSettings,
}

/// An application as seen by the service API.
///
/// Resolved from the bearer token by the token validator; carries
/// everything the handlers need so no second lookup is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceApp {
    pub id: AppId,
    pub tenant_id: TenantId,
    pub name: String,
    pub mode: AppMode,
    pub features: AppFeatures,
}

impl ServiceApp {
    /// Creates a new app record.
    pub fn new(
        id: AppId,
        tenant_id: TenantId,
        name: impl Into<String>,
        mode: AppMode,
        features: AppFeatures,
    ) -> Self {
        Self {
            id,
            tenant_id,
            name: name.into(),
            mode,
            features,
        }
    }

    /// Returns true when conversation endpoints apply to this app.
    pub fn is_chat_based(&self) -> bool {
        self.mode.is_chat_based()
    }
}
