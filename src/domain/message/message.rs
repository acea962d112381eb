//! The message entity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{ConversationId, MessageId, Timestamp, ValidationError};

use super::{AgentThought, MessageFeedback, MessageFile};

/// Lifecycle status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Normal,
    Error,
    Stopped,
}

impl MessageStatus {
    /// Returns the wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Normal => "normal",
            MessageStatus::Error => "error",
            MessageStatus::Stopped => "stopped",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(MessageStatus::Normal),
            "error" => Ok(MessageStatus::Error),
            "stopped" => Ok(MessageStatus::Stopped),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown message status '{}'", other),
            )),
        }
    }
}

/// One question/answer exchange inside a conversation.
///
/// Produced by the chat pipeline; read-only here except for the feedback
/// attached through the feedback endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub parent_message_id: Option<MessageId>,

    /// Prompt variables supplied with the query; may embed file references.
    pub inputs: serde_json::Value,

    pub query: String,
    pub answer: String,

    pub message_files: Vec<MessageFile>,

    /// The requesting end user's feedback, when present.
    pub feedback: Option<MessageFeedback>,

    /// Opaque JSON blob written by the pipeline (usage, citations, ...).
    pub message_metadata: Option<String>,

    pub status: MessageStatus,
    pub error: Option<String>,

    pub agent_thoughts: Vec<AgentThought>,
    pub created_at: Timestamp,
}

impl Message {
    /// Creates a completed exchange.
    pub fn new(
        conversation_id: ConversationId,
        query: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            parent_message_id: None,
            inputs: serde_json::Value::Object(Default::default()),
            query: query.into(),
            answer: answer.into(),
            message_files: Vec::new(),
            feedback: None,
            message_metadata: None,
            status: MessageStatus::Normal,
            error: None,
            agent_thoughts: Vec::new(),
            created_at: Timestamp::now(),
        }
    }

    /// Sets the parent message (the exchange this one regenerated or follows).
    pub fn with_parent(mut self, parent: MessageId) -> Self {
        self.parent_message_id = Some(parent);
        self
    }

    /// Sets the prompt input variables.
    pub fn with_inputs(mut self, inputs: serde_json::Value) -> Self {
        self.inputs = inputs;
        self
    }

    /// Sets the raw metadata blob.
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.message_metadata = Some(metadata.into());
        self
    }

    /// Sets an explicit creation time (used when reconstructing from storage).
    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = created_at;
        self
    }

    /// Marks the message as failed with an error text.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.status = MessageStatus::Error;
        self.error = Some(error.into());
        self
    }

    /// Returns true when the message finished normally with a usable answer.
    pub fn has_answer(&self) -> bool {
        self.status != MessageStatus::Normal || !self.answer.is_empty()
    }
}
