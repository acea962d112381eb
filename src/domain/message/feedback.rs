//! Message feedback records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    AppId, ConversationId, EndUserId, FeedbackId, MessageId, Timestamp, ValidationError,
};

/// A like/dislike rating on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackRating {
    Like,
    Dislike,
}

impl FeedbackRating {
    /// Returns the wire representation of the rating.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackRating::Like => "like",
            FeedbackRating::Dislike => "dislike",
        }
    }
}

impl fmt::Display for FeedbackRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeedbackRating {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(FeedbackRating::Like),
            "dislike" => Ok(FeedbackRating::Dislike),
            other => Err(ValidationError::invalid_format(
                "rating",
                format!("expected 'like' or 'dislike', got '{}'", other),
            )),
        }
    }
}

/// Who recorded a feedback entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSource {
    /// An end user, through an application surface.
    User,
    /// An operator, through the console.
    Admin,
}

/// Feedback left by one end user on one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFeedback {
    pub id: FeedbackId,
    pub app_id: AppId,
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    pub from_end_user_id: EndUserId,
    pub rating: FeedbackRating,
    pub content: Option<String>,
    pub from_source: FeedbackSource,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MessageFeedback {
    /// Creates a new end-user feedback entry.
    pub fn from_end_user(
        app_id: AppId,
        conversation_id: ConversationId,
        message_id: MessageId,
        end_user_id: EndUserId,
        rating: FeedbackRating,
        content: Option<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: FeedbackId::new(),
            app_id,
            conversation_id,
            message_id,
            from_end_user_id: end_user_id,
            rating,
            content,
            from_source: FeedbackSource::User,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the rating and content, bumping `updated_at`.
    pub fn revise(&mut self, rating: FeedbackRating, content: Option<String>) {
        self.rating = rating;
        self.content = content;
        self.updated_at = Timestamp::now();
    }
}
