//! Files attached to a message.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the exchange a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileBelongsTo {
    User,
    Assistant,
}

/// A file attached to a message (uploaded input or generated output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageFile {
    pub id: Uuid,

    /// Coarse media kind, e.g. `image` or `audio`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Access URL; signed URLs are refreshed at projection time.
    pub url: String,

    pub belongs_to: FileBelongsTo,
}

impl MessageFile {
    /// Creates a message file record.
    pub fn new(
        kind: impl Into<String>,
        url: impl Into<String>,
        belongs_to: FileBelongsTo,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            url: url.into(),
            belongs_to,
        }
    }
}
