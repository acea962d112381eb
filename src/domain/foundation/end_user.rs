//! End user identity resolved for a request.

use serde::{Deserialize, Serialize};

use super::{AppId, EndUserId, Timestamp};

/// External id recorded when the caller did not supply a `user` value.
pub const DEFAULT_EXTERNAL_ID: &str = "DEFAULT-USER";

/// The resolved caller identity for a given request.
///
/// End users are provisioned lazily: the first request carrying an
/// unknown `user` value creates the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndUser {
    pub id: EndUserId,
    pub app_id: AppId,

    /// The caller-supplied `user` value, or [`DEFAULT_EXTERNAL_ID`].
    pub external_id: String,

    /// True when the caller supplied no `user` value.
    pub is_anonymous: bool,

    pub created_at: Timestamp,
}

impl EndUser {
    /// Creates an end user for a caller-supplied external id.
    pub fn identified(app_id: AppId, external_id: impl Into<String>) -> Self {
        Self {
            id: EndUserId::new(),
            app_id,
            external_id: external_id.into(),
            is_anonymous: false,
            created_at: Timestamp::now(),
        }
    }

    /// Creates the fallback end user for requests without a `user` value.
    pub fn anonymous(app_id: AppId) -> Self {
        Self {
            id: EndUserId::new(),
            app_id,
            external_id: DEFAULT_EXTERNAL_ID.to_string(),
            is_anonymous: true,
            created_at: Timestamp::now(),
        }
    }
}
