//! End user store port.

use async_trait::async_trait;

use crate::domain::foundation::{AppId, DomainError, EndUser};

/// Store port for lazily provisioned end users.
#[async_trait]
pub trait EndUserStore: Send + Sync {
    /// Resolve an end user by the caller-supplied `user` value.
    ///
    /// The first request carrying an unknown external id creates the
    /// record; `None` resolves to the app's anonymous fallback user.
    async fn get_or_create(
        &self,
        app_id: &AppId,
        external_id: Option<&str>,
    ) -> Result<EndUser, DomainError>;
}
