//! PostgreSQL implementation of EndUserStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    AppId, DomainError, EndUser, EndUserId, Timestamp, DEFAULT_EXTERNAL_ID,
};
use crate::ports::EndUserStore;

/// PostgreSQL implementation of EndUserStore.
///
/// End users are provisioned lazily on first sight of an external id.
/// A unique index on (app_id, external_id) makes concurrent first
/// requests converge on one row.
#[derive(Clone)]
pub struct PostgresEndUserStore {
    pool: PgPool,
}

impl PostgresEndUserStore {
    /// Creates a new PostgresEndUserStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find(
        &self,
        app_id: &AppId,
        external_id: &str,
    ) -> Result<Option<EndUser>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, app_id, external_id, is_anonymous, created_at
            FROM end_users
            WHERE app_id = $1 AND external_id = $2
            "#,
        )
        .bind(app_id.as_uuid())
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch end user: {}", e)))?;

        Ok(row.map(|row| {
            let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
            EndUser {
                id: EndUserId::from_uuid(row.get("id")),
                app_id: AppId::from_uuid(row.get("app_id")),
                external_id: row.get("external_id"),
                is_anonymous: row.get("is_anonymous"),
                created_at: Timestamp::from_datetime(created_at),
            }
        }))
    }
}

#[async_trait]
impl EndUserStore for PostgresEndUserStore {
    async fn get_or_create(
        &self,
        app_id: &AppId,
        external_id: Option<&str>,
    ) -> Result<EndUser, DomainError> {
        let external_id = external_id.unwrap_or(DEFAULT_EXTERNAL_ID);
        let is_anonymous = external_id == DEFAULT_EXTERNAL_ID;

        if let Some(user) = self.find(app_id, external_id).await? {
            return Ok(user);
        }

        let candidate = EndUser {
            id: EndUserId::new(),
            app_id: *app_id,
            external_id: external_id.to_string(),
            is_anonymous,
            created_at: Timestamp::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO end_users (id, app_id, external_id, is_anonymous, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (app_id, external_id) DO NOTHING
            "#,
        )
        .bind(candidate.id.as_uuid())
        .bind(candidate.app_id.as_uuid())
        .bind(&candidate.external_id)
        .bind(candidate.is_anonymous)
        .bind(candidate.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to create end user: {}", e)))?;

        // A concurrent request may have won the insert; read back the
        // row that actually exists.
        self.find(app_id, external_id)
            .await?
            .ok_or_else(|| DomainError::database("End user vanished after insert"))
    }
}
