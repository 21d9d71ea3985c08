use crate::{
    error::SessionError,
    models::{SessionRecord, UserRecord},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// SessionRepository
///
/// The persistence adapter behind session resolution. The OAuth flow owns the
/// writes to these tables; this service only reads sessions and revokes them on sign-out.
///
/// **Send + Sync + async_trait** keep `Arc<dyn SessionRepository>` usable across
/// Axum's task boundaries.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Looks up a non-expired session by its token, joined with its user.
    async fn find_session(&self, token: &str) -> Result<Option<SessionRecord>, SessionError>;

    /// Loads a user directly. Used by the local development bypass.
    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>, SessionError>;

    /// Revokes a session. Returns `false` when no row matched.
    async fn delete_session(&self, token: &str) -> Result<bool, SessionError>;
}

/// RepositoryState
///
/// The shared handle stored in `AppState`.
pub type RepositoryState = Arc<dyn SessionRepository>;

/// PostgresRepository
///
/// `SessionRepository` over the Prisma-generated `"User"` / `"Session"` tables.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresRepository {
    async fn find_session(&self, token: &str) -> Result<Option<SessionRecord>, SessionError> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT u.id, u.name, u.email, u.image, u.role, s.expires
            FROM "Session" s
            JOIN "User" u ON u.id = s."userId"
            WHERE s."sessionToken" = $1 AND s.expires > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>, SessionError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"SELECT id, name, email, image, role FROM "User" WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete_session(&self, token: &str) -> Result<bool, SessionError> {
        let result = sqlx::query(r#"DELETE FROM "Session" WHERE "sessionToken" = $1"#)
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
