//! Access token bookkeeping on Repository

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Repository;
use crate::error::AppResult;

impl Repository {
    /// Record an issued token
    pub async fn tokens_create(&self, user_id: i64, token_id: Uuid, expires_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO access_tokens (user_id, token_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(token_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Mark a token as used. Returns false if it was revoked or has expired.
    pub async fn tokens_touch(&self, token_id: Uuid, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE access_tokens SET last_used_at = NOW()
            WHERE token_id = $1 AND user_id = $2 AND expires_at > NOW()
            "#,
        )
        .bind(token_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke a token
    pub async fn tokens_delete(&self, token_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM access_tokens WHERE token_id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop a user's expired tokens
    pub async fn tokens_purge_expired(&self, user_id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE user_id = $1 AND expires_at <= NOW()")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
