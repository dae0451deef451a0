//! Visit domain methods on Repository

use super::Repository;
use crate::{
    error::AppResult,
    models::visit::{NewVisit, Visit},
};

impl Repository {
    /// List all visits
    pub async fn visits_list(&self) -> AppResult<Vec<Visit>> {
        let rows = sqlx::query_as::<_, Visit>("SELECT * FROM visits ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get visit by ID
    pub async fn visits_find(&self, id: i64) -> AppResult<Option<Visit>> {
        let row = sqlx::query_as::<_, Visit>("SELECT * FROM visits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Create visit
    pub async fn visits_insert(&self, data: &NewVisit, user_id: Option<i64>) -> AppResult<Visit> {
        let row = sqlx::query_as::<_, Visit>(
            r#"
            INSERT INTO visits (user_id, name, email, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(data.latitude)
        .bind(data.longitude)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Replace the business fields of a visit
    pub async fn visits_update(&self, id: i64, data: &NewVisit) -> AppResult<Option<Visit>> {
        let row = sqlx::query_as::<_, Visit>(
            r#"
            UPDATE visits
            SET name = $1, email = $2, latitude = $3, longitude = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete visit
    pub async fn visits_delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM visits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
