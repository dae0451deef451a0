//! Repository layer for database operations

pub mod tokens;
pub mod users;
pub mod visits;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::visit::{NewVisit, Visit},
};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Round-trip to the database (readiness probe)
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Durable store of visit records.
///
/// Each call is a single-row (or single-statement) operation; nothing here
/// spans a transaction, so concurrent writers are last-write-wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitsStore: Send + Sync {
    /// Every visit, ascending id
    async fn list(&self) -> AppResult<Vec<Visit>>;

    async fn find(&self, id: i64) -> AppResult<Option<Visit>>;

    async fn insert(&self, visit: &NewVisit, user_id: Option<i64>) -> AppResult<Visit>;

    /// Overwrite the business fields; `None` when `id` does not exist
    async fn update(&self, id: i64, visit: &NewVisit) -> AppResult<Option<Visit>>;

    /// `false` when `id` does not exist
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

#[async_trait]
impl VisitsStore for Repository {
    async fn list(&self) -> AppResult<Vec<Visit>> {
        self.visits_list().await
    }

    async fn find(&self, id: i64) -> AppResult<Option<Visit>> {
        self.visits_find(id).await
    }

    async fn insert(&self, visit: &NewVisit, user_id: Option<i64>) -> AppResult<Visit> {
        self.visits_insert(visit, user_id).await
    }

    async fn update(&self, id: i64, visit: &NewVisit) -> AppResult<Option<Visit>> {
        self.visits_update(id, visit).await
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        self.visits_delete(id).await
    }
}
