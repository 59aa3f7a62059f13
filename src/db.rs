// src/db.rs
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::config::Config;
use crate::models::Category;
use crate::poll;
use crate::store::{CategoryStore, CategoryTx, StoreError};

pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// [`CategoryStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn CategoryTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgCategoryTx { tx }))
    }
}

struct PgCategoryTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CategoryTx for PgCategoryTx {
    async fn create(&mut self, name: &str) -> Result<Category, StoreError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(category)
    }

    async fn list_all(&mut self) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories ORDER BY id ASC",
        )
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(categories)
    }

    async fn get(&mut self, id: i32) -> Result<Category, StoreError> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn update(&mut self, id: i32, name: &str) -> Result<Category, StoreError> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, updated_at = now()
            WHERE id = $2
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&mut self, id: i32) -> Result<u64, StoreError> {
        // Lock the row first so concurrent writers to the same id wait for us.
        sqlx::query_scalar::<_, i32>("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        let detached = poll::detach_from_category(&mut self.tx, id).await?;
        debug!(category_id = id, detached, "polls detached");

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(detached)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
