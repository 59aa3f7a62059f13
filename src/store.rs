// store.rs
//! Persistence seam between the handlers and the database.
//!
//! A request opens one [`CategoryTx`] via [`CategoryStore::begin`], runs its
//! operations on it and calls [`CategoryTx::commit`]. A scope that is dropped
//! without committing is rolled back.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Category;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Category with ID {0} was not found")]
    NotFound(i32),
    #[error("{0}")]
    Persistence(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn CategoryTx>, StoreError>;
}

#[async_trait]
pub trait CategoryTx: Send {
    async fn create(&mut self, name: &str) -> Result<Category, StoreError>;

    /// All categories, ordered by id ascending.
    async fn list_all(&mut self) -> Result<Vec<Category>, StoreError>;

    async fn get(&mut self, id: i32) -> Result<Category, StoreError>;

    async fn update(&mut self, id: i32, name: &str) -> Result<Category, StoreError>;

    /// Detaches the category's polls and removes it. Returns how many polls
    /// were detached.
    async fn delete(&mut self, id: i32) -> Result<u64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
