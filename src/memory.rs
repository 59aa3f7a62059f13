// src/memory.rs
//! In-memory [`CategoryStore`] used by the handler tests.
//!
//! A scope holds the table lock for its whole lifetime and works on a copy
//! of the tables; `commit` writes the copy back, dropping discards it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::Category;
use crate::store::{CategoryStore, CategoryTx, StoreError};

#[derive(Debug, Clone, Default)]
struct Tables {
    categories: BTreeMap<i32, Category>,
    // poll id -> category id
    polls: BTreeMap<i32, Option<i32>>,
    last_category_id: i32,
    last_poll_id: i32,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with a persistence error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn add_poll(&self, category_id: Option<i32>) -> i32 {
        let mut tables = self.tables.lock().await;
        tables.last_poll_id += 1;
        let id = tables.last_poll_id;
        tables.polls.insert(id, category_id);
        id
    }

    /// `None` when the poll does not exist.
    pub async fn poll_category(&self, poll_id: i32) -> Option<Option<i32>> {
        self.tables.lock().await.polls.get(&poll_id).copied()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.tables.lock().await.categories.values().cloned().collect()
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn CategoryTx>, StoreError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            work,
            fail_writes: self.fail_writes.load(Ordering::SeqCst),
        }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    work: Tables,
    fail_writes: bool,
}

impl MemoryTx {
    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Persistence("simulated write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryTx for MemoryTx {
    async fn create(&mut self, name: &str) -> Result<Category, StoreError> {
        self.check_writable()?;
        self.work.last_category_id += 1;
        let now = Utc::now();
        let category = Category {
            id: self.work.last_category_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.work.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_all(&mut self) -> Result<Vec<Category>, StoreError> {
        Ok(self.work.categories.values().cloned().collect())
    }

    async fn get(&mut self, id: i32) -> Result<Category, StoreError> {
        self.work
            .categories
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&mut self, id: i32, name: &str) -> Result<Category, StoreError> {
        let fail = self.check_writable();
        let category = self
            .work
            .categories
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        fail?;
        category.name = name.to_string();
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete(&mut self, id: i32) -> Result<u64, StoreError> {
        if !self.work.categories.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }

        let mut detached = 0;
        for category_id in self.work.polls.values_mut() {
            if *category_id == Some(id) {
                *category_id = None;
                detached += 1;
            }
        }

        // Fail after the polls were touched so rollback is observable.
        self.check_writable()?;
        self.work.categories.remove(&id);
        Ok(detached)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx {
            mut guard,
            work,
            fail_writes: _,
        } = *self;
        *guard = work;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropped_scope_rolls_back() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.create("Discarded").await.unwrap();
        drop(tx);

        assert!(store.categories().await.is_empty());
    }

    #[tokio::test]
    async fn committed_scope_is_visible() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let created = tx.create("Kept").await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.categories().await, vec![created]);
    }

    #[tokio::test]
    async fn delete_detaches_only_matching_polls() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let a = tx.create("A").await.unwrap();
        let b = tx.create("B").await.unwrap();
        tx.commit().await.unwrap();

        let poll_a = store.add_poll(Some(a.id)).await;
        let poll_b = store.add_poll(Some(b.id)).await;

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.delete(a.id).await.unwrap(), 1);
        tx.commit().await.unwrap();

        assert_eq!(store.poll_category(poll_a).await, Some(None));
        assert_eq!(store.poll_category(poll_b).await, Some(Some(b.id)));
    }
}
