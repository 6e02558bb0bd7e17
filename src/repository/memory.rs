// src/repository/memory.rs
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::traits::{next_id, ResourceStore, StoreError};
use crate::models::Stored;

/// Process-local collection, used by tests and throwaway instances.
pub struct MemoryStore<T> {
    rows: RwLock<Vec<Value>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> MemoryStore<T> {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows: RwLock::new(rows),
            _record: PhantomData,
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl<T> ResourceStore<T> for MemoryStore<T>
where
    T: Serialize + Send + Sync + 'static,
{
    async fn list_all(&self) -> Result<Vec<Value>, StoreError> {
        Ok(self.rows.read().await.clone())
    }

    async fn append(&self, record: T) -> Result<Value, StoreError> {
        let mut rows = self.rows.write().await;
        let created = serde_json::to_value(Stored::new(next_id(&rows)?, record))?;
        rows.push(created.clone());
        Ok(created)
    }
}
