// src/repository/traits.rs
//! Store abstraction shared by every content collection.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed collection data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("collection file must hold a JSON array")]
    NotAnArray,

    #[error("no id left after {0}")]
    IdsExhausted(i64),

    #[error("hosted store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("hosted store rejected the query ({status}): {message}")]
    Query { status: u16, message: String },
}

/// Append-only collection of records of one kind.
///
/// Rows come back exactly as the store holds them, including fields the record
/// type does not know about. Only new records are typed. Implementations
/// assign the integer id; callers never supply one.
#[async_trait]
pub trait ResourceStore<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Every row, in the store's natural order.
    async fn list_all(&self) -> Result<Vec<Value>, StoreError>;

    /// Append one record and return the row as stored, id included.
    async fn append(&self, record: T) -> Result<Value, StoreError>;
}

/// Numeric `id` of a row, if it has one.
pub fn row_id(row: &Value) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

/// Id for the next record of a locally numbered collection.
pub fn next_id(rows: &[Value]) -> Result<i64, StoreError> {
    match rows.iter().filter_map(row_id).max() {
        Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted(max)),
        None => Ok(1),
    }
}
