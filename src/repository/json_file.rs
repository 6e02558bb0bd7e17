// src/repository/json_file.rs
//! Collections kept as one JSON array per file.
//!
//! The files are also edited by hand, so rows are carried as plain JSON: an
//! append rewrites existing rows exactly as they were read.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;

use super::traits::{next_id, ResourceStore, StoreError};
use crate::models::Stored;

/// File-backed store. Appends are serialized through `write_lock` and land via
/// a temporary sibling file renamed over the original.
pub struct JsonFileStore<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T>
where
    T: Serialize + Send + Sync + 'static,
{
    /// Open the store at `path`, seeding an empty array if the file is absent.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if fs::metadata(&path).await.is_err() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await.map_err(|e| io_error(parent, e))?;
            }
            fs::write(&path, "[]").await.map_err(|e| io_error(&path, e))?;
            info!("Created empty collection at {}", path.display());
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<Value>, StoreError> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;

        match serde_json::from_str(&content)? {
            Value::Array(rows) => Ok(rows),
            _ => Err(StoreError::NotAnArray),
        }
    }

    async fn write(&self, rows: &[Value]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(rows)?;
        let staging = self.path.with_extension("json.tmp");

        fs::write(&staging, content)
            .await
            .map_err(|e| io_error(&staging, e))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        Ok(())
    }
}

#[async_trait]
impl<T> ResourceStore<T> for JsonFileStore<T>
where
    T: Serialize + Send + Sync + 'static,
{
    async fn list_all(&self) -> Result<Vec<Value>, StoreError> {
        self.read().await
    }

    async fn append(&self, record: T) -> Result<Value, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut rows = self.read().await?;
        let id = next_id(&rows)?;
        let created = serde_json::to_value(Stored::new(id, record))?;
        rows.push(created.clone());
        self.write(&rows).await?;

        debug!("Appended record {} to {}", id, self.path.display());
        Ok(created)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::models::{AudioLecture, Quote};
    use crate::repository::traits::row_id;

    fn quote(text: &str) -> Quote {
        Quote {
            quote: text.into(),
            author: "B".into(),
            source: "C".into(),
            lang: "urdu".into(),
        }
    }

    fn ids(rows: &[Value]) -> Vec<i64> {
        rows.iter().filter_map(row_id).collect()
    }

    #[tokio::test]
    async fn open_seeds_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested/quotes.json");

        let store = JsonFileStore::<Quote>::open(&path).await.unwrap();
        assert!(store.path().is_file());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let temp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Quote>::open(temp.path().join("quotes.json")).await.unwrap();

        let first = store.append(quote("A")).await.unwrap();
        let second = store.append(quote("A")).await.unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
        assert_eq!(second["quote"], "A");

        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn next_id_follows_the_largest_existing_id() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("quotes.json");
        std::fs::write(
            &path,
            r#"[{"id": 7, "quote": "x", "author": "a", "source": "s", "lang": "urdu"},
                {"id": 3, "quote": "y", "author": "a", "source": "s", "lang": "urdu"}]"#,
        )
        .unwrap();

        let store = JsonFileStore::<Quote>::open(&path).await.unwrap();
        let created = store.append(quote("z")).await.unwrap();
        assert_eq!(created["id"], 8);

        assert_eq!(ids(&store.list_all().await.unwrap()), vec![7, 3, 8]);
    }

    #[tokio::test]
    async fn hand_edited_rows_survive_an_append() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("quotes.json");
        let seeded = json!([{
            "id": 1,
            "quote": "x",
            "author": "a",
            "source": "s",
            "lang": "urdu",
            "featured": true
        }]);
        std::fs::write(&path, seeded.to_string()).unwrap();

        let store = JsonFileStore::<Quote>::open(&path).await.unwrap();
        store.append(quote("new")).await.unwrap();

        let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk[0], seeded[0]);
        assert_eq!(on_disk[1]["id"], 2);
        assert!(on_disk[1].get("featured").is_none());
    }

    #[tokio::test]
    async fn rows_missing_record_fields_are_listed_as_stored() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("audiobayanat.json");
        let legacy = json!([{
            "id": 1,
            "title": "Old bayan",
            "scholar": "Mufti",
            "duration": 3600,
            "lang": "urdu",
            "url": "/audio/old.mp3"
        }]);
        std::fs::write(&path, legacy.to_string()).unwrap();

        let store = JsonFileStore::<AudioLecture>::open(&path).await.unwrap();
        assert_eq!(Value::Array(store.list_all().await.unwrap()), legacy);
    }

    #[tokio::test]
    async fn malformed_file_is_a_parse_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("quotes.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::<Quote>::open(&path).await.unwrap();
        assert!(matches!(store.list_all().await, Err(StoreError::Parse(_))));
        assert!(matches!(store.append(quote("A")).await, Err(StoreError::Parse(_))));
    }

    #[tokio::test]
    async fn non_array_file_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("quotes.json");
        std::fs::write(&path, r#"{"id": 1}"#).unwrap();

        let store = JsonFileStore::<Quote>::open(&path).await.unwrap();
        assert!(matches!(store.list_all().await, Err(StoreError::NotAnArray)));
    }

    #[tokio::test]
    async fn exhausted_ids_leave_the_file_untouched() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("quotes.json");
        let content = json!([{"id": i64::MAX, "quote": "x"}]).to_string();
        std::fs::write(&path, &content).unwrap();

        let store = JsonFileStore::<Quote>::open(&path).await.unwrap();
        assert!(matches!(
            store.append(quote("A")).await,
            Err(StoreError::IdsExhausted(i64::MAX))
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[tokio::test]
    async fn removed_file_is_an_io_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("quotes.json");
        let store = JsonFileStore::<Quote>::open(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(store.list_all().await, Err(StoreError::Io { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_get_distinct_ids() {
        let temp = tempfile::tempdir().unwrap();
        let store = Arc::new(
            JsonFileStore::<Quote>::open(temp.path().join("quotes.json"))
                .await
                .unwrap(),
        );

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.append(quote(&format!("q{}", i))).await })
            })
            .collect();

        let mut created = Vec::new();
        for handle in handles {
            created.push(handle.await.unwrap().unwrap());
        }
        let mut assigned = ids(&created);
        assigned.sort_unstable();
        assert_eq!(assigned, (1..=16).collect::<Vec<_>>());
        assert_eq!(store.list_all().await.unwrap().len(), 16);
    }
}
