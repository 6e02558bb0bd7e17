// src/repository/mod.rs
//! Repository module for data access layer
//!
//! Each collection gets its own [`ResourceStore`], picked per collection from
//! configuration: a JSON file, a hosted table, or process memory.

pub mod hosted;
pub mod json_file;
pub mod memory;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use reqwest::Client;

pub use hosted::HostedTableStore;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::{row_id, ResourceStore, StoreError};

use crate::config::{Backend, Config};
use crate::models::{AudioLecture, Book, HymnOrChant, Poem, Quote, ReformSession};
use crate::resources::{AudioBayanat, Books, HamdoNaat, IslahiMajalis, Poems, Quotes, Resource};

/// One store per content collection.
pub struct Repositories {
    pub audio_bayanat: Arc<dyn ResourceStore<AudioLecture>>,
    pub hamdonaat: Arc<dyn ResourceStore<HymnOrChant>>,
    pub poems: Arc<dyn ResourceStore<Poem>>,
    pub quotes: Arc<dyn ResourceStore<Quote>>,
    pub books: Arc<dyn ResourceStore<Book>>,
    pub islahi_majalis: Arc<dyn ResourceStore<ReformSession>>,
}

impl Repositories {
    /// Open every collection with the backend the configuration assigns it.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.hosted.timeout_secs))
            .build()
            .context("Failed to build hosted store client")?;

        Ok(Self {
            audio_bayanat: open::<AudioBayanat>(config, &client).await?,
            hamdonaat: open::<HamdoNaat>(config, &client).await?,
            poems: open::<Poems>(config, &client).await?,
            quotes: open::<Quotes>(config, &client).await?,
            books: open::<Books>(config, &client).await?,
            islahi_majalis: open::<IslahiMajalis>(config, &client).await?,
        })
    }

    /// Empty in-memory collections.
    pub fn in_memory() -> Self {
        Self {
            audio_bayanat: Arc::new(MemoryStore::default()),
            hamdonaat: Arc::new(MemoryStore::default()),
            poems: Arc::new(MemoryStore::default()),
            quotes: Arc::new(MemoryStore::default()),
            books: Arc::new(MemoryStore::default()),
            islahi_majalis: Arc::new(MemoryStore::default()),
        }
    }
}

async fn open<R: Resource>(
    config: &Config,
    client: &Client,
) -> Result<Arc<dyn ResourceStore<R::Record>>> {
    let backend = config.storage.backend_for(R::PATH);

    let store: Arc<dyn ResourceStore<R::Record>> = match backend {
        Backend::File => {
            let path = config.storage.data_dir.join(R::FILE);
            let store = JsonFileStore::<R::Record>::open(&path)
                .await
                .with_context(|| format!("Failed to open {} collection", R::LABEL))?;
            Arc::new(store)
        }
        Backend::Hosted => Arc::new(HostedTableStore::<R::Record>::new(
            client.clone(),
            &config.hosted,
            R::TABLE,
        )),
        Backend::Memory => Arc::new(MemoryStore::<R::Record>::default()),
    };

    info!("Collection {} uses the {} backend", R::PATH, backend);
    Ok(store)
}
