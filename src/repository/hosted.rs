// src/repository/hosted.rs
//! Hosted table store speaking the PostgREST dialect exposed by Supabase.
//!
//! The service owns id assignment; rows come back ordered by id, newest first.

use std::marker::PhantomData;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

use super::traits::{row_id, ResourceStore, StoreError};
use crate::config::HostedConfig;

pub struct HostedTableStore<T> {
    client: Client,
    endpoint: String,
    api_key: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> HostedTableStore<T> {
    pub fn new(client: Client, config: &HostedConfig, table: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/rest/v1/{}", config.url.trim_end_matches('/'), table),
            api_key: config.api_key.clone(),
            _record: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl<T> ResourceStore<T> for HostedTableStore<T>
where
    T: Serialize + Send + Sync + 'static,
{
    async fn list_all(&self) -> Result<Vec<Value>, StoreError> {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("select", "*"), ("order", "id.desc")]);

        let response = ensure_success(self.authorize(request).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn append(&self, record: T) -> Result<Value, StoreError> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("Prefer", "return=representation")
            .json(&[&record]);

        let response = ensure_success(self.authorize(request).send().await?).await?;
        let status = response.status().as_u16();
        let rows: Vec<Value> = response.json().await?;

        let created = rows.into_iter().next().ok_or_else(|| StoreError::Query {
            status,
            message: "insert returned no rows".to_string(),
        })?;
        debug!("Inserted row {:?} into {}", row_id(&created), self.endpoint);
        Ok(created)
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Query { status, message })
}
