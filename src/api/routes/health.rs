// src/api/routes/health.rs
//! Health check routes

use axum::{extract::State, response::Json, routing::get, Router};
use log::warn;
use serde_json::{json, Map, Value};

use crate::api::error::ApiError;
use crate::api::{ApiResult, AppState};
use crate::repository::Repositories;
use crate::resources::{AudioBayanat, Books, HamdoNaat, IslahiMajalis, Poems, Quotes, Resource};

/// Create health check routes
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness_check))
        .route("/ready", get(readiness_check))
}

/// Returns 200 OK if the service is running
async fn health_check() -> ApiResult<Json<Value>> {
    Ok(Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    })))
}

async fn liveness_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(json!({
        "status": "alive",
        "timestamp": chrono::Utc::now(),
        "uptime_seconds": state.started_at.elapsed().as_secs()
    })))
}

/// Returns 200 OK once every collection can be read.
async fn readiness_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let repositories = &state.repositories;
    let mut collections = Map::new();
    let mut ready = true;

    for (path, count) in [
        (AudioBayanat::PATH, count::<AudioBayanat>(repositories).await),
        (HamdoNaat::PATH, count::<HamdoNaat>(repositories).await),
        (Poems::PATH, count::<Poems>(repositories).await),
        (Quotes::PATH, count::<Quotes>(repositories).await),
        (Books::PATH, count::<Books>(repositories).await),
        (IslahiMajalis::PATH, count::<IslahiMajalis>(repositories).await),
    ] {
        let check = match count {
            Some(records) => json!({ "status": "readable", "records": records }),
            None => {
                ready = false;
                json!({ "status": "unreadable" })
            }
        };
        collections.insert(path.to_string(), check);
    }

    if !ready {
        return Err(ApiError::ServiceUnavailable(
            "Service is not ready".to_string(),
        ));
    }

    Ok(Json(json!({
        "status": "ready",
        "timestamp": chrono::Utc::now(),
        "collections": collections
    })))
}

async fn count<R: Resource>(repositories: &Repositories) -> Option<usize> {
    match R::store(repositories).list_all().await {
        Ok(records) => Some(records.len()),
        Err(err) => {
            warn!("Readiness: {} is unreadable: {}", R::PATH, err);
            None
        }
    }
}
