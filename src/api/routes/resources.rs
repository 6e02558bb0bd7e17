// src/api/routes/resources.rs
//! List and create handlers shared by every content collection.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use log::{error, info};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::{ApiResult, AppState};
use crate::repository::{row_id, StoreError};
use crate::resources::Resource;

/// Mount `GET` and `POST /api/<path>` for one collection.
pub fn mount<R: Resource>(router: Router<AppState>) -> Router<AppState> {
    router.route(
        &format!("/api/{}", R::PATH),
        get(list_records::<R>).post(create_record::<R>),
    )
}

/// Every row as stored, in store order. No server-side filtering.
async fn list_records<R: Resource>(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Value>>> {
    R::store(&state.repositories)
        .list_all()
        .await
        .map(Json)
        .map_err(|err| store_failure(&state, format!("Failed to load {}", R::LABEL), err))
}

async fn create_record<R: Resource>(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let body = body?;
    let body: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Request body must be valid JSON".to_string()))?;

    let record = R::prepare(&body, Utc::now().date_naive())?;

    let created = R::store(&state.repositories)
        .append(record)
        .await
        .map_err(|err| store_failure(&state, format!("Failed to add {}", R::LABEL), err))?;

    info!("Added {} #{:?}", R::LABEL, row_id(&created));
    Ok((StatusCode::CREATED, Json(created)))
}

fn store_failure(state: &AppState, message: String, err: StoreError) -> ApiError {
    error!("{}: {}", message, err);
    let details = state
        .config
        .expose_error_details()
        .then(|| err.to_string());
    ApiError::internal(message, details)
}
