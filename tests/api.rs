use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use daruleman_site::api::{create_router, AppState};
use daruleman_site::config::Config;
use daruleman_site::models::Quote;
use daruleman_site::repository::{Repositories, ResourceStore, StoreError};

fn app() -> Router {
    app_with(Repositories::in_memory(), Config::default())
}

fn app_with(repositories: Repositories, config: Config) -> Router {
    let state = AppState::new(Arc::new(repositories), Arc::new(config)).unwrap();
    create_router(state)
}

/// A quotes table whose backend is down.
struct OfflineStore;

#[async_trait]
impl ResourceStore<Quote> for OfflineStore {
    async fn list_all(&self) -> Result<Vec<Value>, StoreError> {
        Err(offline())
    }

    async fn append(&self, _record: Quote) -> Result<Value, StoreError> {
        Err(offline())
    }
}

fn offline() -> StoreError {
    StoreError::Query {
        status: 503,
        message: "table offline".to_string(),
    }
}

fn offline_quotes(environment: &str) -> Router {
    let mut repositories = Repositories::in_memory();
    repositories.quotes = Arc::new(OfflineStore);
    let mut config = Config::default();
    config.server.environment = environment.to_string();
    app_with(repositories, config)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn quotes_get_sequential_ids() {
    let app = app();
    let quote = json!({"quote": "Q", "author": "A", "source": "S", "lang": "urdu"});

    let (status, first) = post(&app, "/api/quotes", quote.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["id"], 1);
    assert_eq!(first["quote"], "Q");

    let (status, second) = post(&app, "/api/quotes", quote).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["id"], 2);

    let (status, all) = get(&app, "/api/quotes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all, json!([first, second]));
}

#[tokio::test]
async fn rejected_create_leaves_collection_unchanged() {
    let app = app();

    let (status, body) = post(&app, "/api/books", json!({"title": "X"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: author, link");

    let (_, all) = get(&app, "/api/books").await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn book_price_defaults_to_free() {
    let app = app();
    let (status, book) = post(
        &app,
        "/api/books",
        json!({"title": "Fazail", "author": "Shaykh", "link": "https://example.com/f.pdf"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["price"], "Free");
    assert_eq!(book["id"], 1);
}

#[tokio::test]
async fn poem_lines_must_be_a_non_empty_list() {
    let app = app();
    for lines in [json!([]), json!("one line"), json!([1, 2])] {
        let (status, body) = post(
            &app,
            "/api/poems",
            json!({"title": "T", "poet": "P", "lang": "urdu", "lines": lines}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: lines");
    }

    let (status, poem) = post(
        &app,
        "/api/poems",
        json!({"title": "T", "poet": "P", "lang": "urdu", "lines": ["a", "b"]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(poem["lines"], json!(["a", "b"]));
}

#[tokio::test]
async fn recordings_are_stamped_with_todays_date() {
    let app = app();
    let body = json!({
        "title": "Bayan",
        "scholar": "Mufti",
        "duration": "45:00",
        "lang": "urdu",
        "url": "https://example.com/bayan.opus"
    });

    let (status, created) = post(&app, "/api/audiobayanat", body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        created["date"],
        Utc::now().date_naive().format("%Y-%m-%d").to_string()
    );

    let (status, hymn) = post(&app, "/api/hamdonaatokalaam", body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(hymn["id"], 1);
}

#[tokio::test]
async fn islahi_majalis_round_trip() {
    let app = app();
    let (status, created) = post(
        &app,
        "/api/islahimajalis",
        json!({
            "title": "Majlis",
            "scholar": "Hazrat",
            "duration": "1:10:00",
            "lang": "urdu",
            "url": "https://example.com/majlis.mp3"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created.get("created_at").is_none());

    let (_, all) = get(&app, "/api/islahimajalis").await;
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["title"], "Majlis");
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = app();

    let request = Request::post("/api/quotes")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(&app, "/api/quotes", json!(["quote"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Request body must be a JSON object");
}

#[tokio::test]
async fn health_endpoints() {
    let app = app();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get(&app, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collections"]["quotes"]["records"], 0);
}

#[tokio::test]
async fn audio_sources_follow_device_preference() {
    let app = app();

    let (status, body) = get(
        &app,
        "/api/audio/sources?url=https%3A%2F%2Fcdn.example.com%2Fb.opus&device=ios",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["primaryUrl"], "https://cdn.example.com/b.m4a");
    assert_eq!(body["primaryType"], "audio/aac");
    assert_eq!(body["sources"].as_array().unwrap().len(), 3);

    let request = Request::get("/api/audio/sources?url=/audio/b.opus")
        .header("user-agent", "Mozilla/5.0 (Linux; Android 14)")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app, request).await;
    assert_eq!(body["primaryUrl"], "/audio/b.mp3");

    let (status, body) = get(&app, "/api/audio/sources").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Audio URL is required");
}

#[tokio::test]
async fn store_failures_are_json_500s_with_details_outside_production() {
    let app = offline_quotes("development");
    let quote = json!({"quote": "Q", "author": "A", "source": "S", "lang": "urdu"});

    let (status, body) = get(&app, "/api/quotes").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to load quote");
    assert!(body["details"].as_str().unwrap().contains("table offline"));

    let (status, body) = post(&app, "/api/quotes", quote).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to add quote");
    assert!(body["details"].as_str().unwrap().contains("table offline"));
}

#[tokio::test]
async fn production_store_failures_hide_details() {
    let app = offline_quotes("production");
    let quote = json!({"quote": "Q", "author": "A", "source": "S", "lang": "urdu"});

    let (status, body) = get(&app, "/api/quotes").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to load quote"}));

    let (status, body) = post(&app, "/api/quotes", quote).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to add quote"}));

    let (status, _) = get(&app, "/api/books").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_device_is_a_json_bad_request() {
    let app = app();

    let (status, body) = get(&app, "/api/audio/sources?url=%2Fa.opus&device=foo").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("foo"));
}

#[tokio::test]
async fn oversized_body_is_a_json_413() {
    let mut config = Config::default();
    config.server.max_body_size = 16;
    let app = app_with(Repositories::in_memory(), config);

    let quote = json!({"quote": "a long saying that will not fit", "author": "A", "source": "S", "lang": "urdu"});
    let (status, body) = post(&app, "/api/quotes", quote).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());

    let (_, all) = get(&app, "/api/quotes").await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn file_rows_are_served_as_written() {
    let temp = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.storage.data_dir = temp.path().to_path_buf();
    let seeded = json!([
        {"id": 7, "title": "Old bayan", "scholar": "S", "duration": 3600, "lang": "urdu", "url": "/a.mp3", "featured": true}
    ]);
    std::fs::write(temp.path().join("audiobayanat.json"), seeded.to_string()).unwrap();

    let repositories = Repositories::from_config(&config).await.unwrap();
    let app = app_with(repositories, config);

    let (status, all) = get(&app, "/api/audiobayanat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all, seeded);

    let lecture = json!({"title": "New", "scholar": "S", "duration": "1:00", "lang": "urdu", "url": "/b.mp3"});
    let (status, created) = post(&app, "/api/audiobayanat", lecture).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 8);

    let (_, all) = get(&app, "/api/audiobayanat").await;
    assert_eq!(all[0], seeded[0]);
    assert_eq!(all[1], created);
}
