// src/api/middleware.rs
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::{info, warn};

/// Log one line per request: `METHOD /path -> status (ms)`.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed = started.elapsed().as_millis();
    if status.is_server_error() {
        warn!("{} {} -> {} ({} ms)", method, path, status.as_u16(), elapsed);
    } else {
        info!("{} {} -> {} ({} ms)", method, path, status.as_u16(), elapsed);
    }

    response
}
