// src/api/mod.rs
//! API layer module
//!
//! Routes every collection under `/api/<path>`, the audio proxy under
//! `/api/audio` and the health checks under `/health`.

pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use log::warn;
use reqwest::Client;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;
use crate::repository::Repositories;

/// API application state
#[derive(Clone)]
pub struct AppState {
    pub repositories: Arc<Repositories>,
    pub config: Arc<Config>,
    /// Outbound client for the audio proxy.
    pub http_client: Client,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(repositories: Arc<Repositories>, config: Arc<Config>) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .user_agent(config.proxy.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.proxy.connect_timeout_secs))
            .build()
            .context("Failed to build audio proxy client")?;

        Ok(Self {
            repositories,
            config,
            http_client,
            started_at: Instant::now(),
        })
    }
}

/// Create the main API router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let mut router = routes::create_routes()
        .layer(DefaultBodyLimit::max(state.config.server.max_body_size))
        .layer(cors_layer(&state.config.server.cors_origins));

    if state.config.logging.log_requests {
        router = router.layer(axum::middleware::from_fn(middleware::log_requests));
    }

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
}

/// API error types
pub mod error {
    use axum::{
        extract::rejection::{BytesRejection, QueryRejection},
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use serde_json::json;
    use std::fmt;

    use crate::resources::ValidationError;

    #[derive(Debug)]
    pub enum ApiError {
        BadRequest(String),
        /// An extractor rejected the request before the handler ran.
        Rejected { status: StatusCode, message: String },
        /// A status relayed from an upstream server.
        Upstream { status: StatusCode, message: String },
        Internal { message: String, details: Option<String> },
        ServiceUnavailable(String),
    }

    impl ApiError {
        pub fn internal(message: impl Into<String>, details: Option<String>) -> Self {
            ApiError::Internal {
                message: message.into(),
                details,
            }
        }
    }

    impl fmt::Display for ApiError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
                ApiError::Rejected { status, message } => {
                    write!(f, "Rejected {}: {}", status.as_u16(), message)
                }
                ApiError::Upstream { status, message } => {
                    write!(f, "Upstream {}: {}", status.as_u16(), message)
                }
                ApiError::Internal { message, details } => match details {
                    Some(details) => write!(f, "Internal Server Error: {} ({})", message, details),
                    None => write!(f, "Internal Server Error: {}", message),
                },
                ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            }
        }
    }

    impl std::error::Error for ApiError {}

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            let (status, message, details) = match self {
                ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
                ApiError::Rejected { status, message } => (status, message, None),
                ApiError::Upstream { status, message } => (status, message, None),
                ApiError::Internal { message, details } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, message, details)
                }
                ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg, None),
            };

            let body = match details {
                Some(details) => json!({ "error": message, "details": details }),
                None => json!({ "error": message }),
            };

            (status, Json(body)).into_response()
        }
    }

    impl From<BytesRejection> for ApiError {
        fn from(rejection: BytesRejection) -> Self {
            ApiError::Rejected {
                status: rejection.status(),
                message: rejection.body_text(),
            }
        }
    }

    impl From<QueryRejection> for ApiError {
        fn from(rejection: QueryRejection) -> Self {
            ApiError::Rejected {
                status: rejection.status(),
                message: rejection.body_text(),
            }
        }
    }

    impl From<ValidationError> for ApiError {
        fn from(err: ValidationError) -> Self {
            ApiError::BadRequest(err.to_string())
        }
    }
}

/// API result type
pub type ApiResult<T> = Result<T, error::ApiError>;
