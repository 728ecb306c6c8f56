//! HTTP gateway (Axum) in front of the similarity pipeline.
//!
//! This module is primarily used by the `pairscore` server binary.

#![allow(missing_docs)]

pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use handler::similarity_handler;
pub use state::HandlerState;

use crate::pipeline::PAIRSCORE_STATUS_HEADER;

/// Header value sent by `GET /healthz`.
pub const PAIRSCORE_STATUS_HEALTHY: &str = "healthy";

pub fn create_router_with_state(state: HandlerState) -> Router {
    let static_dir = state.static_dir.clone();

    let router = Router::new()
        .route("/healthz", get(health_handler))
        .route("/similarity", post(similarity_handler));

    let router = match static_dir {
        Some(dir) => {
            tracing::debug!(dir = %dir.display(), "Serving static frontend");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
}

#[tracing::instrument(skip(state))]
pub async fn health_handler(State(state): State<HandlerState>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        PAIRSCORE_STATUS_HEADER,
        HeaderValue::from_static(PAIRSCORE_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: "ok",
            store: state.store_backend,
        }),
    )
        .into_response()
}
