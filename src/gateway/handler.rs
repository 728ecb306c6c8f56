use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, instrument};

use crate::gateway::payload::SimilarityRequest;
use crate::gateway::state::HandlerState;
use crate::pipeline::{PAIRSCORE_STATUS_HEADER, SimilarityOutcome};

/// `POST /similarity`. Always answers 200 with a [`crate::pipeline::ResultEnvelope`].
#[instrument(skip(state, body), fields(status = tracing::field::Empty))]
pub async fn similarity_handler(State(state): State<HandlerState>, body: Bytes) -> Response {
    let request = SimilarityRequest::from_body(&body);

    let outcome = state
        .pipeline
        .evaluate(request.first(), request.second())
        .await;

    tracing::Span::current().record("status", outcome.status().as_header_value());
    info!(
        status = %outcome.status(),
        served_without_engine = outcome.served_without_engine(),
        "Similarity request complete"
    );

    make_response(outcome)
}

pub(crate) fn make_response(outcome: SimilarityOutcome) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        PAIRSCORE_STATUS_HEADER,
        HeaderValue::from_static(outcome.status().as_header_value()),
    );

    (StatusCode::OK, headers, Json(outcome.into_envelope())).into_response()
}
