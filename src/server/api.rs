//! Axum handlers for the classification routes.
//!
//! Each handler receives [`AppState`] via [`axum::extract::State`] and
//! returns an axum [`Response`]. Decode failures map to 400; model and
//! output failures map to 500.

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::vision::{self, ClassificationResult, ClassifyError, InvalidImage};

use super::AppState;

const LOAD_FAILED: &str = "Error loading input image";
const DECODE_FAILED: &str = "Error decoding input image";

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct InputImage {
    image: String,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

fn bad_image(msg: impl std::fmt::Display) -> Response {
    (StatusCode::BAD_REQUEST, json_error("invalid_image", msg)).into_response()
}

/// Map a finished pipeline run to a response. `invalid_msg` is the client
/// message for undecodable input.
fn respond(
    route: &'static str,
    outcome: Result<Result<ClassificationResult, ClassifyError>, tokio::task::JoinError>,
    invalid_msg: &str,
) -> Response {
    match outcome {
        Ok(Ok(result)) => {
            info!(route, label = result.label.as_str(), confidence = result.confidence, "classified");
            (StatusCode::OK, Json(result)).into_response()
        }
        Ok(Err(ClassifyError::InvalidImage(e))) => {
            info!(route, "rejected input: {e}");
            match e {
                // Size refusals carry their reason to the client.
                InvalidImage::Dimensions { .. } | InvalidImage::TooLarge { .. } => {
                    bad_image(format!("{invalid_msg}: {e}"))
                }
                _ => bad_image(invalid_msg),
            }
        }
        Ok(Err(e)) => {
            warn!(route, "classification failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, json_error("inference", e)).into_response()
        }
        Err(e) => {
            warn!(route, "classification task panicked: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, json_error("internal", "classification task failed"))
                .into_response()
        }
    }
}

/// Pull the upload out of a `multipart/form-data` body: the `image` field,
/// or the first field carrying a file name.
async fn multipart_image(mut form: Multipart) -> Option<Bytes> {
    while let Ok(Some(field)) = form.next_field().await {
        if field.name() == Some("image") || field.file_name().is_some() {
            return field.bytes().await.ok();
        }
    }
    None
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET {prefix}/health
pub(super) async fn health(State(state): State<AppState>) -> Response {
    let body = json!({
        "status": "ok",
        "project": &*state.project_name,
        "backend": &*state.backend,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST {prefix}/predict/file: image bytes as the body or a multipart upload.
pub(super) async fn classify_file(State(state): State<AppState>, request: Request) -> Response {
    let bytes = if is_multipart(&request) {
        match Multipart::from_request(request, &state).await {
            Ok(form) => multipart_image(form).await,
            Err(e) => {
                info!(route = "file", "rejected multipart body: {e}");
                None
            }
        }
    } else {
        match Bytes::from_request(request, &state).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                info!(route = "file", "rejected body: {e}");
                None
            }
        }
    };

    let Some(bytes) = bytes else {
        return bad_image(LOAD_FAILED);
    };

    let model = state.model.clone();
    let outcome =
        tokio::task::spawn_blocking(move || vision::classify_bytes(&bytes, model.as_ref())).await;
    respond("file", outcome, LOAD_FAILED)
}

/// POST {prefix}/predict/base64: `{"image": "<base64>"}`.
pub(super) async fn classify_base64(
    State(state): State<AppState>,
    Json(req): Json<InputImage>,
) -> Response {
    let model = state.model.clone();
    let outcome =
        tokio::task::spawn_blocking(move || vision::classify_base64(&req.image, model.as_ref()))
            .await;
    respond("base64", outcome, DECODE_FAILED)
}
