//! Axum HTTP front end for the classifier.
//!
//! ## URL layout (`{prefix}` is `api_prefix`, e.g. `/api`)
//!
//! ```text
//! GET  {prefix}/health
//! POST {prefix}/predict/file     raw image bytes, or multipart field `image`
//! POST {prefix}/predict/base64   {"image": "<base64>"}
//! ```
//!
//! Classification is CPU-bound, so handlers hand it to
//! [`tokio::task::spawn_blocking`].

mod api;

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::model::Inference;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone: all fields are reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Project name reported by the health endpoint.
    pub project_name: Arc<str>,
    /// Backend name reported by the health endpoint.
    pub backend: Arc<str>,
    /// Read-only inference capability shared by all requests.
    pub model: Arc<dyn Inference>,
}

impl AppState {
    pub fn new(
        project_name: impl Into<Arc<str>>,
        backend: impl Into<Arc<str>>,
        model: Arc<dyn Inference>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            backend: backend.into(),
            model,
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the router with every route nested under `api_prefix`.
pub fn build_router(state: AppState, api_prefix: &str, max_body_bytes: usize) -> Router {
    let api = Router::new()
        .route("/health",         get(api::health))
        .route("/predict/file",   post(api::classify_file))
        .route("/predict/base64", post(api::classify_base64));

    let prefix = api_prefix.trim_end_matches('/');
    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };

    router
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Bind `config.server.bind` and serve until `shutdown` resolves.
pub async fn serve(
    config: &Config,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    let bind_addr = config.server.bind.as_str();
    let router = build_router(state, &config.api_prefix, config.server.max_body_bytes);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, api_prefix = %config.api_prefix, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Server(format!("server error: {e}")))?;

    info!("http server shut down");
    Ok(())
}
