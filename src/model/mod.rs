//! Inference capability.
//!
//! [`Inference`] is the seam the classification pipeline calls through: a
//! normalised `(1, 3, H, W)` batch in, a vector of log-probabilities out.
//! [`Model`] is an enum over concrete backends, built once at startup by
//! [`build`] and shared read-only by every request.
//!
//! Adding a backend = new module + new variant + new `infer` arm + new
//! `build` arm.

pub mod checkpoint;
pub mod dummy;
#[cfg(feature = "onnx")]
pub mod onnx;

use std::path::PathBuf;

use ndarray::ArrayView4;
use thiserror::Error;

use crate::config::ModelConfig;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown model backend: {0}")]
    UnknownBackend(String),

    #[error("model backend '{0}' is not compiled in (enable the `{0}` feature)")]
    BackendDisabled(String),

    #[error("unsupported device '{0}' (supported: cpu)")]
    UnsupportedDevice(String),

    #[error("cannot read checkpoint {}: {source}", path.display())]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("checkpoint {} expected SHA-256 {expected} but found {actual}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("failed to load model from {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model session mutex was poisoned by a previous panic")]
    SessionPoisoned,
}

// ── Capability ────────────────────────────────────────────────────────────────

/// Maps a normalised image batch to per-class log-probabilities.
///
/// Implementations must be deterministic and safe to call from many threads
/// at once; any locking a runtime needs lives inside the implementation.
pub trait Inference: Send + Sync {
    fn infer(&self, batch: ArrayView4<'_, f32>) -> Result<Vec<f32>, ModelError>;
}

impl<F> Inference for F
where
    F: Fn(ArrayView4<'_, f32>) -> Result<Vec<f32>, ModelError> + Send + Sync,
{
    fn infer(&self, batch: ArrayView4<'_, f32>) -> Result<Vec<f32>, ModelError> {
        self(batch)
    }
}

// ── Backend enum ──────────────────────────────────────────────────────────────

/// All available inference backends.
#[derive(Debug)]
pub enum Model {
    Dummy(dummy::DummyModel),
    #[cfg(feature = "onnx")]
    Onnx(onnx::OnnxModel),
}

impl Model {
    /// Backend name as written in `[model] backend`.
    pub fn backend(&self) -> &'static str {
        match self {
            Model::Dummy(_) => "dummy",
            #[cfg(feature = "onnx")]
            Model::Onnx(_) => "onnx",
        }
    }
}

impl Inference for Model {
    fn infer(&self, batch: ArrayView4<'_, f32>) -> Result<Vec<f32>, ModelError> {
        match self {
            Model::Dummy(m) => m.infer(batch),
            #[cfg(feature = "onnx")]
            Model::Onnx(m) => m.infer(batch),
        }
    }
}

// ── Factory ───────────────────────────────────────────────────────────────────

/// Construct the configured backend. Called once at startup; every error is
/// fatal to the process.
pub fn build(config: &ModelConfig) -> Result<Model, ModelError> {
    if !config.device.eq_ignore_ascii_case("cpu") {
        return Err(ModelError::UnsupportedDevice(config.device.clone()));
    }

    if let Some(expected) = config.sha256.as_deref() {
        checkpoint::verify(&config.path, expected)?;
    }

    match config.backend.as_str() {
        "dummy" => Ok(Model::Dummy(dummy::DummyModel)),
        #[cfg(feature = "onnx")]
        "onnx" => Ok(Model::Onnx(onnx::OnnxModel::load(config)?)),
        #[cfg(not(feature = "onnx"))]
        "onnx" => Err(ModelError::BackendDisabled("onnx".into())),
        other => Err(ModelError::UnknownBackend(other.to_string())),
    }
}
