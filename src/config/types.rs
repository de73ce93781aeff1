//! Public configuration types consumed at startup.

use std::path::PathBuf;

/// HTTP listener configuration (`[server]`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the listener to.
    pub bind: String,
    /// Upper bound on a request body, applied to every endpoint.
    pub max_body_bytes: usize,
}

/// Inference backend configuration (`[model]`).
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Which backend to construct (`"dummy"`, `"onnx"`).
    pub backend: String,
    /// Checkpoint location (already expanded, no `~`).
    pub path: PathBuf,
    /// Target device identifier. Only `"cpu"` is accepted today.
    pub device: String,
    /// Expected SHA-256 of the checkpoint, lowercase hex.
    pub sha256: Option<String>,
    /// Name of the ONNX input tensor.
    pub input_name: String,
    /// Name of the ONNX output tensor.
    pub output_name: String,
}

/// Fully-resolved service configuration.
///
/// Built once in `main` and passed by reference; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_name: String,
    /// API mount point. Always starts with `/`.
    pub api_prefix: String,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub server: ServerConfig,
    pub model: ModelConfig,
}
