//! Raw deserialization types.
//!
//! These structs mirror the merged TOML tree and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw config shape: serde target before resolution.
#[derive(Deserialize)]
pub(super) struct RawConfig {
    pub project_name: String,
    pub api_prefix: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub server: RawServer,
    pub model: RawModel,
}

// ── Server ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawServer {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for RawServer {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

// ── Model ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawModel {
    #[serde(default = "default_backend")]
    pub backend: String,
    pub path: String,
    pub device: String,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_output_name")]
    pub output_name: String,
}

pub(super) fn default_log_level() -> String { "info".to_string() }
pub(super) fn default_bind() -> String { "127.0.0.1:8000".to_string() }
pub(super) fn default_max_body_bytes() -> usize { 10 * 1024 * 1024 }
pub(super) fn default_backend() -> String { "dummy".to_string() }
pub(super) fn default_input_name() -> String { "input".to_string() }
pub(super) fn default_output_name() -> String { "output".to_string() }
