//! Layered configuration.
//!
//! A base TOML document ships inside the binary; a user document overrides it
//! key by key. Overrides must keep the type of the value they replace.
//!
//! # Module layout
//!
//! - **tree**: `merge`, the type-checked deep merge of two `toml::Table`s.
//! - **raw**: Raw deserialization types (`RawConfig`, `RawModel`, …).
//!   These mirror the file shape and use serde defaults; kept private.
//! - **types**: Public configuration structs (`Config`, `ModelConfig`, …).
//! - **load**: Loading logic: `load`, `load_from`, `load_layers`,
//!   `postprocess`, `resolve`, `expand_home`.

mod load;
mod raw;
mod tree;
mod types;

use std::path::PathBuf;

use thiserror::Error;

pub use load::{
    BASE_CONFIG, USER_CONFIG_PATH, expand_home, load, load_from, load_layers, postprocess,
    resolve,
};
pub use tree::merge;
pub use types::*;

/// Errors raised while building the configuration. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An override tried to change the structural type of a key.
    #[error("type mismatch for key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Dotted path of the key, e.g. `model.device`.
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    /// The merged tree is missing a required key or holds an invalid value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
impl Config {
    /// Safe `Config` for unit tests: dummy backend, no files touched.
    pub fn test_default() -> Self {
        Self {
            project_name: "test".into(),
            api_prefix: "/api".into(),
            log_level: "info".into(),
            log_file: None,
            server: ServerConfig {
                bind: raw::default_bind(),
                max_body_bytes: raw::default_max_body_bytes(),
            },
            model: ModelConfig {
                backend: "dummy".into(),
                path: PathBuf::from("models/test.onnx"),
                device: "cpu".into(),
                sha256: None,
                input_name: raw::default_input_name(),
                output_name: raw::default_output_name(),
            },
        }
    }
}
