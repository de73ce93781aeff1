//! Configuration loading with env-var overrides.
//!
//! The base document is compiled into the binary; the user document is read
//! from disk and merged on top with [`merge`]. After the merge the tree is
//! postprocessed, then `WHISKER_LOG_LEVEL` and `WHISKER_BIND` are applied.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml::{Table, Value};

use super::raw::RawConfig;
use super::tree::merge;
use super::types::*;
use super::ConfigError;

/// Base configuration shipped with the service.
pub const BASE_CONFIG: &str = include_str!("../../config/default.toml");

/// User override document, relative to the working directory.
pub const USER_CONFIG_PATH: &str = "config.toml";

/// Load config from the given path, or `config.toml`, then apply env-var overrides.
///
/// A missing `config.toml` counts as an empty override. A missing file that
/// was asked for explicitly is an error.
pub fn load(config_path: Option<&str>) -> Result<Config, ConfigError> {
    let log_level_override = env::var("WHISKER_LOG_LEVEL").ok();
    let bind_override = env::var("WHISKER_BIND").ok();

    let (path, required) = match config_path {
        Some(p) => (Path::new(p), true),
        None => (Path::new(USER_CONFIG_PATH), false),
    };
    load_from(
        path,
        required,
        log_level_override.as_deref(),
        bind_override.as_deref(),
    )
}

/// Internal loader: accepts an explicit user path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    user_path: &Path,
    required: bool,
    log_level_override: Option<&str>,
    bind_override: Option<&str>,
) -> Result<Config, ConfigError> {
    let user_src = match fs::read_to_string(user_path) {
        Ok(src) => Some(src),
        Err(e) if e.kind() == ErrorKind::NotFound && !required => None,
        Err(source) => {
            return Err(ConfigError::Read {
                path: user_path.to_path_buf(),
                source,
            });
        }
    };

    let tree = load_layers(BASE_CONFIG, user_src.as_deref(), &user_path.display().to_string())?;
    resolve(tree, log_level_override, bind_override)
}

/// Parse both documents, merge them and run [`postprocess`].
pub fn load_layers(
    base_src: &str,
    user_src: Option<&str>,
    user_origin: &str,
) -> Result<Table, ConfigError> {
    let base = parse(base_src, "base config")?;
    let user = match user_src {
        Some(src) => parse(src, user_origin)?,
        None => Table::new(),
    };
    let mut merged = merge(&base, &user)?;
    postprocess(&mut merged);
    Ok(merged)
}

fn parse(src: &str, origin: &str) -> Result<Table, ConfigError> {
    src.parse::<Table>().map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })
}

/// Normalise known path-like keys in place.
///
/// Only `api_prefix` is touched: it gains a leading `/` if it lacks one.
/// Values of the wrong type are left for typed validation to report.
pub fn postprocess(config: &mut Table) {
    if let Some(Value::String(prefix)) = config.get_mut("api_prefix") {
        if !prefix.starts_with('/') {
            prefix.insert(0, '/');
        }
    }
}

/// Validate a merged tree into a typed [`Config`] and apply overrides.
pub fn resolve(
    tree: Table,
    log_level_override: Option<&str>,
    bind_override: Option<&str>,
) -> Result<Config, ConfigError> {
    let parsed: RawConfig = Deserialize::deserialize(Value::Table(tree))
        .map_err(|e: toml::de::Error| ConfigError::Invalid(e.message().to_string()))?;

    if parsed.project_name.trim().is_empty() {
        return Err(ConfigError::Invalid("project_name must not be empty".into()));
    }
    if parsed.model.path.trim().is_empty() {
        return Err(ConfigError::Invalid("model.path must not be empty".into()));
    }
    if parsed.server.max_body_bytes == 0 {
        return Err(ConfigError::Invalid(
            "server.max_body_bytes must be greater than 0".into(),
        ));
    }

    let log_level = log_level_override.unwrap_or(&parsed.log_level).to_string();
    crate::logger::parse_level(&log_level).map_err(|_| {
        ConfigError::Invalid(format!(
            "log_level '{log_level}' must be one of off, error, warn, info, debug, trace"
        ))
    })?;

    let m = parsed.model;

    Ok(Config {
        project_name: parsed.project_name,
        api_prefix: parsed.api_prefix,
        log_level,
        log_file: parsed.log_file.as_deref().map(expand_home),
        server: ServerConfig {
            bind: bind_override.unwrap_or(&parsed.server.bind).to_string(),
            max_body_bytes: parsed.server.max_body_bytes,
        },
        model: ModelConfig {
            backend: m.backend,
            path: expand_home(&m.path),
            device: m.device,
            sha256: m.sha256,
            input_name: m.input_name,
            output_name: m.output_name,
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
