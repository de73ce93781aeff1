//! Whisker: service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load and merge config (base + user document)
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Build the inference backend
//!   6. Serve HTTP until Ctrl-C

use std::sync::Arc;

use tracing::info;

use whisker::{config, error, logger, model, server};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), error::AppError> {
    // Load .env if present: ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = match parse_cli_args(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print!("{USAGE}");
            return Ok(());
        }
        Err(msg) => {
            eprintln!("error: {msg}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    let config = config::load(args.config_path.as_deref())?;

    let (effective_log_level, source) = match args.log_level {
        Some(level) => (level, logger::LevelSource::Explicit),
        None => (config.log_level.as_str(), logger::LevelSource::Configured),
    };

    logger::init(effective_log_level, source, config.log_file.as_deref())?;

    info!(
        project_name = %config.project_name,
        api_prefix = %config.api_prefix,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let model = model::build(&config.model)?;

    info!(
        backend = model.backend(),
        path = %config.model.path.display(),
        device = %config.model.device,
        "model ready"
    );

    let state = server::AppState::new(
        config.project_name.as_str(),
        model.backend(),
        Arc::new(model),
    );

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
        }
    };

    server::serve(&config, state, shutdown).await
}

const USAGE: &str = "\
Usage: whisker [OPTIONS]

Options:
  -h, --help                 Print help
  -f, --config <PATH>        User configuration file (default: config.toml)
  -v, -vv, -vvv, -vvvv       Increase logging verbosity
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Run(CliArgs),
}

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

/// Each `-v` raises verbosity one tier: warn, info, debug, then trace.
fn verbosity_level(verbosity: usize) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    }
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut verbosity = 0usize;
    let mut config_path = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--" => break,
            "-h" | "--help" => return Ok(Command::Help),
            "-f" | "--config" => match iter.next() {
                Some(path) => config_path = Some(path),
                None => return Err(format!("{arg} requires a path argument")),
            },
            "--verbose" => verbosity += 1,
            a if a.len() > 1 && a.starts_with('-') && a[1..].chars().all(|c| c == 'v') => {
                verbosity += a.len() - 1;
            }
            a if a.starts_with("--config=") => {
                config_path = Some(a["--config=".len()..].to_string());
            }
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }

    Ok(Command::Run(CliArgs {
        log_level: verbosity_level(verbosity),
        config_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        parse_cli_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_args_runs_with_defaults() {
        assert_eq!(parse(&[]), Ok(Command::Run(CliArgs::default())));
    }

    #[test]
    fn verbosity_tiers() {
        let level = |args: &[&str]| match parse(args) {
            Ok(Command::Run(a)) => a.log_level,
            other => panic!("unexpected: {other:?}"),
        };
        assert_eq!(level(&["-v"]), Some("warn"));
        assert_eq!(level(&["-vv"]), Some("info"));
        assert_eq!(level(&["-v", "-vv"]), Some("debug"));
        assert_eq!(level(&["-vvvvvv"]), Some("trace"));
        assert_eq!(level(&["--verbose", "--verbose"]), Some("info"));
    }

    #[test]
    fn config_path_forms() {
        let expected = Ok(Command::Run(CliArgs {
            log_level: None,
            config_path: Some("/etc/whisker.toml".into()),
        }));
        assert_eq!(parse(&["-f", "/etc/whisker.toml"]), expected);
        assert_eq!(parse(&["--config", "/etc/whisker.toml"]), expected);
        assert_eq!(parse(&["--config=/etc/whisker.toml"]), expected);
    }

    #[test]
    fn missing_config_value_is_an_error() {
        assert!(parse(&["-f"]).unwrap_err().contains("requires a path"));
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse(&["-v", "--help", "--bogus"]), Ok(Command::Help));
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert!(parse(&["--port", "80"]).unwrap_err().contains("--port"));
    }

    #[test]
    fn double_dash_stops_parsing() {
        assert_eq!(parse(&["--", "--bogus"]), Ok(Command::Run(CliArgs::default())));
    }
}
