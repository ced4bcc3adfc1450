//! Log setup
//!
//! Everything goes to a rolling file; text mode mirrors to stdout. The
//! filter comes from `RUST_LOG` when set, otherwise from the config level
//! with the HTTP client stack capped at `warn` so getUpdates long polls and
//! TON Center calls do not flood debug output.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

const QUIET_DEPENDENCIES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2"];

fn rotation(name: &str) -> Rotation {
    match name {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

fn default_directives(level: &str) -> String {
    QUIET_DEPENDENCIES
        .iter()
        .fold(level.to_string(), |acc, dep| format!("{acc},{dep}=warn"))
}

/// Returned guard flushes the file writer on drop; hold it in `main`.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let appender = RollingFileAppender::new(
        rotation(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .with(fmt::layer().compact().with_target(false))
            .init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cap_http_stack() {
        let d = default_directives("debug");
        assert!(d.starts_with("debug,"));
        assert!(d.contains("reqwest=warn"));
        assert!(d.contains("hyper=warn"));
        assert!(EnvFilter::try_new(&d).is_ok());
    }

    #[test]
    fn test_unknown_rotation_never_rolls() {
        assert_eq!(rotation("hourly"), Rotation::HOURLY);
        assert_eq!(rotation("weekly"), Rotation::NEVER);
    }
}
