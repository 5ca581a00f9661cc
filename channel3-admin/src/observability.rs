//! Logging bootstrap for the admin CLI.
//!
//! Structured logs go to stderr so command output on stdout stays clean for
//! scripting.

use std::io;

use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log format configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format for interactive use.
    Pretty,
    /// JSON format for log aggregation.
    Json,
}

impl LogFormat {
    /// Determines log format from the `LOG_FORMAT` environment variable:
    /// `json` selects JSON, anything else (or unset) selects pretty.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT").unwrap_or_default().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Initializes tracing with env-based filtering (`RUST_LOG`, default `info`)
/// and the given output format.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => {
            subscriber.with(fmt::layer().with_target(true).with_writer(io::stderr)).init();
        }
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(io::stderr))
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_defaults_to_pretty() {
        // Unset in the test environment.
        if std::env::var("LOG_FORMAT").is_err() {
            assert_eq!(LogFormat::from_env(), LogFormat::Pretty);
        }
    }
}
