//! Logging initialisation for the deployer.
//!
//! Progress notices (families updated, images rewritten, services rolled)
//! are emitted as `tracing` events; this module installs the subscriber that
//! renders them.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Environment variable selecting the log format.
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs, one object per line.
    #[default]
    Json,
    /// Human-readable multi-line logs.
    Pretty,
}

impl LogFormat {
    /// Parses a format name; anything but `pretty` selects JSON.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("pretty") {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Reads the format from `LOG_FORMAT`, defaulting to JSON.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_VAR).map_or_else(|_| Self::default(), |value| Self::parse(&value))
    }
}

/// Installs the global subscriber.
///
/// Levels come from `RUST_LOG` (default `info`). Subsequent calls are
/// no-ops.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json().without_time())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}
