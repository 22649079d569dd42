//! Logging setup over `tracing-subscriber`

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{RemuxError, RemuxResult};

const LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Logging configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level; `RUST_LOG` takes precedence when set
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LogConfig {
    pub fn validate(&self) -> RemuxResult<()> {
        if LEVELS.contains(&self.level.to_lowercase().as_str()) {
            Ok(())
        } else {
            Err(RemuxError::Config {
                message: format!(
                    "Unknown log level '{}'. Expected one of: {}",
                    self.level,
                    LEVELS.join(", ")
                ),
            })
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_lowercase()))
    }
}

/// Install the global subscriber, writing to stderr. Later calls are no-ops.
pub fn init(config: &LogConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
