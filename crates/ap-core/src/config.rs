//! Application configuration.
//!
//! Deployment is entirely environment-driven: a port, a verbose toggle,
//! and an upload ceiling. Every field defaults sensibly so the service
//! runs with no environment at all.

use crate::bytesize::parse_byte_size;

/// Default upload ceiling: 250 MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 250 << 20;

/// Root application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    /// Log engine diagnostics even for successful runs.
    pub verbose: bool,
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Request resource limits.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Maximum accepted request body size in bytes.
    pub max_upload_size: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }
}

impl Config {
    /// Build a config from the process environment.
    ///
    /// Recognized variables: `PORT` (listener port), `VERBOSE` (`true` or
    /// `1`), and `MAX_UPLOAD_SIZE` (a byte-size string such as `250MB`).
    /// Invalid values log a warning and keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(p) if p > 0 => config.server.port = p,
                _ => tracing::warn!(
                    "invalid PORT '{port}', using default {}",
                    config.server.port
                ),
            }
        }

        if matches!(std::env::var("VERBOSE").as_deref(), Ok("true") | Ok("1")) {
            config.verbose = true;
        }

        if let Ok(raw) = std::env::var("MAX_UPLOAD_SIZE") {
            match parse_byte_size(&raw) {
                Ok(size) => config.limits.max_upload_size = size,
                Err(e) => tracing::warn!(
                    "invalid MAX_UPLOAD_SIZE '{raw}', using default 250MB: {e}"
                ),
            }
        }

        config
    }
}
