//! Unified error type for the audiopress application.
//!
//! All crates funnel their failures into [`Error`], which carries enough
//! context for the HTTP layer to derive a status code via
//! [`Error::http_status`].

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving the engine or serving requests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No engine binary is bundled for this platform. Fatal at startup.
    #[error("no bundled engine for {os}/{arch}")]
    UnsupportedPlatform {
        /// Operating system name as reported by the compiler.
        os: &'static str,
        /// CPU architecture name as reported by the compiler.
        arch: &'static str,
    },

    /// Request data failed validation.
    #[error("{0}")]
    Validation(String),

    /// The engine failed: launch error, non-zero exit, or timeout.
    /// The message embeds captured stderr and must never reach a client.
    #[error("engine failed: {message}")]
    Engine {
        /// Human-readable failure description, including diagnostics.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Engine { .. } => 400,
            Error::UnsupportedPlatform { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::Engine`].
    pub fn engine(message: impl Into<String>) -> Self {
        Error::Engine {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
