//! ap-core: shared configuration and error types for audiopress.

pub mod bytesize;
pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
