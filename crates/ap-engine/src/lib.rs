//! ap-engine: bundled audio engine management and invocation.
//!
//! Resolves the platform-specific engine binary baked into the build,
//! installs it into an on-disk cache, and runs transcode jobs against it
//! under a hard timeout.

pub mod artifact;
pub mod command;
pub mod filters;
pub mod transcode;

pub use artifact::EngineArtifact;
pub use command::{EngineCommand, EngineOutput};
pub use filters::FilterChain;
pub use transcode::{OutputFormat, Transcoder};
