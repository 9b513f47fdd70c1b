//! Shared application context.

use std::sync::Arc;

use ap_core::Config;
use ap_engine::Transcoder;

/// State shared across all route handlers via Axum.
///
/// Everything here is immutable after startup; concurrent requests share
/// it read-only and need no further synchronization.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub transcoder: Arc<Transcoder>,
}
