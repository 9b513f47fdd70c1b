//! Liveness endpoint.

/// GET|HEAD /health
///
/// Axum serves HEAD through the GET handler with the body stripped, which
/// gives the required empty-body HEAD response for free.
pub async fn health() -> &'static str {
    "ok"
}
