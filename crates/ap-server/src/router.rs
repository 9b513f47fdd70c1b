//! Axum router construction.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::routes;

/// Build the application router.
///
/// The upload ceiling is enforced by [`DefaultBodyLimit`] before the
/// handler buffers the body, so oversized requests are rejected without
/// ever reaching the executor. Unmatched methods on a route answer 405
/// via axum's method routing.
pub fn build_router(ctx: AppContext) -> Router {
    let max_upload =
        usize::try_from(ctx.config.limits.max_upload_size).unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/convert",
            post(routes::convert::convert).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
