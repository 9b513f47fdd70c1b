//! The /convert endpoint: media bytes in, transcoded audio out.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use ap_core::Error;
use ap_engine::{FilterChain, OutputFormat};

use crate::context::AppContext;
use crate::error::AppError;

/// Query parameters accepted by [`convert`].
#[derive(Debug, Default, Deserialize)]
pub struct ConvertParams {
    /// Target encoding: wav (default), mp3, or flac.
    format: Option<String>,
    /// Filter bitmask, or the literals "all" / "true".
    filters: Option<String>,
}

/// POST /convert?format={wav|mp3|flac}&filters={mask|"all"|"true"}
///
/// The raw request body is the input media; any container the engine can
/// demux is accepted. Successful responses carry the target format's MIME
/// type and are marked non-cacheable.
pub async fn convert(
    State(ctx): State<AppContext>,
    Query(params): Query<ConvertParams>,
    body: Bytes,
) -> Result<Response, AppError> {
    let format_param = params
        .format
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("wav");
    let format = OutputFormat::parse(format_param)
        .ok_or_else(|| Error::validation(format!("unsupported format: {format_param}")))?;

    let filters = FilterChain::parse(params.filters.as_deref().unwrap_or(""));

    let data = ctx.transcoder.transcode(&body, format, &filters).await?;

    Ok((
        [
            (header::CONTENT_TYPE, format.mime()),
            (header::CACHE_CONTROL, "no-store"),
        ],
        data,
    )
        .into_response())
}
