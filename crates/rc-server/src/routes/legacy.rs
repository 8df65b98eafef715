use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use rc_av::LegacyJob;

use crate::context::AppContext;
use crate::error::AppError;
use crate::range;

/// GET /legacy/{*path}
///
/// Legacy-compatible MP4, generated on first request and then served from
/// the cache with range support.
pub async fn legacy_stream(
    State(ctx): State<AppContext>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (path, source) = ctx.resolve_video(&path).await?;
    let prober = Arc::clone(&ctx.prober);
    let transcoder = Arc::clone(&ctx.transcoder);

    let output = ctx
        .legacy_cache
        .get_or_generate(&path.cache_key(), move |dir| async move {
            let report = prober.probe(&source).await?;
            let flags = rc_probe::determine_compatibility(&report).flags;
            transcoder
                .legacy(&LegacyJob::from_compatibility(source, dir, &flags))
                .await
        })
        .await?;

    Ok(range::serve_file(&output.path, super::range_header(&headers)).await?)
}
