//! HLS playlist and segment routes.
//!
//! `/hls/{*path}` carries the library path followed by one file name:
//! `playlist.m3u8` or a `.ts` segment. The playlist references its segments
//! by relative name, so both resolve under the same prefix.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use rc_av::{HlsJob, HlsOutput, HLS_PLAYLIST};
use rc_core::Error;

use crate::context::AppContext;
use crate::error::AppError;
use crate::range;

/// GET /hls/{*path}
pub async fn hls_file(
    State(ctx): State<AppContext>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (video, file_name) = path
        .rsplit_once('/')
        .ok_or_else(|| Error::not_found("hls file", &path))?;

    if file_name == HLS_PLAYLIST {
        let output = generate(&ctx, video).await?;
        return Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/vnd.apple.mpegurl")],
            output.playlist.clone(),
        )
            .into_response());
    }

    validate_segment_name(file_name)?;
    let output = generate(&ctx, video).await?;
    let segment = output.segment_dir.join(file_name);
    match tokio::fs::metadata(&segment).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(Error::not_found("segment", file_name).into()),
    }

    Ok(range::serve_file(&segment, super::range_header(&headers)).await?)
}

/// Segment names are plain `.ts` file names.
fn validate_segment_name(name: &str) -> rc_core::Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        return Err(Error::Validation("Invalid segment filename".into()));
    }
    if !name.ends_with(".ts") {
        return Err(Error::not_found("hls file", name));
    }
    Ok(())
}

async fn generate(ctx: &AppContext, raw: &str) -> rc_core::Result<Arc<HlsOutput>> {
    let (path, source) = ctx.resolve_video(raw).await?;
    let prober = Arc::clone(&ctx.prober);
    let transcoder = Arc::clone(&ctx.transcoder);

    ctx.hls_cache
        .get_or_generate(&path.cache_key(), move |dir| async move {
            let report = prober.probe(&source).await?;
            let flags = rc_probe::determine_compatibility(&report).flags;
            transcoder
                .hls(&HlsJob::from_compatibility(source, dir, &flags))
                .await
        })
        .await
}
