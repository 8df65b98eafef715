use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;

use crate::context::AppContext;
use crate::error::AppError;
use crate::range;

/// GET /video/{*path}
///
/// Original file bytes with HTTP range support.
pub async fn direct_stream(
    State(ctx): State<AppContext>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (_, file) = ctx.resolve_video(&path).await?;
    Ok(range::serve_file(&file, super::range_header(&headers)).await?)
}
