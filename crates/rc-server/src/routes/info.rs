use axum::extract::{Path, State};
use axum::Json;
use rc_probe::MediaAnalysis;

use crate::context::AppContext;
use crate::error::AppError;

/// GET /api/video/info/{*path}
///
/// Probe the file and report its streams, compatibility flags and the
/// playback modes available for it. Probed on every request.
pub async fn video_info(
    State(ctx): State<AppContext>,
    Path(path): Path<String>,
) -> Result<Json<MediaAnalysis>, AppError> {
    let (path, file) = ctx.resolve_video(&path).await?;
    let report = ctx.prober.probe(&file).await?;
    let analysis = rc_probe::analyze(report);

    tracing::debug!(
        path = %path.as_str(),
        hls = analysis.compatibility.is_hls_compatible,
        legacy = analysis.compatibility.is_legacy_compatible,
        "Analyzed video"
    );

    Ok(Json(analysis))
}
