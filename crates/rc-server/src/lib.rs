//! rc-server: HTTP surface for reelcast.
//!
//! This crate ties the other rc-* crates into a running server. It provides:
//!
//! - The single-flight [`transcode_cache::TranscodeCache`] used for HLS and
//!   legacy artifacts
//! - The byte-range responder in [`range`]
//! - Axum routes for the catalog, compatibility analysis and playback
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod range;
pub mod router;
pub mod routes;
pub mod transcode_cache;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use rc_av::tools::{FFMPEG, FFPROBE};
use rc_av::{FfmpegTranscoder, FfprobeProber, ToolRegistry, Transcoder};
use rc_core::config::Config;
use rc_probe::Prober;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

/// Start the reelcast server.
///
/// Scans the library, discovers the external tools, builds the
/// [`AppContext`] and serves HTTP until a shutdown signal is received.
pub async fn start(config: Config) -> rc_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let library_root = config.require_library()?.to_path_buf();
    let display_names = config.library.display_names.clone();
    let scan_root = library_root.clone();
    let (library, _stats) = tokio::task::spawn_blocking(move || {
        rc_library::scan_with(&scan_root, &display_names)
    })
    .await
    .map_err(|e| rc_core::Error::Internal(format!("Library scan task failed: {e}")))?;

    // Discover external tools.
    let tools = ToolRegistry::discover(&config.tools);
    for info in tools.check_all() {
        if info.available {
            tracing::info!(
                "Tool found: {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!("Tool not found: {}; playback analysis and transcoding will fail", info.name);
        }
    }

    let transcode = &config.transcode;
    let prober: Arc<dyn Prober> = Arc::new(
        FfprobeProber::from_registry(&tools, transcode.probe_timeout()).unwrap_or_else(|_| {
            FfprobeProber::new(PathBuf::from(FFPROBE), transcode.probe_timeout())
        }),
    );
    let transcoder: Arc<dyn Transcoder> = Arc::new(
        FfmpegTranscoder::from_registry(&tools, transcode.clone())
            .unwrap_or_else(|_| FfmpegTranscoder::new(PathBuf::from(FFMPEG), transcode.clone())),
    );

    tokio::fs::create_dir_all(&transcode.cache_dir).await?;
    tracing::info!("Transcode cache at {}", transcode.cache_dir.display());

    let cleanup_interval = transcode.cleanup_interval();
    let ctx = AppContext::new(config.clone(), library, library_root, prober, transcoder);

    // Cancellation token for graceful shutdown.
    let cancel = CancellationToken::new();

    let cleanup_ctx = ctx.clone();
    let cleanup_cancel = cancel.clone();
    let cleanup_handle = tokio::spawn(async move {
        run_cache_cleanup(cleanup_ctx, cleanup_interval, cleanup_cancel).await;
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| rc_core::Error::Config(format!("Invalid server address: {e}")))?;

    let app = router::build_router(ctx, config.server.static_dir.clone());

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| rc_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    // Signal background tasks to stop.
    cancel.cancel();
    let _ = cleanup_handle.await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Periodically evict idle transcode artifacts until cancelled.
async fn run_cache_cleanup(ctx: AppContext, every: std::time::Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                ctx.cleanup_caches().await;
            }
            _ = cancel.cancelled() => break,
        }
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}
