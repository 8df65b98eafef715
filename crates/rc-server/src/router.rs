//! Axum router construction.
//!
//! Builds the application router with the catalog API, the three playback
//! routes, middleware layers, and optional static UI serving.

use std::path::PathBuf;

use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::routes;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
        .expose_headers([
            header::CONTENT_RANGE,
            header::CONTENT_LENGTH,
            header::ACCEPT_RANGES,
        ]);

    let api = Router::new()
        .route("/library", get(routes::library::get_library))
        .route("/profiles", get(routes::library::list_profiles))
        .route("/video/info/{*path}", get(routes::info::video_info));

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .route("/video/{*path}", get(routes::video::direct_stream))
        .route("/hls/{*path}", get(routes::hls::hls_file))
        .route("/legacy/{*path}", get(routes::legacy::legacy_stream))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Static file serving for the web UI, with SPA fallback to index.html.
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                tower_http::services::ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(tower_http::services::ServeFile::new(index_path)),
            );
        } else {
            tracing::warn!("Static directory {:?} does not exist; UI disabled", dir);
        }
    }

    app
}
