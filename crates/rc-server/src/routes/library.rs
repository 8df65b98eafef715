//! Catalog and profile routes.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::context::AppContext;

/// GET /api/library
///
/// The catalog built at start-up: series with their seasons and episodes,
/// plus the flat movie list.
pub async fn get_library(State(ctx): State<AppContext>) -> Response {
    Json(ctx.library.as_ref()).into_response()
}

/// GET /api/profiles
pub async fn list_profiles(State(ctx): State<AppContext>) -> Response {
    Json(&ctx.config.profiles).into_response()
}
