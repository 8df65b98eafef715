//! Route handlers for the HTTP API.

pub mod health;
pub mod hls;
pub mod info;
pub mod legacy;
pub mod library;
pub mod video;

use axum::http::{header, HeaderMap};

/// Raw `Range` header value, if present and valid UTF-8.
pub(crate) fn range_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::RANGE).and_then(|v| v.to_str().ok())
}
