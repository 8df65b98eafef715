//! Byte-range responses for seekable playback.
//!
//! [`respond`] is the pure decision (status, headers, slice); [`serve_file`]
//! applies it to a file on disk, streaming the slice in 64KB chunks so memory
//! stays bounded regardless of file size.

use std::path::Path;

use axum::body::Body;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

const CHUNK_SIZE: usize = 64 * 1024;

/// Outcome of applying an optional `Range` header to a file of known size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeResponse {
    pub status: StatusCode,
    pub headers: Vec<(HeaderName, String)>,
    /// First byte of the body.
    pub start: u64,
    /// Number of body bytes; zero for 416.
    pub length: u64,
}

impl RangeResponse {
    /// Last byte of the body, if the body is non-empty.
    pub fn end_inclusive(&self) -> Option<u64> {
        (self.length > 0).then(|| self.start + self.length - 1)
    }

    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse the first range of a `bytes=` header into `(start, end)`.
///
/// A missing or unparsable start is read as 0, an omitted or unparsable end
/// as end-of-file. Returns `None` when the header is not a byte range.
fn parse_range(value: &str) -> Option<(u64, Option<u64>)> {
    let ranges = value.trim().strip_prefix("bytes=")?;
    let first = ranges.split(',').next()?.trim();
    let (start_str, end_str) = first.split_once('-').unwrap_or((first, ""));

    let start = start_str.trim().parse().unwrap_or(0);
    let end = end_str.trim().parse().ok();
    Some((start, end))
}

/// Decide the status, headers and slice for a request.
pub fn respond(file_size: u64, range_header: Option<&str>) -> RangeResponse {
    let Some(value) = range_header else {
        return RangeResponse {
            status: StatusCode::OK,
            headers: vec![
                (header::CONTENT_LENGTH, file_size.to_string()),
                (header::ACCEPT_RANGES, "bytes".to_string()),
            ],
            start: 0,
            length: file_size,
        };
    };

    let (start, end) = parse_range(value).unwrap_or((0, None));
    let last = file_size.saturating_sub(1);
    let end = end.unwrap_or(last).min(last);

    if file_size == 0 || start >= file_size || end < start {
        return RangeResponse {
            status: StatusCode::RANGE_NOT_SATISFIABLE,
            headers: vec![
                (header::CONTENT_RANGE, format!("bytes */{file_size}")),
                (header::CONTENT_LENGTH, "0".to_string()),
                (header::ACCEPT_RANGES, "bytes".to_string()),
            ],
            start,
            length: 0,
        };
    }

    let length = end - start + 1;
    RangeResponse {
        status: StatusCode::PARTIAL_CONTENT,
        headers: vec![
            (header::CONTENT_RANGE, format!("bytes {start}-{end}/{file_size}")),
            (header::CONTENT_LENGTH, length.to_string()),
            (header::ACCEPT_RANGES, "bytes".to_string()),
        ],
        start,
        length,
    }
}

/// MIME type for a served file, by extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "m4v" => "video/x-m4v",
        "mpg" | "mpeg" => "video/mpeg",
        "3gp" => "video/3gpp",
        "ogv" => "video/ogg",
        "ts" => "video/mp2t",
        "m3u8" => "application/vnd.apple.mpegurl",
        _ => "video/mp4",
    }
}

/// Serve `path` honouring an optional `Range` header.
pub async fn serve_file(path: &Path, range_header: Option<&str>) -> rc_core::Result<Response> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|_| rc_core::Error::not_found("file", path.display()))?;
    let size = metadata.len();
    let decision = respond(size, range_header);

    if decision.status == StatusCode::RANGE_NOT_SATISFIABLE {
        tracing::debug!(path = %path.display(), range = ?range_header, "Range not satisfiable");
        return Err(rc_core::Error::RangeNotSatisfiable { size });
    }

    let mut headers = decision.headers;
    headers.push((header::CONTENT_TYPE, content_type_for(path).to_string()));

    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|_| rc_core::Error::not_found("file", path.display()))?;
    if decision.start > 0 {
        file.seek(std::io::SeekFrom::Start(decision.start)).await?;
    }

    // Take limits reads to exactly the requested slice.
    let stream = ReaderStream::with_capacity(file.take(decision.length), CHUNK_SIZE);
    Ok(with_headers(decision.status, headers, Body::from_stream(stream)))
}

fn with_headers(status: StatusCode, headers: Vec<(HeaderName, String)>, body: Body) -> Response {
    let mut response = (status, body).into_response();
    for (name, value) in headers {
        if let Ok(value) = value.parse() {
            response.headers_mut().insert(name, value);
        }
    }
    response
}
