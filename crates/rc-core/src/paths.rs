//! Client-supplied library paths and the cache keys derived from them.
//!
//! Every path that arrives over HTTP goes through [`LibraryPath::parse`]
//! before it is joined to the library root, so traversal attempts are
//! rejected without touching the filesystem.

use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A validated, `/`-separated path relative to the library root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryPath(String);

impl LibraryPath {
    /// Validate a client-supplied relative path.
    ///
    /// Leading slashes, empty segments and `.` segments are dropped. Any `..`
    /// segment is rejected as [`Error::Forbidden`], as is a path with no
    /// segments left or one containing NUL or backslash characters.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.contains('\0') || raw.contains('\\') {
            return Err(Error::Forbidden(format!("invalid characters in path '{raw}'")));
        }

        let mut segments = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(Error::Forbidden(format!(
                        "parent-directory traversal in path '{raw}'"
                    )))
                }
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(Error::Validation("empty library path".into()));
        }

        Ok(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join this path onto the library root.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, s| acc.join(s))
    }

    /// Resolve against `root` and require the result to be a regular file.
    pub async fn resolve_file(&self, root: &Path) -> Result<PathBuf> {
        let full = self.resolve(root);
        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_file() => Ok(full),
            _ => Err(Error::not_found("video", &self.0)),
        }
    }

    /// Stable cache key for artifacts generated from this path.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_path(&self.0)
    }
}

impl fmt::Display for LibraryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content-addressed identity of a catalog path: the first 16 hex characters
/// of the SHA-256 of the relative path string. File bytes are not hashed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_path(relative: &str) -> Self {
        let digest = Sha256::digest(relative.as_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(16);
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
