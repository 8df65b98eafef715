//! Unified error type for reelcast.
//!
//! Every crate funnels its failures into [`Error`], which carries enough
//! context for HTTP handlers to derive a status code via [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in reelcast.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A catalog path does not resolve to a regular file, or a named
    /// resource is missing.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video", "segment").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The request attempted to escape the library root.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The media prober produced no usable output.
    #[error("Probe error: {0}")]
    Probe(String),

    /// An HLS or legacy artifact could not be generated.
    #[error("Generation failed [{mode}]: {message}")]
    Generation {
        /// Playback mode being generated ("hls", "legacy").
        mode: String,
        /// Human-readable error description.
        message: String,
    },

    /// The requested byte range starts at or beyond the end of the file.
    #[error("Range not satisfiable for file of {size} bytes")]
    RangeNotSatisfiable {
        /// Size of the file the range was applied to.
        size: u64,
    },

    /// Startup configuration is malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external tool (ffmpeg, ffprobe) could not be run or failed.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Forbidden(_) => 403,
            Error::Probe(_) => 422,
            Error::Generation { .. } => 502,
            Error::RangeNotSatisfiable { .. } => 416,
            Error::Config(_) => 500,
            Error::Validation(_) => 400,
            Error::Tool { .. } => 502,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Stable snake_case code used in JSON error documents.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Forbidden(_) => "forbidden",
            Error::Probe(_) => "probe_failed",
            Error::Generation { .. } => "generation_failed",
            Error::RangeNotSatisfiable { .. } => "range_not_satisfiable",
            Error::Config(_) => "config_invalid",
            Error::Validation(_) => "validation_error",
            Error::Tool { .. } => "tool_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Generation`].
    pub fn generation(mode: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Generation {
            mode: mode.into(),
            message: message.into(),
        }
    }

    /// Build an owned copy of this error.
    ///
    /// A single failed generation is reported to every caller that was
    /// waiting on it, so the error has to be handed out more than once.
    /// `std::io::Error` is not `Clone`; its kind and message are carried over.
    pub fn replicate(&self) -> Self {
        match self {
            Error::NotFound { entity, id } => Error::NotFound {
                entity: entity.clone(),
                id: id.clone(),
            },
            Error::Forbidden(m) => Error::Forbidden(m.clone()),
            Error::Probe(m) => Error::Probe(m.clone()),
            Error::Generation { mode, message } => Error::Generation {
                mode: mode.clone(),
                message: message.clone(),
            },
            Error::RangeNotSatisfiable { size } => Error::RangeNotSatisfiable { size: *size },
            Error::Config(m) => Error::Config(m.clone()),
            Error::Validation(m) => Error::Validation(m.clone()),
            Error::Tool { tool, message } => Error::Tool {
                tool: tool.clone(),
                message: message.clone(),
            },
            Error::Io { source } => Error::Io {
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            Error::Internal(m) => Error::Internal(m.clone()),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
