//! # rc-av
//!
//! External audio/video tooling for reelcast.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find ffmpeg and ffprobe, either
//!   from configured paths or on `PATH`.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Probing** ([`FfprobeProber`]) -- implements [`rc_probe::Prober`] by
//!   shelling out to ffprobe.
//! - **Transcoding** ([`FfmpegTranscoder`]) -- implements [`Transcoder`] to
//!   produce HLS playlists with segments and legacy-compatible MP4 files.

pub mod command;
pub mod probe;
pub mod tools;
pub mod transcode;

pub use command::{ToolCommand, ToolOutput};
pub use probe::FfprobeProber;
pub use tools::{ToolInfo, ToolRegistry};
pub use transcode::{
    FfmpegTranscoder, HlsJob, HlsOutput, LegacyJob, LegacyOutput, Transcoder, HLS_PLAYLIST,
};
