//! # rc-probe
//!
//! Probed media metadata and the playback compatibility analyzer.
//!
//! The actual inspection of a file is delegated to an external tool behind
//! the [`Prober`] trait. This crate owns the data model it produces, the
//! parser for `ffprobe` JSON output, and the pure decision logic that turns a
//! [`ProbeReport`] into compatibility flags and playback modes.
//!
//! ```
//! use rc_probe::{compat, ffprobe};
//!
//! let json = r#"{"format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2"},
//!   "streams": [
//!     {"codec_type": "video", "codec_name": "h264", "profile": "Main", "width": 1280, "height": 720},
//!     {"codec_type": "audio", "codec_name": "aac"}
//!   ]}"#;
//! let report = ffprobe::parse_ffprobe_json(json).unwrap();
//! let result = compat::determine_compatibility(&report);
//! assert!(result.flags.is_hls_compatible);
//! assert!(result.flags.is_legacy_compatible);
//! ```

pub mod compat;
pub mod ffprobe;
pub mod prober;
pub mod types;

pub use compat::{
    analyze, determine_compatibility, generate_playback_modes, Compatibility,
    CompatibilityResult, MediaAnalysis, PlaybackMode, PlaybackModeId,
};
pub use prober::Prober;
pub use types::{AudioStream, FormatInfo, ProbeReport, SubtitleStream, VideoStream};
