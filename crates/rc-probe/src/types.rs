//! Core types for media probe results.
//!
//! A [`ProbeReport`] is a snapshot of one probe; nothing mutates it after
//! creation. Field names match the compatibility document served by
//! `/api/video/info`.

use serde::{Deserialize, Serialize};

/// Complete probe result for one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub format: FormatInfo,
    pub video_streams: Vec<VideoStream>,
    pub audio_streams: Vec<AudioStream>,
    pub subtitle_streams: Vec<SubtitleStream>,
}

impl ProbeReport {
    pub fn primary_video(&self) -> Option<&VideoStream> {
        self.video_streams.first()
    }

    pub fn primary_audio(&self) -> Option<&AudioStream> {
        self.audio_streams.first()
    }
}

/// Container-level information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Comma-separated demuxer names, e.g. `mov,mp4,m4a,3gp,3g2,mj2`.
    pub name: String,
    pub long_name: String,
    /// Duration in seconds.
    pub duration: f64,
    /// File size in bytes.
    pub size: u64,
    /// Overall bitrate in bits per second.
    pub bitrate: u64,
}

/// A video stream within a media file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoStream {
    /// Codec identifier, e.g. `h264`, `hevc`, `vp9`.
    pub codec_name: String,
    pub codec_long_name: String,
    /// Encoding profile as reported by the prober, e.g. `Main`, `High`.
    pub profile: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub bitrate: u64,
    pub pix_fmt: String,
    pub bit_depth: u32,
    pub color_space: String,
    pub color_transfer: String,
    pub color_primaries: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub language: Option<String>,
}

/// An audio stream within a media file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioStream {
    pub codec_name: String,
    pub codec_long_name: String,
    pub sample_rate: u32,
    pub channels: u32,
    /// e.g. `stereo`, `5.1(side)`.
    pub channel_layout: String,
    pub bitrate: u64,
    pub bit_depth: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub language: Option<String>,
}

/// A subtitle stream within a media file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubtitleStream {
    pub codec_name: String,
    pub language: String,
    pub title: String,
    pub forced: bool,
}
