//! HLS and legacy-MP4 generation.
//!
//! The [`Transcoder`] trait is the seam between the artifact cache and the
//! external encoder. [`FfmpegTranscoder`] is the production implementation;
//! tests substitute fakes that write artifacts directly.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rc_core::config::TranscodeConfig;
use rc_core::Error;
use rc_probe::Compatibility;

use crate::command::ToolCommand;
use crate::tools::{ToolRegistry, FFMPEG};

/// Playlist file written into every HLS output directory.
pub const HLS_PLAYLIST: &str = "playlist.m3u8";

/// ffmpeg segment filename template; segments are `segment_000.ts`, ...
pub const HLS_SEGMENT_PATTERN: &str = "segment_%03d.ts";

/// Final name of a legacy MP4 inside its output directory.
pub const LEGACY_FILE: &str = "legacy.mp4";

const LEGACY_PARTIAL_FILE: &str = "legacy.partial.mp4";

/// Request to segment one source file into HLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HlsJob {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    /// Stream-copy the video instead of re-encoding it.
    pub copy_video: bool,
    /// Stream-copy the audio instead of re-encoding it.
    pub copy_audio: bool,
}

impl HlsJob {
    /// Choose copy or re-encode per stream kind from compatibility flags.
    pub fn from_compatibility(source: PathBuf, output_dir: PathBuf, flags: &Compatibility) -> Self {
        Self {
            source,
            output_dir,
            copy_video: !flags.needs_video_transcode,
            copy_audio: !flags.needs_audio_transcode,
        }
    }
}

/// A generated HLS rendition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HlsOutput {
    /// Playlist text as written by the encoder.
    pub playlist: String,
    /// Directory holding the segments referenced by the playlist.
    pub segment_dir: PathBuf,
}

/// Request to produce a single legacy-compatible MP4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyJob {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    /// Remux without re-encoding; only valid for legacy-compatible sources.
    pub copy_streams: bool,
}

impl LegacyJob {
    pub fn from_compatibility(source: PathBuf, output_dir: PathBuf, flags: &Compatibility) -> Self {
        Self {
            source,
            output_dir,
            copy_streams: flags.is_legacy_compatible,
        }
    }
}

/// A generated legacy MP4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyOutput {
    pub path: PathBuf,
}

/// External transcoding collaborator.
#[async_trait]
pub trait Transcoder: Send + Sync {
    fn name(&self) -> &'static str;

    /// Write an HLS playlist and segments into `job.output_dir`.
    async fn hls(&self, job: &HlsJob) -> rc_core::Result<HlsOutput>;

    /// Write a legacy-compatible MP4 into `job.output_dir`.
    async fn legacy(&self, job: &LegacyJob) -> rc_core::Result<LegacyOutput>;
}

/// [`Transcoder`] backed by the `ffmpeg` CLI.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg_path: PathBuf,
    settings: TranscodeConfig,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: PathBuf, settings: TranscodeConfig) -> Self {
        Self {
            ffmpeg_path,
            settings,
        }
    }

    pub fn from_registry(tools: &ToolRegistry, settings: TranscodeConfig) -> rc_core::Result<Self> {
        Ok(Self::new(tools.require(FFMPEG)?.to_path_buf(), settings))
    }

    fn base_command(&self, source: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(self.ffmpeg_path.clone());
        cmd.timeout(self.settings.generation_timeout());
        cmd.args(["-y", "-nostdin", "-loglevel", "error", "-i"]);
        cmd.arg(source.to_string_lossy().as_ref());
        cmd.args(["-map", "0:v:0", "-map", "0:a:0?", "-sn"]);
        cmd
    }

    fn hls_command(&self, job: &HlsJob) -> ToolCommand {
        let mut cmd = self.base_command(&job.source);

        if job.copy_video {
            cmd.args(["-c:v", "copy"]);
        } else {
            cmd.args(["-c:v", "libx264", "-pix_fmt", "yuv420p"]);
            cmd.args(["-preset", &self.settings.video_preset]);
            cmd.args(["-crf", &self.settings.video_crf.to_string()]);
        }

        if job.copy_audio {
            cmd.args(["-c:a", "copy"]);
        } else {
            cmd.args(["-c:a", "aac", "-b:a", &self.settings.audio_bitrate, "-ac", "2"]);
        }

        cmd.args(["-f", "hls"]);
        cmd.args(["-hls_time", &self.settings.hls_segment_secs.max(1).to_string()]);
        cmd.args(["-hls_playlist_type", "vod"]);
        cmd.arg("-hls_segment_filename");
        cmd.arg(job.output_dir.join(HLS_SEGMENT_PATTERN).to_string_lossy().as_ref());
        cmd.arg(job.output_dir.join(HLS_PLAYLIST).to_string_lossy().as_ref());
        cmd
    }

    fn legacy_command(&self, job: &LegacyJob, output: &Path) -> ToolCommand {
        let mut cmd = self.base_command(&job.source);

        if job.copy_streams {
            cmd.args(["-c", "copy"]);
        } else {
            cmd.args([
                "-c:v",
                "libx264",
                "-profile:v",
                "baseline",
                "-level",
                "3.0",
                "-pix_fmt",
                "yuv420p",
            ]);
            cmd.args(["-preset", &self.settings.video_preset]);
            cmd.args(["-crf", &self.settings.video_crf.to_string()]);
            cmd.args(["-c:a", "aac", "-b:a", &self.settings.legacy_audio_bitrate, "-ac", "2"]);
        }

        cmd.args(["-movflags", "+faststart", "-f", "mp4"]);
        cmd.arg(output.to_string_lossy().as_ref());
        cmd
    }
}

fn generation_error(mode: &str, e: Error) -> Error {
    match e {
        Error::Tool { message, .. } => Error::generation(mode, message),
        Error::Io { source } => Error::generation(mode, source.to_string()),
        other => other,
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn hls(&self, job: &HlsJob) -> rc_core::Result<HlsOutput> {
        tokio::fs::create_dir_all(&job.output_dir)
            .await
            .map_err(|e| generation_error("hls", e.into()))?;

        tracing::info!(
            source = %job.source.display(),
            output = %job.output_dir.display(),
            copy_video = job.copy_video,
            copy_audio = job.copy_audio,
            "Generating HLS rendition"
        );

        self.hls_command(job)
            .execute()
            .await
            .map_err(|e| generation_error("hls", e))?;

        let playlist_path = job.output_dir.join(HLS_PLAYLIST);
        let playlist = tokio::fs::read_to_string(&playlist_path)
            .await
            .map_err(|_| Error::generation("hls", "ffmpeg produced no playlist"))?;
        if playlist.trim().is_empty() {
            return Err(Error::generation("hls", "ffmpeg produced an empty playlist"));
        }

        Ok(HlsOutput {
            playlist,
            segment_dir: job.output_dir.clone(),
        })
    }

    async fn legacy(&self, job: &LegacyJob) -> rc_core::Result<LegacyOutput> {
        tokio::fs::create_dir_all(&job.output_dir)
            .await
            .map_err(|e| generation_error("legacy", e.into()))?;

        let partial = job.output_dir.join(LEGACY_PARTIAL_FILE);
        let final_path = job.output_dir.join(LEGACY_FILE);

        tracing::info!(
            source = %job.source.display(),
            output = %final_path.display(),
            copy_streams = job.copy_streams,
            "Generating legacy MP4"
        );

        let result = self.legacy_command(job, &partial).execute().await;
        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(generation_error("legacy", e));
        }

        match tokio::fs::metadata(&partial).await {
            Ok(meta) if meta.len() > 0 => {}
            _ => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(Error::generation("legacy", "ffmpeg produced no output file"));
            }
        }

        tokio::fs::rename(&partial, &final_path)
            .await
            .map_err(|e| generation_error("legacy", e.into()))?;

        Ok(LegacyOutput { path: final_path })
    }
}
