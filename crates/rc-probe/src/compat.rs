//! Playback compatibility analysis.
//!
//! Everything here is a pure function of a [`ProbeReport`]: the same report
//! always yields the same flags and the same four modes in the same order.
//! Missing streams count as "not compatible"; nothing here can fail.

use serde::{Deserialize, Serialize};

use crate::types::{AudioStream, ProbeReport, VideoStream};

/// Video codecs that can be segmented into HLS without re-encoding.
const HLS_VIDEO_CODECS: &[&str] = &["h264", "hevc", "h265"];

/// Audio codecs that can be segmented into HLS without re-encoding.
const HLS_AUDIO_CODECS: &[&str] = &["aac", "mp3"];

/// H.264 profiles accepted by old set-top boxes and phones.
const LEGACY_PROFILES: &[&str] = &["baseline", "main"];

const LEGACY_MAX_BIT_DEPTH: u32 = 8;

/// Container marker required for direct legacy playback.
const LEGACY_CONTAINER_MARKER: &str = "mp4";

/// Compatibility flags derived from a probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    pub is_hls_compatible: bool,
    pub needs_video_transcode: bool,
    pub needs_audio_transcode: bool,
    pub is_legacy_compatible: bool,
}

/// Flags plus the ordered playback modes they imply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    pub flags: Compatibility,
    pub available_modes: Vec<PlaybackMode>,
}

/// Identifier of a playback strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackModeId {
    Original,
    Hls,
    Legacy,
    Download,
}

impl PlaybackModeId {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackModeId::Original => "original",
            PlaybackModeId::Hls => "hls",
            PlaybackModeId::Legacy => "legacy",
            PlaybackModeId::Download => "download",
        }
    }
}

impl std::fmt::Display for PlaybackModeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-facing playback option. `name` and `description` are
/// presentation text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackMode {
    pub id: PlaybackModeId,
    pub name: String,
    pub description: String,
    pub requires_transcoding: bool,
    pub format_type: String,
}

/// The compatibility query document: probe data, flags and modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAnalysis {
    #[serde(flatten)]
    pub report: ProbeReport,
    pub compatibility: Compatibility,
    pub playback_modes: Vec<PlaybackMode>,
}

pub fn is_hls_video(stream: &VideoStream) -> bool {
    HLS_VIDEO_CODECS.contains(&stream.codec_name.as_str())
}

pub fn is_hls_audio(stream: &AudioStream) -> bool {
    HLS_AUDIO_CODECS.contains(&stream.codec_name.as_str())
}

/// H.264 in a constrained profile at 8-bit or below.
pub fn is_legacy_video(stream: &VideoStream) -> bool {
    if stream.codec_name != "h264" {
        return false;
    }
    let profile = stream.profile.to_lowercase();
    LEGACY_PROFILES.iter().any(|p| profile.contains(p)) && stream.bit_depth <= LEGACY_MAX_BIT_DEPTH
}

/// Compute the compatibility flags and playback modes for a probe.
pub fn determine_compatibility(report: &ProbeReport) -> CompatibilityResult {
    let flags = compatibility_flags(report);
    CompatibilityResult {
        flags,
        available_modes: generate_playback_modes(report, &flags),
    }
}

fn compatibility_flags(report: &ProbeReport) -> Compatibility {
    let videos = &report.video_streams;
    let audios = &report.audio_streams;

    let video_ok = !videos.is_empty() && videos.iter().all(is_hls_video);
    let audio_ok = !audios.is_empty() && audios.iter().all(is_hls_audio);
    let is_hls_compatible = video_ok && audio_ok;

    let is_legacy_compatible = is_hls_compatible
        && videos.iter().all(is_legacy_video)
        && report.format.name.contains(LEGACY_CONTAINER_MARKER);

    Compatibility {
        is_hls_compatible,
        needs_video_transcode: !video_ok,
        needs_audio_transcode: !audio_ok,
        is_legacy_compatible,
    }
}

/// The four playback modes, always in the order original, hls, legacy,
/// download.
pub fn generate_playback_modes(report: &ProbeReport, flags: &Compatibility) -> Vec<PlaybackMode> {
    let original_description = match report.primary_video() {
        Some(video) => {
            let mut desc = format!("{} {}x{}", video.codec_name, video.width, video.height);
            if video.bit_depth > LEGACY_MAX_BIT_DEPTH {
                desc.push_str(&format!(" {}-bit", video.bit_depth));
            }
            if let Some(audio) = report.primary_audio() {
                desc.push_str(&format!(" + {}", audio.codec_name));
            }
            desc.push_str(" (No transcoding, best quality)");
            desc
        }
        None => "Original file without any transcoding".to_string(),
    };

    let hls_description = if flags.is_hls_compatible {
        "Stream copy (no re-encoding) - Best quality with seeking support".to_string()
    } else {
        let mut desc = String::from("Transcode to H.264/AAC");
        if flags.needs_video_transcode {
            desc.push_str(" (video)");
        }
        if flags.needs_audio_transcode {
            desc.push_str(" (audio)");
        }
        desc.push_str(" - Recommended for web browsers");
        desc
    };

    let legacy_description = if flags.is_legacy_compatible {
        "H.264 Baseline/Main + AAC in MP4 (Direct play on all devices)"
    } else {
        "Transcode to H.264 Baseline + AAC MP4 - Compatible with all devices (old TVs, phones)"
    };

    vec![
        PlaybackMode {
            id: PlaybackModeId::Original,
            name: "Original Quality".into(),
            description: original_description,
            requires_transcoding: false,
            format_type: "original".into(),
        },
        PlaybackMode {
            id: PlaybackModeId::Hls,
            name: "HLS Streaming".into(),
            description: hls_description,
            requires_transcoding: !flags.is_hls_compatible,
            format_type: "hls".into(),
        },
        PlaybackMode {
            id: PlaybackModeId::Legacy,
            name: "Legacy Compatible".into(),
            description: legacy_description.into(),
            requires_transcoding: !flags.is_legacy_compatible,
            format_type: "legacy".into(),
        },
        PlaybackMode {
            id: PlaybackModeId::Download,
            name: "Direct Download/Link".into(),
            description: "Direct link to original file - For native video players".into(),
            requires_transcoding: false,
            format_type: "original".into(),
        },
    ]
}

/// Build the full compatibility document for a probe.
pub fn analyze(report: ProbeReport) -> MediaAnalysis {
    let result = determine_compatibility(&report);
    MediaAnalysis {
        report,
        compatibility: result.flags,
        playback_modes: result.available_modes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FormatInfo;

    fn video(codec: &str, profile: &str, bit_depth: u32) -> VideoStream {
        VideoStream {
            codec_name: codec.into(),
            profile: profile.into(),
            width: 1920,
            height: 1080,
            bit_depth,
            ..Default::default()
        }
    }

    fn audio(codec: &str) -> AudioStream {
        AudioStream {
            codec_name: codec.into(),
            channels: 2,
            ..Default::default()
        }
    }

    fn report(format: &str, videos: Vec<VideoStream>, audios: Vec<AudioStream>) -> ProbeReport {
        ProbeReport {
            format: FormatInfo {
                name: format.into(),
                ..Default::default()
            },
            video_streams: videos,
            audio_streams: audios,
            subtitle_streams: vec![],
        }
    }

    fn mode(result: &CompatibilityResult, id: PlaybackModeId) -> &PlaybackMode {
        result.available_modes.iter().find(|m| m.id == id).unwrap()
    }

    #[test]
    fn h264_aac_is_hls_compatible() {
        let r = report("matroska,webm", vec![video("h264", "High", 8)], vec![audio("aac")]);
        let result = determine_compatibility(&r);

        assert!(result.flags.is_hls_compatible);
        assert!(!result.flags.needs_video_transcode);
        assert!(!result.flags.needs_audio_transcode);
        assert!(!result.flags.is_legacy_compatible);
        let hls = mode(&result, PlaybackModeId::Hls);
        assert!(!hls.requires_transcoding);
        assert!(hls.description.starts_with("Stream copy"));
    }

    #[test]
    fn unsupported_video_needs_transcode() {
        let r = report("matroska,webm", vec![video("vp9", "", 8)], vec![audio("aac")]);
        let result = determine_compatibility(&r);

        assert!(result.flags.needs_video_transcode);
        assert!(!result.flags.needs_audio_transcode);
        assert!(!result.flags.is_hls_compatible);
        let hls = mode(&result, PlaybackModeId::Hls);
        assert!(hls.requires_transcoding);
        assert_eq!(
            hls.description,
            "Transcode to H.264/AAC (video) - Recommended for web browsers"
        );
    }

    #[test]
    fn one_bad_stream_spoils_the_set() {
        let r = report(
            "mov,mp4,m4a,3gp,3g2,mj2",
            vec![video("h264", "Main", 8)],
            vec![audio("aac"), audio("dts")],
        );
        let result = determine_compatibility(&r);
        assert!(!result.flags.is_hls_compatible);
        assert!(result.flags.needs_audio_transcode);
        assert!(!result.flags.is_legacy_compatible);
    }

    #[test]
    fn missing_streams_are_not_compatible() {
        let r = report("mp4", vec![], vec![]);
        let result = determine_compatibility(&r);
        assert!(!result.flags.is_hls_compatible);
        assert!(result.flags.needs_video_transcode);
        assert!(result.flags.needs_audio_transcode);
        assert_eq!(
            mode(&result, PlaybackModeId::Hls).description,
            "Transcode to H.264/AAC (video) (audio) - Recommended for web browsers"
        );
        assert_eq!(
            mode(&result, PlaybackModeId::Original).description,
            "Original file without any transcoding"
        );
    }

    #[test]
    fn legacy_requires_profile_depth_and_container() {
        let ok = report(
            "mov,mp4,m4a,3gp,3g2,mj2",
            vec![video("h264", "Constrained Baseline", 8)],
            vec![audio("mp3")],
        );
        assert!(determine_compatibility(&ok).flags.is_legacy_compatible);

        let high = report("mov,mp4,m4a,3gp,3g2,mj2", vec![video("h264", "High", 8)], vec![audio("aac")]);
        assert!(!determine_compatibility(&high).flags.is_legacy_compatible);

        let deep = report("mov,mp4,m4a,3gp,3g2,mj2", vec![video("h264", "Main", 10)], vec![audio("aac")]);
        assert!(!determine_compatibility(&deep).flags.is_legacy_compatible);

        let mkv = report("matroska,webm", vec![video("h264", "Main", 8)], vec![audio("aac")]);
        assert!(!determine_compatibility(&mkv).flags.is_legacy_compatible);

        let hevc = report("mov,mp4,m4a,3gp,3g2,mj2", vec![video("hevc", "Main", 8)], vec![audio("aac")]);
        let result = determine_compatibility(&hevc);
        assert!(result.flags.is_hls_compatible);
        assert!(!result.flags.is_legacy_compatible);
    }

    #[test]
    fn h265_alias_accepted() {
        let r = report("matroska,webm", vec![video("h265", "Main", 8)], vec![audio("aac")]);
        assert!(determine_compatibility(&r).flags.is_hls_compatible);
    }

    #[test]
    fn modes_are_always_four_in_order() {
        let r = report("mp4", vec![video("av1", "", 10)], vec![audio("opus")]);
        let result = determine_compatibility(&r);
        let ids: Vec<PlaybackModeId> = result.available_modes.iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            [
                PlaybackModeId::Original,
                PlaybackModeId::Hls,
                PlaybackModeId::Legacy,
                PlaybackModeId::Download
            ]
        );
        assert!(!result.available_modes[0].requires_transcoding);
        assert!(!result.available_modes[3].requires_transcoding);
        assert_eq!(result.available_modes[3].format_type, "original");
        assert_eq!(
            result.available_modes[0].description,
            "av1 1920x1080 10-bit + opus (No transcoding, best quality)"
        );
    }

    #[test]
    fn analysis_is_deterministic() {
        let r = report(
            "mov,mp4,m4a,3gp,3g2,mj2",
            vec![video("h264", "Main", 8)],
            vec![audio("aac")],
        );
        assert_eq!(determine_compatibility(&r), determine_compatibility(&r));
    }

    #[test]
    fn analysis_document_shape() {
        let r = report("mov,mp4,m4a,3gp,3g2,mj2", vec![video("h264", "Main", 8)], vec![audio("aac")]);
        let json = serde_json::to_value(analyze(r)).unwrap();

        assert_eq!(json["format"]["name"], "mov,mp4,m4a,3gp,3g2,mj2");
        assert_eq!(json["video_streams"][0]["codec_name"], "h264");
        assert!(json["subtitle_streams"].as_array().unwrap().is_empty());
        assert_eq!(json["compatibility"]["is_legacy_compatible"], true);
        assert_eq!(json["playback_modes"][2]["id"], "legacy");
        assert_eq!(json["playback_modes"][2]["requires_transcoding"], false);
    }
}
