//! Parsing of `ffprobe -print_format json -show_format -show_streams` output.
//!
//! ffprobe reports most numeric fields (bit rates, sizes, sample rates) as
//! JSON strings, and some as numbers depending on version. Every numeric
//! field is therefore read leniently and falls back to zero when absent.

use rc_core::{Error, Result};
use serde::Deserialize;

use crate::types::{AudioStream, FormatInfo, ProbeReport, SubtitleStream, VideoStream};

/// Parse ffprobe JSON into a [`ProbeReport`].
///
/// Empty output, malformed JSON, or a document carrying neither format nor
/// stream information is a [`Error::Probe`].
pub fn parse_ffprobe_json(json: &str) -> Result<ProbeReport> {
    if json.trim().is_empty() {
        return Err(Error::Probe("ffprobe produced no output".into()));
    }

    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| Error::Probe(format!("ffprobe JSON parse error: {e}")))?;

    if output.format.is_none() && output.streams.is_empty() {
        return Err(Error::Probe(
            "ffprobe output has no format or stream information".into(),
        ));
    }

    Ok(build_report(output))
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    format_long_name: Option<String>,
    duration: Option<Lenient>,
    size: Option<Lenient>,
    bit_rate: Option<Lenient>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    codec_long_name: Option<String>,
    profile: Option<String>,
    width: Option<Lenient>,
    height: Option<Lenient>,
    pix_fmt: Option<String>,
    r_frame_rate: Option<String>,
    bit_rate: Option<Lenient>,
    bits_per_raw_sample: Option<Lenient>,
    bits_per_sample: Option<Lenient>,
    color_space: Option<String>,
    color_transfer: Option<String>,
    color_primaries: Option<String>,
    sample_rate: Option<Lenient>,
    channels: Option<Lenient>,
    channel_layout: Option<String>,
    #[serde(default)]
    disposition: FfprobeDisposition,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    forced: u8,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
    title: Option<String>,
}

/// A numeric field that may arrive as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Lenient {
    Int(u64),
    Float(f64),
    Text(String),
}

impl Lenient {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Lenient::Int(n) => Some(*n as f64),
            Lenient::Float(f) => Some(*f),
            Lenient::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Lenient::Int(n) => Some(*n),
            Lenient::Float(f) if *f >= 0.0 => Some(*f as u64),
            Lenient::Float(_) => None,
            Lenient::Text(s) => {
                let s = s.trim();
                s.parse()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64))
            }
        }
    }
}

fn num_u64(v: &Option<Lenient>) -> u64 {
    v.as_ref().and_then(Lenient::as_u64).unwrap_or(0)
}

fn num_u32(v: &Option<Lenient>) -> u32 {
    u32::try_from(num_u64(v)).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

fn build_report(output: FfprobeOutput) -> ProbeReport {
    let fmt = output.format.unwrap_or_default();
    let format = FormatInfo {
        name: fmt.format_name.unwrap_or_default(),
        long_name: fmt.format_long_name.unwrap_or_default(),
        duration: fmt.duration.as_ref().and_then(Lenient::as_f64).unwrap_or(0.0),
        size: num_u64(&fmt.size),
        bitrate: num_u64(&fmt.bit_rate),
    };

    let mut report = ProbeReport {
        format,
        ..Default::default()
    };

    for stream in output.streams {
        match stream.codec_type.as_deref().unwrap_or("") {
            "video" => report.video_streams.push(video_stream(stream)),
            "audio" => report.audio_streams.push(AudioStream {
                sample_rate: num_u32(&stream.sample_rate),
                channels: num_u32(&stream.channels),
                bitrate: num_u64(&stream.bit_rate),
                bit_depth: num_u32(&stream.bits_per_sample),
                codec_name: stream.codec_name.unwrap_or_default(),
                codec_long_name: stream.codec_long_name.unwrap_or_default(),
                channel_layout: stream.channel_layout.unwrap_or_default(),
                language: stream.tags.language,
            }),
            "subtitle" => report.subtitle_streams.push(SubtitleStream {
                codec_name: stream.codec_name.unwrap_or_default(),
                language: stream.tags.language.unwrap_or_default(),
                title: stream.tags.title.unwrap_or_default(),
                forced: stream.disposition.forced == 1,
            }),
            other => tracing::trace!(codec_type = other, "ignoring stream"),
        }
    }

    report
}

fn video_stream(stream: FfprobeStream) -> VideoStream {
    let pix_fmt = stream.pix_fmt.unwrap_or_default();
    let bit_depth = stream
        .bits_per_raw_sample
        .as_ref()
        .and_then(Lenient::as_u64)
        .filter(|d| *d > 0)
        .map(|d| d as u32)
        .unwrap_or_else(|| bit_depth_from_pix_fmt(&pix_fmt));

    VideoStream {
        codec_name: stream.codec_name.unwrap_or_default(),
        codec_long_name: stream.codec_long_name.unwrap_or_default(),
        profile: stream.profile.unwrap_or_default(),
        width: num_u32(&stream.width),
        height: num_u32(&stream.height),
        fps: stream
            .r_frame_rate
            .as_deref()
            .and_then(parse_frame_rate)
            .unwrap_or(0.0),
        bitrate: num_u64(&stream.bit_rate),
        pix_fmt,
        bit_depth,
        color_space: stream.color_space.unwrap_or_default(),
        color_transfer: stream.color_transfer.unwrap_or_default(),
        color_primaries: stream.color_primaries.unwrap_or_default(),
        language: stream.tags.language,
    }
}

fn bit_depth_from_pix_fmt(pix_fmt: &str) -> u32 {
    if pix_fmt.contains("10") {
        10
    } else if pix_fmt.contains("12") {
        12
    } else {
        8
    }
}

fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    if let Some((num, den)) = rate_str.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        return (den > 0.0).then(|| num / den);
    }
    rate_str.trim().parse().ok()
}
