//! Benchmarks for probe output parsing and the compatibility decision.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rc_probe::{analyze, determine_compatibility, ffprobe::parse_ffprobe_json};

/// ffprobe output for a typical web-ready file
const FFPROBE_SIMPLE: &str = r#"{
    "format": {
        "filename": "/movies/movie.mp4",
        "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
        "duration": "7200.000000",
        "size": "1500000000",
        "bit_rate": "1666666"
    },
    "streams": [
        {
            "index": 0,
            "codec_type": "video",
            "codec_name": "h264",
            "profile": "Main",
            "width": 1920,
            "height": 1080,
            "pix_fmt": "yuv420p",
            "r_frame_rate": "24000/1001",
            "bits_per_raw_sample": "8",
            "tags": {"language": "und"}
        },
        {
            "index": 1,
            "codec_type": "audio",
            "codec_name": "aac",
            "channels": 2,
            "channel_layout": "stereo",
            "sample_rate": "48000",
            "tags": {"language": "eng"}
        }
    ]
}"#;

/// ffprobe output for a multi-track remux
const FFPROBE_COMPLEX: &str = r#"{
    "format": {
        "filename": "/movies/complex_movie.mkv",
        "format_name": "matroska,webm",
        "duration": "9000.000000",
        "size": "45000000000"
    },
    "streams": [
        {"index": 0, "codec_type": "video", "codec_name": "hevc", "profile": "Main 10",
         "width": 3840, "height": 2160, "pix_fmt": "yuv420p10le", "r_frame_rate": "24000/1001",
         "color_space": "bt2020nc", "color_transfer": "smpte2084", "color_primaries": "bt2020"},
        {"index": 1, "codec_type": "audio", "codec_name": "truehd", "channels": 8,
         "sample_rate": "48000", "tags": {"language": "eng", "title": "TrueHD 7.1"}},
        {"index": 2, "codec_type": "audio", "codec_name": "ac3", "channels": 6,
         "sample_rate": "48000", "bit_rate": "640000", "tags": {"language": "eng"}},
        {"index": 3, "codec_type": "audio", "codec_name": "aac", "channels": 2,
         "sample_rate": "48000", "tags": {"language": "spa"}},
        {"index": 4, "codec_type": "subtitle", "codec_name": "subrip",
         "disposition": {"default": 1, "forced": 0}, "tags": {"language": "eng", "title": "English"}},
        {"index": 5, "codec_type": "subtitle", "codec_name": "subrip",
         "disposition": {"default": 0, "forced": 1}, "tags": {"language": "eng", "title": "Forced"}},
        {"index": 6, "codec_type": "subtitle", "codec_name": "hdmv_pgs_subtitle",
         "tags": {"language": "jpn"}}
    ]
}"#;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("ffprobe_parse");

    for (name, json) in [("simple", FFPROBE_SIMPLE), ("complex", FFPROBE_COMPLEX)] {
        group.throughput(Throughput::Bytes(json.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| parse_ffprobe_json(black_box(json)).unwrap());
        });
    }

    group.finish();
}

fn bench_compatibility(c: &mut Criterion) {
    let simple = parse_ffprobe_json(FFPROBE_SIMPLE).unwrap();
    let complex = parse_ffprobe_json(FFPROBE_COMPLEX).unwrap();

    c.bench_function("determine_compatibility_simple", |b| {
        b.iter(|| determine_compatibility(black_box(&simple)));
    });
    c.bench_function("determine_compatibility_complex", |b| {
        b.iter(|| determine_compatibility(black_box(&complex)));
    });
    c.bench_function("analyze_and_serialize", |b| {
        b.iter(|| {
            let analysis = analyze(black_box(complex.clone()));
            serde_json::to_string(&analysis).unwrap()
        });
    });
}

criterion_group!(benches, bench_parse, bench_compatibility);
criterion_main!(benches);
