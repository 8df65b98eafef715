//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which lays out a small library in a temp
//! directory, scans it, and builds a full [`AppContext`] around fake probe and
//! transcode collaborators. [`TestHarness::with_server`] starts Axum on a
//! random port for HTTP-level testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use rc_av::{HlsJob, HlsOutput, LegacyJob, LegacyOutput, Transcoder, HLS_PLAYLIST};
use rc_core::config::Config;
use rc_core::Error;
use rc_probe::{AudioStream, FormatInfo, ProbeReport, Prober, VideoStream};
use rc_server::context::AppContext;
use rc_server::router::build_router;

pub const EPISODE_1: &str = "Breaking.Bad.(2008)/Season 1/Breaking.Bad.S01E01.Pilot.mkv";
pub const EPISODE_2: &str = "Breaking.Bad.(2008)/Season 1/Breaking.Bad.S01E02.mkv";
pub const MOVIE: &str = "Movies/Zodiac.2007.mp4";
/// Present in the library but unreadable by the prober.
pub const BROKEN: &str = "Movies/Broken.avi";

pub const FILE_SIZE: usize = 1000;

pub const SEGMENT_BYTES: &[u8] = b"fake transport stream";
pub const LEGACY_BYTES: &[u8] = b"fake legacy mp4 payload";

/// Deterministic file content so range responses can be checked byte for byte.
pub fn file_content() -> Vec<u8> {
    (0..FILE_SIZE).map(|i| (i % 251) as u8).collect()
}

fn report(format: &str, video: &str, profile: &str, audio: &str) -> ProbeReport {
    ProbeReport {
        format: FormatInfo {
            name: format.into(),
            duration: 2700.0,
            size: FILE_SIZE as u64,
            ..Default::default()
        },
        video_streams: vec![VideoStream {
            codec_name: video.into(),
            profile: profile.into(),
            width: 1920,
            height: 1080,
            fps: 23.976,
            bit_depth: 8,
            ..Default::default()
        }],
        audio_streams: vec![AudioStream {
            codec_name: audio.into(),
            channels: 2,
            sample_rate: 48000,
            ..Default::default()
        }],
        subtitle_streams: Vec::new(),
    }
}

/// Prober answering from canned reports keyed by file name.
#[derive(Default)]
pub struct FakeProber {
    reports: HashMap<String, ProbeReport>,
    pub calls: AtomicUsize,
}

impl FakeProber {
    pub fn with_library_reports() -> Self {
        let mut reports = HashMap::new();
        reports.insert(
            "Breaking.Bad.S01E01.Pilot.mkv".to_string(),
            report("matroska,webm", "h264", "High", "aac"),
        );
        reports.insert(
            "Breaking.Bad.S01E02.mkv".to_string(),
            report("matroska,webm", "hevc", "Main 10", "ac3"),
        );
        reports.insert(
            "Zodiac.2007.mp4".to_string(),
            report("mov,mp4,m4a,3gp,3g2,mj2", "h264", "Main", "aac"),
        );
        Self {
            reports,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Prober for FakeProber {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn probe(&self, path: &Path) -> rc_core::Result<ProbeReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.reports
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::Probe(format!("no streams found in {}", path.display())))
    }
}

/// Transcoder that writes small placeholder artifacts and records its jobs.
pub struct FakeTranscoder {
    pub delay: Duration,
    pub fail: AtomicBool,
    pub hls_calls: AtomicUsize,
    pub legacy_calls: AtomicUsize,
    pub hls_jobs: Mutex<Vec<HlsJob>>,
    pub legacy_jobs: Mutex<Vec<LegacyJob>>,
}

impl Default for FakeTranscoder {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(100),
            fail: AtomicBool::new(false),
            hls_calls: AtomicUsize::new(0),
            legacy_calls: AtomicUsize::new(0),
            hls_jobs: Mutex::new(Vec::new()),
            legacy_jobs: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn hls(&self, job: &HlsJob) -> rc_core::Result<HlsOutput> {
        self.hls_calls.fetch_add(1, Ordering::SeqCst);
        self.hls_jobs.lock().unwrap().push(job.clone());
        tokio::time::sleep(self.delay).await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::generation("hls", "ffmpeg exited with status 1"));
        }

        tokio::fs::create_dir_all(&job.output_dir).await?;
        tokio::fs::write(job.output_dir.join("segment_000.ts"), SEGMENT_BYTES).await?;
        tokio::fs::write(job.output_dir.join("segment_001.ts"), SEGMENT_BYTES).await?;
        let playlist = "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:6\n\
                        #EXT-X-PLAYLIST-TYPE:VOD\n#EXTINF:6.000000,\nsegment_000.ts\n\
                        #EXTINF:4.000000,\nsegment_001.ts\n#EXT-X-ENDLIST\n"
            .to_string();
        tokio::fs::write(job.output_dir.join(HLS_PLAYLIST), &playlist).await?;

        Ok(HlsOutput {
            playlist,
            segment_dir: job.output_dir.clone(),
        })
    }

    async fn legacy(&self, job: &LegacyJob) -> rc_core::Result<LegacyOutput> {
        self.legacy_calls.fetch_add(1, Ordering::SeqCst);
        self.legacy_jobs.lock().unwrap().push(job.clone());
        tokio::time::sleep(self.delay).await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::generation("legacy", "ffmpeg exited with status 1"));
        }

        tokio::fs::create_dir_all(&job.output_dir).await?;
        let path = job.output_dir.join("legacy.mp4");
        tokio::fs::write(&path, LEGACY_BYTES).await?;
        Ok(LegacyOutput { path })
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] over a temp
/// library.
pub struct TestHarness {
    pub ctx: AppContext,
    pub prober: Arc<FakeProber>,
    pub transcoder: Arc<FakeTranscoder>,
    dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = dir.path().join("library");
        for rel in [EPISODE_1, EPISODE_2, MOVIE, BROKEN] {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, file_content()).unwrap();
        }
        std::fs::write(root.join("Movies/notes.txt"), b"not a video").unwrap();

        let mut config = Config::default();
        config.library.path = Some(root.clone());
        config.transcode.cache_dir = dir.path().join("cache");

        let library = rc_library::scan(&root);
        let prober = Arc::new(FakeProber::with_library_reports());
        let transcoder = Arc::new(FakeTranscoder::default());

        let ctx = AppContext::new(
            config,
            library,
            root,
            prober.clone(),
            transcoder.clone(),
        );

        Self {
            ctx,
            prober,
            transcoder,
            dir,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = build_router(harness.ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("library")
    }

    pub fn hls_calls(&self) -> usize {
        self.transcoder.hls_calls.load(Ordering::SeqCst)
    }

    pub fn legacy_calls(&self) -> usize {
        self.transcoder.legacy_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.transcoder.fail.store(fail, Ordering::SeqCst);
    }
}
