//! Integration tests for legacy MP4 generation and serving.

mod common;

use common::{TestHarness, EPISODE_2, LEGACY_BYTES, MOVIE};

#[tokio::test]
async fn legacy_file_is_generated_once_and_served() {
    let (h, addr) = TestHarness::with_server().await;
    let url = format!("http://{addr}/legacy/{MOVIE}");

    let mut handles = Vec::new();
    for _ in 0..6 {
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            let resp = reqwest::get(&url).await.unwrap();
            (resp.status().as_u16(), resp.bytes().await.unwrap())
        }));
    }
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, 200);
        assert_eq!(body.as_ref(), LEGACY_BYTES);
    }

    assert_eq!(h.legacy_calls(), 1);
    assert_eq!(h.ctx.legacy_cache.len(), 1);

    let jobs = h.transcoder.legacy_jobs.lock().unwrap().clone();
    assert!(jobs[0].copy_streams);
}

#[tokio::test]
async fn legacy_file_supports_ranges() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/legacy/{MOVIE}"))
        .header("Range", "bytes=5-")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 206);
    assert_eq!(
        resp.headers()["content-range"].to_str().unwrap(),
        format!("bytes 5-{}/{}", LEGACY_BYTES.len() - 1, LEGACY_BYTES.len())
    );
    assert_eq!(resp.headers()["content-type"].to_str().unwrap(), "video/mp4");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &LEGACY_BYTES[5..]);
}

#[tokio::test]
async fn incompatible_source_is_reencoded() {
    let (h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/legacy/{EPISODE_2}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let jobs = h.transcoder.legacy_jobs.lock().unwrap().clone();
    assert!(!jobs[0].copy_streams);
}

#[tokio::test]
async fn hls_and_legacy_caches_are_independent() {
    let (h, addr) = TestHarness::with_server().await;

    reqwest::get(format!("http://{addr}/legacy/{MOVIE}"))
        .await
        .unwrap();
    reqwest::get(format!("http://{addr}/hls/{MOVIE}/playlist.m3u8"))
        .await
        .unwrap();

    assert_eq!(h.legacy_calls(), 1);
    assert_eq!(h.hls_calls(), 1);
    assert_ne!(
        h.ctx.legacy_cache.artifact_dir(&rc_core::CacheKey::for_path(MOVIE)),
        h.ctx.hls_cache.artifact_dir(&rc_core::CacheKey::for_path(MOVIE))
    );
}

#[tokio::test]
async fn failed_generation_reports_error() {
    let (h, addr) = TestHarness::with_server().await;
    h.set_failing(true);

    let resp = reqwest::get(format!("http://{addr}/legacy/{MOVIE}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    assert!(h.ctx.legacy_cache.is_empty());
}
