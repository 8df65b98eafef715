//! Library scanner.
//!
//! Walks the library root once, classifies every recognized video file as an
//! episode or a movie, and assembles the sorted [`MediaLibrary`]. A missing or
//! non-directory root yields an empty catalog rather than an error.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::{Duration, Instant};

use rc_core::{MediaLibrary, Movie, Season, Series, Video};

use crate::heuristics::{
    clean_movie_name, clean_series_name, is_season_folder, is_video_file, parse_episode,
};

/// Summary of one scan, logged when the walk completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub series: usize,
    pub seasons: usize,
    pub episodes: usize,
    pub movies: usize,
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Scan `root` using canonical series names as display names.
pub fn scan(root: &Path) -> MediaLibrary {
    scan_with(root, &HashMap::new()).0
}

/// Scan `root`, applying custom display names keyed by canonical series name.
pub fn scan_with(
    root: &Path,
    display_names: &HashMap<String, String>,
) -> (MediaLibrary, ScanStats) {
    let started = Instant::now();
    let mut stats = ScanStats::default();

    if !root.is_dir() {
        tracing::warn!(path = %root.display(), "Library root does not exist or is not a directory");
        return (MediaLibrary::default(), stats);
    }

    tracing::info!(path = %root.display(), "Starting library scan");

    // series name -> season number -> episodes
    let mut grouped: BTreeMap<String, BTreeMap<u32, Vec<Video>>> = BTreeMap::new();
    let mut movies: Vec<Movie> = Vec::new();

    for entry in walkdir::WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "Error walking directory");
                None
            }
        })
    {
        if !entry.file_type().is_file() || !is_video_file(entry.path()) {
            continue;
        }

        let path = entry.path();
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!(path = %path.display(), "Skipping file with non UTF-8 name");
            stats.skipped += 1;
            continue;
        };
        let Some(relative) = relative_path(root, path) else {
            tracing::warn!(path = %path.display(), "Skipping file outside library root");
            stats.skipped += 1;
            continue;
        };

        match parse_episode(filename) {
            Some(marker) => {
                let series = series_name_for(path);
                tracing::debug!(
                    path = %relative,
                    series = %series,
                    season = marker.season,
                    episode = marker.episode,
                    "Classified as episode"
                );
                grouped
                    .entry(series)
                    .or_default()
                    .entry(marker.season)
                    .or_default()
                    .push(Video {
                        path: relative,
                        filename: filename.to_string(),
                        season: Some(marker.season),
                        episode: Some(marker.episode),
                    });
            }
            None => {
                let name = clean_movie_name(filename);
                tracing::debug!(path = %relative, name = %name, "Classified as movie");
                movies.push(Movie {
                    name,
                    path: relative,
                });
            }
        }
    }

    let series: Vec<Series> = grouped
        .into_iter()
        .map(|(name, seasons)| {
            let seasons = seasons
                .into_iter()
                .map(|(number, mut episodes)| {
                    episodes.sort_by(|a, b| {
                        a.episode
                            .cmp(&b.episode)
                            .then_with(|| a.filename.cmp(&b.filename))
                    });
                    Season { number, episodes }
                })
                .collect();
            let display_name = display_names
                .get(&name)
                .cloned()
                .unwrap_or_else(|| name.clone());
            Series {
                name,
                display_name,
                seasons,
            }
        })
        .collect();

    movies.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));

    stats.series = series.len();
    stats.seasons = series.iter().map(|s| s.seasons.len()).sum();
    stats.episodes = series.iter().map(Series::episode_count).sum();
    stats.movies = movies.len();
    stats.elapsed = started.elapsed();

    tracing::info!(
        series = stats.series,
        seasons = stats.seasons,
        episodes = stats.episodes,
        movies = stats.movies,
        skipped = stats.skipped,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "Library scan complete"
    );

    (MediaLibrary { series, movies }, stats)
}

/// Series name from the parent directory, or the grandparent when the parent
/// is a season folder.
fn series_name_for(path: &Path) -> String {
    let parent = path.parent();
    let parent_name = dir_name(parent);

    let raw = if is_season_folder(parent_name) {
        dir_name(parent.and_then(Path::parent))
    } else {
        parent_name
    };

    clean_series_name(raw)
}

fn dir_name(dir: Option<&Path>) -> &str {
    dir.and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .unwrap_or("")
}

/// `/`-separated path of `path` relative to `root`.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}
