//! Catalog data model produced by the library scanner.
//!
//! The catalog is built once per scan and is read-only afterwards. Its JSON
//! form is the document served by `GET /api/library`.

use serde::{Deserialize, Serialize};

/// One scanned video file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Path relative to the library root, `/`-separated.
    pub path: String,
    pub filename: String,
    /// Season number; implied by the enclosing [`Season`] in the catalog
    /// document, so it is not serialized.
    #[serde(skip_serializing, default)]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub episode: Option<u32>,
}

/// A numbered season holding its episodes in playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub number: u32,
    pub episodes: Vec<Video>,
}

/// A series grouped from episodic files sharing a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Canonical key derived from the directory name.
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub seasons: Vec<Season>,
}

impl Series {
    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }
}

/// A standalone video with no season/episode markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub name: String,
    pub path: String,
}

/// The in-memory catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLibrary {
    pub series: Vec<Series>,
    pub movies: Vec<Movie>,
}

impl MediaLibrary {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.movies.is_empty()
    }

    /// Total number of videos across series and movies.
    pub fn video_count(&self) -> usize {
        self.series.iter().map(Series::episode_count).sum::<usize>() + self.movies.len()
    }
}
