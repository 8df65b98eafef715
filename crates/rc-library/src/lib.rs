//! rc-library: turns a directory tree of video files into a catalog.
//!
//! [`heuristics`] classifies filenames and cleans up display names;
//! [`scanner`] walks the library root and groups files into series,
//! seasons and movies.

pub mod heuristics;
pub mod scanner;

pub use heuristics::{is_video_file, parse_episode, EpisodeMarker};
pub use scanner::{scan, scan_with, ScanStats};
