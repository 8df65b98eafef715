//! Filename heuristics.
//!
//! Episode detection is an ordered rule table: each rule is tried in
//! priority order against the bare filename and the first match wins.

use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

/// Fallback series name when cleaning leaves nothing behind.
pub const UNKNOWN_SERIES: &str = "Unknown Series";

/// Recognized video container extensions (matched case-insensitively).
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp", "ogv",
];

/// Season and episode numbers extracted from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeMarker {
    pub season: u32,
    pub episode: u32,
}

struct EpisodeRule {
    name: &'static str,
    pattern: Regex,
    extract: fn(&Captures<'_>) -> Option<EpisodeMarker>,
}

/// Season in group 1, episode in group 2.
fn season_episode_groups(caps: &Captures<'_>) -> Option<EpisodeMarker> {
    let season = caps.get(1)?.as_str().parse().ok()?;
    let episode = caps.get(2)?.as_str().parse().ok()?;
    Some(EpisodeMarker { season, episode })
}

static EPISODE_RULES: LazyLock<Vec<EpisodeRule>> = LazyLock::new(|| {
    vec![
        EpisodeRule {
            name: "SxxExx",
            pattern: Regex::new(r"[Ss](\d{1,2})[Ee](\d{1,3})").expect("valid regex"),
            extract: season_episode_groups,
        },
        // Digit guards keep resolutions like 1920x1080 from matching.
        EpisodeRule {
            name: "NxNN",
            pattern: Regex::new(r"(?:^|[^0-9])(\d{1,2})[xX](\d{1,3})(?:[^0-9]|$)")
                .expect("valid regex"),
            extract: season_episode_groups,
        },
        EpisodeRule {
            name: "Season N Episode N",
            pattern: Regex::new(r"(?i)season\s*(\d{1,2}).*episode\s*(\d{1,3})")
                .expect("valid regex"),
            extract: season_episode_groups,
        },
    ]
});

static SEASON_FOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:season\s*\d+|s\d+)\b").expect("valid regex"));

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[\(\[]?\d{4}[\)\]]?\s*").expect("valid regex"));

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[._\-]+").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Check if a path has a recognized video extension.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Extract season/episode numbers from a filename, if any rule matches.
pub fn parse_episode(filename: &str) -> Option<EpisodeMarker> {
    EPISODE_RULES.iter().find_map(|rule| {
        let caps = rule.pattern.captures(filename)?;
        let marker = (rule.extract)(&caps)?;
        tracing::trace!(rule = rule.name, filename, ?marker, "episode rule matched");
        Some(marker)
    })
}

/// Whether a directory name looks like a season folder (`Season 2`, `S02`).
pub fn is_season_folder(dir_name: &str) -> bool {
    SEASON_FOLDER.is_match(dir_name)
}

fn normalize_separators(name: &str) -> String {
    let name = SEPARATORS.replace_all(name, " ");
    WHITESPACE.replace_all(&name, " ").trim().to_string()
}

/// Canonical series name from a directory name: years dropped, separators
/// collapsed into single spaces.
pub fn clean_series_name(dir_name: &str) -> String {
    let name = YEAR.replace_all(dir_name, " ");
    let name = normalize_separators(&name);
    if name.is_empty() {
        UNKNOWN_SERIES.to_string()
    } else {
        name
    }
}

/// Movie title from a filename: extension and episode markers removed,
/// separators collapsed. Falls back to the raw filename.
pub fn clean_movie_name(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    };

    let mut name = stem.to_string();
    for rule in EPISODE_RULES.iter() {
        name = rule.pattern.replace_all(&name, "").into_owned();
    }

    let name = normalize_separators(&name);
    if name.is_empty() {
        filename.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(season: u32, episode: u32) -> Option<EpisodeMarker> {
        Some(EpisodeMarker { season, episode })
    }

    #[test]
    fn all_episode_forms_agree() {
        for name in [
            "Show.S01E02.mkv",
            "show.s01e02.720p.mkv",
            "Show - 1x02 - Pilot.avi",
            "Show Season 1 Episode 2.mp4",
            "show SEASON 1 - the one - EPISODE 2.mp4",
            "S1E2.mkv",
        ] {
            assert_eq!(parse_episode(name), marker(1, 2), "{name}");
        }
    }

    #[test]
    fn cross_marker_is_case_insensitive() {
        assert_eq!(parse_episode("Show.1X02.mkv"), marker(1, 2));
        assert_eq!(parse_episode("Show.12X105.mkv"), marker(12, 105));
        assert_eq!(parse_episode("Movie.1920X1080.mp4"), None);
    }

    #[test]
    fn first_rule_wins() {
        // Both SxxExx and NxNN are present; SxxExx has priority.
        assert_eq!(parse_episode("Show.S03E04.2x05.mkv"), marker(3, 4));
    }

    #[test]
    fn three_digit_episodes() {
        assert_eq!(parse_episode("Anime.S01E105.mkv"), marker(1, 105));
    }

    #[test]
    fn no_episode_marker() {
        assert_eq!(parse_episode("The.Matrix.1999.mkv"), None);
        assert_eq!(parse_episode("Movie.1920x1080.mp4"), None);
    }

    #[test]
    fn video_extensions_case_insensitive() {
        assert!(is_video_file(Path::new("a.MKV")));
        assert!(is_video_file(Path::new("dir/a.mpeg")));
        assert!(is_video_file(Path::new("clip.3gp")));
        assert!(!is_video_file(Path::new("a.srt")));
        assert!(!is_video_file(Path::new("mkv")));
    }

    #[test]
    fn season_folders() {
        assert!(is_season_folder("Season 1"));
        assert!(is_season_folder("season02"));
        assert!(is_season_folder("S03"));
        assert!(is_season_folder("s1"));
        assert!(!is_season_folder("Breaking Bad"));
        assert!(!is_season_folder("Specials"));
    }

    #[test]
    fn series_names_are_cleaned() {
        assert_eq!(clean_series_name("Breaking.Bad.(2008)"), "Breaking Bad");
        assert_eq!(clean_series_name("The_Office-[2005]"), "The Office");
        assert_eq!(clean_series_name("Doctor   Who 2005"), "Doctor Who");
        assert_eq!(clean_series_name("2008"), UNKNOWN_SERIES);
        assert_eq!(clean_series_name("..."), UNKNOWN_SERIES);
    }

    #[test]
    fn movie_names_are_cleaned() {
        assert_eq!(clean_movie_name("The.Matrix.1999.mkv"), "The Matrix 1999");
        assert_eq!(clean_movie_name("my_home-video.mp4"), "my home video");
        assert_eq!(clean_movie_name("noext"), "noext");
        assert_eq!(clean_movie_name("---.mkv"), "---.mkv");
    }
}
