//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! library, server, tool and transcode settings. Every section defaults
//! sensibly so a completely empty `{}` file is valid; only the library path
//! must be supplied before the server can start.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub library: LibraryConfig,
    pub server: ServerConfig,
    pub tools: ToolsConfig,
    pub transcode: TranscodeConfig,
    pub profiles: Vec<Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: LibraryConfig::default(),
            server: ServerConfig::default(),
            tools: ToolsConfig::default(),
            transcode: TranscodeConfig::default(),
            profiles: default_profiles(),
        }
    }
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Load configuration from a file, failing if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return the configured library root, or `ConfigInvalid` if none is set.
    pub fn require_library(&self) -> Result<&Path> {
        match self.library.path.as_deref() {
            Some(p) if !p.as_os_str().is_empty() => Ok(p),
            _ => Err(Error::Config(
                "library.path is not set; point it at your media directory".into(),
            )),
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        match &self.library.path {
            None => warnings.push("library.path is not set; the server will refuse to start".into()),
            Some(p) if !p.is_dir() => {
                warnings.push(format!("library.path {} is not a directory", p.display()))
            }
            Some(_) => {}
        }

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if let Some(ref dir) = self.server.static_dir {
            if !dir.is_dir() {
                warnings.push(format!(
                    "server.static_dir {} does not exist; the web UI will not be served",
                    dir.display()
                ));
            }
        }

        let t = &self.transcode;
        if t.probe_timeout_secs == 0 {
            warnings.push("transcode.probe_timeout_secs is 0; probes will time out immediately".into());
        }
        if t.generation_timeout_secs == 0 {
            warnings.push(
                "transcode.generation_timeout_secs is 0; generations will time out immediately".into(),
            );
        }
        if t.hls_segment_secs == 0 {
            warnings.push("transcode.hls_segment_secs must be at least 1".into());
        }
        if t.video_crf > 51 {
            warnings.push(format!(
                "transcode.video_crf {} is outside the x264 range 0-51",
                t.video_crf
            ));
        }
        if t.hls_max_entries == 0 || t.legacy_max_entries == 0 {
            warnings.push("transcode cache sizes below 1 are raised to 1".into());
        }

        let mut seen = std::collections::HashSet::new();
        for (i, profile) in self.profiles.iter().enumerate() {
            if profile.id.is_empty() {
                warnings.push(format!("profiles[{i}].id is empty"));
            } else if !seen.insert(profile.id.as_str()) {
                warnings.push(format!("profiles[{i}].id '{}' is duplicated", profile.id));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Media library settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root directory that is scanned and served.
    pub path: Option<PathBuf>,
    /// Custom display names keyed by canonical series name.
    pub display_names: HashMap<String, String>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            static_dir: None,
        }
    }
}

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
}

/// Probing, transcoding and artifact cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    pub cache_dir: PathBuf,
    pub probe_timeout_secs: u64,
    pub generation_timeout_secs: u64,
    pub hls_segment_secs: u32,
    pub video_crf: u32,
    pub video_preset: String,
    pub audio_bitrate: String,
    pub legacy_audio_bitrate: String,
    pub hls_max_entries: usize,
    pub legacy_max_entries: usize,
    /// Idle time after which a cached artifact is removed. 0 disables it.
    pub cache_ttl_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            cache_dir: std::env::temp_dir().join("reelcast-cache"),
            probe_timeout_secs: 30,
            generation_timeout_secs: 4 * 60 * 60,
            hls_segment_secs: 6,
            video_crf: 23,
            video_preset: "veryfast".into(),
            audio_bitrate: "192k".into(),
            legacy_audio_bitrate: "128k".into(),
            hls_max_entries: 64,
            legacy_max_entries: 16,
            cache_ttl_secs: 24 * 60 * 60,
            cleanup_interval_secs: 300,
        }
    }
}

impl TranscodeConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Idle TTL for cached artifacts, `None` when age-based eviction is off.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

/// A viewer profile shown by the web client's profile picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

fn default_profiles() -> Vec<Profile> {
    vec![Profile {
        id: "default".into(),
        name: "Default".into(),
        icon: "👤".into(),
    }]
}
