//! FFprobe-based [`rc_probe::Prober`] implementation.
//!
//! Shells out to `ffprobe -v quiet -print_format json -show_format -show_streams`
//! and parses the JSON with [`rc_probe::ffprobe::parse_ffprobe_json`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rc_core::Error;
use rc_probe::{ProbeReport, Prober};

use crate::command::ToolCommand;
use crate::tools::{ToolRegistry, FFPROBE};

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: PathBuf, timeout: Duration) -> Self {
        Self {
            ffprobe_path,
            timeout,
        }
    }

    /// Create a prober from a discovered registry.
    pub fn from_registry(tools: &ToolRegistry, timeout: Duration) -> rc_core::Result<Self> {
        Ok(Self::new(tools.require(FFPROBE)?.to_path_buf(), timeout))
    }

    fn command(&self, path: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(self.ffprobe_path.clone());
        cmd.timeout(self.timeout);
        cmd.args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ]);
        cmd.arg(path.to_string_lossy().as_ref());
        cmd
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> rc_core::Result<ProbeReport> {
        let output = self.command(path).execute().await.map_err(|e| match e {
            Error::Tool { message, .. } => Error::Probe(format!(
                "ffprobe failed for {}: {message}",
                path.display()
            )),
            other => other,
        })?;

        rc_probe::ffprobe::parse_ffprobe_json(&output.stdout)
    }
}
