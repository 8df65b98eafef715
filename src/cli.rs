use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelcast")]
#[command(author, version, about = "Personal media server with direct, HLS and legacy playback")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the library and start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Library root directory (overrides config)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },

    /// Scan a directory and print the resulting catalog
    Scan {
        /// Library root to scan
        #[arg(required = true)]
        dir: PathBuf,

        /// Output the catalog document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe a media file and display its playback compatibility
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_overrides() {
        let cli = Cli::try_parse_from([
            "reelcast", "-c", "cfg.json", "serve", "--port", "9000", "--library", "/media",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        match cli.command {
            Commands::Serve { host, port, library } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9000));
                assert_eq!(library, Some(PathBuf::from("/media")));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn scan_json_flag() {
        let cli = Cli::try_parse_from(["reelcast", "scan", "/media", "--json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Scan { json: true, .. }));
    }
}
