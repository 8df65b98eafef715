mod cli;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use rc_av::{FfprobeProber, ToolRegistry};
use rc_core::config::Config;
use rc_probe::Prober;

/// Expand `~` and environment variables in a user-supplied path.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => path.to_path_buf(),
    }
}

fn load_config(path: Option<&Path>) -> Config {
    let path = path.map(expand_path);
    Config::load_or_default(path.as_deref())
}

async fn serve(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    library: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path);

    // CLI flags take precedence over the config file.
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(library) = library {
        config.library.path = Some(expand_path(&library));
    }

    tracing::info!("Starting reelcast");
    rc_server::start(config).await?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelcast=trace,rc_server=trace,rc_library=debug,rc_probe=debug,rc_av=debug,rc_core=debug,tower_http=debug".to_string()
        } else {
            "reelcast=info,rc_server=info,rc_library=info,rc_probe=info,rc_av=info,rc_core=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            library,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(cli.config.as_deref(), host, port, library))
        }
        Commands::Scan { dir, json } => scan_dir(&expand_path(&dir), cli.config.as_deref(), json),
        Commands::Probe { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&expand_path(&file), cli.config.as_deref(), json))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reelcast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn scan_dir(dir: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {:?}", dir);
    }

    let config = load_config(config_path);
    let (library, stats) = rc_library::scan_with(dir, &config.library.display_names);

    if json {
        println!("{}", serde_json::to_string_pretty(&library)?);
        return Ok(());
    }

    for series in &library.series {
        println!("{} ({} episodes)", series.display_name, series.episode_count());
        for season in &series.seasons {
            println!("  Season {}", season.number);
            for video in &season.episodes {
                match video.episode {
                    Some(ep) => println!("    E{:02} {}", ep, video.filename),
                    None => println!("        {}", video.filename),
                }
            }
        }
    }

    if !library.movies.is_empty() {
        println!("Movies");
        for movie in &library.movies {
            println!("  {} - {}", movie.name, movie.path);
        }
    }

    println!(
        "\n{} series, {} seasons, {} episodes, {} movies in {:.2?}",
        stats.series, stats.seasons, stats.episodes, stats.movies, stats.elapsed
    );
    Ok(())
}

async fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.is_file() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = load_config(config_path);
    let tools = ToolRegistry::discover(&config.tools);
    let prober = FfprobeProber::from_registry(&tools, config.transcode.probe_timeout())?;
    let analysis = rc_probe::analyze(prober.probe(file).await?);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let report = &analysis.report;
    println!("File: {}", file.display());
    println!("Container: {}", report.format.name);
    println!("Size: {} bytes", report.format.size);
    let secs = report.format.duration.max(0.0) as u64;
    println!(
        "Duration: {:02}:{:02}:{:02}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    );

    println!("\nVideo Streams: {}", report.video_streams.len());
    for (i, s) in report.video_streams.iter().enumerate() {
        println!(
            "  [{}] {} {} {}x{} {:.3} fps, {} bit",
            i, s.codec_name, s.profile, s.width, s.height, s.fps, s.bit_depth
        );
    }

    println!("\nAudio Streams: {}", report.audio_streams.len());
    for (i, s) in report.audio_streams.iter().enumerate() {
        print!("  [{}] {} {}ch {} Hz", i, s.codec_name, s.channels, s.sample_rate);
        if let Some(ref lang) = s.language {
            print!(" ({})", lang);
        }
        println!();
    }

    println!("\nSubtitle Streams: {}", report.subtitle_streams.len());
    for (i, s) in report.subtitle_streams.iter().enumerate() {
        print!("  [{}] {}", i, s.codec_name);
        if !s.language.is_empty() {
            print!(" ({})", s.language);
        }
        if s.forced {
            print!(" [forced]");
        }
        println!();
    }

    let flags = &analysis.compatibility;
    println!("\nHLS compatible: {}", flags.is_hls_compatible);
    println!("Legacy compatible: {}", flags.is_legacy_compatible);
    println!("\nPlayback modes:");
    for mode in &analysis.playback_modes {
        let marker = if mode.requires_transcoding { "*" } else { " " };
        println!("  {} {:<9} {}", marker, mode.id.as_str(), mode.description);
    }
    println!("  (* requires transcoding)");

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = load_config(config_path);
    let tools = ToolRegistry::discover(&config.tools);
    let mut all_ok = true;

    for tool in tools.check_all() {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);
        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }
        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }
        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to enable analysis and transcoding.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            let p = expand_path(p);
            println!("Validating config: {:?}", p);
            Config::load(&p)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        println!("Configuration loaded with {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }

    println!("  Server: {}:{}", config.server.host, config.server.port);
    match config.library.path {
        Some(ref p) => println!("  Library: {}", p.display()),
        None => println!("  Library: (not set)"),
    }
    println!("  Cache: {}", config.transcode.cache_dir.display());
    println!("  Profiles: {}", config.profiles.len());

    Ok(())
}
