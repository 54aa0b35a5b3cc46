use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use playlist_import::import::ImportOrchestrator;
use playlist_import::library::load_library;
use playlist_import::progress::ProgressDisplay;
use playlist_import::report::{summary, write_report};
use playlist_import::safety::validate_report_path;
use playlist_import::youtube::{YouTubeConfig, YouTubeSource, DEFAULT_API_BASE, MAX_PAGE_SIZE};

#[derive(Parser)]
#[command(name = "playlist-import")]
#[command(about = "Match a YouTube playlist against a local audio library")]
struct Args {
    /// Playlist URL containing a list= parameter
    url: String,

    /// Library snapshot: .json array or SQLite database with a tracks table
    #[arg(long)]
    library: PathBuf,

    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "YOUTUBE_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    #[arg(long, default_value_t = MAX_PAGE_SIZE)]
    page_size: u32,

    /// HTTP read timeout in seconds
    #[arg(long, default_value = "15")]
    timeout_secs: u64,

    /// Write the full result as JSON
    #[arg(long)]
    output: Option<PathBuf>,

    /// Hide progress bars and log progress lines instead
    #[arg(long)]
    log_only: bool,

    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
    );
    clog.init();

    run(args)
}

fn run(args: Args) -> Result<()> {
    if let Some(output) = &args.output {
        validate_report_path(output, &args.library)?;
    }
    if args.api_key.trim().is_empty() {
        bail!("An API key is required (--api-key or YOUTUBE_API_KEY)");
    }

    let start = Instant::now();

    let library = load_library(&args.library)
        .with_context(|| format!("Failed to load library {}", args.library.display()))?;

    let source = YouTubeSource::new(YouTubeConfig {
        api_base: args.api_base,
        api_key: args.api_key,
        page_size: args.page_size,
        timeout: Duration::from_secs(args.timeout_secs),
    });

    let mut display = ProgressDisplay::new(args.log_only);
    let mut orchestrator = ImportOrchestrator::new(source);
    let outcome = orchestrator.run(&args.url, &library, &mut display);
    display.finish();
    let result = outcome.context("Import failed")?;

    let elapsed = start.elapsed();
    println!("\n{}", summary(&result, elapsed));

    if let Some(output) = &args.output {
        write_report(output, &result, elapsed)?;
        info!("Report written to {}", output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from([
            "playlist-import",
            "https://www.youtube.com/playlist?list=PLx",
            "--library",
            "library.json",
            "--api-key",
            "key",
        ])
        .unwrap();
        assert_eq!(args.page_size, MAX_PAGE_SIZE);
        assert_eq!(args.timeout_secs, 15);
        assert!(args.output.is_none());
        assert!(!args.log_only);
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_require_library() {
        let parsed = Args::try_parse_from([
            "playlist-import",
            "https://www.youtube.com/playlist?list=PLx",
            "--api-key",
            "key",
        ]);
        assert!(parsed.is_err());
    }
}
