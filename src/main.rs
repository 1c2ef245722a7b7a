use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::{debug, error, info};

use trendscout::captions::CaptionService;
use trendscout::config::{Config, config_path};
use trendscout::report::DailyBrief;
use trendscout::scout::TranscriptScout;
use trendscout::trending::TrendingClient;
use trendscout::youtube::YouTubeCaptions;
use trendscout::{TranscriptRecord, VideoMetadata, score};

mod cli;

use cli::Cli;

const DEFAULT_OUTPUT: &str = "data/daily_brief.json";
const DEFAULT_REGION: &str = "US";
const DEFAULT_MAX_RESULTS: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("trendscout.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trendscout")
        .join("logs")
}

fn build_after_help() -> String {
    format!(
        "\nENVIRONMENT:\n  YOUTUBE_API_KEY   required to fetch the trending chart\n  RUST_LOG          log filter (default: info)\n\nConfig is read from: {}\nLogs are written to: {}",
        config_path().display(),
        log_dir().join("trendscout.log").display()
    )
}

fn load_videos(path: &Path) -> Result<Vec<VideoMetadata>> {
    let data = std::fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    let videos = serde_json::from_str(&data).wrap_err_with(|| format!("parsing video metadata in {}", path.display()))?;
    Ok(videos)
}

/// Preferred languages first, then any language if allowed
async fn acquire<S: CaptionService>(
    scout: &TranscriptScout<S>,
    input: &str,
    languages: &[String],
    any_language: bool,
) -> Option<TranscriptRecord> {
    if let Some(record) = scout.attempt_preferred(input, Some(languages)).await {
        return Some(record);
    }
    if any_language {
        debug!("No preferred-language transcript for {input}, trying any language");
        return scout.attempt_any_language(input).await;
    }
    None
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cmd = <Cli as clap::CommandFactory>::command().after_help(build_after_help());
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_else(|e| {
        error!("Ignoring invalid config at {}: {e}", config_path().display());
        Config::default()
    });

    // CLI flags take priority over config
    let languages = if cli.langs.is_empty() {
        config.languages.clone().unwrap_or_default()
    } else {
        cli.langs.clone()
    };
    let min_score = cli.min_score.or(config.min_score);
    let timeout = Duration::from_secs(config.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

    let scout = match YouTubeCaptions::new(timeout) {
        Ok(service) => TranscriptScout::new(service, config.retry),
        Err(e) => {
            error!("Captioning service failed to initialize: {e}");
            TranscriptScout::disabled(config.retry)
        }
    };

    if cli.health {
        let health = scout.health_check().await;
        println!("{}", serde_json::to_string_pretty(&health)?);
        return Ok(());
    }

    // Direct mode: transcripts for the given videos only
    if !cli.videos.is_empty() {
        let mut records = Vec::new();
        for input in &cli.videos {
            match acquire(&scout, input, &languages, cli.any_language).await {
                Some(record) => records.push(record),
                None => eprintln!("No transcript for {input}"),
            }
        }
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let mut videos = if let Some(ref path) = cli.input {
        load_videos(path)?
    } else {
        let api_key = std::env::var("YOUTUBE_API_KEY")
            .map_err(|_| eyre::eyre!("YOUTUBE_API_KEY environment variable not set (required for the trending chart)"))?;
        let region = cli
            .region
            .clone()
            .or(config.region.clone())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let category = config.category_id.clone().unwrap_or_else(|| "0".to_string());
        let max_results = cli.max_results.or(config.max_results).unwrap_or(DEFAULT_MAX_RESULTS);
        TrendingClient::new(reqwest::Client::new(), api_key, config.retry)
            .fetch_trending(&region, &category, max_results)
            .await?
    };
    info!("Scouting transcripts for {} videos", videos.len());

    let mut skipped = 0;
    for video in videos.iter_mut() {
        let potential = scout.score_potential(video);
        let attempt = match min_score {
            Some(min) => potential >= min,
            None => score::should_fetch(potential),
        };
        if !attempt {
            info!("Skipping {} (potential score {potential})", video.video_id);
            skipped += 1;
            continue;
        }

        video.transcript = acquire(&scout, &video.video_id, &languages, cli.any_language).await;
        if cli.verbose {
            let status = if video.transcript.is_some() { "ok" } else { "none" };
            eprintln!("[{status}] {} (score {potential})", video.title);
        }
    }

    let brief = DailyBrief::new(videos, skipped);
    let output = cli
        .output
        .clone()
        .or(config.output.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    brief.save(&output)?;

    if cli.verbose {
        eprintln!(
            "Transcripts: {}/{} ({} skipped by score)\nReport written to: {}",
            brief.summary.videos_with_transcripts,
            brief.summary.total_videos_analyzed,
            brief.summary.videos_skipped_by_score,
            output.display()
        );
    }

    Ok(())
}
