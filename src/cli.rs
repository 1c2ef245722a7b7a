use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "trendscout",
    about = "Trending YouTube video scout with transcript acquisition",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Video URLs or IDs to fetch transcripts for directly
    pub videos: Vec<String>,

    /// Read video metadata (JSON array) from a file instead of the trending chart
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Region code for the trending chart
    #[arg(short, long)]
    pub region: Option<String>,

    /// Number of trending videos to fetch (1-50)
    #[arg(short = 'n', long)]
    pub max_results: Option<u32>,

    /// Preferred caption language, in order (repeatable)
    #[arg(short, long = "lang")]
    pub langs: Vec<String>,

    /// Try any language when no preferred transcript is found
    #[arg(short, long)]
    pub any_language: bool,

    /// Minimum transcript-potential score to attempt a fetch
    #[arg(long, allow_negative_numbers = true)]
    pub min_score: Option<i32>,

    /// Where to write the run report
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print captioning service health and exit
    #[arg(long)]
    pub health: bool,

    /// Print per-video progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
