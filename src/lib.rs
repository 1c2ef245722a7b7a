pub mod captions;
pub mod config;
pub mod format;
pub mod language;
pub mod report;
pub mod retry;
pub mod score;
pub mod scout;
pub mod trending;
pub mod youtube;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single timestamped caption fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// One caption stream offered by the captioning service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageTrack {
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
    pub is_translatable: bool,
    #[serde(skip)]
    pub base_url: String,
}

/// Normalized transcript for a video.
///
/// `word_count` and `duration_covered` are derived from the text and cues at
/// construction and cannot be set independently. Records are only ever
/// built from fetched cues, never read back from input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptRecord {
    video_id: String,
    language: String,
    is_generated: bool,
    is_translatable: bool,
    text: String,
    word_count: usize,
    duration_covered: f64,
    fetch_timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl TranscriptRecord {
    pub fn new(video_id: &str, track: &LanguageTrack, cues: &[Cue], note: Option<String>) -> Self {
        let text = format::format_cues(cues);
        Self {
            video_id: video_id.to_string(),
            language: track.language_code.clone(),
            is_generated: track.is_generated,
            is_translatable: track.is_translatable,
            word_count: format::word_count(&text),
            duration_covered: format::duration_covered(cues),
            text,
            fetch_timestamp: Utc::now(),
            note,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_generated(&self) -> bool {
        self.is_generated
    }

    pub fn is_translatable(&self) -> bool {
        self.is_translatable
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn duration_covered(&self) -> f64 {
        self.duration_covered
    }

    pub fn fetch_timestamp(&self) -> DateTime<Utc> {
        self.fetch_timestamp
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// Metadata for one trending video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub channel_id: String,
    pub published_at: String,
    pub duration: String,
    pub duration_seconds: u64,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub category_id: String,
    pub category_name: String,
    pub tags: Vec<String>,
    pub url: String,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<TranscriptRecord>,
}

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap());

static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})",
        r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})",
        r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Extract video ID from various YouTube URL formats
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    // Bare 11-character video ID
    if BARE_ID.is_match(input) {
        return Some(input.to_string());
    }

    // Pattern match before URL parsing: malformed URLs may still match
    for re in URL_PATTERNS.iter() {
        if let Some(caps) = re.captures(input) {
            return Some(caps[1].to_string());
        }
    }

    video_id_from_url(input)
}

fn video_id_from_url(input: &str) -> Option<String> {
    let parsed = url::Url::parse(input).ok()?;
    let candidate = match parsed.host_str()? {
        "youtube.com" | "www.youtube.com" | "m.youtube.com" => parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned()),
        "youtu.be" => parsed
            .path_segments()
            .and_then(|mut s| s.next())
            .map(|s| s.to_string()),
        _ => None,
    }?;

    BARE_ID.is_match(&candidate).then_some(candidate)
}
