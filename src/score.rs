use crate::VideoMetadata;
use crate::trending::category_name;

/// Minimum score at which a transcript fetch is attempted
pub const FETCH_THRESHOLD: i32 = 0;

const HIGH_LIKELIHOOD_CATEGORIES: &[&str] = &[
    "news",
    "education",
    "science",
    "technology",
    "people",
    "blogs",
    "comedy",
    "entertainment",
    "howto",
    "style",
];

const LOW_LIKELIHOOD_CATEGORIES: &[&str] = &["music", "gaming", "sports", "film", "animation"];

const SPEECH_INDICATORS: &[&str] = &[
    "interview",
    "tutorial",
    "podcast",
    "documentary",
    "lecture",
    "explained",
    "review",
    "discussion",
    "analysis",
    "commentary",
    "how to",
    "guide",
    "ted talk",
    "talk show",
];

const NON_SPEECH_INDICATORS: &[&str] = &[
    "lyrics",
    "instrumental",
    "remix",
    "karaoke",
    "8d audio",
    "slowed",
    "reverb",
    "bass boosted",
    "type beat",
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn duration_points(seconds: u64) -> i32 {
    match seconds {
        s if s > 1800 => 3,
        s if s > 600 => 2,
        s if s > 180 => 1,
        s if s < 60 => -2,
        _ => 0,
    }
}

/// Heuristic likelihood that a video carries a usable transcript
pub fn score_potential(video: &VideoMetadata) -> i32 {
    let title = video.title.to_lowercase();
    let category = if video.category_name.is_empty() {
        category_name(&video.category_id).to_lowercase()
    } else {
        video.category_name.to_lowercase()
    };

    let mut score = duration_points(video.duration_seconds);

    // The two category checks are independent
    if contains_any(&category, HIGH_LIKELIHOOD_CATEGORIES) {
        score += 3;
    }
    if contains_any(&category, LOW_LIKELIHOOD_CATEGORIES) {
        score -= 3;
    }

    if contains_any(&title, SPEECH_INDICATORS) {
        score += 2;
    }
    if contains_any(&title, NON_SPEECH_INDICATORS) {
        score -= 3;
    }

    if title.contains("live") || title.contains("stream") {
        score += 1;
    }
    if title.contains("cover") && category.contains("music") {
        score -= 2;
    }

    score
}

pub fn should_fetch(score: i32) -> bool {
    score >= FETCH_THRESHOLD
}
