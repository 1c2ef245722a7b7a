use thiserror::Error;

use crate::{Cue, LanguageTrack};

/// Failures reported by a captioning service
#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("no transcript found for video {0}")]
    NoTranscriptFound(String),

    #[error("video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("rate limited while fetching {0}")]
    RateLimited(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("{0}")]
    Other(String),
}

/// How the retry layer treats a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Captions disabled or absent; permanent
    NoCaptions,
    /// Video removed, private or blocked; permanent
    Unavailable,
    /// Retry with the longer rate-limit backoff
    RateLimited,
    /// Retry with the standard backoff
    Transient,
}

impl CaptionError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CaptionError::TranscriptsDisabled(_) | CaptionError::NoTranscriptFound(_) => ErrorClass::NoCaptions,
            CaptionError::VideoUnavailable { .. } => ErrorClass::Unavailable,
            CaptionError::RateLimited(_) => ErrorClass::RateLimited,
            CaptionError::RequestFailed(_) | CaptionError::Other(_) => ErrorClass::Transient,
        }
    }
}

impl From<reqwest::Error> for CaptionError {
    fn from(e: reqwest::Error) -> Self {
        if e.status().is_some_and(|s| s == reqwest::StatusCode::TOO_MANY_REQUESTS) {
            CaptionError::RateLimited(e.to_string())
        } else {
            CaptionError::RequestFailed(e.to_string())
        }
    }
}

/// The captioning service boundary: listing tracks and fetching cues
#[allow(async_fn_in_trait)]
pub trait CaptionService {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<LanguageTrack>, CaptionError>;

    async fn fetch_cues(&self, video_id: &str, track: &LanguageTrack) -> Result<Vec<Cue>, CaptionError>;

    /// Whether the service answers at all
    async fn probe(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_classes() {
        assert_eq!(
            CaptionError::TranscriptsDisabled("x".into()).class(),
            ErrorClass::NoCaptions
        );
        assert_eq!(CaptionError::NoTranscriptFound("x".into()).class(), ErrorClass::NoCaptions);
        assert_eq!(
            CaptionError::VideoUnavailable {
                video_id: "x".into(),
                reason: "private".into()
            }
            .class(),
            ErrorClass::Unavailable
        );
    }

    #[test]
    fn test_transient_classes() {
        assert_eq!(CaptionError::RateLimited("x".into()).class(), ErrorClass::RateLimited);
        assert_eq!(CaptionError::RequestFailed("x".into()).class(), ErrorClass::Transient);
        assert_eq!(CaptionError::Other("x".into()).class(), ErrorClass::Transient);
    }

    #[test]
    fn test_error_messages() {
        let e = CaptionError::VideoUnavailable {
            video_id: "dQw4w9WgXcQ".into(),
            reason: "This video is private".into(),
        };
        assert_eq!(e.to_string(), "video dQw4w9WgXcQ is unavailable: This video is private");
    }
}
