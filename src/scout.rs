use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

use crate::captions::CaptionService;
use crate::language::{FALLBACK_NOTE, Pass, any_language_candidates, resolve_track};
use crate::retry::{RetryPolicy, with_retry};
use crate::{LanguageTrack, TranscriptRecord, VideoMetadata, extract_video_id, score};

/// Languages tried when the caller gives none
pub const DEFAULT_LANGUAGES: &[&str] = &["en", "en-US", "en-GB", "en-CA"];

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub enabled: bool,
    pub service_reachable: bool,
    pub timestamp: DateTime<Utc>,
}

/// Transcript acquisition façade.
///
/// Every operation returns a record or absence; failures are logged, never
/// raised. A scout built with [`TranscriptScout::disabled`] answers absence to
/// everything without touching the network.
pub struct TranscriptScout<S> {
    service: Option<S>,
    policy: RetryPolicy,
}

impl<S: CaptionService> TranscriptScout<S> {
    pub fn new(service: S, policy: RetryPolicy) -> Self {
        info!("Transcript scout initialized");
        Self {
            service: Some(service),
            policy,
        }
    }

    pub fn disabled(policy: RetryPolicy) -> Self {
        warn!("Transcript scout disabled: captioning service unavailable");
        Self { service: None, policy }
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    fn prepare(&self, video_input: &str) -> Option<(&S, String)> {
        let Some(service) = self.service.as_ref() else {
            warn!("Transcript service not available");
            return None;
        };
        if video_input.trim().is_empty() {
            warn!("Empty video ID provided");
            return None;
        }
        let Some(video_id) = extract_video_id(video_input) else {
            warn!("Invalid video ID format: {video_input}");
            return None;
        };
        Some((service, video_id))
    }

    async fn list(&self, service: &S, video_id: &str) -> Option<Vec<LanguageTrack>> {
        with_retry(&self.policy, video_id, "track listing", || service.list_tracks(video_id)).await
    }

    async fn fetch(&self, service: &S, video_id: &str, track: &LanguageTrack, note: Option<&str>) -> Option<TranscriptRecord> {
        let cues = with_retry(&self.policy, video_id, "cue fetch", || service.fetch_cues(video_id, track)).await?;
        if cues.is_empty() {
            warn!("Empty transcript data for video {video_id} ({})", track.language_code);
            return None;
        }

        let record = TranscriptRecord::new(video_id, track, &cues, note.map(str::to_string));
        info!(
            "Fetched transcript for video {video_id} (language: {}, {} words)",
            record.language(),
            record.word_count()
        );
        Some(record)
    }

    /// Fetch a transcript in the first available preferred language, falling
    /// back to generated and then any track
    pub async fn attempt_preferred(&self, video_input: &str, language_codes: Option<&[String]>) -> Option<TranscriptRecord> {
        let (service, video_id) = self.prepare(video_input)?;
        let languages: Vec<String> = match language_codes {
            Some(codes) if !codes.is_empty() => codes.to_vec(),
            _ => DEFAULT_LANGUAGES.iter().map(|c| c.to_string()).collect(),
        };

        info!("Attempting to fetch transcript for video {video_id}");
        let tracks = self.list(service, &video_id).await?;

        let Some(resolution) = resolve_track(&tracks, &languages) else {
            info!("No transcript available for video {video_id}: listing is empty");
            return None;
        };
        if resolution.pass == Pass::AnyTrack {
            info!(
                "Using fallback language '{}' for video {video_id}",
                resolution.track.language_code
            );
        }

        let note = resolution.is_fallback(&languages).then_some(FALLBACK_NOTE);
        self.fetch(service, &video_id, resolution.track, note).await
    }

    /// Fetch the first track that yields cues, generated tracks first
    pub async fn attempt_any_language(&self, video_input: &str) -> Option<TranscriptRecord> {
        let (service, video_id) = self.prepare(video_input)?;
        let tracks = self.list(service, &video_id).await?;

        for track in any_language_candidates(&tracks) {
            if let Some(record) = self.fetch(service, &video_id, track, Some(FALLBACK_NOTE)).await {
                return Some(record);
            }
            info!(
                "Track {} unusable for video {video_id}, trying next",
                track.language_code
            );
        }

        info!("No usable transcript in any language for video {video_id}");
        None
    }

    /// Available caption tracks for a video; empty on any failure
    pub async fn list_languages(&self, video_input: &str) -> Vec<LanguageTrack> {
        let Some((service, video_id)) = self.prepare(video_input) else {
            return Vec::new();
        };
        self.list(service, &video_id).await.unwrap_or_default()
    }

    pub fn score_potential(&self, video: &VideoMetadata) -> i32 {
        score::score_potential(video)
    }

    pub async fn health_check(&self) -> HealthStatus {
        let service_reachable = match &self.service {
            Some(service) => service.probe().await,
            None => false,
        };
        HealthStatus {
            enabled: self.is_enabled(),
            service_reachable,
            timestamp: Utc::now(),
        }
    }
}
