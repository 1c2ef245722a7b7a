use std::path::Path;

use chrono::{DateTime, Utc};
use eyre::Result;
use log::info;
use serde::Serialize;

use crate::VideoMetadata;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_videos_analyzed: usize,
    pub videos_with_transcripts: usize,
    pub videos_skipped_by_score: usize,
}

/// The JSON artifact of one run
#[derive(Debug, Clone, Serialize)]
pub struct DailyBrief {
    pub timestamp: DateTime<Utc>,
    pub date: String,
    pub summary: RunSummary,
    pub trending_videos: Vec<VideoMetadata>,
    pub videos_with_transcripts: Vec<VideoMetadata>,
}

impl DailyBrief {
    pub fn new(videos: Vec<VideoMetadata>, skipped_by_score: usize) -> Self {
        let timestamp = Utc::now();
        let with_transcripts: Vec<VideoMetadata> = videos.iter().filter(|v| v.transcript.is_some()).cloned().collect();
        Self {
            timestamp,
            date: timestamp.format("%Y-%m-%d").to_string(),
            summary: RunSummary {
                total_videos_analyzed: videos.len(),
                videos_with_transcripts: with_transcripts.len(),
                videos_skipped_by_score: skipped_by_score,
            },
            trending_videos: videos,
            videos_with_transcripts: with_transcripts,
        }
    }

    pub fn render(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render()?)?;
        info!("Saved daily brief to {}", path.display());
        Ok(())
    }
}
