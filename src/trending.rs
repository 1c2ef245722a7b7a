use eyre::{Result, bail};
use log::{debug, info, warn};
use serde::Deserialize;

use crate::VideoMetadata;
use crate::captions::ErrorClass;
use crate::retry::RetryPolicy;

const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

const MAX_DESCRIPTION_CHARS: usize = 1000;
const MAX_TAGS: usize = 10;

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
    #[serde(rename = "contentDetails", default)]
    content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    title: String,
    description: String,
    channel_title: String,
    channel_id: String,
    published_at: String,
    category_id: String,
    tags: Vec<String>,
}

// The Data API encodes counts as strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentDetails {
    duration: String,
}

/// Client for the YouTube Data API "most popular" chart
pub struct TrendingClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    policy: RetryPolicy,
}

impl TrendingClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: VIDEOS_URL.to_string(),
            policy,
        }
    }

    /// Fetch up to `max_results` (clamped to 1..=50) trending videos
    pub async fn fetch_trending(&self, region: &str, category_id: &str, max_results: u32) -> Result<Vec<VideoMetadata>> {
        let max_results = max_results.clamp(1, 50);
        info!("Fetching {max_results} trending videos for region {region}");

        let max_attempts = self.policy.max_attempts.max(1);
        for attempt in 0..max_attempts {
            match self.request(region, category_id, max_results).await {
                Ok(videos) => {
                    info!("Fetched {} trending videos", videos.len());
                    return Ok(videos);
                }
                Err(FetchError::Fatal(e)) => return Err(e),
                Err(FetchError::Retryable(class, e)) => {
                    if attempt + 1 >= max_attempts {
                        return Err(e.wrap_err(format!("trending fetch failed after {max_attempts} attempts")));
                    }
                    let delay = self.policy.delay_for(attempt, class);
                    warn!(
                        "Trending fetch failed (attempt {}/{max_attempts}): {e}, retrying in {delay:?}",
                        attempt + 1
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
        bail!("trending fetch made no attempts")
    }

    async fn request(&self, region: &str, category_id: &str, max_results: u32) -> Result<Vec<VideoMetadata>, FetchError> {
        let max_results = max_results.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("part", "id,snippet,statistics,contentDetails"),
                ("chart", "mostPopular"),
                ("regionCode", region),
                ("maxResults", max_results.as_str()),
                ("videoCategoryId", category_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Retryable(ErrorClass::Transient, e.into()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let list: VideoListResponse = resp.json().await.map_err(|e| FetchError::Retryable(ErrorClass::Transient, e.into()))?;
        Ok(list.items.into_iter().filter_map(into_metadata).collect())
    }
}

enum FetchError {
    Fatal(eyre::Report),
    Retryable(ErrorClass, eyre::Report),
}

fn classify_failure(status: reqwest::StatusCode, body: &str) -> FetchError {
    if status == reqwest::StatusCode::FORBIDDEN {
        if body.contains("quotaExceeded") || body.contains("dailyLimitExceeded") {
            return FetchError::Fatal(eyre::eyre!("YouTube API quota exceeded, try again tomorrow"));
        }
        if body.contains("keyInvalid") {
            return FetchError::Fatal(eyre::eyre!("invalid YouTube API key"));
        }
    }
    let class = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        ErrorClass::RateLimited
    } else {
        ErrorClass::Transient
    };
    FetchError::Retryable(class, eyre::eyre!("YouTube Data API returned {status}: {body}"))
}

fn into_metadata(item: VideoItem) -> Option<VideoMetadata> {
    let snippet = item.snippet;
    if snippet.title.is_empty() || snippet.title == "Private video" {
        debug!("Skipping private or deleted video {}", item.id);
        return None;
    }

    let count = |v: &Option<String>| -> u64 { v.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0) };
    let duration_seconds = parse_iso8601_duration(&item.content_details.duration);

    Some(VideoMetadata {
        url: format!("https://www.youtube.com/watch?v={}", item.id),
        title: snippet.title,
        description: snippet.description.chars().take(MAX_DESCRIPTION_CHARS).collect(),
        channel_title: snippet.channel_title,
        channel_id: snippet.channel_id,
        published_at: snippet.published_at,
        duration: item.content_details.duration,
        duration_seconds,
        view_count: count(&item.statistics.view_count),
        like_count: count(&item.statistics.like_count),
        comment_count: count(&item.statistics.comment_count),
        category_name: category_name(&snippet.category_id).to_string(),
        category_id: snippet.category_id,
        tags: snippet.tags.into_iter().take(MAX_TAGS).collect(),
        video_id: item.id,
        transcript: None,
    })
}

/// Parse a `PT#H#M#S` duration into seconds; malformed or out-of-range input yields 0
pub fn parse_iso8601_duration(duration: &str) -> u64 {
    let Some(rest) = duration.strip_prefix("PT") else {
        return 0;
    };

    let mut total = 0u64;
    let mut digits = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let Ok(n) = digits.parse::<u64>() else {
            return 0;
        };
        digits.clear();
        let unit = match c {
            'H' => 3600,
            'M' => 60,
            'S' => 1,
            _ => return 0,
        };
        let Some(sum) = n.checked_mul(unit).and_then(|secs| total.checked_add(secs)) else {
            return 0;
        };
        total = sum;
    }

    if digits.is_empty() { total } else { 0 }
}

/// Human-readable name for a YouTube category ID
pub fn category_name(category_id: &str) -> &'static str {
    match category_id {
        "1" => "Film & Animation",
        "2" => "Autos & Vehicles",
        "10" => "Music",
        "15" => "Pets & Animals",
        "17" => "Sports",
        "19" => "Travel & Events",
        "20" => "Gaming",
        "22" => "People & Blogs",
        "23" => "Comedy",
        "24" => "Entertainment",
        "25" => "News & Politics",
        "26" => "Howto & Style",
        "27" => "Education",
        "28" => "Science & Technology",
        _ => "Other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_iso8601_duration("PT4M13S"), 253);
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), 3723);
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
        assert_eq!(parse_iso8601_duration("PT2H"), 7200);
        assert_eq!(parse_iso8601_duration("PT10M"), 600);
    }

    #[test]
    fn test_parse_duration_malformed() {
        assert_eq!(parse_iso8601_duration(""), 0);
        assert_eq!(parse_iso8601_duration("P1D"), 0);
        assert_eq!(parse_iso8601_duration("PTxS"), 0);
        assert_eq!(parse_iso8601_duration("PT12"), 0);
    }

    #[test]
    fn test_parse_duration_overflow_is_zero() {
        assert_eq!(parse_iso8601_duration("PT99999999999999999H"), 0);
        assert_eq!(parse_iso8601_duration(&format!("PT{}S1S", u64::MAX)), 0);
        assert_eq!(parse_iso8601_duration("PT99999999999999999999S"), 0);
    }

    #[test]
    fn test_category_name() {
        assert_eq!(category_name("10"), "Music");
        assert_eq!(category_name("27"), "Education");
        assert_eq!(category_name("999"), "Other");
        assert_eq!(category_name(""), "Other");
    }

    #[test]
    fn test_into_metadata() {
        let description = "x".repeat(1500);
        let tags: Vec<String> = (0..15).map(|i| format!("tag{i}")).collect();
        let json = serde_json::json!({
            "id": "dQw4w9WgXcQ",
            "snippet": {
                "title": "Never Gonna Give You Up",
                "description": description,
                "channelTitle": "Rick Astley",
                "channelId": "UCuAXFkgsw1L7xaCfnd5JJOw",
                "publishedAt": "2009-10-25T06:57:33Z",
                "categoryId": "10",
                "tags": tags
            },
            "statistics": {"viewCount": "1500000000", "likeCount": "17000000"},
            "contentDetails": {"duration": "PT3M33S"}
        });
        let item: VideoItem = serde_json::from_value(json).unwrap();
        let video = into_metadata(item).unwrap();
        assert_eq!(video.video_id, "dQw4w9WgXcQ");
        assert_eq!(video.duration_seconds, 213);
        assert_eq!(video.category_name, "Music");
        assert_eq!(video.view_count, 1_500_000_000);
        assert_eq!(video.comment_count, 0);
        assert_eq!(video.description.chars().count(), 1000);
        assert_eq!(video.tags.len(), 10);
        assert_eq!(video.url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_into_metadata_skips_private() {
        let item: VideoItem = serde_json::from_value(serde_json::json!({
            "id": "dQw4w9WgXcQ",
            "snippet": {"title": "Private video"}
        }))
        .unwrap();
        assert!(into_metadata(item).is_none());

        let item: VideoItem = serde_json::from_value(serde_json::json!({"id": "dQw4w9WgXcQ"})).unwrap();
        assert!(into_metadata(item).is_none());
    }

    #[test]
    fn test_classify_failure() {
        let forbidden = reqwest::StatusCode::FORBIDDEN;
        assert!(matches!(
            classify_failure(forbidden, r#"{"reason":"quotaExceeded"}"#),
            FetchError::Fatal(_)
        ));
        assert!(matches!(classify_failure(forbidden, "keyInvalid"), FetchError::Fatal(_)));
        assert!(matches!(
            classify_failure(forbidden, "other"),
            FetchError::Retryable(ErrorClass::Transient, _)
        ));
        assert!(matches!(
            classify_failure(reqwest::StatusCode::INTERNAL_SERVER_ERROR, ""),
            FetchError::Retryable(ErrorClass::Transient, _)
        ));
        assert!(matches!(
            classify_failure(reqwest::StatusCode::TOO_MANY_REQUESTS, ""),
            FetchError::Retryable(ErrorClass::RateLimited, _)
        ));
    }

    #[tokio::test]
    async fn test_fetch_trending_honors_policy_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: std::time::Duration::ZERO,
            rate_limit_multiplier: 1,
        };
        // Nothing listens on the discard port, so every attempt fails to connect
        let client = TrendingClient {
            endpoint: "http://127.0.0.1:9/youtube/v3/videos".to_string(),
            ..TrendingClient::new(reqwest::Client::new(), "test-key", policy)
        };
        let err = client.fetch_trending("US", "0", 5).await.unwrap_err();
        assert_eq!(err.to_string(), "trending fetch failed after 2 attempts");
    }
}
