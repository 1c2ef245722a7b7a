use std::sync::LazyLock;
use std::time::Duration;

use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::captions::{CaptionError, CaptionService};
use crate::{Cue, LanguageTrack};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const ORIGIN: &str = "https://www.youtube.com";

static API_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).unwrap());
static API_KEY_LEGACY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).unwrap());

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks", default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    name: Option<TrackName>,
    kind: Option<String>,
    #[serde(rename = "isTranslatable", default)]
    is_translatable: bool,
}

#[derive(Debug, Deserialize)]
struct TrackName {
    #[serde(rename = "simpleText")]
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl From<CaptionTrack> for LanguageTrack {
    fn from(t: CaptionTrack) -> Self {
        let language = t
            .name
            .and_then(|n| n.simple_text.or_else(|| n.runs.into_iter().next().map(|r| r.text)))
            .unwrap_or_else(|| t.language_code.clone());
        LanguageTrack {
            language,
            is_generated: t.kind.as_deref() == Some("asr"),
            is_translatable: t.is_translatable,
            language_code: t.language_code,
            base_url: t.base_url.replace("&fmt=srv3", ""),
        }
    }
}

/// Captions from YouTube's built-in tracks via the InnerTube API
pub struct YouTubeCaptions {
    client: reqwest::Client,
}

impl YouTubeCaptions {
    pub fn new(timeout: Duration) -> Result<Self, CaptionError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CaptionError::Other(format!("could not build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String, CaptionError> {
        let resp = self.client.get(url).send().await?;
        Ok(check_status(resp)?.text().await?)
    }
}

fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, CaptionError> {
    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(CaptionError::RateLimited(resp.url().to_string()));
    }
    if !status.is_success() {
        return Err(CaptionError::RequestFailed(format!("HTTP {status} from {}", resp.url())));
    }
    Ok(resp)
}

impl CaptionService for YouTubeCaptions {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<LanguageTrack>, CaptionError> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("{ORIGIN}/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");
        let page_html = self.get_text(&watch_url).await?;

        if page_html.contains("g-recaptcha") {
            return Err(CaptionError::RateLimited(format!("bot check served for {video_id}")));
        }
        let api_key = extract_api_key(&page_html)?;

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("{ORIGIN}/youtubei/v1/player?key={api_key}&prettyPrint=false");
        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": "en",
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id
        });

        let resp = self.client.post(&player_url).json(&body).send().await?;
        let text = check_status(resp)?.text().await?;
        let player: InnerTubePlayerResponse =
            serde_json::from_str(&text).map_err(|e| CaptionError::Other(format!("malformed player response: {e}")))?;

        tracks_from_player(video_id, player)
    }

    async fn fetch_cues(&self, video_id: &str, track: &LanguageTrack) -> Result<Vec<Cue>, CaptionError> {
        debug!("Fetching {} captions for {video_id}", track.language_code);
        let caption_xml = self.get_text(&track.base_url).await?;
        parse_caption_xml(&caption_xml)
    }

    async fn probe(&self) -> bool {
        match self.client.head(ORIGIN).send().await {
            Ok(resp) => !resp.status().is_server_error(),
            Err(e) => {
                debug!("Probe of {ORIGIN} failed: {e}");
                false
            }
        }
    }
}

fn tracks_from_player(video_id: &str, player: InnerTubePlayerResponse) -> Result<Vec<LanguageTrack>, CaptionError> {
    if let Some(ps) = player.playability_status.filter(|ps| ps.status != "OK") {
        return Err(CaptionError::VideoUnavailable {
            video_id: video_id.to_string(),
            reason: ps.reason.unwrap_or(ps.status),
        });
    }

    let renderer = player
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .ok_or_else(|| CaptionError::TranscriptsDisabled(video_id.to_string()))?;

    if renderer.caption_tracks.is_empty() {
        return Err(CaptionError::NoTranscriptFound(video_id.to_string()));
    }

    Ok(renderer.caption_tracks.into_iter().map(LanguageTrack::from).collect())
}

fn extract_api_key(html: &str) -> Result<String, CaptionError> {
    API_KEY
        .captures(html)
        .or_else(|| API_KEY_LEGACY.captures(html))
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| CaptionError::Other("could not extract InnerTube API key from watch page".to_string()))
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Cue>, CaptionError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut cues = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                // Final cues sometimes omit dur
                current_dur = dur.or(Some(0.0));
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(start), Some(dur)) = (current_start.take(), current_dur.take()) {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.is_empty() {
                        cues.push(Cue {
                            text,
                            start,
                            duration: dur,
                        });
                    }
                }
            }
            // An element with no text must not leave its timing behind
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                current_start = None;
                current_dur = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CaptionError::Other(format!("error parsing caption XML: {e}"))),
            _ => {}
        }
    }

    Ok(cues)
}
