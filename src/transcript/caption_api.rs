//! Timed-text caption API strategy.

use super::{Absent, FailureCause, StrategyResult, Transcript, TranscriptStrategy};
use crate::config::CaptionApiSettings;
use crate::error::{LecternError, Result};
use crate::transcript::decode_entities;
use crate::video_id::VideoId;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Fetches captions from the public timed-text endpoint.
///
/// Asks for the manually uploaded track in the preferred language first, then for the
/// auto-generated (ASR) track.
pub struct CaptionApiStrategy {
    client: reqwest::Client,
    base_url: Url,
    language: String,
}

/// json3 timed-text payload.
#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

impl CaptionApiStrategy {
    pub fn new(settings: &CaptionApiSettings, language: &str) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            LecternError::Config(format!("Invalid caption_api.base_url {}: {}", settings.base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            language: language.to_string(),
        })
    }

    /// Build the request URL for a track. `kind` is `Some("asr")` for auto-generated captions.
    fn track_url(&self, video_id: &VideoId, kind: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("v", video_id.as_str())
                .append_pair("lang", &self.language)
                .append_pair("fmt", "json3");
            if let Some(kind) = kind {
                query.append_pair("kind", kind);
            }
        }
        url
    }

    /// Fetch one track. `Ok(None)` means the track does not exist or is empty.
    async fn fetch_track(&self, video_id: &VideoId, kind: Option<&str>) -> Result<Option<Transcript>> {
        let url = self.track_url(video_id, kind);
        debug!("Requesting {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LecternError::UpstreamStatus {
                status: status.as_u16(),
                context: "timed-text caption API".to_string(),
            });
        }

        let body = response.text().await?;
        // A missing track comes back as 200 with an empty body.
        if body.trim().is_empty() {
            return Ok(None);
        }

        let cues = parse_json3(&body)?;
        Ok(Transcript::from_cues(cues))
    }
}

#[async_trait]
impl TranscriptStrategy for CaptionApiStrategy {
    fn name(&self) -> &'static str {
        "caption_api"
    }

    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn fetch(&self, video_id: &VideoId) -> StrategyResult {
        for kind in [None, Some("asr")] {
            match self.fetch_track(video_id, kind).await {
                Ok(Some(transcript)) => {
                    info!(
                        "Fetched {} caption track ({} words)",
                        kind.unwrap_or("manual"),
                        transcript.word_count()
                    );
                    return Ok(transcript);
                }
                Ok(None) => debug!("No {} track for language {}", kind.unwrap_or("manual"), self.language),
                Err(e) => {
                    let absent = Absent::from(e);
                    // A missing track is worth another request; throttling or gating is not.
                    if absent.cause != Some(FailureCause::NoCaptions) {
                        return Err(absent);
                    }
                    debug!("{} track unavailable: {}", kind.unwrap_or("manual"), absent);
                }
            }
        }

        Err(Absent::with_cause(
            FailureCause::NoCaptions,
            format!("No {} caption track available", self.language),
        ))
    }
}

/// Extract cue texts from a json3 timed-text document.
fn parse_json3(body: &str) -> Result<Vec<String>> {
    let timed_text: TimedText = serde_json::from_str(body)?;

    Ok(timed_text
        .events
        .into_iter()
        .map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            decode_entities(&text)
        })
        .collect())
}
