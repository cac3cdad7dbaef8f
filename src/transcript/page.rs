//! Direct watch-page strategy.
//!
//! Fetches the public watch page with a browser header set picked at random from a
//! configured pool and looks for caption-track references in the embedded player
//! response. This strategy is degraded: it can establish that captions exist but cannot
//! extract their text, so it never yields a transcript. Its value is the diagnostic it
//! leaves behind for failure classification.

use super::{Absent, FailureCause, StrategyResult, TranscriptStrategy};
use crate::config::PageSettings;
use crate::error::{LecternError, Result};
use crate::video_id::VideoId;
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use regex::Regex;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

static PLAYABILITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""playabilityStatus":\{"status":"([A-Z_]+)""#).expect("Invalid regex")
});

/// What the watch page says about captions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageInspection {
    /// The player response lists caption tracks.
    CaptionsReferenced { tracks: usize },
    /// The video is playable but has no caption tracks.
    NoCaptions,
    /// Playback requires sign-in or age verification.
    Restricted(String),
    /// The video cannot be played at all (removed, unavailable).
    Unplayable(String),
    /// The request was diverted to an anti-abuse interstitial.
    Blocked,
    /// No player response in the page (consent wall, error shell, truncated body).
    Unrecognized,
}

/// Fetches the watch page and inspects it for caption tracks.
pub struct DirectPageStrategy {
    client: reqwest::Client,
    base_url: Url,
    user_agents: Vec<String>,
    accept_language: String,
}

impl DirectPageStrategy {
    pub fn new(settings: &PageSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            LecternError::Config(format!("Invalid page.base_url {}: {}", settings.base_url, e))
        })?;

        if settings.user_agents.is_empty() {
            return Err(LecternError::Config("page.user_agents must not be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            user_agents: settings.user_agents.clone(),
            accept_language: settings.accept_language.clone(),
        })
    }

    /// Pick a user agent uniformly at random from the pool.
    fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or_default()
    }

    async fn fetch_page(&self, video_id: &VideoId) -> Result<(Url, String)> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("v", video_id.as_str());

        let user_agent = self.pick_user_agent().to_string();
        debug!("Fetching {} as {}", url, user_agent);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LecternError::UpstreamStatus {
                status: status.as_u16(),
                context: "watch page".to_string(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await?;
        Ok((final_url, body))
    }
}

#[async_trait]
impl TranscriptStrategy for DirectPageStrategy {
    fn name(&self) -> &'static str {
        "page"
    }

    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn fetch(&self, video_id: &VideoId) -> StrategyResult {
        let (final_url, html) = self.fetch_page(video_id).await.map_err(Absent::from)?;

        let inspection = if final_url.path().contains("/sorry/") {
            PageInspection::Blocked
        } else {
            inspect_page(&html)
        };

        Err(absent_for(inspection))
    }
}

/// Inspect watch-page HTML for playability and caption tracks.
pub fn inspect_page(html: &str) -> PageInspection {
    if html.contains("detected unusual traffic") {
        return PageInspection::Blocked;
    }

    let has_tracks = html.contains("\"captionTracks\":");

    let Some(caps) = PLAYABILITY_PATTERN.captures(html) else {
        return if has_tracks {
            PageInspection::CaptionsReferenced {
                tracks: count_tracks(html),
            }
        } else {
            PageInspection::Unrecognized
        };
    };

    let status = caps[1].to_string();
    match status.as_str() {
        "OK" if has_tracks => PageInspection::CaptionsReferenced {
            tracks: count_tracks(html),
        },
        // Only a playable player response without tracks proves the video has none.
        "OK" => PageInspection::NoCaptions,
        "LOGIN_REQUIRED" | "AGE_VERIFICATION_REQUIRED" | "CONTENT_CHECK_REQUIRED" => {
            PageInspection::Restricted(status)
        }
        _ => PageInspection::Unplayable(status),
    }
}

fn count_tracks(html: &str) -> usize {
    html.matches("\"vssId\":").count().max(1)
}

/// Every inspection ends the strategy without a transcript; the cause records why.
fn absent_for(inspection: PageInspection) -> Absent {
    match inspection {
        PageInspection::CaptionsReferenced { tracks } => {
            info!("Watch page references {} caption track(s) but their text is not extractable", tracks);
            Absent::new(format!(
                "Captions exist ({} track(s)) but could not be extracted from the watch page",
                tracks
            ))
        }
        PageInspection::NoCaptions => {
            Absent::with_cause(FailureCause::NoCaptions, "Watch page lists no caption tracks")
        }
        PageInspection::Restricted(status) => Absent::with_cause(
            FailureCause::AccessRestricted,
            format!("Playback restricted ({})", status),
        ),
        PageInspection::Unplayable(status) => Absent::new(format!("Video unplayable ({})", status)),
        PageInspection::Blocked => Absent::with_cause(
            FailureCause::RateLimited,
            "Watch page request was diverted to an anti-abuse check",
        ),
        PageInspection::Unrecognized => Absent::new("Watch page carried no player response"),
    }
}
