//! Transcript acquisition for Lectern.
//!
//! A transcript is obtained by walking an ordered chain of strategies, each of which
//! knows one way of getting caption text for a video. The first strategy that yields a
//! non-empty transcript wins; a strategy that cannot produce one reports [`Absent`]
//! and the [`TranscriptResolver`] moves on to the next.
//!
//! # Strategies
//!
//! - **caption_api**: the public timed-text endpoint, English track first, then ASR.
//! - **yt_dlp**: enumerates caption tracks with yt-dlp and converts the WebVTT file.
//! - **page**: fetches the watch page with a rotated browser header set. Degraded: it
//!   can only tell whether captions exist, never return their text.

mod caption_api;
mod normalize;
mod pacing;
mod page;
mod resolver;
mod yt_dlp;

pub use caption_api::CaptionApiStrategy;
pub use normalize::{decode_entities, normalize_cues};
pub use pacing::RateLimiter;
pub use page::{inspect_page, DirectPageStrategy, PageInspection};
pub use resolver::TranscriptResolver;
pub use yt_dlp::{parse_vtt, select_track, CaptionTrack, YtDlpStrategy};

use crate::error::LecternError;
use crate::video_id::VideoId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A normalized, non-empty transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript(String);

impl Transcript {
    /// Build a transcript from raw cues using the standard normalization.
    ///
    /// Returns `None` when every cue is blank.
    pub fn from_cues<I, S>(cues: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(normalize_cues(cues))
    }

    /// Wrap already-normalized text. Returns `None` for blank text.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

impl std::fmt::Display for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why no strategy could produce a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// The video has no caption tracks.
    NoCaptions,
    /// The video is private, age-restricted or otherwise gated.
    AccessRestricted,
    /// The upstream source is throttling requests.
    RateLimited,
    /// No specific cause could be distinguished.
    Unavailable,
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::NoCaptions => {
                write!(f, "Unable to fetch transcript: this video has no captions available.")
            }
            FailureCause::AccessRestricted => write!(
                f,
                "Unable to fetch transcript: this video is private or age-restricted."
            ),
            FailureCause::RateLimited => write!(
                f,
                "Unable to fetch transcript: YouTube is temporarily rate limiting requests. Please try again later."
            ),
            FailureCause::Unavailable => write!(
                f,
                "Unable to fetch transcript. This may be because:\n\
                 - The video doesn't have captions available\n\
                 - The video is private or age-restricted\n\
                 - YouTube is temporarily blocking requests (try again later)"
            ),
        }
    }
}

/// Final result of resolving a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Success {
        transcript: Transcript,
        /// Name of the strategy that produced the transcript.
        strategy: &'static str,
    },
    Failure(FailureCause),
}

impl ResolutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionOutcome::Success { .. })
    }

    /// Convert into a library result, mapping failures to [`LecternError::TranscriptUnavailable`].
    pub fn into_result(self) -> crate::error::Result<(Transcript, &'static str)> {
        match self {
            ResolutionOutcome::Success {
                transcript,
                strategy,
            } => Ok((transcript, strategy)),
            ResolutionOutcome::Failure(cause) => Err(LecternError::TranscriptUnavailable(cause)),
        }
    }
}

/// A strategy could not produce a transcript.
///
/// `cause` carries a classified signal when the strategy observed one, for example an
/// HTTP 429 or a login-required playability status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Absent {
    pub cause: Option<FailureCause>,
    pub reason: String,
}

impl Absent {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            cause: None,
            reason: reason.into(),
        }
    }

    pub fn with_cause(cause: FailureCause, reason: impl Into<String>) -> Self {
        Self {
            cause: Some(cause),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Absent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

impl From<LecternError> for Absent {
    fn from(err: LecternError) -> Self {
        let cause = match &err {
            LecternError::TranscriptUnavailable(cause) => Some(*cause),
            LecternError::UpstreamStatus { status, .. } => cause_for_status(*status),
            LecternError::Http(e) => e.status().and_then(|s| cause_for_status(s.as_u16())),
            _ => None,
        };

        Self {
            cause,
            reason: err.to_string(),
        }
    }
}

/// Map an upstream HTTP status to a failure cause.
pub(crate) fn cause_for_status(status: u16) -> Option<FailureCause> {
    match status {
        429 => Some(FailureCause::RateLimited),
        401 | 403 => Some(FailureCause::AccessRestricted),
        404 => Some(FailureCause::NoCaptions),
        _ => None,
    }
}

/// Outcome of a single strategy attempt.
pub type StrategyResult = std::result::Result<Transcript, Absent>;

/// One self-contained way of obtaining transcript text.
///
/// Implementations must not panic and must bound every network call or subprocess
/// with a timeout. All failures are reported as [`Absent`].
#[async_trait]
pub trait TranscriptStrategy: Send + Sync {
    /// Short identifier used in logs and responses.
    fn name(&self) -> &'static str;

    /// Try to fetch a transcript for the video.
    async fn fetch(&self, video_id: &VideoId) -> StrategyResult;
}

/// The built-in strategy kinds, used to configure the fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    CaptionApi,
    YtDlp,
    Page,
}

impl StrategyKind {
    /// Default fallback order.
    pub const DEFAULT_ORDER: [StrategyKind; 3] =
        [StrategyKind::CaptionApi, StrategyKind::YtDlp, StrategyKind::Page];
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "caption_api" | "api" => Ok(StrategyKind::CaptionApi),
            "yt_dlp" | "ytdlp" => Ok(StrategyKind::YtDlp),
            "page" | "direct" => Ok(StrategyKind::Page),
            _ => Err(format!("Unknown transcript strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::CaptionApi => write!(f, "caption_api"),
            StrategyKind::YtDlp => write!(f, "yt_dlp"),
            StrategyKind::Page => write!(f, "page"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_rejects_blank() {
        assert!(Transcript::new("   ").is_none());
        assert!(Transcript::from_cues(["", "  ", "\n"]).is_none());
        assert_eq!(
            Transcript::from_cues(["hello", "world!"]).unwrap().as_str(),
            "hello. world!"
        );
    }

    #[test]
    fn test_absent_from_status_error() {
        let absent = Absent::from(LecternError::UpstreamStatus {
            status: 429,
            context: "timedtext".to_string(),
        });
        assert_eq!(absent.cause, Some(FailureCause::RateLimited));

        let absent = Absent::from(LecternError::UpstreamStatus {
            status: 500,
            context: "timedtext".to_string(),
        });
        assert_eq!(absent.cause, None);

        let absent = Absent::from(LecternError::ToolNotFound("yt-dlp".to_string()));
        assert_eq!(absent.cause, None);
        assert!(absent.reason.contains("yt-dlp"));
    }

    #[test]
    fn test_unavailable_message_lists_causes() {
        let message = FailureCause::Unavailable.to_string();
        assert!(message.contains("captions"));
        assert!(message.contains("private or age-restricted"));
        assert!(message.contains("blocking requests"));
    }

    #[test]
    fn test_outcome_into_result() {
        let outcome = ResolutionOutcome::Failure(FailureCause::NoCaptions);
        match outcome.into_result() {
            Err(LecternError::TranscriptUnavailable(FailureCause::NoCaptions)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_strategy_kind_parse() {
        assert_eq!("caption_api".parse::<StrategyKind>().unwrap(), StrategyKind::CaptionApi);
        assert_eq!("yt-dlp".parse::<StrategyKind>().unwrap(), StrategyKind::YtDlp);
        assert_eq!("PAGE".parse::<StrategyKind>().unwrap(), StrategyKind::Page);
        assert!("whisper".parse::<StrategyKind>().is_err());
        assert_eq!(StrategyKind::YtDlp.to_string(), "yt_dlp");
    }
}
