//! Ordered strategy fallback with pacing.

use super::{
    CaptionApiStrategy, DirectPageStrategy, FailureCause, RateLimiter, ResolutionOutcome,
    StrategyKind, TranscriptStrategy, YtDlpStrategy,
};
use crate::config::Settings;
use crate::error::Result;
use crate::video_id::VideoId;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Tries transcript strategies in priority order until one succeeds.
pub struct TranscriptResolver {
    strategies: Vec<Box<dyn TranscriptStrategy>>,
    limiter: Arc<RateLimiter>,
}

impl TranscriptResolver {
    /// Create a resolver over the given strategies, in priority order.
    pub fn new(strategies: Vec<Box<dyn TranscriptStrategy>>, limiter: Arc<RateLimiter>) -> Self {
        Self { strategies, limiter }
    }

    /// Build the strategy chain described by the settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let language = settings.resolver.language.as_str();

        let mut strategies: Vec<Box<dyn TranscriptStrategy>> = Vec::new();
        for kind in &settings.resolver.strategies {
            let strategy: Box<dyn TranscriptStrategy> = match kind {
                StrategyKind::CaptionApi => {
                    Box::new(CaptionApiStrategy::new(&settings.caption_api, language)?)
                }
                StrategyKind::YtDlp => Box::new(YtDlpStrategy::new(
                    &settings.yt_dlp,
                    language,
                    settings.temp_dir(),
                )),
                StrategyKind::Page => Box::new(DirectPageStrategy::new(&settings.page)?),
            };
            strategies.push(strategy);
        }

        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(
            settings.resolver.min_interval_ms,
        )));

        info!(
            "Transcript strategies: {}",
            settings
                .resolver
                .strategies
                .iter()
                .map(|k| k.to_string())
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        Ok(Self::new(strategies, limiter))
    }

    /// Names of the configured strategies, in order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve a transcript for the video.
    ///
    /// Waits for the pacing interval, then walks the strategies until one yields a
    /// non-empty transcript. When all are absent, the failure cause is the most recent
    /// classified signal, or [`FailureCause::Unavailable`] if none was seen.
    #[instrument(skip(self), fields(video_id = %video_id))]
    pub async fn resolve(&self, video_id: &VideoId) -> ResolutionOutcome {
        self.limiter.wait_if_needed().await;

        let mut cause = None;

        for strategy in &self.strategies {
            debug!("Trying strategy {}", strategy.name());

            match strategy.fetch(video_id).await {
                Ok(transcript) if !transcript.as_str().trim().is_empty() => {
                    info!(
                        "Transcript resolved by {} ({} words)",
                        strategy.name(),
                        transcript.word_count()
                    );
                    return ResolutionOutcome::Success {
                        transcript,
                        strategy: strategy.name(),
                    };
                }
                Ok(_) => debug!("Strategy {} returned an empty transcript", strategy.name()),
                Err(absent) => {
                    warn!("Strategy {} found nothing: {}", strategy.name(), absent);
                    cause = absent.cause.or(cause);
                }
            }
        }

        let cause = cause.unwrap_or(FailureCause::Unavailable);
        warn!("All transcript strategies exhausted ({:?})", cause);
        ResolutionOutcome::Failure(cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockStrategy;
    use crate::transcript::Absent;
    use std::sync::atomic::Ordering;

    fn video_id() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    fn resolver(strategies: Vec<Box<dyn TranscriptStrategy>>) -> TranscriptResolver {
        TranscriptResolver::new(strategies, Arc::new(RateLimiter::new(Duration::ZERO)))
    }

    #[tokio::test]
    async fn test_falls_back_in_order() {
        let first = MockStrategy::absent("first", Absent::new("network down"));
        let second = MockStrategy::found("second", &["hello", "world!", "  ", "done"]);
        let third = MockStrategy::found("third", &["never used"]);
        let (first_calls, second_calls, third_calls) = (first.calls(), second.calls(), third.calls());

        let resolver = resolver(vec![Box::new(first), Box::new(second), Box::new(third)]);

        match resolver.resolve(&video_id()).await {
            ResolutionOutcome::Success { transcript, strategy } => {
                assert_eq!(transcript.as_str(), "hello. world! done.");
                assert_eq!(strategy, "second");
            }
            other => panic!("expected success, got {:?}", other),
        }

        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_transcript_continues_to_next() {
        let blank = MockStrategy::found("blank", &["", "   "]);
        let good = MockStrategy::found("good", &["content"]);
        let resolver = resolver(vec![Box::new(blank), Box::new(good)]);

        let (transcript, strategy) = resolver.resolve(&video_id()).await.into_result().unwrap();
        assert_eq!(transcript.as_str(), "content.");
        assert_eq!(strategy, "good");
    }

    #[tokio::test]
    async fn test_exhaustion_is_failure() {
        let resolver = resolver(vec![
            Box::new(MockStrategy::absent("a", Absent::new("nothing"))),
            Box::new(MockStrategy::found("b", &[" "])),
        ]);

        assert_eq!(
            resolver.resolve(&video_id()).await,
            ResolutionOutcome::Failure(FailureCause::Unavailable)
        );
    }

    #[tokio::test]
    async fn test_failure_uses_latest_classified_cause() {
        let resolver = resolver(vec![
            Box::new(MockStrategy::absent(
                "a",
                Absent::with_cause(FailureCause::NoCaptions, "no track"),
            )),
            Box::new(MockStrategy::absent(
                "b",
                Absent::with_cause(FailureCause::RateLimited, "429"),
            )),
            Box::new(MockStrategy::absent("c", Absent::new("captions exist"))),
        ]);

        assert_eq!(
            resolver.resolve(&video_id()).await,
            ResolutionOutcome::Failure(FailureCause::RateLimited)
        );
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let resolver = resolver(vec![Box::new(MockStrategy::found(
            "fixed",
            &["same text", "every time?"],
        ))]);

        let first = resolver.resolve(&video_id()).await;
        let second = resolver.resolve(&video_id()).await;
        assert_eq!(first, second);
        assert!(first.is_success());
    }

    #[tokio::test]
    async fn test_resolve_is_paced() {
        let resolver = TranscriptResolver::new(
            vec![Box::new(MockStrategy::absent("a", Absent::new("nothing")))],
            Arc::new(RateLimiter::new(Duration::from_millis(200))),
        );

        resolver.resolve(&video_id()).await;
        let start = std::time::Instant::now();
        resolver.resolve(&video_id()).await;
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn test_from_settings_order() {
        let mut settings = Settings::default();
        settings.resolver.strategies = vec![StrategyKind::Page, StrategyKind::CaptionApi];

        let resolver = TranscriptResolver::from_settings(&settings).unwrap();
        assert_eq!(resolver.strategy_names(), vec!["page", "caption_api"]);
    }
}
