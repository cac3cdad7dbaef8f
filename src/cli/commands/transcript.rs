//! Transcript command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{emit, Output};
use crate::config::Settings;
use crate::transcript::TranscriptResolver;
use crate::video_id::VideoId;
use anyhow::Result;

/// Run the transcript command.
pub async fn run_transcript(url: &str, output: Option<&str>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Transcript)?;

    let Some(video_id) = VideoId::from_url(url) else {
        Output::error("Invalid YouTube URL.");
        anyhow::bail!("Could not extract a video ID from {}", url);
    };

    let resolver = TranscriptResolver::from_settings(&settings)?;
    let spinner = Output::spinner(&format!("Fetching transcript for {}...", video_id));

    let result = resolver.resolve(&video_id).await.into_result();
    spinner.finish_and_clear();

    match result {
        Ok((transcript, strategy)) => {
            Output::info(&format!(
                "{} words via {}",
                transcript.word_count(),
                strategy
            ));
            emit(transcript.as_str(), output)?;
            Ok(())
        }
        Err(e) => {
            Output::error(&e.to_string());
            Err(e.into())
        }
    }
}
