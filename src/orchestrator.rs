//! Pipeline orchestrator for Lectern.
//!
//! Coordinates URL parsing, transcript resolution and note generation.

use crate::config::{Prompts, Settings};
use crate::error::{LecternError, Result};
use crate::notes::{NoteGenerator, NoteStyle, OpenAiNoteGenerator};
use crate::transcript::{Transcript, TranscriptResolver};
use crate::video_id::VideoId;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the Lectern pipeline.
pub struct Orchestrator {
    resolver: TranscriptResolver,
    generator: Arc<dyn NoteGenerator>,
    default_style: NoteStyle,
}

impl Orchestrator {
    /// Create an orchestrator from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
        let resolver = TranscriptResolver::from_settings(settings)?;
        let generator = Arc::new(OpenAiNoteGenerator::new(&settings.notes, prompts.notes)?);

        Ok(Self::with_components(
            resolver,
            generator,
            NoteStyle::parse_lenient(&settings.notes.style),
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        resolver: TranscriptResolver,
        generator: Arc<dyn NoteGenerator>,
        default_style: NoteStyle,
    ) -> Self {
        Self {
            resolver,
            generator,
            default_style,
        }
    }

    pub fn resolver(&self) -> &TranscriptResolver {
        &self.resolver
    }

    /// Style used when a request does not name one.
    pub fn default_style(&self) -> NoteStyle {
        self.default_style
    }

    /// Resolve the transcript for a YouTube URL.
    #[instrument(skip(self))]
    pub async fn fetch_transcript(&self, url: &str) -> Result<ResolvedTranscript> {
        let video_id = VideoId::from_url(url)
            .ok_or_else(|| LecternError::InvalidUrl(url.to_string()))?;

        info!("Resolving transcript for {}", video_id);
        let (transcript, strategy) = self.resolver.resolve(&video_id).await.into_result()?;

        Ok(ResolvedTranscript {
            video_id,
            transcript,
            strategy,
        })
    }

    /// Resolve the transcript for a URL and turn it into notes.
    #[instrument(skip(self))]
    pub async fn generate_notes(&self, url: &str, style: Option<NoteStyle>) -> Result<GeneratedNotes> {
        let resolved = self.fetch_transcript(url).await?;
        let style = style.unwrap_or(self.default_style);

        let notes = self.generator.generate(&resolved.transcript, style).await?;

        Ok(GeneratedNotes {
            video_id: resolved.video_id,
            style,
            strategy: resolved.strategy,
            notes,
        })
    }
}

/// A transcript together with where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedTranscript {
    pub video_id: VideoId,
    pub transcript: Transcript,
    /// Strategy that produced the transcript.
    pub strategy: &'static str,
}

/// Notes generated for a video.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedNotes {
    pub video_id: VideoId,
    pub style: NoteStyle,
    pub strategy: &'static str,
    pub notes: String,
}
