//! Shared helpers for unit tests.

use crate::error::Result;
use crate::notes::{NoteGenerator, NoteStyle};
use crate::transcript::{Absent, StrategyResult, Transcript, TranscriptStrategy};
use crate::video_id::VideoId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Serve a router on an ephemeral local port and return its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A strategy returning canned cues (or absence) and counting its invocations.
pub struct MockStrategy {
    name: &'static str,
    cues: Option<Vec<String>>,
    absent: Absent,
    calls: Arc<AtomicUsize>,
}

impl MockStrategy {
    pub fn found(name: &'static str, cues: &[&str]) -> Self {
        Self {
            name,
            cues: Some(cues.iter().map(|c| c.to_string()).collect()),
            absent: Absent::new("unused"),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn absent(name: &'static str, absent: Absent) -> Self {
        Self {
            name,
            cues: None,
            absent,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle to the invocation counter, usable after the strategy is boxed.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl TranscriptStrategy for MockStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _video_id: &VideoId) -> StrategyResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.cues {
            Some(cues) => Transcript::from_cues(cues)
                .ok_or_else(|| Absent::new(format!("{} returned blank cues", self.name))),
            None => Err(self.absent.clone()),
        }
    }
}

/// A note generator that echoes its inputs, or fails on demand.
pub struct EchoGenerator {
    pub fail: bool,
}

#[async_trait]
impl NoteGenerator for EchoGenerator {
    async fn generate(&self, transcript: &Transcript, style: NoteStyle) -> Result<String> {
        if self.fail {
            return Err(crate::error::LecternError::Generation("model unavailable".to_string()));
        }
        Ok(format!("[{}] {}", style, transcript))
    }
}
