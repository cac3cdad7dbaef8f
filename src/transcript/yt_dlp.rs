//! Caption extraction through yt-dlp.
//!
//! yt-dlp is asked for the video's metadata to enumerate caption tracks, then to write
//! the chosen track as WebVTT into a temporary directory that is removed on return.

use super::{Absent, FailureCause, StrategyResult, Transcript, TranscriptStrategy};
use crate::config::YtDlpSettings;
use crate::error::{LecternError, Result};
use crate::transcript::decode_entities;
use crate::video_id::VideoId;
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::LazyLock;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

/// A caption track chosen from yt-dlp metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub language: String,
    /// Auto-generated captions rather than uploaded subtitles.
    pub automatic: bool,
}

/// Extracts captions with the yt-dlp tool.
pub struct YtDlpStrategy {
    binary: String,
    timeout: Duration,
    language: String,
    temp_root: PathBuf,
}

impl YtDlpStrategy {
    /// Subtitle files are written to per-call directories created under `temp_root`.
    pub fn new(settings: &YtDlpSettings, language: &str, temp_root: PathBuf) -> Self {
        Self {
            binary: settings.binary.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            language: language.to_string(),
            temp_root,
        }
    }

    fn scratch_dir(&self) -> Result<tempfile::TempDir> {
        std::fs::create_dir_all(&self.temp_root)?;
        Ok(tempfile::tempdir_in(&self.temp_root)?)
    }

    /// Run yt-dlp with a bounded timeout. The child is killed if the timeout fires.
    async fn run(&self, args: &[&str]) -> Result<Output> {
        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let result = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| LecternError::Timeout(self.timeout.as_secs()))?;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LecternError::ToolNotFound(self.binary.clone()));
            }
            Err(e) => {
                return Err(LecternError::ToolFailed(format!("{} execution failed: {e}", self.binary)));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if let Some(cause) = classify_stderr(&stderr) {
                return Err(LecternError::TranscriptUnavailable(cause));
            }
            return Err(LecternError::ToolFailed(format!("{} failed: {}", self.binary, stderr.trim())));
        }

        Ok(output)
    }

    /// Ask yt-dlp which caption tracks exist and pick one.
    async fn choose_track(&self, video_id: &VideoId) -> Result<Option<CaptionTrack>> {
        let url = video_id.watch_url();
        let output = self
            .run(&["--dump-json", "--skip-download", "--no-warnings", "--no-playlist", url.as_str()])
            .await?;

        let info: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        Ok(select_track(&info, &self.language))
    }

    /// Download a caption track as WebVTT into `dir` and return the file path.
    async fn download_track(&self, video_id: &VideoId, track: &CaptionTrack, dir: &Path) -> Result<PathBuf> {
        let url = video_id.watch_url();
        let template = dir.join("%(id)s.%(ext)s");
        let template = template.to_string_lossy();
        let write_flag = if track.automatic { "--write-auto-subs" } else { "--write-subs" };

        self.run(&[
            "--skip-download",
            write_flag,
            "--sub-langs",
            track.language.as_str(),
            "--sub-format",
            "vtt",
            "--no-warnings",
            "--no-playlist",
            "--output",
            &*template,
            url.as_str(),
        ])
        .await?;

        find_subtitle_file(dir, video_id)
    }
}

#[async_trait]
impl TranscriptStrategy for YtDlpStrategy {
    fn name(&self) -> &'static str {
        "yt_dlp"
    }

    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn fetch(&self, video_id: &VideoId) -> StrategyResult {
        let track = match self.choose_track(video_id).await {
            Ok(Some(track)) => track,
            Ok(None) => {
                return Err(Absent::with_cause(
                    FailureCause::NoCaptions,
                    "yt-dlp reported no caption tracks",
                ))
            }
            Err(e) => return Err(Absent::from(e)),
        };

        info!(
            "Using {} caption track '{}'",
            if track.automatic { "automatic" } else { "uploaded" },
            track.language
        );

        // Dropped (and deleted) on every return path below.
        let temp_dir = self.scratch_dir().map_err(Absent::from)?;

        let path = self
            .download_track(video_id, &track, temp_dir.path())
            .await
            .map_err(Absent::from)?;

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Absent::from(LecternError::from(e)))?;

        Transcript::from_cues(parse_vtt(&content))
            .ok_or_else(|| Absent::new(format!("Caption track '{}' contained no text", track.language)))
    }
}

/// Pick a caption track from yt-dlp's `--dump-json` output.
///
/// Order: uploaded subtitles in the preferred language, automatic captions in the
/// preferred language, then the first uploaded and the first automatic track as yt-dlp
/// listed them.
pub fn select_track(info: &serde_json::Value, preferred: &str) -> Option<CaptionTrack> {
    let languages = |key: &str| -> Vec<String> {
        info[key]
            .as_object()
            .map(|tracks| {
                tracks
                    .iter()
                    .filter(|(_, formats)| formats.as_array().is_some_and(|f| !f.is_empty()))
                    .map(|(lang, _)| lang.clone())
                    .collect()
            })
            .unwrap_or_default()
    };

    let uploaded = languages("subtitles");
    let automatic = languages("automatic_captions");

    let matches = |lang: &str| lang == preferred || lang.starts_with(&format!("{}-", preferred));
    let track = |language: &String, automatic: bool| CaptionTrack {
        language: language.clone(),
        automatic,
    };

    uploaded
        .iter()
        .find(|l| matches(l.as_str()))
        .map(|l| track(l, false))
        .or_else(|| automatic.iter().find(|l| matches(l.as_str())).map(|l| track(l, true)))
        .or_else(|| uploaded.first().map(|l| track(l, false)))
        .or_else(|| automatic.first().map(|l| track(l, true)))
}

/// Convert WebVTT content to caption cues.
///
/// Drops the header block, NOTE/STYLE/REGION blocks, cue identifiers, timing lines with
/// their positioning settings and inline markup. Consecutive duplicate lines, which
/// rolling auto-captions produce, are collapsed.
pub fn parse_vtt(content: &str) -> Vec<String> {
    let content = content.replace("\r\n", "\n");
    let mut cues: Vec<String> = Vec::new();

    for block in content.split("\n\n") {
        let block = block.trim_matches('\n');
        let first = block.lines().next().unwrap_or_default().trim_start();
        if block.is_empty()
            || first.starts_with("WEBVTT")
            || first.starts_with("NOTE")
            || first.starts_with("STYLE")
            || first.starts_with("REGION")
        {
            continue;
        }

        let Some(timing_index) = block.lines().position(|l| l.contains("-->")) else {
            continue;
        };

        for line in block.lines().skip(timing_index + 1) {
            let text = decode_entities(&TAG_PATTERN.replace_all(line, ""));
            let text = text.trim();
            if text.is_empty() || cues.last().is_some_and(|last| last == text) {
                continue;
            }
            cues.push(text.to_string());
        }
    }

    cues
}

/// Locate the subtitle file yt-dlp wrote for the video.
fn find_subtitle_file(dir: &Path, video_id: &VideoId) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir)?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(video_id.as_str()) && name.ends_with(".vtt") {
            debug!("Found subtitle file {}", name);
            return Ok(entry.path());
        }
    }

    warn!("yt-dlp finished without writing a subtitle file");
    Err(LecternError::CaptionSource("Subtitle file not found after download".into()))
}

/// Map yt-dlp's error output to a failure cause.
///
/// yt-dlp exposes no machine-readable error codes, so this matches the messages it
/// prints for the cases we distinguish. Unknown messages yield `None`.
fn classify_stderr(stderr: &str) -> Option<FailureCause> {
    let stderr = stderr.to_lowercase();
    if stderr.contains("http error 429") || stderr.contains("too many requests") {
        Some(FailureCause::RateLimited)
    } else if stderr.contains("private video")
        || stderr.contains("confirm your age")
        || stderr.contains("members-only")
        || stderr.contains("sign in to confirm")
    {
        Some(FailureCause::AccessRestricted)
    } else {
        None
    }
}
