//! YouTube video identifiers and URL parsing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Length of every YouTube video ID.
pub const VIDEO_ID_LEN: usize = 11;

// Matches the watch, embed, v and youtu.be URL shapes.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:https?://)?
        (?:www\.)?
        (?:youtube\.com/(?:watch\?v=|embed/|v/)|youtu\.be/)
        ([a-zA-Z0-9_-]{11})
    ",
    )
    .expect("Invalid regex")
});

/// A validated 11-character YouTube video ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Validate a bare token as a video ID.
    pub fn parse(token: &str) -> Option<Self> {
        let valid = token.len() == VIDEO_ID_LEN
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        valid.then(|| Self(token.to_string()))
    }

    /// Extract the video ID from a YouTube URL.
    ///
    /// Returns `None` when the input is not one of the recognized URL shapes.
    pub fn from_url(input: &str) -> Option<Self> {
        let caps = URL_PATTERN.captures(input.trim())?;
        caps.get(1).map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch page URL.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VideoId {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("Invalid video ID: {}", value))
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

/// Extract a video ID from a URL. Convenience wrapper over [`VideoId::from_url`].
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    VideoId::from_url(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(input: &str) -> Option<String> {
        extract_video_id(input).map(String::from)
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extracted("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extracted("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extracted("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extracted("youtube.com/v/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extracted("https://www.youtube.com/watch?v=a_b-C1d2E3f&t=42s"),
            Some("a_b-C1d2E3f".to_string())
        );
    }

    #[test]
    fn test_rejects_unrecognized_shapes() {
        assert_eq!(extracted(""), None);
        assert_eq!(extracted("dQw4w9WgXcQ"), None);
        assert_eq!(extracted("https://vimeo.com/123456789"), None);
        assert_eq!(extracted("https://www.youtube.com/playlist?list=PLtest"), None);
        assert_eq!(extracted("https://youtu.be/short"), None);
        assert_eq!(extracted("https://www.youtube.com/watch?v=bad!chars11"), None);
    }

    #[test]
    fn test_extracted_ids_are_valid_tokens() {
        let inputs = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtu.be/___________",
            "https://youtube.com/embed/-----------?start=3",
            "www.youtube.com/v/0123456789abcdef",
        ];

        for input in inputs {
            let id = extract_video_id(input).expect(input);
            assert_eq!(id.as_str().len(), VIDEO_ID_LEN);
            assert!(VideoId::parse(id.as_str()).is_some());
        }
    }

    #[test]
    fn test_parse_bare_token() {
        assert!(VideoId::parse("dQw4w9WgXcQ").is_some());
        assert!(VideoId::parse("dQw4w9WgXc").is_none());
        assert!(VideoId::parse("dQw4w9WgXcQQ").is_none());
        assert!(VideoId::parse("dQw4w9WgXc!").is_none());
    }

    #[test]
    fn test_watch_url() {
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
