//! Lecture note generation.
//!
//! Turns a transcript into structured notes with an LLM. The presentation style only
//! changes one instruction line in the prompt.

mod openai;

pub use openai::OpenAiNoteGenerator;

use crate::config::NotePrompts;
use crate::config::Prompts;
use crate::error::Result;
use crate::transcript::Transcript;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Presentation style for generated notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteStyle {
    Concise,
    Detailed,
    KeyPoints,
    #[default]
    Default,
}

impl NoteStyle {
    /// Parse a style name. Unrecognized names fall back to [`NoteStyle::Default`].
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "concise" => NoteStyle::Concise,
            "detailed" => NoteStyle::Detailed,
            "key_points" | "keypoints" => NoteStyle::KeyPoints,
            _ => NoteStyle::Default,
        }
    }

    /// Extra prompt instruction for this style; empty for the default style.
    pub fn instruction<'a>(&self, prompts: &'a NotePrompts) -> &'a str {
        match self {
            NoteStyle::Concise => &prompts.concise,
            NoteStyle::Detailed => &prompts.detailed,
            NoteStyle::KeyPoints => &prompts.key_points,
            NoteStyle::Default => "",
        }
    }
}

impl std::fmt::Display for NoteStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoteStyle::Concise => write!(f, "concise"),
            NoteStyle::Detailed => write!(f, "detailed"),
            NoteStyle::KeyPoints => write!(f, "key_points"),
            NoteStyle::Default => write!(f, "default"),
        }
    }
}

/// Build the note-generation prompt for a transcript.
pub fn build_prompt(prompts: &NotePrompts, transcript: &Transcript, style: NoteStyle) -> String {
    let mut vars = HashMap::new();
    vars.insert(
        "style_instruction".to_string(),
        style.instruction(prompts).to_string(),
    );
    vars.insert("transcript".to_string(), transcript.to_string());
    Prompts::render(&prompts.user, &vars)
}

/// Trait for note generators.
#[async_trait]
pub trait NoteGenerator: Send + Sync {
    /// Generate notes for a transcript in the given style.
    async fn generate(&self, transcript: &Transcript, style: NoteStyle) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient() {
        assert_eq!(NoteStyle::parse_lenient("concise"), NoteStyle::Concise);
        assert_eq!(NoteStyle::parse_lenient("Detailed"), NoteStyle::Detailed);
        assert_eq!(NoteStyle::parse_lenient("key_points"), NoteStyle::KeyPoints);
        assert_eq!(NoteStyle::parse_lenient("key-points"), NoteStyle::KeyPoints);
        assert_eq!(NoteStyle::parse_lenient("default"), NoteStyle::Default);
        assert_eq!(NoteStyle::parse_lenient("haiku"), NoteStyle::Default);
        assert_eq!(NoteStyle::parse_lenient(""), NoteStyle::Default);
    }

    #[test]
    fn test_build_prompt_with_style() {
        let prompts = NotePrompts::default();
        let transcript = Transcript::new("Entropy measures disorder.").unwrap();

        let prompt = build_prompt(&prompts, &transcript, NoteStyle::Concise);
        assert!(prompt.starts_with("Generate structured lecture notes"));
        assert!(prompt.contains("- Keep the notes brief and to the point."));
        assert!(prompt.ends_with("Lecture Transcript:\nEntropy measures disorder."));
    }

    #[test]
    fn test_default_style_adds_no_instruction() {
        let prompts = NotePrompts::default();
        let transcript = Transcript::new("text").unwrap();

        let prompt = build_prompt(&prompts, &transcript, NoteStyle::Default);
        assert!(!prompt.contains("{{style_instruction}}"));
        assert!(!prompt.contains(&prompts.concise));
        assert!(!prompt.contains(&prompts.detailed));
        assert!(!prompt.contains(&prompts.key_points));
    }

    #[test]
    fn test_unknown_style_matches_default_prompt() {
        let prompts = NotePrompts::default();
        let transcript = Transcript::new("text").unwrap();

        assert_eq!(
            build_prompt(&prompts, &transcript, NoteStyle::parse_lenient("fancy")),
            build_prompt(&prompts, &transcript, NoteStyle::Default)
        );
    }
}
