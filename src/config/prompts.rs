//! Prompt templates for Lectern.
//!
//! The note prompt can be customized by placing a `notes.toml` file in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub notes: NotePrompts,
}

/// Prompts for lecture note generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotePrompts {
    /// Template with `{{style_instruction}}` and `{{transcript}}` placeholders.
    pub user: String,
    pub concise: String,
    pub detailed: String,
    pub key_points: String,
}

impl Default for NotePrompts {
    fn default() -> Self {
        Self {
            user: r#"Generate structured lecture notes from the following transcript:

- Format the notes into sections with bullet points.
- Use clear headings and subheadings.
- Summarize key concepts, definitions, and examples.

{{style_instruction}}

Lecture Transcript:
{{transcript}}"#
                .to_string(),
            concise: "- Keep the notes brief and to the point.".to_string(),
            detailed: "- Provide comprehensive explanations and examples.".to_string(),
            key_points: "- Focus on the most important concepts and takeaways.".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, overriding defaults from `custom_dir` when given.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let notes_path = custom_path.join("notes.toml");
            if notes_path.exists() {
                let content = std::fs::read_to_string(&notes_path)?;
                prompts.notes = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in one pass, so values are never re-expanded.
    /// Unknown placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}
