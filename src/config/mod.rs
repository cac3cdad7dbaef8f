//! Configuration module for Lectern.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{NotePrompts, Prompts};
pub use settings::{
    CaptionApiSettings, GeneralSettings, NotesSettings, PageSettings, PromptSettings,
    ResolverSettings, ServerSettings, Settings, YtDlpSettings,
};
