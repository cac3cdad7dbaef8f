//! Lectern - YouTube lecture notes
//!
//! Turns a YouTube lecture into structured study notes.
//!
//! # Overview
//!
//! Getting a transcript out of YouTube is unreliable, so Lectern tries several sources
//! in a fixed priority order and falls back to the next one whenever a source fails or
//! comes back empty. The winning transcript is handed to an LLM together with a
//! presentation style (concise, detailed, key points).
//!
//! # Architecture
//!
//! - `video_id` - URL parsing into validated video IDs
//! - `transcript` - Strategy chain, resolver and pacing
//! - `notes` - Prompt construction and note generation
//! - `orchestrator` - Pipeline coordination
//! - `config` - Configuration management
//! - `cli` - Command-line interface and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use lectern::config::Settings;
//! use lectern::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings)?;
//!
//!     let generated = orchestrator
//!         .generate_notes("https://www.youtube.com/watch?v=dQw4w9WgXcQ", None)
//!         .await?;
//!     println!("{}", generated.notes);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod notes;
pub mod openai;
pub mod orchestrator;
pub mod transcript;
pub mod video_id;

#[cfg(test)]
mod test_support;

pub use error::{LecternError, Result};
