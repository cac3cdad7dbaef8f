//! CLI module for Lectern.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{emit, Output};

use clap::{Parser, Subcommand};

/// Lectern - YouTube lecture notes
///
/// Fetches a video's transcript, falling back across several caption sources,
/// and turns it into structured study notes.
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate lecture notes for a YouTube video
    Notes {
        /// YouTube video URL
        url: String,

        /// Note style (concise, detailed, key_points, default)
        #[arg(short, long)]
        style: Option<String>,

        /// Write notes to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Fetch and print the transcript of a YouTube video
    Transcript {
        /// YouTube video URL
        url: String,

        /// Write the transcript to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Start the HTTP server
    Serve {
        /// Host to bind to (defaults to server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notes_command() {
        let cli = Cli::parse_from([
            "lectern",
            "-vv",
            "notes",
            "https://youtu.be/dQw4w9WgXcQ",
            "--style",
            "concise",
        ]);

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Notes { url, style, output } => {
                assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
                assert_eq!(style.as_deref(), Some("concise"));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::parse_from(["lectern", "serve"]);
        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert!(port.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
