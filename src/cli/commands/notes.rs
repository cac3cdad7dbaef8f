//! Notes command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{emit, Output};
use crate::config::Settings;
use crate::notes::NoteStyle;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the notes command.
pub async fn run_notes(
    url: &str,
    style: Option<&str>,
    output: Option<&str>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Notes) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lectern doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(&settings)?;
    let style = style.map(NoteStyle::parse_lenient);

    let spinner = Output::spinner("Fetching transcript and generating notes...");

    match orchestrator.generate_notes(url, style).await {
        Ok(generated) => {
            spinner.finish_and_clear();
            Output::info(&format!(
                "Transcript for {} via {}, {} style",
                generated.video_id, generated.strategy, generated.style
            ));
            emit(&generated.notes, output)?;
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&e.to_string());
            return Err(e.into());
        }
    }

    Ok(())
}
