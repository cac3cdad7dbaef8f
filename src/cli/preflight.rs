//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::error::{LecternError, Result};
use crate::openai::{api_key_status, ApiKeyStatus, API_KEY_VAR};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Note generation requires an API key.
    Notes,
    /// Transcript fetching needs nothing beyond network access.
    Transcript,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Notes => check_api_key(),
        Operation::Transcript => Ok(()),
    }
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    let problem = match api_key_status() {
        ApiKeyStatus::Present(_) => return Ok(()),
        ApiKeyStatus::Empty => "is empty",
        ApiKeyStatus::Missing => "not set",
    };
    Err(LecternError::Config(format!(
        "{} {}. Set it with: export {}='sk-...'",
        API_KEY_VAR, problem, API_KEY_VAR
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_transcript_no_requirements() {
        assert!(check(Operation::Transcript).is_ok());
    }
}
