//! OpenAI client configuration with sensible defaults.

use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Create an OpenAI client with a custom timeout.
///
/// The API key is read from `OPENAI_API_KEY`.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

/// State of the API key in the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyStatus {
    Missing,
    Empty,
    Present(String),
}

/// Read the API key from the environment.
pub fn api_key_status() -> ApiKeyStatus {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if key.trim().is_empty() => ApiKeyStatus::Empty,
        Ok(key) => ApiKeyStatus::Present(key),
        Err(_) => ApiKeyStatus::Missing,
    }
}

/// Check whether an OpenAI API key is present in the environment.
pub fn is_api_key_configured() -> bool {
    matches!(api_key_status(), ApiKeyStatus::Present(_))
}
