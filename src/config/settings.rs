//! Configuration settings for Lectern.

use crate::transcript::StrategyKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub resolver: ResolverSettings,
    pub caption_api: CaptionApiSettings,
    pub yt_dlp: YtDlpSettings,
    pub page: PageSettings,
    pub notes: NotesSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for temporary files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/lectern".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Transcript resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Minimum interval between transcript fetches, in milliseconds.
    pub min_interval_ms: u64,
    /// Strategies to try, in priority order.
    pub strategies: Vec<StrategyKind>,
    /// Preferred caption language.
    pub language: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            min_interval_ms: 1000,
            strategies: StrategyKind::DEFAULT_ORDER.to_vec(),
            language: "en".to_string(),
        }
    }
}

/// Timed-text caption API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionApiSettings {
    /// Timed-text endpoint.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CaptionApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com/api/timedtext".to_string(),
            timeout_secs: 15,
        }
    }
}

/// yt-dlp caption extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YtDlpSettings {
    /// yt-dlp executable name or path.
    pub binary: String,
    /// Timeout per yt-dlp invocation in seconds.
    pub timeout_secs: u64,
}

impl Default for YtDlpSettings {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Direct watch-page fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    /// Watch page URL; the video ID is sent as the `v` query parameter.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Browser user agents, one picked at random per request.
    pub user_agents: Vec<String>,
    /// Accept-Language header sent with the request.
    pub accept_language: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com/watch".to_string(),
            timeout_secs: 15,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15".to_string(),
            ],
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Note generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesSettings {
    /// LLM model used to write notes.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Style used when a request does not name one.
    pub style: String,
}

impl Default for NotesSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
            style: "default".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Settings::default())
        }
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> crate::error::Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        if settings.resolver.strategies.is_empty() {
            return Err(crate::error::LecternError::Config(
                "resolver.strategies must list at least one strategy".to_string(),
            ));
        }
        Ok(settings)
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::LecternError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lectern")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.resolver.min_interval_ms, 1000);
        assert_eq!(settings.resolver.strategies, StrategyKind::DEFAULT_ORDER.to_vec());
        assert_eq!(settings.server.port, 8080);
        assert!(!settings.page.user_agents.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [resolver]
            strategies = ["yt_dlp", "caption_api"]
            min_interval_ms = 250

            [notes]
            model = "gpt-4.1"
            "#,
        )
        .unwrap();

        assert_eq!(
            settings.resolver.strategies,
            vec![StrategyKind::YtDlp, StrategyKind::CaptionApi]
        );
        assert_eq!(settings.resolver.min_interval_ms, 250);
        assert_eq!(settings.resolver.language, "en");
        assert_eq!(settings.notes.model, "gpt-4.1");
        assert_eq!(settings.caption_api.timeout_secs, 15);
    }

    #[test]
    fn test_empty_strategy_list_rejected() {
        let result = Settings::from_toml("[resolver]\nstrategies = []\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 9090;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 9090);
    }
}
