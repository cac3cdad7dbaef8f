//! Doctor command - check that each transcript source and note generation can run.

use crate::cli::Output;
use crate::config::Settings;
use crate::openai::{api_key_status, ApiKeyStatus, API_KEY_VAR};
use crate::transcript::StrategyKind;
use console::style;
use std::process::Command;
use url::Url;

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Ok,
    Warning,
    Error,
}

#[derive(Debug)]
struct Check {
    label: String,
    severity: Severity,
    detail: String,
    hint: Option<String>,
}

impl Check {
    fn new(severity: Severity, label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            severity,
            detail: detail.into(),
            hint: None,
        }
    }

    fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Collects checks per section and prints them as they arrive.
#[derive(Default)]
struct Report {
    checks: Vec<Check>,
}

impl Report {
    fn section(&self, title: &str) {
        println!("\n{}", style(title).bold());
    }

    fn push(&mut self, check: Check) {
        let icon = match check.severity {
            Severity::Ok => style("✓").green(),
            Severity::Warning => style("!").yellow(),
            Severity::Error => style("✗").red(),
        };
        println!("  {} {} - {}", icon, style(&check.label).bold(), check.detail);
        if let Some(hint) = &check.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
        self.checks.push(check);
    }

    fn count(&self, severity: Severity) -> usize {
        self.checks.iter().filter(|c| c.severity == severity).count()
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Lectern Doctor");

    let mut report = Report::default();

    report.section("Transcript sources");
    let chain = settings
        .resolver
        .strategies
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
    report.push(Check::new(
        Severity::Ok,
        "Order",
        format!("{} (min interval {} ms)", chain, settings.resolver.min_interval_ms),
    ));
    for kind in &settings.resolver.strategies {
        report.push(check_strategy(*kind, settings));
    }
    report.push(check_temp_dir(settings));

    report.section("Note generation");
    report.push(check_api_key(api_key_status()));
    report.push(Check::new(
        Severity::Ok,
        "Model",
        format!("{} (temperature {})", settings.notes.model, settings.notes.temperature),
    ));

    report.section("Configuration");
    let config_path = Settings::default_config_path();
    report.push(if config_path.exists() {
        Check::new(Severity::Ok, "Config file", config_path.display().to_string())
    } else {
        Check::new(Severity::Warning, "Config file", "using defaults").hint("Create with: lectern config edit")
    });

    println!();
    let errors = report.count(Severity::Error);
    let warnings = report.count(Severity::Warning);
    if errors > 0 {
        Output::error(&format!("{} error(s) found.", errors));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Lectern is ready to use.");
    }

    Ok(())
}

fn check_strategy(kind: StrategyKind, settings: &Settings) -> Check {
    let label = kind.to_string();
    match kind {
        StrategyKind::CaptionApi => check_base_url(&label, &settings.caption_api.base_url),
        StrategyKind::YtDlp => check_tool(&label, &settings.yt_dlp.binary, install_hint_ytdlp()),
        StrategyKind::Page => {
            if settings.page.user_agents.is_empty() {
                Check::new(Severity::Error, label, "no user agents configured")
                    .hint("Add entries to page.user_agents")
            } else {
                match Url::parse(&settings.page.base_url) {
                    Ok(_) => Check::new(
                        Severity::Ok,
                        label,
                        format!("{} user agent(s) in rotation", settings.page.user_agents.len()),
                    ),
                    Err(e) => Check::new(Severity::Error, label, format!("invalid base_url: {}", e)),
                }
            }
        }
    }
}

fn check_base_url(label: &str, base_url: &str) -> Check {
    match Url::parse(base_url) {
        Ok(url) => Check::new(Severity::Ok, label, url.as_str()),
        Err(e) => Check::new(Severity::Error, label, format!("invalid base_url: {}", e)),
    }
}

/// Probe an external tool. A missing tool only disables its strategy, so it is a warning.
fn check_tool(label: &str, binary: &str, hint: &str) -> Check {
    match Command::new(binary).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = stdout.lines().next().unwrap_or("installed").trim();
            Check::new(Severity::Ok, label, format!("{} {}", binary, truncate_chars(version, 50)))
        }
        Ok(_) => Check::new(Severity::Warning, label, format!("{} is installed but not working", binary)).hint(hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Check::new(Severity::Warning, label, format!("{} not found, strategy will be skipped", binary)).hint(hint)
        }
        Err(e) => Check::new(Severity::Warning, label, format!("{}: {}", binary, e)).hint(hint),
    }
}

fn check_temp_dir(settings: &Settings) -> Check {
    let dir = settings.temp_dir();
    let writable = std::fs::create_dir_all(&dir).and_then(|_| tempfile::tempdir_in(&dir).map(drop));
    match writable {
        Ok(()) => Check::new(Severity::Ok, "Scratch dir", dir.display().to_string()),
        Err(e) => Check::new(Severity::Warning, "Scratch dir", format!("{} is not writable: {}", dir.display(), e))
            .hint("Set general.temp_dir to a writable directory"),
    }
}

fn check_api_key(status: ApiKeyStatus) -> Check {
    let hint = format!("Set with: export {}='sk-...'", API_KEY_VAR);
    match status {
        ApiKeyStatus::Present(key) => Check::new(Severity::Ok, API_KEY_VAR, format!("configured ({})", mask_key(&key))),
        ApiKeyStatus::Empty => Check::new(Severity::Error, API_KEY_VAR, "empty").hint(hint),
        ApiKeyStatus::Missing => Check::new(Severity::Error, API_KEY_VAR, "not set").hint(hint),
    }
}

/// Show only the ends of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_warning() {
        let check = check_tool("yt_dlp", "lectern-test-no-such-binary", "install it");
        assert_eq!(check.severity, Severity::Warning);
        assert_eq!(check.hint.as_deref(), Some("install it"));
    }

    #[test]
    fn test_mask_key_handles_multibyte() {
        assert_eq!(mask_key("sk-abcdefghijklmnop1234"), "sk-abcd...1234");
        assert_eq!(mask_key("short"), "*****");
        // Multibyte characters must not split on byte boundaries.
        assert_eq!(mask_key("ключ-ключ-ключ-ключ"), "ключ-кл...ключ");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("yt-dlp 2024.01.01", 50), "yt-dlp 2024.01.01");
        assert_eq!(truncate_chars(&"é".repeat(60), 50), format!("{}...", "é".repeat(50)));
    }

    #[test]
    fn test_api_key_checks() {
        assert_eq!(check_api_key(ApiKeyStatus::Missing).severity, Severity::Error);
        assert_eq!(check_api_key(ApiKeyStatus::Empty).severity, Severity::Error);
        let ok = check_api_key(ApiKeyStatus::Present("sk-abcdefghijklmnop1234".into()));
        assert_eq!(ok.severity, Severity::Ok);
        assert!(!ok.detail.contains("efghijkl"));
    }

    #[test]
    fn test_page_without_user_agents_is_error() {
        let mut settings = Settings::default();
        settings.page.user_agents.clear();
        assert_eq!(check_strategy(StrategyKind::Page, &settings).severity, Severity::Error);

        let settings = Settings::default();
        assert_eq!(check_strategy(StrategyKind::Page, &settings).severity, Severity::Ok);
        assert_eq!(check_strategy(StrategyKind::CaptionApi, &settings).severity, Severity::Ok);
    }
}
