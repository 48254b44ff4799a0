//! Harness configuration
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional TOML file, then environment variables (optionally seeded from an
//! `<ENV>.env` file).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Browsers the harness knows how to launch
pub const SUPPORTED_BROWSERS: &[&str] = &["chromium", "firefox", "webkit"];

/// Top-level harness configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Application under test; browser scenarios are skipped without it
    pub base_url: Option<String>,

    /// Browser session settings
    pub browser: BrowserConfig,

    /// Content database settings
    pub database: DatabaseConfig,

    /// Account API settings
    pub account_api: AccountApiConfig,

    /// Report output settings
    pub report: ReportConfig,
}

/// Browser session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// chromium, firefox or webkit
    pub name: String,
    pub headless: bool,
    pub action_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    pub screenshot_dir: PathBuf,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            name: "chromium".to_string(),
            headless: true,
            action_timeout_ms: 15_000,
            navigation_timeout_ms: 30_000,
            screenshot_dir: PathBuf::from("test-results/screenshots"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,

    /// Give up connecting after this many seconds
    pub connect_timeout_secs: u64,

    /// Pause between connection attempts
    pub retry_interval_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("test-results/stagecraft.db"),
            connect_timeout_secs: 60,
            retry_interval_secs: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }
}

/// Account API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for AccountApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://demoqa.com/Account/v1".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults when missing
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load `<env>.env` into the process environment if it exists.
    ///
    /// Returns `Ok(false)` only when the file is absent; a file that exists
    /// but cannot be read or parsed is an error.
    pub fn load_env_file(env: &str) -> Result<bool> {
        let file = format!("{}.env", env);
        match dotenvy::from_filename(&file) {
            Ok(_) => {
                debug!("Loaded environment file {}", file);
                Ok(true)
            }
            Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No environment file {}", file);
                Ok(false)
            }
            Err(err) => Err(Error::InvalidConfig(format!("cannot load {}: {}", file, err))),
        }
    }

    /// Build the effective configuration: env file, TOML file, then
    /// environment overrides
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "uat".to_string());
        Self::load_env_file(&env)?;

        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(browser) = lookup("BROWSER") {
            self.browser.name = canonical_browser(&browser);
        }
        if let Some(headless) = lookup("HEADLESS") {
            self.browser.headless = headless != "false";
        }
        if let Some(ms) = parse_number(&lookup, "ACTION_TIMEOUT") {
            self.browser.action_timeout_ms = ms;
        }
        if let Some(ms) = parse_number(&lookup, "NAVIGATION_TIMEOUT") {
            self.browser.navigation_timeout_ms = ms;
        }
        if let Some(path) = lookup("DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(url) = lookup("ACCOUNT_API_URL") {
            self.account_api.base_url = url;
        }
        if let Some(dir) = lookup("REPORT_DIR") {
            self.report.output_dir = PathBuf::from(dir);
        }
    }

    /// Reject settings no collaborator can work with
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_BROWSERS.contains(&canonical_browser(&self.browser.name).as_str()) {
            return Err(Error::InvalidConfig(format!(
                "unknown browser '{}' (expected one of {})",
                self.browser.name,
                SUPPORTED_BROWSERS.join(", ")
            )));
        }
        if self.browser.action_timeout_ms == 0 || self.browser.navigation_timeout_ms == 0 {
            return Err(Error::InvalidConfig("browser timeouts must be non-zero".to_string()));
        }
        if self.account_api.request_timeout_secs == 0 {
            return Err(Error::InvalidConfig("account API timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Lowercase a browser name and map vendor aliases onto the engine name
pub fn canonical_browser(name: &str) -> String {
    let name = name.trim().to_lowercase();
    match name.as_str() {
        "chrome" => "chromium".to_string(),
        "safari" => "webkit".to_string(),
        _ => name,
    }
}

fn parse_number(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a number", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: HarnessConfig = toml::from_str(
            r#"
base_url = "http://localhost:3000"

[browser]
name = "firefox"
"#,
        )
        .unwrap();

        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.browser.name, "firefox");
        assert_eq!(config.browser.action_timeout_ms, 15_000);
        assert_eq!(config.database.connect_timeout_secs, 60);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = HarnessConfig::default();
        config.apply_env_overrides(lookup(&[
            ("BASE_URL", "http://staging.local"),
            ("HEADLESS", "false"),
            ("ACTION_TIMEOUT", "5000"),
            ("DB_PATH", "/tmp/db.sqlite"),
        ]));

        assert_eq!(config.base_url.as_deref(), Some("http://staging.local"));
        assert!(!config.browser.headless);
        assert_eq!(config.browser.action_timeout_ms, 5000);
        assert_eq!(config.database.path, PathBuf::from("/tmp/db.sqlite"));
    }

    #[test]
    fn test_unparsable_timeout_ignored() {
        let mut config = HarnessConfig::default();
        config.apply_env_overrides(lookup(&[("NAVIGATION_TIMEOUT", "soon")]));
        assert_eq!(config.browser.navigation_timeout_ms, 30_000);
    }

    #[test]
    fn test_validate_rejects_unknown_browser() {
        let mut config = HarnessConfig::default();
        config.browser.name = "netscape".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_browser_aliases_pass_validation() {
        let mut config = HarnessConfig::default();
        config.apply_env_overrides(lookup(&[("BROWSER", "Chrome")]));
        assert_eq!(config.browser.name, "chromium");
        assert!(config.validate().is_ok());

        // Names from a TOML file are not rewritten but still validate
        config.browser.name = "Safari".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(canonical_browser(&config.browser.name), "webkit");
    }

    #[test]
    fn test_missing_env_file_is_absent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let env = tmp.path().join("nowhere");
        assert!(!HarnessConfig::load_env_file(env.to_str().unwrap()).unwrap());
    }

    #[test]
    fn test_malformed_env_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("broken.env"), "BASE_URL='unterminated\n").unwrap();
        let env = tmp.path().join("broken");

        let err = HarnessConfig::load_env_file(env.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg.contains("broken.env")));
    }

    #[test]
    fn test_env_file_is_loaded() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("local.env"),
            "STAGECRAFT_ENV_FILE_MARKER=loaded\n",
        )
        .unwrap();
        let env = tmp.path().join("local");

        assert!(HarnessConfig::load_env_file(env.to_str().unwrap()).unwrap());
        assert_eq!(std::env::var("STAGECRAFT_ENV_FILE_MARKER").unwrap(), "loaded");
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = HarnessConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert!(config.base_url.is_none());
        assert!(config.validate().is_ok());
    }
}
