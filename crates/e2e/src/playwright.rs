//! Playwright browser automation
//!
//! Each browser call generates a small Node script, runs it, and reads a JSON
//! result line from stdout. The session remembers the last URL navigated to
//! and replays that navigation at the start of every later script, so queries
//! see the page the test is on.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str::FromStr;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};

use stagecraft_common::{canonical_browser, HarnessConfig};

use crate::error::{E2eError, E2eResult};

/// Browser-session capability consumed by web abilities
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Load `url`, resolving relative paths against the base URL
    async fn navigate(&self, url: &str) -> E2eResult<()>;

    /// Whether the first element matching `selector` becomes visible within
    /// the action timeout
    async fn is_visible(&self, selector: &str) -> E2eResult<bool>;

    /// Text of the first element matching `selector`
    async fn text_content(&self, selector: &str) -> E2eResult<Option<String>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical_browser(s).as_str() {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::InvalidInput(format!("Unknown browser: {}", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: Option<String>,
    pub screenshot_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
    pub action_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
            action_timeout_ms: 15_000,
            navigation_timeout_ms: 30_000,
        }
    }
}

impl PlaywrightConfig {
    pub fn from_harness(config: &HarnessConfig) -> E2eResult<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            screenshot_dir: config.browser.screenshot_dir.clone(),
            browser: config.browser.name.parse()?,
            headless: config.browser.headless,
            action_timeout_ms: config.browser.action_timeout_ms,
            navigation_timeout_ms: config.browser.navigation_timeout_ms,
            ..Default::default()
        })
    }

    /// Absolute URL for `url`. Absolute URLs pass through unchanged.
    pub fn resolve_url(&self, url: &str) -> E2eResult<String> {
        if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("about:") {
            return Ok(url.to_string());
        }

        match &self.base_url {
            Some(base) => Ok(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            )),
            None => Err(E2eError::InvalidInput(format!(
                "Relative URL '{}' needs a base URL (set BASE_URL)",
                url
            ))),
        }
    }
}

/// What a generated script does after replaying navigation
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Action {
    Navigate,
    IsVisible(String),
    TextContent(String),
    Screenshot(PathBuf),
}

#[derive(Debug, Deserialize)]
struct ScriptResult {
    success: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Browser session driven by generated Playwright scripts
pub struct PlaywrightBrowser {
    config: PlaywrightConfig,
    current_url: Mutex<Option<String>>,
}

impl PlaywrightBrowser {
    /// Create a session, failing when Playwright is not installed
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;
        std::fs::create_dir_all(&config.screenshot_dir)?;

        info!("Using Playwright {} browser", config.browser.as_str());
        Ok(Self {
            config,
            current_url: Mutex::new(None),
        })
    }

    /// Check if Playwright is installed
    pub fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    pub fn current_url(&self) -> Option<String> {
        self.current_url.lock().clone()
    }

    /// Save a full-page screenshot of the current page
    pub async fn screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        let path = self.config.screenshot_dir.join(format!("{}.png", name));
        let url = self.current_url();
        let script = build_script(&self.config, url.as_deref(), &Action::Screenshot(path.clone()));
        self.run_script(&script).await?;
        Ok(path)
    }

    /// Execute a generated script via Node, returning its `value`
    pub async fn run_script(&self, script: &str) -> E2eResult<Value> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("session.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        let output = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(temp_dir.path())
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        script_outcome(output.status.success(), &stdout, &stderr)
    }

    async fn run(&self, url: Option<&str>, action: Action) -> E2eResult<Value> {
        let script = build_script(&self.config, url, &action);
        self.run_script(&script).await
    }
}

#[async_trait]
impl BrowserSession for PlaywrightBrowser {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        let resolved = self.config.resolve_url(url)?;
        info!("Navigating to {}", resolved);
        self.run(Some(&resolved), Action::Navigate).await?;
        *self.current_url.lock() = Some(resolved);
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        let url = self.current_url();
        let value = self
            .run(url.as_deref(), Action::IsVisible(selector.to_string()))
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn text_content(&self, selector: &str) -> E2eResult<Option<String>> {
        let url = self.current_url();
        let value = self
            .run(url.as_deref(), Action::TextContent(selector.to_string()))
            .await?;
        Ok(value.as_str().map(String::from))
    }
}

/// JavaScript string literal for `s`
fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Build the Playwright script that opens `url` (if any) and then performs
/// `action`
pub(crate) fn build_script(config: &PlaywrightConfig, url: Option<&str>, action: &Action) -> String {
    let mut script = format!(
        r#"
const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  page.setDefaultTimeout({action_timeout});
  page.setDefaultNavigationTimeout({navigation_timeout});
  let value = null;

  try {{
"#,
        browser = config.browser.as_str(),
        headless = config.headless,
        width = config.viewport_width,
        height = config.viewport_height,
        action_timeout = config.action_timeout_ms,
        navigation_timeout = config.navigation_timeout_ms,
    );

    if let Some(url) = url {
        script.push_str(&format!("    await page.goto({});\n", js_str(url)));
    }

    let body = match action {
        Action::Navigate => String::new(),
        Action::IsVisible(selector) => format!(
            "    value = await page.locator({}).first()\n      .waitFor({{ state: 'visible' }})\n      .then(() => true, () => false);\n",
            js_str(selector)
        ),
        Action::TextContent(selector) => format!(
            "    value = await page.locator({}).first().textContent();\n",
            js_str(selector)
        ),
        Action::Screenshot(path) => format!(
            "    await page.screenshot({{ path: {}, fullPage: true }});\n",
            js_str(&path.to_string_lossy())
        ),
    };
    script.push_str(&body);

    script.push_str(
        r#"
    console.log(JSON.stringify({ success: true, value }));
  } catch (error) {
    console.log(JSON.stringify({ success: false, error: error.message }));
    process.exitCode = 1;
  } finally {
    await browser.close();
  }
})();
"#,
    );

    script
}

fn result_line(stdout: &str) -> Option<&str> {
    stdout.lines().rev().find(|l| l.trim_start().starts_with('{'))
}

/// Turn a finished script run into its value or error. A failed run that
/// still printed a result reports the Playwright message; only runs that
/// died before printing one fall back to the raw output.
fn script_outcome(exited_ok: bool, stdout: &str, stderr: &str) -> E2eResult<Value> {
    if exited_ok {
        return parse_result(stdout);
    }
    match result_line(stdout).and_then(|line| serde_json::from_str::<ScriptResult>(line).ok()) {
        Some(ScriptResult { success: false, error, .. }) => Err(E2eError::Playwright(
            error.unwrap_or_else(|| "unknown error".to_string()),
        )),
        _ => Err(E2eError::Playwright(format!(
            "Script failed:\nstdout: {}\nstderr: {}",
            stdout, stderr
        ))),
    }
}

/// Read the last JSON line a script printed
fn parse_result(stdout: &str) -> E2eResult<Value> {
    let line = result_line(stdout)
        .ok_or_else(|| E2eError::Playwright(format!("No result in script output: {}", stdout)))?;

    let result: ScriptResult = serde_json::from_str(line)?;
    if !result.success {
        return Err(E2eError::Playwright(
            result.error.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    Ok(result.value)
}
