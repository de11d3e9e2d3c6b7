//! Browser executor - wraps agent-browser CLI
//!
//! Provides async interface to agent-browser commands.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use url::Url;

use crate::core::config::BrowserConfig;
use crate::core::{PilotError, Result, ToolResult};
use crate::tools::browser::snapshot::Snapshot;

const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

/// Executor for browser automation via agent-browser CLI
pub struct BrowserExecutor {
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
    /// Per-command timeout
    timeout: Duration,
    /// Value forwarded as ANONYMIZED_TELEMETRY
    telemetry: bool,
}

impl BrowserExecutor {
    /// Create a new browser executor
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            headed: false,
            timeout: Duration::from_millis(30000),
            telemetry: true,
        }
    }

    /// Create an executor from browser settings
    pub fn from_config(config: &BrowserConfig, telemetry: bool) -> Self {
        Self {
            session_name: config.session_name.clone(),
            headed: config.headed,
            timeout: Duration::from_millis(config.timeout_ms),
            telemetry,
        }
    }

    /// Check if agent-browser is installed
    pub async fn is_available() -> bool {
        Command::new("agent-browser")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Check that agent-browser launches, retrying with a delay between attempts
    pub async fn ensure_available(retries: u32, delay: Duration) -> Result<()> {
        let attempts = retries.max(1);
        for attempt in 1..=attempts {
            if Self::is_available().await {
                return Ok(());
            }
            if attempt < attempts {
                tracing::warn!(
                    "agent-browser not reachable (attempt {}/{}), retrying in {:?}",
                    attempt,
                    attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
        Err(PilotError::AgentBrowserNotFound)
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("agent-browser");
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        cmd.args(args);
        cmd.env(
            "ANONYMIZED_TELEMETRY",
            if self.telemetry { "true" } else { "false" },
        );
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!("agent-browser {}", args.join(" "));

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                PilotError::browser(format!(
                    "agent-browser {} timed out after {:?}",
                    args.first().copied().unwrap_or_default(),
                    self.timeout
                ))
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PilotError::AgentBrowserNotFound
                } else {
                    PilotError::browser(format!("Failed to run agent-browser: {}", e))
                }
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(PilotError::browser(format!(
                "agent-browser command failed: {}",
                stderr.trim()
            )))
        }
    }

    /// Run a command and return JSON output
    async fn run_json_command(&self, args: &[&str]) -> Result<String> {
        let mut full_args: Vec<&str> = args.to_vec();
        full_args.push("--json");
        self.run_command(&full_args).await
    }

    /// Interactive snapshot rendered for the model
    async fn page_summary(&self) -> Result<String> {
        let output = self.run_json_command(&["snapshot", "-i"]).await?;
        Ok(match serde_json::from_str::<Snapshot>(&output) {
            Ok(snapshot) => snapshot.format_for_display(),
            Err(_) => output,
        })
    }

    /// Navigate to a URL
    pub async fn open(&self, url: &str) -> Result<ToolResult> {
        let url = normalize_url(url)?;
        self.run_command(&["open", url.as_str()]).await?;

        // Best effort; slow pages still return a usable snapshot
        if let Err(e) = self.run_command(&["wait", "--load", "networkidle"]).await {
            tracing::debug!("wait for network idle failed: {}", e);
        }

        let summary = self.page_summary().await?;
        Ok(ToolResult::success(
            "go_to_url",
            format!("Navigated to {}.\n{}", url, summary),
        ))
    }

    /// Run a Google search for the query
    pub async fn search_google(&self, query: &str) -> Result<ToolResult> {
        let url = google_search_url(query)?;
        let mut result = self.open(url.as_str()).await?;
        result.tool_name = "search_google".to_string();
        Ok(result)
    }

    /// Go back in history
    pub async fn back(&self) -> Result<ToolResult> {
        self.run_command(&["back"]).await?;
        let summary = self.page_summary().await?;
        Ok(ToolResult::success(
            "go_back",
            format!("Went back.\n{}", summary),
        ))
    }

    /// Open a URL in a new tab; the new tab becomes active
    pub async fn open_tab(&self, url: &str) -> Result<ToolResult> {
        let url = normalize_url(url)?;
        self.run_command(&["tab", "new", url.as_str()]).await?;

        let summary = self.page_summary().await?;
        Ok(ToolResult::success(
            "open_tab",
            format!("Opened new tab at {}.\n{}", url, summary),
        ))
    }

    /// Switch to a tab by index
    pub async fn switch_tab(&self, index: u32) -> Result<ToolResult> {
        let index = index.to_string();
        self.run_command(&["tab", &index]).await?;

        let summary = self.page_summary().await?;
        Ok(ToolResult::success(
            "switch_tab",
            format!("Switched to tab {}.\n{}", index, summary),
        ))
    }

    /// Click an element by ref
    pub async fn click(&self, ref_id: &str) -> Result<ToolResult> {
        let ref_id = element_ref(ref_id);
        self.run_command(&["click", &ref_id]).await?;

        let summary = self.page_summary().await?;
        Ok(ToolResult::success(
            "click_element",
            format!("Clicked {}.\n{}", ref_id, summary),
        ))
    }

    /// Fill an input field
    pub async fn fill(&self, ref_id: &str, text: &str) -> Result<ToolResult> {
        let ref_id = element_ref(ref_id);
        self.run_command(&["fill", &ref_id, text]).await?;

        Ok(ToolResult::success(
            "input_text",
            format!("Filled {} with '{}'", ref_id, text),
        ))
    }

    /// Press a key
    pub async fn press(&self, key: &str) -> Result<ToolResult> {
        self.run_command(&["press", key]).await?;
        let summary = self.page_summary().await?;
        Ok(ToolResult::success(
            "press_key",
            format!("Pressed {}.\n{}", key, summary),
        ))
    }

    /// Scroll the page
    pub async fn scroll(&self, direction: &str, pixels: Option<u32>) -> Result<ToolResult> {
        let mut args = vec!["scroll", direction];
        let px_str;

        if let Some(px) = pixels {
            px_str = px.to_string();
            args.push(&px_str);
        }

        self.run_command(&args).await?;
        Ok(ToolResult::success(
            "scroll",
            format!("Scrolled {}", direction),
        ))
    }

    /// Get text from an element
    pub async fn get_text(&self, ref_id: &str) -> Result<ToolResult> {
        let ref_id = element_ref(ref_id);
        let output = self.run_command(&["get", "text", &ref_id]).await?;

        Ok(ToolResult::success("get_text", output.trim()))
    }

    /// Full page snapshot with current URL and title
    pub async fn extract_content(&self) -> Result<ToolResult> {
        let url = self.run_command(&["get", "url"]).await?;
        let title = self.run_command(&["get", "title"]).await?;
        let output = self.run_json_command(&["snapshot"]).await?;

        let body = match serde_json::from_str::<Snapshot>(&output) {
            Ok(snapshot) => snapshot
                .raw_tree()
                .map(str::to_string)
                .unwrap_or_else(|| snapshot.format_for_display()),
            Err(_) => output,
        };

        Ok(ToolResult::success(
            "extract_page_content",
            format!("Page: {} ({})\n{}", title.trim(), url.trim(), body),
        ))
    }

    /// Close the browser
    pub async fn close(&self) -> Result<()> {
        self.run_command(&["close"]).await?;
        Ok(())
    }
}

/// Element refs are passed to agent-browser with an `@` prefix
fn element_ref(ref_id: &str) -> String {
    let trimmed = ref_id.trim();
    if trimmed.starts_with('@') {
        trimmed.to_string()
    } else {
        format!("@{}", trimmed)
    }
}

/// Parse a navigation target, defaulting to https when no scheme is given
pub fn normalize_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PilotError::browser("No URL given"));
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    Url::parse(&candidate).map_err(|e| PilotError::browser(format!("Invalid URL '{}': {}", raw, e)))
}

/// Google results page for a query
pub fn google_search_url(query: &str) -> Result<Url> {
    let query = query.trim();
    if query.is_empty() {
        return Err(PilotError::browser("Empty search query"));
    }
    Url::parse_with_params(GOOGLE_SEARCH_URL, &[("q", query)])
        .map_err(|e| PilotError::browser(format!("Invalid search URL: {}", e)))
}
