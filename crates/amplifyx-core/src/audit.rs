//! Page performance audits.
//!
//! [`LighthouseAuditor`] drives the `lighthouse` CLI against a headless Chrome
//! and converts its JSON report into a [`PageSpeedReport`]. On unix the child
//! leads its own process group. When the timeout fires or the run fails, the
//! whole group is killed, so the Chrome instance lighthouse launched dies
//! along with it.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::types::PageSpeedReport;

/// Chrome flags passed through lighthouse
pub const CHROME_FLAGS: &str = "--headless --no-sandbox";

pub const DEFAULT_AUDIT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to launch lighthouse: {0}")]
    Launch(#[source] std::io::Error),

    #[error("failed to collect lighthouse output: {0}")]
    Io(#[source] std::io::Error),

    #[error("lighthouse did not finish within {0:?}")]
    Timeout(Duration),

    #[error("lighthouse exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("lighthouse returned no result")]
    NoResult,
}

/// Anything that can produce a performance report for a URL
#[async_trait]
pub trait PageAuditor: Send + Sync {
    async fn audit(&self, url: &str) -> Result<PageSpeedReport, AuditError>;
}

/// Runs the lighthouse CLI as a child process
#[derive(Debug, Clone)]
pub struct LighthouseAuditor {
    program: PathBuf,
    launcher_args: Vec<String>,
    chrome_path: Option<PathBuf>,
    timeout: Duration,
}

impl LighthouseAuditor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            launcher_args: Vec::new(),
            chrome_path: None,
            timeout: DEFAULT_AUDIT_TIMEOUT,
        }
    }

    /// Arguments placed before the URL, e.g. `["lighthouse"]` when the program is `npx`
    pub fn with_launcher_args(mut self, args: Vec<String>) -> Self {
        self.launcher_args = args;
        self
    }

    /// Chrome binary handed to lighthouse through `CHROME_PATH`
    pub fn with_chrome_path(mut self, path: Option<PathBuf>) -> Self {
        self.chrome_path = path;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, url: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.launcher_args)
            .arg(url)
            .arg("--output=json")
            .arg("--output-path=stdout")
            .arg("--only-categories=performance")
            .arg("--quiet")
            .arg(format!("--chrome-flags={}", CHROME_FLAGS))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        command.process_group(0);

        if let Some(chrome) = &self.chrome_path {
            command.env("CHROME_PATH", chrome);
        }

        command
    }
}

impl Default for LighthouseAuditor {
    fn default() -> Self {
        Self::new("lighthouse")
    }
}

#[async_trait]
impl PageAuditor for LighthouseAuditor {
    async fn audit(&self, url: &str) -> Result<PageSpeedReport, AuditError> {
        info!(url, program = %self.program.display(), "starting lighthouse audit");

        let child = self.command(url).spawn().map_err(AuditError::Launch)?;
        let group = child.id();

        // Dropping the wait future on timeout drops the child, which kills it.
        // Its descendants share the group and are killed separately.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                kill_process_group(group).await;
                return Err(AuditError::Io(e));
            }
            Err(_) => {
                kill_process_group(group).await;
                return Err(AuditError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            kill_process_group(group).await;
            return Err(AuditError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(url, bytes = output.stdout.len(), "lighthouse finished");
        parse_report(&output.stdout, url)
    }
}

/// SIGKILL every process left in the group led by `pgid`
#[cfg(unix)]
async fn kill_process_group(pgid: Option<u32>) {
    let Some(pgid) = pgid else {
        return;
    };

    let status = Command::new("kill")
        .arg("-KILL")
        .arg("--")
        .arg(format!("-{}", pgid))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => debug!(pgid, "killed lighthouse process group"),
        Ok(_) => debug!(pgid, "lighthouse process group already gone"),
        Err(e) => warn!(pgid, error = %e, "failed to kill lighthouse process group"),
    }
}

#[cfg(not(unix))]
async fn kill_process_group(_pgid: Option<u32>) {}

/// Convert a raw lighthouse JSON report into the API shape.
///
/// Empty output or anything that is not a JSON object is [`AuditError::NoResult`].
pub fn parse_report(raw: &[u8], requested_url: &str) -> Result<PageSpeedReport, AuditError> {
    let lhr: JsonValue = serde_json::from_slice(raw).map_err(|_| AuditError::NoResult)?;
    if !lhr.is_object() {
        return Err(AuditError::NoResult);
    }

    let text = |key: &str| lhr.get(key).and_then(JsonValue::as_str).map(str::to_string);

    let url = text("finalUrl")
        .or_else(|| text("finalDisplayedUrl"))
        .unwrap_or_else(|| requested_url.to_string());

    let performance_score = lhr
        .pointer("/categories/performance/score")
        .and_then(JsonValue::as_f64);

    Ok(PageSpeedReport {
        url,
        performance_score,
        fetch_time: text("fetchTime").unwrap_or_default(),
        audits: lhr
            .get("audits")
            .cloned()
            .unwrap_or_else(|| JsonValue::Object(Default::default())),
        lighthouse_version: text("lighthouseVersion").unwrap_or_default(),
    })
}
