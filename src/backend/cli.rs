use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{build_prompt, TranslationBackend};
use crate::app_config::ModelTier;
use crate::errors::BackendError;

/// Name of the local translation CLI probed on PATH
pub const CLI_TOOL_NAME: &str = "gemini";

/// Wall-clock bound for a single CLI call, in seconds
const CALL_TIMEOUT_SECS: u64 = 120;

/// Backend variant that drives the local `gemini` CLI as a subprocess.
///
/// The prompt is passed as an argument and the text is piped through stdin;
/// a non-zero exit status is a backend failure carrying the process stderr.
#[derive(Debug, Clone)]
pub struct CliBackend {
    /// Executable to spawn; overridable for tests
    tool: String,
    /// Concrete model name passed via `-m`
    model: String,
}

impl CliBackend {
    /// Create a new CLI backend for the given model tier
    pub fn new(model_tier: ModelTier) -> Self {
        Self {
            tool: CLI_TOOL_NAME.to_string(),
            model: model_tier.model_name().to_string(),
        }
    }

    /// Create a CLI backend that spawns an arbitrary executable
    pub fn with_tool(tool: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            model: model.into(),
        }
    }
}

/// Check whether an executable is reachable through PATH
pub fn tool_available(name: &str) -> bool {
    find_in_path(name).is_some()
}

/// Check whether the local translation CLI is installed
pub fn cli_available() -> bool {
    tool_available(CLI_TOOL_NAME)
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[async_trait]
impl TranslationBackend for CliBackend {
    async fn translate_raw(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, BackendError> {
        let prompt = build_prompt(text, target_language);
        let start_time = Instant::now();

        let mut child = Command::new(&self.tool)
            .arg("-m")
            .arg(&self.model)
            .arg("-o")
            .arg("text")
            .arg(&prompt)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BackendError::Process(format!("failed to spawn {}: {}", self.tool, e)))?;

        // Write the text to stdin and close it so the tool sees EOF
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| BackendError::Process(format!("failed to write stdin: {}", e)))?;
        }

        let output = tokio::time::timeout(
            Duration::from_secs(CALL_TIMEOUT_SECS),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| BackendError::Timeout(CALL_TIMEOUT_SECS))?
        .map_err(|e| BackendError::Process(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(BackendError::Process(stderr));
        }

        debug!(
            "CLI translation completed in {:?} ({} chars in)",
            start_time.elapsed(),
            text.len()
        );

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn name(&self) -> &'static str {
        "gemini-cli"
    }
}
