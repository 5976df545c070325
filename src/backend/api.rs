use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{build_prompt, TranslationBackend};
use crate::app_config::BackendConfig;
use crate::errors::BackendError;

/// Default generative-language API endpoint
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Maximum number of attempts for transient failures
const MAX_ATTEMPTS: u32 = 20;

/// Base backoff in seconds, doubled per attempt
const BACKOFF_BASE_SECS: u64 = 4;

/// Backoff ceiling in seconds
const BACKOFF_CAP_SECS: u64 = 60;

/// Backend variant that calls the remote generative-language API.
///
/// Requires a credential at construction; transient failures (rate limiting,
/// temporary unavailability) are retried with capped exponential backoff, any
/// other failure propagates immediately.
pub struct ApiBackend {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Concrete model name
    model: String,
}

impl std::fmt::Debug for ApiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never include the credential in debug output
        f.debug_struct("ApiBackend")
            .field("model", &self.model)
            .finish()
    }
}

/// Generation request body
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    /// Conversation contents; a single user turn for translation
    contents: Vec<GenerateContent>,
}

/// One content turn in a request or response
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateContent {
    /// Text parts of this turn
    #[serde(default)]
    pub parts: Vec<GeneratePart>,
}

/// One text part
#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratePart {
    /// The actual text content
    pub text: String,
}

/// Generation response body
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    /// Candidate completions; the first one is used
    #[serde(default)]
    pub candidates: Vec<GenerateCandidate>,
}

/// One candidate completion
#[derive(Debug, Deserialize)]
pub struct GenerateCandidate {
    /// The content of the candidate
    pub content: GenerateContent,
}

impl GenerateRequest {
    /// Create a single-prompt request
    pub fn single_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![GenerateContent {
                parts: vec![GeneratePart {
                    text: prompt.into(),
                }],
            }],
        }
    }
}

/// Backoff delay before retry number `attempt` (0-based)
fn backoff_delay(attempt: u32) -> Duration {
    let secs = BACKOFF_BASE_SECS
        .saturating_mul(1u64 << attempt.min(8))
        .min(BACKOFF_CAP_SECS);
    Duration::from_secs(secs)
}

impl ApiBackend {
    /// Create a new API backend from configuration.
    ///
    /// Fails fast with a configuration error when no credential is present.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let api_key = match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key.to_string(),
            _ => {
                return Err(BackendError::Config(
                    "API mode requires a credential".to_string(),
                ))
            }
        };

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key,
            model: config.model_name().to_string(),
        })
    }

    /// Extract the concatenated candidate text from a response
    pub fn extract_text(response: &GenerateResponse) -> Result<String, BackendError> {
        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| BackendError::Parse("response contained no candidates".to_string()))?;

        let text: String = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();

        Ok(text.trim().to_string())
    }

    /// Issue one generateContent request, without retry handling
    async fn generate_once(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError> {
        let url = format!("{}/models/{}:generateContent", DEFAULT_ENDPOINT, self.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(BackendError::Api {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TranslationBackend for ApiBackend {
    async fn translate_raw(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, BackendError> {
        let request = GenerateRequest::single_prompt(build_prompt(text, target_language));

        let mut attempt = 0u32;
        loop {
            match self.generate_once(&request).await {
                Ok(response) => {
                    debug!("API translation succeeded on attempt {}", attempt + 1);
                    return Self::extract_text(&response);
                }
                Err(e) if e.is_transient() => {
                    attempt += 1;
                    if attempt >= MAX_ATTEMPTS {
                        return Err(BackendError::RateLimited {
                            attempts: attempt,
                            message: e.to_string(),
                        });
                    }
                    let delay = backoff_delay(attempt - 1);
                    warn!(
                        "Transient API error ({}), retrying in {:?} - attempt {}/{}",
                        e, delay, attempt, MAX_ATTEMPTS
                    );
                    tokio::time::sleep(delay).await;
                }
                // Non-transient failures propagate untried
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &'static str {
        "gemini-api"
    }
}
