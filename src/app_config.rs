use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module holds the backend configuration: which variant to run
/// (local CLI or remote API), which model tier, and the credential.
/// Environment variable that supplies the remote API credential
pub const API_KEY_ENV_VAR: &str = "GOOGLE_API_KEY";

/// Default number of concurrent backend calls per batch
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 5;

/// Backend variant selected at startup
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Local `gemini` CLI subprocess, no credential required
    Cli,
    /// Remote generative-language HTTP API
    #[default]
    Api,
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::Api => write!(f, "api"),
        }
    }
}

/// Model tier to request from the backend
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Fast, cheaper model
    #[default]
    Fast,
    /// Higher-quality, slower model
    Quality,
}

impl ModelTier {
    /// Concrete model name for this tier
    pub fn model_name(&self) -> &'static str {
        match self {
            Self::Fast => "gemini-2.0-flash",
            Self::Quality => "gemini-2.5-pro",
        }
    }
}

impl std::str::FromStr for ModelTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fast" | "flash" => Ok(Self::Fast),
            "quality" | "pro" => Ok(Self::Quality),
            _ => Err(anyhow!("Invalid model tier: {}", s)),
        }
    }
}

/// Configuration for constructing a translation backend.
///
/// Immutable once the backend has been built from it.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct BackendConfig {
    /// Which backend variant to construct
    pub mode: BackendMode,

    /// Which model tier to use
    #[serde(default)]
    pub model_tier: ModelTier,

    /// Remote API credential; unused in CLI mode
    #[serde(default)]
    pub api_key: Option<String>,
}

impl BackendConfig {
    /// Configuration for the local CLI variant
    pub fn cli(model_tier: ModelTier) -> Self {
        Self {
            mode: BackendMode::Cli,
            model_tier,
            api_key: None,
        }
    }

    /// Configuration for the remote API variant
    pub fn api(model_tier: ModelTier, api_key: impl Into<String>) -> Self {
        Self {
            mode: BackendMode::Api,
            model_tier,
            api_key: Some(api_key.into()),
        }
    }

    /// Resolved model name for the configured tier
    pub fn model_name(&self) -> &'static str {
        self.model_tier.model_name()
    }

    /// Validate the configuration before constructing a backend
    pub fn validate(&self) -> Result<()> {
        if self.mode == BackendMode::Api
            && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(anyhow!(
                "API mode requires a credential; pass --api-key or set {}",
                API_KEY_ENV_VAR
            ));
        }
        Ok(())
    }
}
