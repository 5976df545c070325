/*!
 * Backend implementations for the translation capability.
 *
 * This module contains the two interchangeable backend variants:
 * - CLI: local `gemini` command-line tool driven as a subprocess
 * - API: remote generative-language HTTP endpoint
 *
 * The orchestrator holds the active variant as an opaque
 * `Arc<dyn TranslationBackend>` and never branches on its kind.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::BackendError;

/// Build the translation instruction prompt.
///
/// The instruction text is backend-agnostic and must stay identical between
/// variants so output style does not depend on backend selection.
pub fn build_prompt(text: &str, target_language: &str) -> String {
    format!(
        "Translate the following text into {}. \
         Maintain the original tone and style. \
         Do not add any explanations or extra text. \
         Just provide the translation.\n\n\
         Text: {}",
        target_language, text
    )
}

/// Common trait for all translation backends
///
/// This trait defines the interface that both backend variants implement,
/// allowing them to be used interchangeably by the batch orchestrator.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Translate one non-empty string into the target language
    async fn translate_raw(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, BackendError>;

    /// Translate one string into the target language.
    ///
    /// Empty or whitespace-only input short-circuits to the input unchanged
    /// without invoking the underlying variant.
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, BackendError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        self.translate_raw(text, target_language).await
    }

    /// Human-readable backend name for logging
    fn name(&self) -> &'static str;
}

pub mod api;
pub mod cli;
pub mod mock;
