/*!
 * Document format handling.
 *
 * Each supported format has its own module with a segmenter, a write-back
 * path and an async `translate_file` driver. The `TranslationEngine` detects
 * the format from the file extension and dispatches to the right driver; all
 * drivers funnel their units through the same batch orchestrator so ordering
 * and concurrency behave identically across formats.
 */

use anyhow::{anyhow, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::DEFAULT_CONCURRENT_REQUESTS;
use crate::backend::TranslationBackend;
use crate::batch::BatchTranslator;
use crate::errors::DocumentError;
use crate::file_utils::FileManager;
use crate::progress::{NullObserver, TranslationObserver};

pub mod docx;
pub mod epub;
pub mod markdown;
pub mod pdf;

/// Supported document formats, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Markdown text file
    Markdown,
    /// Office Open XML word processing document
    Docx,
    /// EPUB electronic publication
    Epub,
    /// Portable Document Format, handled via DOCX conversion
    Pdf,
}

impl DocumentFormat {
    /// Detect the format of a file from its extension, case-insensitively
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "docx" => Ok(Self::Docx),
            "epub" => Ok(Self::Epub),
            "pdf" => Ok(Self::Pdf),
            other => Err(DocumentError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Markdown => write!(f, "Markdown"),
            Self::Docx => write!(f, "DOCX"),
            Self::Epub => write!(f, "EPUB"),
            Self::Pdf => write!(f, "PDF"),
        }
    }
}

/// Engine tying a backend, a target language and the batch orchestrator to
/// the per-format drivers
pub struct TranslationEngine {
    /// The backend used for every unit
    backend: Arc<dyn TranslationBackend>,
    /// Human-readable target language, passed verbatim into the prompt
    target_language: String,
    /// Concurrency width for the batch orchestrator
    max_concurrent_requests: usize,
    /// Progress sink shared across batches
    observer: Arc<dyn TranslationObserver>,
}

impl TranslationEngine {
    /// Create an engine with the default concurrency and no progress sink
    pub fn new(backend: Arc<dyn TranslationBackend>, target_language: impl Into<String>) -> Self {
        Self {
            backend,
            target_language: target_language.into(),
            max_concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
            observer: Arc::new(NullObserver),
        }
    }

    /// Override the concurrency width
    pub fn with_concurrency(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests.max(1);
        self
    }

    /// Attach a progress sink
    pub fn with_observer(mut self, observer: Arc<dyn TranslationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The configured target language
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Translate a document file and write the translated sibling file.
    ///
    /// Returns the path of the written output. Nothing is written when any
    /// unit fails.
    pub async fn translate_file(&self, input: &Path) -> Result<PathBuf> {
        if !FileManager::file_exists(input) {
            return Err(anyhow!("Input file not found: {}", input.display()));
        }

        let format = DocumentFormat::from_path(input)?;
        info!(
            "Translating {} ({}) into {} via {}",
            input.display(),
            format,
            self.target_language,
            self.backend.name()
        );

        match format {
            DocumentFormat::Markdown => markdown::translate_file(self, input).await,
            DocumentFormat::Docx => docx::translate_file(self, input).await,
            DocumentFormat::Epub => epub::translate_file(self, input).await,
            DocumentFormat::Pdf => pdf::translate_file(self, input).await,
        }
    }

    /// Surface a non-fatal condition to both the log and the observer
    fn warn(&self, message: &str) {
        warn!("{}", message);
        self.observer.on_warning(message);
    }

    /// Run one ordered batch of units through the backend
    pub async fn translate_units(&self, units: &[String]) -> Result<Vec<String>> {
        BatchTranslator::new(Arc::clone(&self.backend))
            .with_concurrency(self.max_concurrent_requests)
            .translate_many(units, &self.target_language, Arc::clone(&self.observer))
            .await
    }
}
