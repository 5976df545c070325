/*!
 * Batch translation processing.
 *
 * This module drives a list of pending strings through the backend with
 * bounded concurrency, per-call retries handled inside the backend, and
 * strict result-order preservation: results are collected by original index,
 * never by completion order.
 */

use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt};
use log::{debug, error};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::app_config::DEFAULT_CONCURRENT_REQUESTS;
use crate::backend::TranslationBackend;
use crate::progress::TranslationObserver;

/// Batch translator for processing translation units concurrently
pub struct BatchTranslator {
    /// The backend to use, opaque to this orchestrator
    backend: Arc<dyn TranslationBackend>,

    /// Maximum number of concurrent requests
    max_concurrent_requests: usize,
}

impl BatchTranslator {
    /// Create a new batch translator with the default concurrency width
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self {
            backend,
            max_concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
        }
    }

    /// Override the concurrency width
    pub fn with_concurrency(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests.max(1);
        self
    }

    /// Translate a batch of texts, preserving input order in the result.
    ///
    /// Every text is dispatched as an independent backend call under a
    /// bounded pool; `observer.on_unit_done` fires once per successful unit
    /// in completion order, never for a failed one. Returns after every unit
    /// has resolved. Any single unrecoverable failure fails the whole batch:
    /// callers must not write partial output.
    pub async fn translate_many(
        &self,
        texts: &[String],
        target_language: &str,
        observer: Arc<dyn TranslationObserver>,
    ) -> Result<Vec<String>> {
        // The backend is never invoked on an empty batch
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_requests));
        let total = texts.len();
        observer.on_batch_started(total);

        let start_time = Instant::now();

        let completions = stream::iter(texts.iter().cloned().enumerate())
            .map(|(index, text)| {
                let backend = Arc::clone(&self.backend);
                let semaphore = Arc::clone(&semaphore);
                let observer = Arc::clone(&observer);
                let target_language = target_language.to_string();

                async move {
                    // Acquire a permit from the semaphore
                    let _permit = semaphore.acquire().await.unwrap();

                    let result = backend.translate(&text, &target_language).await;
                    if result.is_ok() {
                        observer.on_unit_done();
                    }

                    (index, result)
                }
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        // Collect by original index into a pre-sized buffer
        let mut results: Vec<Option<String>> = vec![None; total];
        let mut errors = Vec::new();

        for (index, result) in completions {
            match result {
                Ok(translated) => {
                    results[index] = Some(translated);
                }
                Err(e) => {
                    errors.push(format!("Unit {} failed: {}", index + 1, e));
                }
            }
        }

        if !errors.is_empty() {
            let error_message = format!("Failed to translate batch: {}", errors.join("; "));
            error!("{}", error_message);
            return Err(anyhow!(error_message));
        }

        debug!(
            "Translated {} units in {:?} (width {})",
            total,
            start_time.elapsed(),
            self.max_concurrent_requests
        );

        // Every slot must be filled before the batch is released
        results
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or_else(|| anyhow!("Missing result for unit {}", index)))
            .collect()
    }
}
