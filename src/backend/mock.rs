/*!
 * Mock backend implementations for testing.
 *
 * This module provides mock backends that simulate different behaviors:
 * - `MockBackend::identity()` - returns the input unchanged
 * - `MockBackend::prefixing()` - prefixes `[TR:<lang>]` to the input
 * - `MockBackend::failing()` - always fails with an error
 * - `MockBackend::fail_on_nth(n)` - fails on the nth call only
 */

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::TranslationBackend;
use crate::errors::BackendError;

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Return the input unchanged
    Identity,
    /// Prefix `[TR:<lang>] ` to the input
    Prefixing,
    /// Always fail with an API error
    Failing,
    /// Fail on the nth call (1-based), succeed otherwise
    FailOnNth(usize),
    /// Succeed after a text-dependent delay, to scramble completion order
    Scrambled {
        /// Upper bound for the simulated delay in milliseconds
        max_delay_ms: u64,
    },
}

/// Mock backend for exercising orchestrator and driver behavior
#[derive(Debug)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of calls that reached the variant
    call_count: Arc<AtomicUsize>,
    /// Every text submitted to the variant, in call order
    received: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Backend that translates every string to itself
    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    /// Backend that prefixes `[TR:<lang>] ` to its input
    pub fn prefixing() -> Self {
        Self::new(MockBehavior::Prefixing)
    }

    /// Backend that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Backend that fails on the nth call (1-based) only
    pub fn fail_on_nth(n: usize) -> Self {
        Self::new(MockBehavior::FailOnNth(n))
    }

    /// Backend with text-dependent completion delays
    pub fn scrambled(max_delay_ms: u64) -> Self {
        Self::new(MockBehavior::Scrambled { max_delay_ms })
    }

    /// Number of calls that reached the variant (short-circuits excluded)
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts submitted to the variant so far, in call order
    pub fn received_texts(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

impl Clone for MockBackend {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            call_count: Arc::clone(&self.call_count),
            received: Arc::clone(&self.received),
        }
    }
}

fn text_delay_ms(text: &str, max_delay_ms: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish() % max_delay_ms.max(1)
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn translate_raw(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, BackendError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.received.lock().unwrap().push(text.to_string());

        match self.behavior {
            MockBehavior::Identity => Ok(text.to_string()),

            MockBehavior::Prefixing => Ok(format!("[TR:{}] {}", target_language, text)),

            MockBehavior::Failing => Err(BackendError::Api {
                status_code: 500,
                message: "Simulated backend failure".to_string(),
            }),

            MockBehavior::FailOnNth(n) => {
                if count == n {
                    Err(BackendError::Api {
                        status_code: 500,
                        message: format!("Simulated failure on call #{}", count),
                    })
                } else {
                    Ok(text.to_string())
                }
            }

            MockBehavior::Scrambled { max_delay_ms } => {
                let delay = text_delay_ms(text, max_delay_ms);
                tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
                Ok(format!("[TR:{}] {}", target_language, text))
            }
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
