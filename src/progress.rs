/*!
 * Progress reporting seam between the engine and the user interface.
 *
 * The engine reports per-unit lifecycle events through the TranslationObserver
 * trait and performs no console output itself; the binary wires an indicatif
 * progress bar to this trait.
 */

use std::sync::atomic::{AtomicUsize, Ordering};

/// Observer for translation progress events.
///
/// Callbacks may be invoked from any worker; `on_unit_done` fires exactly once
/// per completed unit, in completion order, not input order.
pub trait TranslationObserver: Send + Sync {
    /// A batch of `total` units is about to be dispatched
    fn on_batch_started(&self, _total: usize) {}

    /// One unit finished translating
    fn on_unit_done(&self) {}

    /// A non-fatal condition worth surfacing to the user
    fn on_warning(&self, _message: &str) {}
}

/// Observer that ignores all events
#[derive(Debug, Default)]
pub struct NullObserver;

impl TranslationObserver for NullObserver {}

/// Observer that counts completions, used by tests and dry runs
#[derive(Debug, Default)]
pub struct CountingObserver {
    completed: AtomicUsize,
    warnings: AtomicUsize,
}

impl CountingObserver {
    /// Create a new counting observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of units reported done so far
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Number of warnings reported so far
    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::SeqCst)
    }
}

impl TranslationObserver for CountingObserver {
    fn on_unit_done(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_warning(&self, _message: &str) {
        self.warnings.fetch_add(1, Ordering::SeqCst);
    }
}
