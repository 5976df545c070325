/*!
 * # doctrans - Structured document translation
 *
 * A Rust library for translating structured documents while preserving their
 * structure, powered by the Gemini family of models.
 *
 * ## Features
 *
 * - Translate Markdown, DOCX, EPUB and PDF documents
 * - Keep code fences, inline code, front matter, markup and packaging intact
 * - Two interchangeable backends:
 *   - Local `gemini` CLI subprocess
 *   - Remote generative-language HTTP API with retry and backoff
 * - Bounded-concurrency batch translation with strict output ordering
 * - All-or-nothing output: a failed unit means no file is written
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Backend mode, model tier and credential configuration
 * - `backend`: The `TranslationBackend` trait and its implementations:
 *   - `backend::cli`: Local CLI subprocess backend
 *   - `backend::api`: Remote HTTP API backend
 *   - `backend::mock`: Deterministic backends for tests
 * - `batch`: Concurrent, order-preserving batch orchestrator
 * - `formats`: Per-format segmentation, write-back and drivers:
 *   - `formats::markdown`, `formats::docx`, `formats::epub`, `formats::pdf`
 * - `progress`: Observer seam between the engine and the user interface
 * - `file_utils`: File system operations and output path derivation
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod backend;
pub mod batch;
pub mod errors;
pub mod file_utils;
pub mod formats;
pub mod progress;

// Re-export main types for easier usage
pub use app_config::{BackendConfig, BackendMode, ModelTier};
pub use backend::TranslationBackend;
pub use batch::BatchTranslator;
pub use formats::{DocumentFormat, TranslationEngine};
pub use progress::TranslationObserver;
