// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use doctrans::app_config::{BackendConfig, ModelTier, API_KEY_ENV_VAR};
use doctrans::backend::api::ApiBackend;
use doctrans::backend::cli::{cli_available, CliBackend};
use doctrans::backend::TranslationBackend;
use doctrans::file_utils::FileManager;
use doctrans::progress::TranslationObserver;
use doctrans::{DocumentFormat, TranslationEngine};

/// CLI wrapper for ModelTier to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliModelTier {
    /// Fast, cheaper model (gemini-2.0-flash)
    #[value(alias = "flash")]
    Fast,
    /// Higher-quality, slower model (gemini-2.5-pro)
    #[value(alias = "quality")]
    Pro,
}

impl From<CliModelTier> for ModelTier {
    fn from(tier: CliModelTier) -> Self {
        match tier {
            CliModelTier::Fast => ModelTier::Fast,
            CliModelTier::Pro => ModelTier::Quality,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// doctrans - Structured document translation
///
/// Translates Markdown, DOCX, EPUB and PDF documents with Gemini models
/// while preserving document structure. Output is written next to the input
/// with a `_translated` suffix.
#[derive(Parser, Debug)]
#[command(name = "doctrans")]
#[command(version = "1.0.0")]
#[command(about = "Translate structured documents with Gemini")]
#[command(long_about = "doctrans translates Markdown, DOCX, EPUB and PDF documents while keeping
code blocks, formatting, markup and packaging intact.

EXAMPLES:
    doctrans report.md                          # Translate to Traditional Chinese
    doctrans -t French book.epub                # Translate an EPUB to French
    doctrans -m pro thesis.docx                 # Use the higher-quality model
    doctrans --api-key KEY paper.pdf            # Force a specific API credential
    doctrans -c 10 large.md                     # Raise the concurrency width

BACKENDS:
    When the `gemini` CLI is installed on PATH it is used directly and no
    credential is needed. Otherwise the remote API is used with the key from
    --api-key, the GOOGLE_API_KEY environment variable, or an interactive
    prompt, in that order.")]
struct CommandLineOptions {
    /// Input document to translate
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Target language, passed verbatim to the model
    #[arg(short, long, default_value = "Traditional Chinese")]
    target_language: String,

    /// Model tier to use
    #[arg(short, long, value_enum, default_value = "fast")]
    model: CliModelTier,

    /// API key for the remote backend
    #[arg(long, env = API_KEY_ENV_VAR, hide_env_values = true)]
    api_key: Option<String>,

    /// Maximum number of concurrent translation requests
    #[arg(short, long, default_value_t = 5)]
    concurrency: usize,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Progress bar bridged onto the engine's observer seam
struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl TranslationObserver for ProgressObserver {
    fn on_batch_started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} units",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
        );
        self.bar
            .set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn on_unit_done(&self) {
        self.bar.inc(1);
    }

    fn on_warning(&self, message: &str) {
        self.bar.println(format!("Warning: {}", message));
    }
}

/// Ask for the API credential interactively as a last resort
fn prompt_for_api_key() -> Result<String> {
    eprint!("Enter your Google API key: ");
    std::io::stderr().flush()?;

    let mut key = String::new();
    std::io::stdin().read_line(&mut key)?;
    let key = key.trim().to_string();

    if key.is_empty() {
        return Err(anyhow!(
            "No API key provided; pass --api-key or set {}",
            API_KEY_ENV_VAR
        ));
    }
    Ok(key)
}

/// Pick the backend: local CLI when installed, remote API otherwise
fn select_backend(cli: &CommandLineOptions) -> Result<Arc<dyn TranslationBackend>> {
    let tier = ModelTier::from(cli.model);

    if cli_available() {
        info!("Using local gemini CLI backend ({})", tier.model_name());
        return Ok(Arc::new(CliBackend::new(tier)));
    }

    let api_key = match cli.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => key.to_string(),
        _ => prompt_for_api_key()?,
    };

    let config = BackendConfig::api(tier, api_key);
    config.validate()?;
    info!("Using remote API backend ({})", config.model_name());
    Ok(Arc::new(ApiBackend::new(&config)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CommandLineOptions::parse();

    let level = cli.log_level.map(LevelFilter::from).unwrap_or(LevelFilter::Info);
    CustomLogger::init(level)?;

    // Validate the input before any credential handling
    if !FileManager::file_exists(&cli.input) {
        return Err(anyhow!("Input file not found: {}", cli.input.display()));
    }
    DocumentFormat::from_path(&cli.input)?;

    let backend = select_backend(&cli)?;
    let observer = Arc::new(ProgressObserver::new());
    let shared: Arc<dyn TranslationObserver> = observer.clone();

    let engine = TranslationEngine::new(backend, cli.target_language.clone())
        .with_concurrency(cli.concurrency)
        .with_observer(shared);

    let output = engine.translate_file(&cli.input).await?;
    observer.finish();

    info!("Translation written to {}", output.display());
    Ok(())
}
