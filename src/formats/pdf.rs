/*!
 * PDF handling via DOCX conversion.
 *
 * There is no reliable way to write translated text back into an arbitrary
 * PDF, so the extracted text is converted into a sibling DOCX file which is
 * then translated by the DOCX pipeline. The intermediate file is left on disk
 * next to the input.
 */

use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use super::{docx, TranslationEngine};
use crate::errors::DocumentError;
use crate::file_utils::FileManager;

/// Split extracted page text into paragraph candidates
fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect()
}

/// Extract the text of a PDF and build a minimal DOCX package from it
pub fn convert_to_docx(input: &Path) -> Result<Vec<u8>, DocumentError> {
    let text = pdf_extract::extract_text(input)
        .map_err(|e| DocumentError::Conversion(format!("{}: {}", input.display(), e)))?;
    docx::write_minimal_docx(&split_paragraphs(&text))
}

/// Translate a PDF by converting it to DOCX first, then delegating to the
/// DOCX pipeline. The output is the translated sibling of the intermediate.
pub async fn translate_file(engine: &TranslationEngine, input: &Path) -> Result<PathBuf> {
    let intermediate = FileManager::sibling_with_extension(input, "docx");
    if FileManager::file_exists(&intermediate) {
        engine.warn(&format!(
            "Overwriting existing intermediate file {}",
            intermediate.display()
        ));
    }

    // Conversion happens before any backend call is made
    let package = convert_to_docx(input)?;
    FileManager::write_bytes(&intermediate, &package)?;
    info!(
        "Converted {} to {} for translation",
        input.display(),
        intermediate.display()
    );

    docx::translate_file(engine, &intermediate).await
}
