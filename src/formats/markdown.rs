/*!
 * Markdown segmentation and reassembly.
 *
 * The raw content is split by a single pattern that isolates fenced code
 * blocks, front-matter blocks and inline code spans as structural spans kept
 * verbatim with their delimiters; everything else is split on blank-line
 * boundaries into paragraph-level translation units.
 */

use anyhow::{anyhow, Result};
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};

use super::TranslationEngine;
use crate::file_utils::FileManager;

/// Pattern isolating code fences, front-matter style blocks and inline code
const STRUCTURAL_PATTERN: &str = r"(?s)```.*?```|---.*?---|`[^`\n]+`";

/// One piece of a translatable block
#[derive(Debug, Clone, PartialEq)]
enum Piece {
    /// Whitespace-only paragraph kept verbatim
    Keep(String),
    /// Index into the unit list
    Unit(usize),
}

/// One top-level segment of the document
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Structural span kept byte-for-byte, delimiters included
    Keep(String),
    /// Block of paragraphs rejoined with a blank line on reassembly
    Paragraphs(Vec<Piece>),
}

/// A segmented Markdown document ready for translation write-back
#[derive(Debug)]
pub struct MarkdownDocument {
    segments: Vec<Segment>,
    units: Vec<String>,
}

impl MarkdownDocument {
    /// Segment raw Markdown content into structural spans and units
    pub fn parse(content: &str) -> Self {
        let pattern = Regex::new(STRUCTURAL_PATTERN).expect("structural pattern must compile");

        let mut segments = Vec::new();
        let mut units = Vec::new();
        let mut cursor = 0;

        for matched in pattern.find_iter(content) {
            if matched.start() > cursor {
                Self::push_paragraphs(&content[cursor..matched.start()], &mut segments, &mut units);
            }
            segments.push(Segment::Keep(matched.as_str().to_string()));
            cursor = matched.end();
        }
        if cursor < content.len() {
            Self::push_paragraphs(&content[cursor..], &mut segments, &mut units);
        }

        debug!(
            "Segmented markdown into {} segments, {} units",
            segments.len(),
            units.len()
        );

        Self { segments, units }
    }

    fn push_paragraphs(part: &str, segments: &mut Vec<Segment>, units: &mut Vec<String>) {
        if part.is_empty() {
            return;
        }

        let pieces = part
            .split("\n\n")
            .map(|paragraph| {
                if paragraph.trim().is_empty() {
                    Piece::Keep(paragraph.to_string())
                } else {
                    let index = units.len();
                    units.push(paragraph.to_string());
                    Piece::Unit(index)
                }
            })
            .collect();

        segments.push(Segment::Paragraphs(pieces));
    }

    /// Texts to submit for translation, in document order
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Rebuild the document with translated units in place of the originals
    pub fn reassemble(&self, translated: &[String]) -> Result<String> {
        if translated.len() != self.units.len() {
            return Err(anyhow!(
                "Translated unit count mismatch: expected {}, got {}",
                self.units.len(),
                translated.len()
            ));
        }

        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Keep(text) => output.push_str(text),
                Segment::Paragraphs(pieces) => {
                    let rendered: Vec<&str> = pieces
                        .iter()
                        .map(|piece| match piece {
                            Piece::Keep(text) => text.as_str(),
                            Piece::Unit(index) => translated[*index].as_str(),
                        })
                        .collect();
                    output.push_str(&rendered.join("\n\n"));
                }
            }
        }
        Ok(output)
    }
}

/// Translate a Markdown file and write the sibling output file
pub async fn translate_file(engine: &TranslationEngine, input: &Path) -> Result<PathBuf> {
    let content = FileManager::read_to_string(input)?;
    let document = MarkdownDocument::parse(&content);

    let translated = engine.translate_units(document.units()).await?;
    let output = document.reassemble(&translated)?;

    let extension = input
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "md".to_string());
    let output_path = FileManager::translated_output_path(input, &extension);
    FileManager::write_to_file(&output_path, &output)?;
    Ok(output_path)
}
