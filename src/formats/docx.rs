/*!
 * DOCX segmentation and reassembly.
 *
 * A DOCX file is a zip package whose main part is `word/document.xml`.
 * Paragraphs (`w:p`) are located by byte range in the raw XML so untouched
 * paragraphs and every other package entry round-trip byte-for-byte.
 * Write-back keeps the paragraph properties (`w:pPr`) and replaces all runs
 * with a single run carrying the translated text; run-level formatting inside
 * a translated paragraph is not preserved (documented limitation).
 */

use anyhow::Result;
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::TranslationEngine;
use crate::errors::DocumentError;
use crate::file_utils::FileManager;

/// Package entry holding the document body
const DOCUMENT_PART: &str = "word/document.xml";

/// Byte-range reference to one `w:p` element in the raw XML
#[derive(Debug, Clone)]
struct ParagraphRef {
    /// Offset of the opening `<w:p>` tag
    start: usize,
    /// Offset just past the closing `</w:p>` tag
    end: usize,
    /// Offset just past the opening tag, where children begin
    open_end: usize,
    /// Byte range of the `w:pPr` subtree, kept on write-back
    properties: Option<(usize, usize)>,
    /// Concatenated `w:t` text of all runs
    text: String,
    /// Whether the paragraph lives inside a table cell
    in_table: bool,
}

/// A parsed DOCX body with paragraph references into the raw XML
#[derive(Debug)]
pub struct DocxDocument {
    xml: String,
    paragraphs: Vec<ParagraphRef>,
}

impl DocxDocument {
    /// Read the document body out of a DOCX package
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocumentError::Parse(format!("not a DOCX package: {}", e)))?;

        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| DocumentError::Parse(format!("missing {}: {}", DOCUMENT_PART, e)))?
            .read_to_string(&mut xml)
            .map_err(|e| DocumentError::Parse(format!("unreadable {}: {}", DOCUMENT_PART, e)))?;

        Self::parse_xml(xml)
    }

    /// Parse a raw `word/document.xml` body
    pub fn parse_xml(xml: String) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(&xml);

        let mut paragraphs: Vec<ParagraphRef> = Vec::new();
        let mut current: Option<ParagraphRef> = None;
        let mut properties_start: Option<usize> = None;
        let mut table_depth = 0usize;
        let mut in_text = false;
        let mut last_pos = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| DocumentError::Parse(format!("invalid OOXML: {}", e)))?;
            let pos = reader.buffer_position() as usize;

            match event {
                Event::Eof => break,
                Event::Start(e) => match e.name().as_ref() {
                    b"w:tbl" => table_depth += 1,
                    b"w:p" => {
                        current = Some(ParagraphRef {
                            start: last_pos,
                            end: pos,
                            open_end: pos,
                            properties: None,
                            text: String::new(),
                            in_table: table_depth > 0,
                        });
                    }
                    b"w:pPr" => {
                        if let Some(paragraph) = &current {
                            if paragraph.properties.is_none() {
                                properties_start = Some(last_pos);
                            }
                        }
                    }
                    b"w:t" => in_text = true,
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"w:p" => paragraphs.push(ParagraphRef {
                        start: last_pos,
                        end: pos,
                        open_end: pos,
                        properties: None,
                        text: String::new(),
                        in_table: table_depth > 0,
                    }),
                    b"w:pPr" => {
                        if let Some(paragraph) = &mut current {
                            if paragraph.properties.is_none() {
                                paragraph.properties = Some((last_pos, pos));
                            }
                        }
                    }
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                    b"w:pPr" => {
                        if let (Some(start), Some(paragraph)) = (properties_start.take(), current.as_mut()) {
                            if paragraph.properties.is_none() {
                                paragraph.properties = Some((start, pos));
                            }
                        }
                    }
                    b"w:t" => in_text = false,
                    b"w:p" => {
                        if let Some(mut paragraph) = current.take() {
                            paragraph.end = pos;
                            paragraphs.push(paragraph);
                        }
                    }
                    _ => {}
                },
                Event::Text(t) => {
                    if in_text {
                        if let Some(paragraph) = &mut current {
                            let text = t.unescape().map_err(|e| {
                                DocumentError::Parse(format!("invalid text node: {}", e))
                            })?;
                            paragraph.text.push_str(&text);
                        }
                    }
                }
                _ => {}
            }

            last_pos = pos;
        }

        debug!("Parsed DOCX body with {} paragraphs", paragraphs.len());
        Ok(Self { xml, paragraphs })
    }

    /// Indices of translatable paragraphs: body paragraphs in document order,
    /// then table-cell paragraphs in document order
    fn unit_indices(&self) -> Vec<usize> {
        let qualifies = |p: &ParagraphRef| !p.text.trim().is_empty();

        let body = self
            .paragraphs
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.in_table && qualifies(p));
        let table = self
            .paragraphs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.in_table && qualifies(p));

        body.chain(table).map(|(i, _)| i).collect()
    }

    /// Texts to submit for translation, aligned with `unit_indices`
    pub fn unit_texts(&self) -> Vec<String> {
        self.unit_indices()
            .into_iter()
            .map(|i| self.paragraphs[i].text.clone())
            .collect()
    }

    /// All paragraph texts in document order, for inspection and tests
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.paragraphs.iter().map(|p| p.text.clone()).collect()
    }

    /// Rebuild the body XML with translated texts written back in unit order
    pub fn rewrite(&self, translated: &[String]) -> Result<String, DocumentError> {
        let indices = self.unit_indices();
        if translated.len() != indices.len() {
            return Err(DocumentError::Serialize(format!(
                "translated unit count mismatch: expected {}, got {}",
                indices.len(),
                translated.len()
            )));
        }

        let mut replacements: Vec<Option<&str>> = vec![None; self.paragraphs.len()];
        for (unit, paragraph_index) in indices.into_iter().enumerate() {
            replacements[paragraph_index] = Some(translated[unit].as_str());
        }

        let mut output = String::with_capacity(self.xml.len());
        let mut cursor = 0usize;

        for (index, paragraph) in self.paragraphs.iter().enumerate() {
            output.push_str(&self.xml[cursor..paragraph.start]);

            match replacements[index] {
                Some(text) if paragraph.end > paragraph.open_end => {
                    output.push_str(&self.xml[paragraph.start..paragraph.open_end]);
                    if let Some((start, end)) = paragraph.properties {
                        output.push_str(&self.xml[start..end]);
                    }
                    output.push_str("<w:r><w:t xml:space=\"preserve\">");
                    output.push_str(&quick_xml::escape::escape(text));
                    output.push_str("</w:t></w:r></w:p>");
                }
                _ => output.push_str(&self.xml[paragraph.start..paragraph.end]),
            }

            cursor = paragraph.end;
        }
        output.push_str(&self.xml[cursor..]);

        Ok(output)
    }
}

/// Rebuild the DOCX package with a replacement document body, copying every
/// other entry verbatim
pub fn rebuild_package(input: &[u8], body_xml: &str) -> Result<Vec<u8>, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(input))
        .map_err(|e| DocumentError::Parse(format!("not a DOCX package: {}", e)))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| DocumentError::Serialize(e.to_string()))?;

        if entry.name() == DOCUMENT_PART {
            writer
                .start_file(
                    DOCUMENT_PART,
                    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
                )
                .map_err(|e| DocumentError::Serialize(e.to_string()))?;
            writer
                .write_all(body_xml.as_bytes())
                .map_err(|e| DocumentError::Serialize(e.to_string()))?;
        } else {
            writer
                .raw_copy_file(entry)
                .map_err(|e| DocumentError::Serialize(e.to_string()))?;
        }
    }

    let cursor = writer
        .finish()
        .map_err(|e| DocumentError::Serialize(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Write a minimal DOCX package with one paragraph per given text.
///
/// Used by the PDF conversion step and by tests that need a fixture.
pub fn write_minimal_docx(paragraphs: &[String]) -> Result<Vec<u8>, DocumentError> {
    const CONTENT_TYPES: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
</Types>";
    const RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>\
</Relationships>";

    let mut body = String::new();
    for text in paragraphs {
        body.push_str("<w:p><w:r><w:t xml:space=\"preserve\">");
        body.push_str(&quick_xml::escape::escape(text));
        body.push_str("</w:t></w:r></w:p>");
    }
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
<w:body>{}</w:body></w:document>",
        body
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", RELS),
        (DOCUMENT_PART, document.as_str()),
    ] {
        writer
            .start_file(name, options)
            .map_err(|e| DocumentError::Serialize(e.to_string()))?;
        writer
            .write_all(content.as_bytes())
            .map_err(|e| DocumentError::Serialize(e.to_string()))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| DocumentError::Serialize(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Translate a DOCX file and write the sibling output file
pub async fn translate_file(engine: &TranslationEngine, input: &Path) -> Result<PathBuf> {
    let bytes = FileManager::read_bytes(input)?;
    let document = DocxDocument::from_bytes(&bytes)?;

    let translated = engine.translate_units(&document.unit_texts()).await?;
    let body_xml = document.rewrite(&translated)?;
    let package = rebuild_package(&bytes, &body_xml)?;

    let output_path = FileManager::translated_output_path(input, "docx");
    FileManager::write_bytes(&output_path, &package)?;
    Ok(output_path)
}
