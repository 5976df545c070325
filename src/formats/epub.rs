/*!
 * EPUB segmentation and reassembly.
 *
 * An EPUB is a zip package of XHTML content documents listed in an OPF
 * manifest. Text nodes outside non-prose containers (script, style, head,
 * title, meta, metadata) become translation units, addressed by byte range in
 * the raw markup so everything else round-trips untouched. The output package
 * keeps the `mimetype` entry first and uncompressed as the container format
 * requires.
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

const CONTAINER_PATH: &str = "META-INF/container.xml";
const MIMETYPE_PATH: &str = "mimetype";
const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";

/// Element names whose descendant text is never translated
const SKIPPED_CONTAINERS: [&[u8]; 6] = [
    b"script", b"style", b"head", b"title", b"meta", b"metadata",
];

/// Byte-range reference to one translatable text node
#[derive(Debug, Clone)]
struct TextNode {
    /// Offset of the raw text node in the item markup
    start: usize,
    /// Offset just past the raw text node
    end: usize,
    /// Unescaped, trimmed text submitted for translation
    text: String,
}

/// One content document of the package
#[derive(Debug)]
struct ContentItem {
    /// Entry name inside the package
    name: String,
    /// Raw markup of the entry
    markup: String,
    /// Translatable text nodes, in document order
    nodes: Vec<TextNode>,
}

/// A parsed EPUB with text-node references into each content document
#[derive(Debug)]
pub struct EpubDocument {
    items: Vec<ContentItem>,
    warnings: Vec<String>,
}

fn read_entry_string(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<String, DocumentError> {
    let mut content = String::new();
    archive
        .by_name(name)
        .map_err(|e| DocumentError::Parse(format!("missing {}: {}", name, e)))?
        .read_to_string(&mut content)
        .map_err(|e| DocumentError::Parse(format!("unreadable {}: {}", name, e)))?;
    Ok(content)
}

/// Extract the OPF path from `META-INF/container.xml`
fn rootfile_path(container: &str) -> Option<String> {
    let mut reader = Reader::from_str(container);
    loop {
        match reader.read_event().ok()? {
            Event::Eof => return None,
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() == b"rootfile" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"full-path" {
                            return attr.unescape_value().ok().map(|v| v.to_string());
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Content document names from the OPF manifest, in manifest order
fn manifest_items(opf: &str, opf_dir: &str) -> Vec<String> {
    let mut reader = Reader::from_str(opf);
    let mut names = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(_) => break,
        };
        match event {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"item" => {
                let mut href = None;
                let mut media_type = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"href" => href = attr.unescape_value().ok().map(|v| v.to_string()),
                        b"media-type" => {
                            media_type = attr.unescape_value().ok().map(|v| v.to_string())
                        }
                        _ => {}
                    }
                }
                if let (Some(href), Some(XHTML_MEDIA_TYPE)) = (href, media_type.as_deref()) {
                    if opf_dir.is_empty() {
                        names.push(href);
                    } else {
                        names.push(format!("{}/{}", opf_dir, href));
                    }
                }
            }
            _ => {}
        }
    }

    names
}

/// Fallback for packages with a missing or unreadable manifest
fn content_names_by_extension(archive: &ZipArchive<Cursor<&[u8]>>) -> Vec<String> {
    archive
        .file_names()
        .filter(|name| {
            let lower = name.to_ascii_lowercase();
            lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
        })
        .map(|name| name.to_string())
        .collect()
}

/// Whether a trimmed text node is worth translating
fn is_translatable(trimmed: &str) -> bool {
    trimmed.chars().count() >= 2 && !trimmed.chars().all(|c| c.is_ascii_digit())
}

/// Locate translatable text nodes in one content document.
///
/// The skip covers the whole subtree of a skipped container, not just its
/// direct text children.
fn segment_markup(markup: &str) -> Result<Vec<TextNode>, DocumentError> {
    let mut reader = Reader::from_str(markup);
    let mut nodes = Vec::new();
    let mut skip_depth = 0usize;
    let mut last_pos = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| DocumentError::Parse(format!("invalid markup: {}", e)))?;
        let pos = reader.buffer_position() as usize;

        match event {
            Event::Eof => break,
            Event::Start(e) => {
                if SKIPPED_CONTAINERS.contains(&e.local_name().as_ref()) {
                    skip_depth += 1;
                }
            }
            Event::End(e) => {
                if SKIPPED_CONTAINERS.contains(&e.local_name().as_ref()) {
                    skip_depth = skip_depth.saturating_sub(1);
                }
            }
            Event::Text(t) if skip_depth == 0 => {
                let text = t
                    .unescape()
                    .map_err(|e| DocumentError::Parse(format!("invalid text node: {}", e)))?;
                let trimmed = text.trim();
                if is_translatable(trimmed) {
                    nodes.push(TextNode {
                        start: last_pos,
                        end: pos,
                        text: trimmed.to_string(),
                    });
                }
            }
            _ => {}
        }

        last_pos = pos;
    }

    Ok(nodes)
}

/// Splice translated texts back into the raw markup, preserving the
/// whitespace that surrounded each original text node
fn rewrite_markup(markup: &str, nodes: &[TextNode], translated: &[&str]) -> String {
    let mut output = String::with_capacity(markup.len());
    let mut cursor = 0usize;

    for (node, text) in nodes.iter().zip(translated) {
        output.push_str(&markup[cursor..node.start]);

        let raw = &markup[node.start..node.end];
        let lead = &raw[..raw.len() - raw.trim_start().len()];
        let trail = &raw[raw.trim_end().len()..];

        output.push_str(lead);
        output.push_str(&quick_xml::escape::escape(*text));
        output.push_str(trail);

        cursor = node.end;
    }
    output.push_str(&markup[cursor..]);

    output
}

impl EpubDocument {
    /// Read and segment every content document of an EPUB package
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocumentError::Parse(format!("not an EPUB package: {}", e)))?;

        let mut warnings = Vec::new();

        let names = match read_entry_string(&mut archive, CONTAINER_PATH)
            .ok()
            .and_then(|container| rootfile_path(&container))
        {
            Some(opf_path) => {
                let opf_dir = opf_path
                    .rsplit_once('/')
                    .map(|(dir, _)| dir.to_string())
                    .unwrap_or_default();
                let opf = read_entry_string(&mut archive, &opf_path)?;
                let names = manifest_items(&opf, &opf_dir);
                if names.is_empty() {
                    warnings.push(
                        "Manifest lists no XHTML documents, falling back to extension scan"
                            .to_string(),
                    );
                    content_names_by_extension(&archive)
                } else {
                    names
                }
            }
            None => {
                warnings
                    .push("No readable OPF manifest, falling back to extension scan".to_string());
                content_names_by_extension(&archive)
            }
        };

        let mut items = Vec::new();
        for name in names {
            let markup = match read_entry_string(&mut archive, &name) {
                Ok(markup) => markup,
                Err(e) => {
                    warnings.push(format!("Skipping content document {}: {}", name, e));
                    continue;
                }
            };
            let nodes = match segment_markup(&markup) {
                Ok(nodes) => nodes,
                Err(e) => {
                    // Malformed documents are carried through untouched
                    warnings.push(format!("Keeping {} verbatim: {}", name, e));
                    Vec::new()
                }
            };
            items.push(ContentItem {
                name,
                markup,
                nodes,
            });
        }

        debug!(
            "Parsed EPUB with {} content documents, {} text nodes",
            items.len(),
            items.iter().map(|i| i.nodes.len()).sum::<usize>()
        );

        Ok(Self { items, warnings })
    }

    /// Non-fatal conditions encountered while reading the package
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Texts to submit for translation, in spine-manifest order
    pub fn unit_texts(&self) -> Vec<String> {
        self.items
            .iter()
            .flat_map(|item| item.nodes.iter().map(|node| node.text.clone()))
            .collect()
    }

    /// Rebuild the package with translated texts spliced into each content
    /// document; every other entry is copied verbatim
    pub fn rebuild_package(
        &self,
        input: &[u8],
        translated: &[String],
    ) -> Result<Vec<u8>, DocumentError> {
        let total: usize = self.items.iter().map(|i| i.nodes.len()).sum();
        if translated.len() != total {
            return Err(DocumentError::Serialize(format!(
                "translated unit count mismatch: expected {}, got {}",
                total,
                translated.len()
            )));
        }

        let mut rewritten = std::collections::HashMap::new();
        let mut offset = 0usize;
        for item in &self.items {
            if item.nodes.is_empty() {
                continue;
            }
            let slice: Vec<&str> = translated[offset..offset + item.nodes.len()]
                .iter()
                .map(|s| s.as_str())
                .collect();
            rewritten.insert(
                item.name.clone(),
                rewrite_markup(&item.markup, &item.nodes, &slice),
            );
            offset += item.nodes.len();
        }

        let mut archive = ZipArchive::new(Cursor::new(input))
            .map_err(|e| DocumentError::Parse(format!("not an EPUB package: {}", e)))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        // The container format requires mimetype first and uncompressed
        if archive.by_name(MIMETYPE_PATH).is_ok() {
            writer
                .start_file(
                    MIMETYPE_PATH,
                    SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
                )
                .map_err(|e| DocumentError::Serialize(e.to_string()))?;
            writer
                .write_all(b"application/epub+zip")
                .map_err(|e| DocumentError::Serialize(e.to_string()))?;
        }

        for i in 0..archive.len() {
            let entry = archive
                .by_index(i)
                .map_err(|e| DocumentError::Serialize(e.to_string()))?;
            let name = entry.name().to_string();

            if name == MIMETYPE_PATH {
                continue;
            }

            if let Some(markup) = rewritten.get(&name) {
                writer
                    .start_file(
                        name,
                        SimpleFileOptions::default()
                            .compression_method(CompressionMethod::Deflated),
                    )
                    .map_err(|e| DocumentError::Serialize(e.to_string()))?;
                writer
                    .write_all(markup.as_bytes())
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
}

/// Translate an EPUB file and write the sibling output file
pub async fn translate_file(engine: &TranslationEngine, input: &Path) -> Result<PathBuf> {
    let bytes = FileManager::read_bytes(input)?;
    let document = EpubDocument::from_bytes(&bytes)?;
    for message in document.warnings() {
        engine.warn(message);
    }

    let translated = engine.translate_units(&document.unit_texts()).await?;
    let package = document.rebuild_package(&bytes, &translated)?;

    let output_path = FileManager::translated_output_path(input, "epub");
    FileManager::write_bytes(&output_path, &package)?;
    Ok(output_path)
}
