/*!
 * Common test utilities for the doctrans test suite
 */

use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use doctrans::formats::docx::write_minimal_docx;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a minimal DOCX file with one paragraph per given text
pub fn create_test_docx(dir: &Path, filename: &str, paragraphs: &[&str]) -> Result<PathBuf> {
    let owned: Vec<String> = paragraphs.iter().map(|p| p.to_string()).collect();
    let package = write_minimal_docx(&owned)?;
    let file_path = dir.join(filename);
    fs::write(&file_path, package)?;
    Ok(file_path)
}

/// Creates a minimal single-page PDF showing the given line of text.
///
/// The text must not contain parentheses or backslashes; it is embedded
/// verbatim in the content stream.
pub fn create_test_pdf(dir: &Path, filename: &str, text: &str) -> Result<PathBuf> {
    let header = "%PDF-1.4\n";
    let objects = [
        "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n".to_string(),
        "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n".to_string(),
        "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
/Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>\nendobj\n"
            .to_string(),
        {
            let stream = format!("BT /F1 24 Tf 72 712 Td ({}) Tj ET", text);
            format!(
                "4 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
                stream.len(),
                stream
            )
        },
        "5 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n".to_string(),
    ];

    let mut body = String::from(header);
    let mut offsets = Vec::new();
    for object in &objects {
        offsets.push(body.len());
        body.push_str(object);
    }

    // Cross-reference table; offsets must match the object positions exactly
    let xref_position = body.len();
    body.push_str("xref\n0 6\n0000000000 65535 f \n");
    for offset in &offsets {
        body.push_str(&format!("{:010} 00000 n \n", offset));
    }
    body.push_str(&format!(
        "trailer\n<< /Size 6 /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        xref_position
    ));

    let file_path = dir.join(filename);
    fs::write(&file_path, body)?;
    Ok(file_path)
}

/// Creates a minimal EPUB file with the given (entry name, markup) chapters
pub fn create_test_epub(dir: &Path, filename: &str, chapters: &[(&str, &str)]) -> Result<PathBuf> {
    let container = "<?xml version=\"1.0\"?>\
<container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\
<rootfiles><rootfile full-path=\"OEBPS/content.opf\" media-type=\"application/oebps-package+xml\"/></rootfiles>\
</container>";

    let manifest: String = chapters
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            format!(
                "<item id=\"item{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>",
                i, name
            )
        })
        .collect();
    let opf = format!(
        "<?xml version=\"1.0\"?><package xmlns=\"http://www.idpf.org/2007/opf\">\
<manifest>{}</manifest></package>",
        manifest
    );

    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file("mimetype", stored)?;
    writer.write_all(b"application/epub+zip")?;
    writer.start_file("META-INF/container.xml", deflated)?;
    writer.write_all(container.as_bytes())?;
    writer.start_file("OEBPS/content.opf", deflated)?;
    writer.write_all(opf.as_bytes())?;
    for (name, markup) in chapters {
        writer.start_file(format!("OEBPS/{}", name), deflated)?;
        writer.write_all(markup.as_bytes())?;
    }

    let bytes = writer.finish()?.into_inner();
    let file_path = dir.join(filename);
    fs::write(&file_path, bytes)?;
    Ok(file_path)
}
