/*!
 * Unit tests for DOCX segmentation and reassembly
 */

use std::fs;

use doctrans::formats::docx::{rebuild_package, write_minimal_docx, DocxDocument};

use crate::common;

#[test]
fn test_fromBytes_withGeneratedPackage_shouldListParagraphs() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_docx(
        temp_dir.path(),
        "doc.docx",
        &["First paragraph", "Second paragraph"],
    )
    .unwrap();

    let bytes = fs::read(&path).unwrap();
    let document = DocxDocument::from_bytes(&bytes).unwrap();
    assert_eq!(
        document.unit_texts(),
        vec!["First paragraph", "Second paragraph"]
    );
}

#[test]
fn test_fromBytes_withNonZipInput_shouldFail() {
    assert!(DocxDocument::from_bytes(b"plain text, not a package").is_err());
}

#[test]
fn test_rewrite_shouldReplaceTextsInOrder() {
    let package = write_minimal_docx(&["Hello".to_string(), "World".to_string()]).unwrap();
    let document = DocxDocument::from_bytes(&package).unwrap();

    let body = document
        .rewrite(&["Bonjour".to_string(), "Monde".to_string()])
        .unwrap();
    let rebuilt = rebuild_package(&package, &body).unwrap();

    let reparsed = DocxDocument::from_bytes(&rebuilt).unwrap();
    assert_eq!(reparsed.unit_texts(), vec!["Bonjour", "Monde"]);
}

#[test]
fn test_rewrite_withSpecialCharacters_shouldSurviveRoundTrip() {
    let package = write_minimal_docx(&["placeholder".to_string()]).unwrap();
    let document = DocxDocument::from_bytes(&package).unwrap();

    let body = document.rewrite(&["5 < 7 && \"quoted\"".to_string()]).unwrap();
    let rebuilt = rebuild_package(&package, &body).unwrap();

    let reparsed = DocxDocument::from_bytes(&rebuilt).unwrap();
    assert_eq!(reparsed.unit_texts(), vec!["5 < 7 && \"quoted\""]);
}

#[test]
fn test_writeMinimalDocx_withUnicodeText_shouldRoundTrip() {
    let package = write_minimal_docx(&["第一段".to_string(), "Résumé".to_string()]).unwrap();
    let document = DocxDocument::from_bytes(&package).unwrap();
    assert_eq!(document.unit_texts(), vec!["第一段", "Résumé"]);
}
