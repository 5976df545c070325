/*!
 * End-to-end document translation tests driven through the engine
 */

use std::fs;
use std::sync::Arc;

use doctrans::backend::mock::MockBackend;
use doctrans::backend::TranslationBackend;
use doctrans::file_utils::FileManager;
use doctrans::formats::docx::DocxDocument;
use doctrans::progress::{CountingObserver, TranslationObserver};
use doctrans::TranslationEngine;

use crate::common;

fn engine_with(backend: Arc<dyn TranslationBackend>) -> TranslationEngine {
    TranslationEngine::new(backend, "French").with_concurrency(3)
}

#[tokio::test]
async fn test_translateFile_withMarkdown_shouldWriteTranslatedSibling() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(
        temp_dir.path(),
        "notes.md",
        "# Title\n\nSome prose here.\n\n```\ncode stays\n```\n",
    )
    .unwrap();

    let engine = engine_with(Arc::new(MockBackend::prefixing()));
    let output = engine.translate_file(&input).await.unwrap();

    assert_eq!(output, temp_dir.path().join("notes_translated.md"));
    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("[TR:French] # Title"));
    assert!(content.contains("[TR:French] Some prose here."));
    assert!(content.contains("```\ncode stays\n```"));
}

#[tokio::test]
async fn test_translateFile_withDocx_shouldTranslateAllParagraphs() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_docx(temp_dir.path(), "report.docx", &["Alpha", "Beta"])
        .unwrap();

    let engine = engine_with(Arc::new(MockBackend::prefixing()));
    let output = engine.translate_file(&input).await.unwrap();

    assert_eq!(output, temp_dir.path().join("report_translated.docx"));
    let document = DocxDocument::from_bytes(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(
        document.unit_texts(),
        vec!["[TR:French] Alpha", "[TR:French] Beta"]
    );
}

#[tokio::test]
async fn test_translateFile_withEpub_shouldWriteTranslatedSibling() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_epub(
        temp_dir.path(),
        "book.epub",
        &[(
            "ch1.xhtml",
            "<html><body><p>Once upon a time</p></body></html>",
        )],
    )
    .unwrap();

    let engine = engine_with(Arc::new(MockBackend::prefixing()));
    let output = engine.translate_file(&input).await.unwrap();

    assert_eq!(output, temp_dir.path().join("book_translated.epub"));
    assert!(FileManager::file_exists(&output));
}

#[tokio::test]
async fn test_translateFile_withPdf_shouldConvertThroughIntermediateDocx() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input =
        common::create_test_pdf(temp_dir.path(), "paper.pdf", "Hello from a PDF page").unwrap();

    let engine = engine_with(Arc::new(MockBackend::prefixing()));
    let output = engine.translate_file(&input).await.unwrap();

    // The PDF pipeline writes a sibling intermediate and a translated DOCX
    assert_eq!(output, temp_dir.path().join("paper_translated.docx"));
    assert!(FileManager::file_exists(temp_dir.path().join("paper.docx")));

    let document = DocxDocument::from_bytes(&fs::read(&output).unwrap()).unwrap();
    let units = document.unit_texts();
    assert_eq!(units.len(), 1);
    assert!(units[0].starts_with("[TR:French]"));
    assert!(units[0].contains("Hello"));
}

#[tokio::test]
async fn test_translateFile_withPdf_existingIntermediate_shouldWarnAndOverwrite() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input =
        common::create_test_pdf(temp_dir.path(), "paper.pdf", "Fresh page text").unwrap();
    common::create_test_file(temp_dir.path(), "paper.docx", "stale placeholder").unwrap();

    let observer = Arc::new(CountingObserver::new());
    let shared: Arc<dyn TranslationObserver> = observer.clone();
    let engine = TranslationEngine::new(Arc::new(MockBackend::identity()), "French")
        .with_observer(shared);

    let output = engine.translate_file(&input).await.unwrap();

    assert_eq!(observer.warnings(), 1);
    // The stale intermediate was replaced by a real package
    let intermediate = fs::read(temp_dir.path().join("paper.docx")).unwrap();
    let document = DocxDocument::from_bytes(&intermediate).unwrap();
    assert!(document.unit_texts()[0].contains("Fresh"));
    assert!(FileManager::file_exists(&output));
}

#[tokio::test]
async fn test_translateFile_withoutTranslatableText_shouldNotTouchBackend() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input =
        common::create_test_file(temp_dir.path(), "code.md", "```\nfn main() {}\n```").unwrap();

    let backend = Arc::new(MockBackend::prefixing());
    let shared: Arc<dyn TranslationBackend> = backend.clone();
    let output = engine_with(shared).translate_file(&input).await.unwrap();

    assert_eq!(backend.call_count(), 0);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "```\nfn main() {}\n```"
    );
}

#[tokio::test]
async fn test_translateFile_withFailingBackend_shouldWriteNothing() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input =
        common::create_test_file(temp_dir.path(), "notes.md", "Some prose here.").unwrap();

    let engine = engine_with(Arc::new(MockBackend::failing()));
    let result = engine.translate_file(&input).await;

    assert!(result.is_err());
    assert!(!FileManager::file_exists(
        temp_dir.path().join("notes_translated.md")
    ));
}

#[tokio::test]
async fn test_translateFile_withMissingInput_shouldFail() {
    let engine = engine_with(Arc::new(MockBackend::identity()));
    let result = engine
        .translate_file(std::path::Path::new("/nonexistent/input.md"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_translateFile_withUnsupportedExtension_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "notes.txt", "text").unwrap();

    let engine = engine_with(Arc::new(MockBackend::identity()));
    assert!(engine.translate_file(&input).await.is_err());
}

#[tokio::test]
async fn test_translateFile_shouldReportProgressThroughObserver() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(
        temp_dir.path(),
        "notes.md",
        "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.",
    )
    .unwrap();

    let observer = Arc::new(CountingObserver::new());
    let shared: Arc<dyn TranslationObserver> = observer.clone();
    let engine = TranslationEngine::new(Arc::new(MockBackend::identity()), "French")
        .with_observer(shared);

    engine.translate_file(&input).await.unwrap();
    assert_eq!(observer.completed(), 3);
}
