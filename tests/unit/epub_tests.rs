/*!
 * Unit tests for EPUB segmentation and reassembly
 */

use std::fs;
use std::io::Read;

use doctrans::formats::epub::EpubDocument;

use crate::common;

const CHAPTER_ONE: &str = "<html><head><title>Book Title</title></head>\
<body><h1>Chapter 1</h1><p>It was a dark and stormy night.</p>\
<p>7</p><style>p { color: red; }</style></body></html>";

const CHAPTER_TWO: &str =
    "<html><body><p>The plot thickens.</p><script>track();</script></body></html>";

#[test]
fn test_fromBytes_shouldCollectProseTextOnly() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_epub(
        temp_dir.path(),
        "book.epub",
        &[("ch1.xhtml", CHAPTER_ONE), ("ch2.xhtml", CHAPTER_TWO)],
    )
    .unwrap();

    let bytes = fs::read(&path).unwrap();
    let document = EpubDocument::from_bytes(&bytes).unwrap();

    assert_eq!(
        document.unit_texts(),
        vec![
            "Chapter 1",
            "It was a dark and stormy night.",
            "The plot thickens."
        ]
    );
}

#[test]
fn test_fromBytes_withNonZipInput_shouldFail() {
    assert!(EpubDocument::from_bytes(b"not an epub").is_err());
}

#[test]
fn test_rebuildPackage_shouldTranslateProseAndKeepEverythingElse() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_epub(temp_dir.path(), "book.epub", &[("ch1.xhtml", CHAPTER_ONE)])
        .unwrap();
    let bytes = fs::read(&path).unwrap();
    let document = EpubDocument::from_bytes(&bytes).unwrap();

    let translated = vec!["Chapitre 1".to_string(), "Il faisait nuit noire.".to_string()];
    let rebuilt = document.rebuild_package(&bytes, &translated).unwrap();

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(rebuilt.as_slice())).unwrap();
    let mut markup = String::new();
    archive
        .by_name("OEBPS/ch1.xhtml")
        .unwrap()
        .read_to_string(&mut markup)
        .unwrap();

    assert!(markup.contains("<h1>Chapitre 1</h1>"));
    assert!(markup.contains("<p>Il faisait nuit noire.</p>"));
    assert!(markup.contains("<title>Book Title</title>"));
    assert!(markup.contains("<p>7</p>"));
    assert!(markup.contains("color: red"));
}

#[test]
fn test_rebuildPackage_outputShouldStillBeValidEpub() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_epub(temp_dir.path(), "book.epub", &[("ch1.xhtml", CHAPTER_ONE)])
        .unwrap();
    let bytes = fs::read(&path).unwrap();
    let document = EpubDocument::from_bytes(&bytes).unwrap();

    let translated = vec!["A".to_string(), "Bee".to_string()];
    let rebuilt = document.rebuild_package(&bytes, &translated).unwrap();

    // The rebuilt package parses again and yields the translated prose
    let reparsed = EpubDocument::from_bytes(&rebuilt).unwrap();
    assert_eq!(reparsed.unit_texts(), vec!["Bee"]);
}
