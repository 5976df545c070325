/*!
 * Unit tests for Markdown segmentation and reassembly
 */

use doctrans::formats::markdown::MarkdownDocument;

fn identity(units: &[String]) -> Vec<String> {
    units.to_vec()
}

#[test]
fn test_parse_withMixedDocument_shouldOnlySubmitProse() {
    let content = "---\ntitle: Guide\n---\n\n# Getting started\n\nRun `cargo init` first.\n\n```sh\ncargo run\n```\n\nDone.";
    let document = MarkdownDocument::parse(content);

    let units = document.units();
    assert!(units.iter().any(|u| u.contains("Getting started")));
    assert!(units.iter().any(|u| u.contains("Done.")));
    assert!(units.iter().all(|u| !u.contains("title: Guide")));
    assert!(units.iter().all(|u| !u.contains("cargo run")));
    assert!(units.iter().all(|u| !u.contains("cargo init")));
}

#[test]
fn test_reassemble_withIdentity_shouldBeByteIdenticalToInput() {
    let content = "---\na: 1\n---\n\nIntro `x` and more.\n\n```\nlet y = 2;\n```\n\nOutro paragraph.\n";
    let document = MarkdownDocument::parse(content);

    let rebuilt = document.reassemble(&identity(document.units())).unwrap();
    assert_eq!(rebuilt, content);
}

#[test]
fn test_reassemble_withTranslations_shouldKeepStructuralSpans() {
    let content = "Paragraph one.\n\n```\ncode block\n```\n\nParagraph two.";
    let document = MarkdownDocument::parse(content);

    let translated: Vec<String> = document
        .units()
        .iter()
        .map(|u| format!("[TR:es] {}", u))
        .collect();
    let rebuilt = document.reassemble(&translated).unwrap();

    assert!(rebuilt.contains("[TR:es] Paragraph one."));
    assert!(rebuilt.contains("[TR:es] Paragraph two."));
    assert!(rebuilt.contains("```\ncode block\n```"));
}

#[test]
fn test_parse_withOnlyCode_shouldYieldNoUnits() {
    let document = MarkdownDocument::parse("```\nonly code here\n```");
    assert!(document.units().is_empty());
}

#[test]
fn test_reassemble_withMismatchedCount_shouldFail() {
    let document = MarkdownDocument::parse("Some text.");
    assert!(document.reassemble(&[]).is_err());
    assert!(document
        .reassemble(&["a".to_string(), "b".to_string()])
        .is_err());
}
