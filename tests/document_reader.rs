//! Document reader tests against PDFs written to temporary files.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use research_synth::tools::{DocumentReaderTool, Tool, ToolError, ToolErrorKind, ToolRegistry};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Write a PDF with one page per entry of `pages`
fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[tokio::test]
async fn test_reads_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.pdf");
    write_pdf(&path, &["First page text", "Second page text"]);

    let tool = DocumentReaderTool::new(4000);
    let text = tool.invoke(path.to_str().unwrap()).await.unwrap();

    assert!(text.contains("First page text"));
    assert!(text.contains("Second page text"));
    assert!(text.find("First").unwrap() < text.find("Second").unwrap());
    assert!(!text.contains("[Truncated"));
}

#[tokio::test]
async fn test_long_document_is_cut_at_budget() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.pdf");
    let page = "x".repeat(1500);
    write_pdf(&path, &[&page, &page, &page]);

    let tool = DocumentReaderTool::new(4000);
    let text = tool.invoke(path.to_str().unwrap()).await.unwrap();

    let notice = "\n\n[Truncated: document exceeds 4000 characters]";
    assert!(text.ends_with(notice));
    assert_eq!(text.chars().count(), 4000 + notice.chars().count());
}

#[tokio::test]
async fn test_unreadable_file_becomes_text_through_registry() {
    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    file.write_all(b"%PDF-1.4 this file is truncated garbage").unwrap();

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(DocumentReaderTool::new(4000))).unwrap();

    let outcome = tools
        .invoke("document_reader", file.path().to_str().unwrap())
        .await
        .unwrap();
    assert_eq!(outcome.error, Some(ToolErrorKind::DocumentUnreadable));
    assert!(outcome.text.starts_with("Failed to read PDF:"));
}

#[tokio::test]
async fn test_blank_path_is_malformed() {
    let tool = DocumentReaderTool::new(4000);
    assert!(matches!(
        tool.invoke("   ").await,
        Err(ToolError::MalformedInput(_))
    ));
}
