//! Integration tests for the tree and merge stages plus orchestrator error
//! paths. Nothing here needs a browser: input PDFs are authored in-test with
//! lopdf and bookmark stores are written as JSON fixtures.

use fav2pdf::pipeline::merge;
use fav2pdf::{convert_folder, ConversionConfig, Fav2PdfError, FavoritesStore, RenderedPage};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

// ── Fixture helpers ──────────────────────────────────────────────────────────

/// Author a minimal valid one-page PDF showing `label`.
fn write_one_page_pdf(path: &Path, label: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(label)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content stream"),
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        "Resources" => resources_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save fixture PDF");
}

fn rendered(path: PathBuf, name: &str) -> RenderedPage {
    RenderedPage {
        path,
        name: name.to_string(),
    }
}

/// Write a bookmark store fixture and return a config pointing at it.
fn store_config(dir: &Path, json: &str) -> ConversionConfig {
    let store = dir.join("Bookmarks");
    std::fs::write(&store, json).expect("write store fixture");
    ConversionConfig::builder()
        .store_path(store)
        .build()
        .unwrap()
}

const STORE_JSON: &str = r#"{
    "roots": {
        "bookmark_bar": {
            "type": "folder",
            "name": "Bookmarks bar",
            "children": [
                {
                    "type": "folder",
                    "name": "Research",
                    "children": [
                        {"type": "url", "name": "Alpha", "url": "http://a.test", "date_added": "1"},
                        {"type": "url", "name": "Beta", "url": "http://b.test", "date_added": "2"}
                    ]
                },
                {"type": "folder", "name": "Empty", "children": []}
            ]
        }
    }
}"#;

// ── Merge stage ──────────────────────────────────────────────────────────────

#[test]
fn merge_concatenates_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("0001_Alpha.pdf");
    let b = dir.path().join("0002_Beta.pdf");
    write_one_page_pdf(&a, "Alpha");
    write_one_page_pdf(&b, "Beta");

    let out = dir.path().join("merged.pdf");
    let pages = vec![rendered(a, "Alpha"), rendered(b, "Beta")];
    let count = merge::merge(&pages, &out, true).expect("merge should succeed");

    assert_eq!(count, 2);
    let doc = Document::load(&out).expect("merged output must be a loadable PDF");
    assert_eq!(doc.get_pages().len(), 2);
}

#[test]
fn merge_skips_missing_files_and_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("0001_A.pdf");
    let c = dir.path().join("0003_C.pdf");
    write_one_page_pdf(&a, "A");
    write_one_page_pdf(&c, "C");

    let out = dir.path().join("merged.pdf");
    let pages = vec![
        rendered(a, "A"),
        rendered(dir.path().join("0002_B.pdf"), "B"), // never written
        rendered(c, "C"),
    ];
    let count = merge::merge(&pages, &out, true).expect("missing file must not abort the merge");

    assert_eq!(count, 2, "only the existing files are merged");
    let doc = Document::load(&out).unwrap();
    assert_eq!(doc.get_pages().len(), 2);

    // Content from A and C only: the outline labels written into the file
    // reflect which sources made it in.
    let bytes = std::fs::read(&out).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("(A)"));
    assert!(text.contains("(C)"));
    assert!(!text.contains("(B)"));
}

#[test]
fn merge_outline_entries_are_labeled_and_ordered() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("0001_Alpha.pdf");
    let b = dir.path().join("0002_Beta.pdf");
    write_one_page_pdf(&a, "first");
    write_one_page_pdf(&b, "second");

    let out = dir.path().join("merged.pdf");
    let pages = vec![rendered(a, "Alpha"), rendered(b, "Beta")];
    merge::merge(&pages, &out, true).unwrap();

    let doc = Document::load(&out).unwrap();
    let catalog = doc.catalog().expect("merged output must have a catalog");
    assert!(
        catalog.get(b"Outlines").is_ok(),
        "outline requested but catalog has no Outlines entry"
    );

    // Outline item titles appear as literal strings in document order.
    let bytes = std::fs::read(&out).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    let alpha = text.find("(Alpha)").expect("outline label Alpha missing");
    let beta = text.find("(Beta)").expect("outline label Beta missing");
    assert!(alpha < beta, "outline labels out of order");
}

#[test]
fn merge_without_outline_leaves_catalog_clean() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("0001_Alpha.pdf");
    write_one_page_pdf(&a, "Alpha");

    let out = dir.path().join("merged.pdf");
    merge::merge(&[rendered(a, "Alpha")], &out, false).unwrap();

    let doc = Document::load(&out).unwrap();
    let catalog = doc.catalog().unwrap();
    assert!(catalog.get(b"Outlines").is_err());
}

#[test]
fn merge_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("0001_Alpha.pdf");
    write_one_page_pdf(&a, "Alpha");

    let out = dir.path().join("nested/deeper/merged.pdf");
    merge::merge(&[rendered(a, "Alpha")], &out, true).unwrap();
    assert!(out.exists());
}

#[test]
fn merge_empty_input_creates_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("merged.pdf");
    let err = merge::merge(&[], &out, true).unwrap_err();
    assert!(matches!(err, Fav2PdfError::NothingToMerge));
    assert!(!out.exists());
}

// ── Tree stage via the public store API ──────────────────────────────────────

#[test]
fn store_flatten_preserves_folder_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("Bookmarks");
    std::fs::write(&store, STORE_JSON).unwrap();

    let tree = FavoritesStore::open(&store).unwrap();
    let entries = tree.find_folder("Research").unwrap().flatten();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Alpha");
    assert_eq!(entries[0].url, "http://a.test");
    assert_eq!(entries[1].name, "Beta");
    assert_eq!(entries[0].date_added, "1");
}

// ── Orchestrator error paths (abort before any browser exists) ───────────────

#[tokio::test]
async fn unknown_folder_fails_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let config = store_config(dir.path(), STORE_JSON);
    let out = dir.path().join("out.pdf");

    let err = convert_folder("No Such Folder", &out, &config, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Fav2PdfError::FolderNotFound { .. }));
    assert!(!out.exists(), "no output may be created for an unknown folder");
}

#[tokio::test]
async fn empty_folder_is_a_noop_success() {
    let dir = tempfile::tempdir().unwrap();
    let config = store_config(dir.path(), STORE_JSON);
    let out = dir.path().join("out.pdf");

    let stats = convert_folder("Empty", &out, &config, None)
        .await
        .expect("empty folder is a warning, not an error");
    assert_eq!(stats.total_entries, 0);
    assert_eq!(stats.rendered_pages, 0);
    assert_eq!(stats.merged_pages, 0);
    assert!(!out.exists());
}

#[tokio::test]
async fn missing_store_fails_with_store_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConversionConfig::builder()
        .store_path(dir.path().join("does-not-exist/Bookmarks"))
        .build()
        .unwrap();

    let err = convert_folder("Research", dir.path().join("out.pdf"), &config, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Fav2PdfError::StoreNotFound { .. }));
}
