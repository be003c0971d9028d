//! PDF merging: concatenate the per-page captures into one document with an
//! outline entry per source page.
//!
//! ## How the concatenation works
//!
//! Each input document's objects are copied into the accumulator under fresh
//! object ids (an id map is built first, then every reference inside the
//! copied objects is rewritten through it). Page objects are collected in
//! input order; at the end a new `Pages` tree, `Catalog`, and trailer are
//! built from scratch. When outline entries are requested, one bookmark per
//! source file is attached to that file's first page and the outline tree is
//! materialised into the catalog.
//!
//! Missing input files are skipped with a warning rather than failing the
//! merge; the render stage already reported why they are missing. An empty
//! input list fails closed: no output file is created.

use crate::error::Fav2PdfError;
use crate::output::RenderedPage;

use lopdf::{Bookmark, Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info, warn};

/// Merge `pages` into a single document at `output_path`, in input order.
///
/// Returns the number of source pages that made it into the output.
///
/// # Errors
/// [`Fav2PdfError::NothingToMerge`] when `pages` is empty or every listed
/// file is missing or unreadable; [`Fav2PdfError::MergeFailed`] /
/// [`Fav2PdfError::OutputWriteFailed`] for unexpected library or I/O errors.
/// In every error case no partial output file is left behind claiming
/// success.
pub fn merge(
    pages: &[RenderedPage],
    output_path: &Path,
    add_outline: bool,
) -> Result<usize, Fav2PdfError> {
    if pages.is_empty() {
        error!("No PDF files to merge");
        return Err(Fav2PdfError::NothingToMerge);
    }

    let mut merged = Document::with_version("1.5");
    let mut page_refs: Vec<Object> = Vec::new();
    let mut outline_targets: Vec<(String, ObjectId)> = Vec::new();
    let mut appended = 0usize;

    for page in pages {
        if !page.path.exists() {
            warn!("File not found, skipping: {}", page.path.display());
            continue;
        }

        let doc = match Document::load(&page.path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Could not load {}, skipping: {}", page.path.display(), e);
                continue;
            }
        };

        match append_document(&mut merged, doc, &mut page_refs) {
            Ok(first_page_id) => {
                outline_targets.push((page.name.clone(), first_page_id));
                appended += 1;
            }
            Err(detail) => {
                warn!("Error adding {}, skipping: {}", page.path.display(), detail);
            }
        }
    }

    if page_refs.is_empty() {
        error!("None of the {} input files could be merged", pages.len());
        return Err(Fav2PdfError::NothingToMerge);
    }

    let catalog_id = finish_document(&mut merged, page_refs);

    if add_outline {
        attach_outline(&mut merged, catalog_id, outline_targets);
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| Fav2PdfError::OutputWriteFailed {
                path: output_path.to_path_buf(),
                source,
            })?;
        }
    }

    merged
        .save(output_path)
        .map_err(|e| Fav2PdfError::MergeFailed {
            detail: format!("saving '{}': {}", output_path.display(), e),
        })?;

    // Success is defined by the artifact, not the API call.
    if !output_path.exists() {
        return Err(Fav2PdfError::MergeFailed {
            detail: format!("output file '{}' was not created", output_path.display()),
        });
    }

    info!(
        "Merged {} pages into {}",
        appended,
        output_path.display()
    );
    Ok(appended)
}

/// Declared extension point: merge with a generated table-of-contents page.
///
/// Not implemented in this version; callers must not depend on it. The
/// signature is kept so downstream code can compile against the intended
/// contract while the feature is absent.
pub fn merge_with_toc(
    _pages: &[RenderedPage],
    _output_path: &Path,
    _toc_title: &str,
) -> Result<usize, Fav2PdfError> {
    Err(Fav2PdfError::MergeFailed {
        detail: "table-of-contents merge is not implemented".to_string(),
    })
}

/// Copy every object of `doc` into `merged` under fresh ids and record its
/// page references in order. Returns the new id of the document's first page.
fn append_document(
    merged: &mut Document,
    doc: Document,
    page_refs: &mut Vec<Object>,
) -> Result<ObjectId, String> {
    let source_pages = doc.get_pages();
    if source_pages.is_empty() {
        return Err("input PDF has no pages".to_string());
    }

    let mut id_map: HashMap<ObjectId, ObjectId> = HashMap::new();
    let mut next_id = merged.max_id + 1;

    for &old_id in doc.objects.keys() {
        id_map.insert(old_id, (next_id, 0));
        next_id += 1;
    }
    merged.max_id = next_id - 1;

    for (&old_id, object) in doc.objects.iter() {
        let new_id = id_map[&old_id];
        let mut cloned = object.clone();
        remap_references(&mut cloned, &id_map);
        merged.objects.insert(new_id, cloned);
    }

    let mut first_page_id = None;
    for (_, &page_id) in source_pages.iter() {
        let new_page_id = id_map[&page_id];
        if first_page_id.is_none() {
            first_page_id = Some(new_page_id);
        }
        page_refs.push(Object::Reference(new_page_id));
    }

    // source_pages is non-empty, so a first page always exists
    Ok(first_page_id.expect("non-empty page set"))
}

/// Build the Pages tree, Catalog, and trailer over the collected pages.
/// Returns the catalog's object id.
fn finish_document(merged: &mut Document, page_refs: Vec<Object>) -> ObjectId {
    let mut pages_dict = Dictionary::new();
    pages_dict.set(b"Type".to_vec(), Object::Name(b"Pages".to_vec()));
    pages_dict.set(b"Count".to_vec(), Object::Integer(page_refs.len() as i64));
    pages_dict.set(b"Kids".to_vec(), Object::Array(page_refs.clone()));
    let pages_id = merged.add_object(pages_dict);

    // Re-parent every page onto the new Pages node.
    for page_ref in &page_refs {
        if let Object::Reference(page_id) = page_ref {
            if let Ok(Object::Dictionary(dict)) = merged.get_object_mut(*page_id) {
                dict.set(b"Parent".to_vec(), Object::Reference(pages_id));
            }
        }
    }

    let mut catalog = Dictionary::new();
    catalog.set(b"Type".to_vec(), Object::Name(b"Catalog".to_vec()));
    catalog.set(b"Pages".to_vec(), Object::Reference(pages_id));
    let catalog_id = merged.add_object(catalog);

    merged.trailer.set("Root", Object::Reference(catalog_id));
    merged
        .trailer
        .set("Size", Object::Integer(merged.max_id as i64 + 1));

    catalog_id
}

/// Attach one outline entry per source file, labeled with its sanitized name
/// and pointing at its first page.
fn attach_outline(
    merged: &mut Document,
    catalog_id: ObjectId,
    targets: Vec<(String, ObjectId)>,
) {
    for (title, page_id) in targets {
        merged.add_bookmark(Bookmark::new(title, [0.0, 0.0, 0.0], 0, page_id), None);
    }
    if let Some(outline_id) = merged.build_outline() {
        if let Ok(Object::Dictionary(catalog)) = merged.get_object_mut(catalog_id) {
            catalog.set(b"Outlines".to_vec(), Object::Reference(outline_id));
        }
    }
}

/// Rewrite every object reference through the id map.
fn remap_references(object: &mut Object, id_map: &HashMap<ObjectId, ObjectId>) {
    match object {
        Object::Reference(id) => {
            if let Some(&new_id) = id_map.get(id) {
                *id = new_id;
            }
        }
        Object::Array(items) => {
            for item in items {
                remap_references(item, id_map);
            }
        }
        Object::Dictionary(dict) => {
            let keys: Vec<_> = dict.iter().map(|(k, _)| k.clone()).collect();
            for key in keys {
                if let Ok(value) = dict.get_mut(&key) {
                    remap_references(value, id_map);
                }
            }
        }
        Object::Stream(stream) => {
            let keys: Vec<_> = stream.dict.iter().map(|(k, _)| k.clone()).collect();
            for key in keys {
                if let Ok(value) = stream.dict.get_mut(&key) {
                    remap_references(value, id_map);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("merged.pdf");
        let err = merge(&[], &out, true).unwrap_err();
        assert!(matches!(err, Fav2PdfError::NothingToMerge));
        assert!(!out.exists(), "no output file may be created");
    }

    #[test]
    fn all_inputs_missing_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("merged.pdf");
        let pages = vec![RenderedPage {
            path: dir.path().join("0001_gone.pdf"),
            name: "gone".into(),
        }];
        let err = merge(&pages, &out, true).unwrap_err();
        assert!(matches!(err, Fav2PdfError::NothingToMerge));
        assert!(!out.exists());
    }

    #[test]
    fn toc_variant_is_unimplemented() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge_with_toc(&[], &dir.path().join("out.pdf"), "Contents").unwrap_err();
        assert!(err.to_string().contains("not implemented"));
    }
}
