//! Bookmark store parsing and tree traversal.
//!
//! ## The store format
//!
//! Chromium-family browsers persist favorites as a single JSON file named
//! `Bookmarks` inside the profile directory. The top-level `roots` object
//! maps a small fixed set of root names (`bookmark_bar`, `other`, `synced`)
//! to folder nodes; every node carries a `type` discriminator of `"folder"`
//! or `"url"`. The file is read-only input here; it is never modified.
//!
//! Roots are kept in an [`IndexMap`] so iteration follows file order. That
//! matters because folder lookup is first-match: two identically named
//! folders resolve by root order, then pre-order within a root. The tie-break
//! is defined but order-dependent; callers who care should use unique names.

use crate::error::Fav2PdfError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One node of the bookmark tree, discriminated by the store's `type` field.
///
/// Only folders have children; the schema enforces it.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BookmarkNode {
    Folder {
        #[serde(default)]
        name: String,
        /// Insertion order is display order.
        #[serde(default)]
        children: Vec<BookmarkNode>,
    },
    Url {
        #[serde(default)]
        name: String,
        #[serde(default)]
        url: String,
        /// Opaque creation timestamp, passed through uninterpreted.
        #[serde(default)]
        date_added: String,
    },
}

/// The flattened unit consumed by the render stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub name: String,
    pub url: String,
    pub date_added: String,
}

/// A parsed bookmark store: the named top-level roots, in file order.
#[derive(Debug, Clone, Deserialize)]
pub struct BookmarkTree {
    roots: IndexMap<String, BookmarkNode>,
}

/// Resolve the platform-default location of the bookmark store.
///
/// Pure lookup, no retry: Windows keeps the default Edge profile under
/// `%LOCALAPPDATA%`, macOS under `~/Library/Application Support`, everything
/// else under `~/.config`.
pub fn default_store_path() -> Result<PathBuf, Fav2PdfError> {
    let profile = if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .ok_or(Fav2PdfError::HomeDirUnavailable)?
            .join("Microsoft")
            .join("Edge")
            .join("User Data")
            .join("Default")
    } else if cfg!(target_os = "macos") {
        dirs::home_dir()
            .ok_or(Fav2PdfError::HomeDirUnavailable)?
            .join("Library/Application Support/Microsoft Edge/Default")
    } else {
        dirs::home_dir()
            .ok_or(Fav2PdfError::HomeDirUnavailable)?
            .join(".config/microsoft-edge/Default")
    };
    Ok(profile.join("Bookmarks"))
}

/// Reader for the on-disk bookmark store.
pub struct FavoritesStore;

impl FavoritesStore {
    /// Load and parse the store file at `path`.
    ///
    /// # Errors
    /// [`Fav2PdfError::StoreNotFound`] if the file does not exist,
    /// [`Fav2PdfError::StoreParse`] if its content does not match the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<BookmarkTree, Fav2PdfError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Fav2PdfError::StoreNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|_| Fav2PdfError::StoreNotFound {
            path: path.to_path_buf(),
        })?;
        let tree: BookmarkTree =
            serde_json::from_str(&text).map_err(|e| Fav2PdfError::StoreParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!(
            roots = tree.roots.len(),
            "Parsed bookmark store {}",
            path.display()
        );
        Ok(tree)
    }
}

impl BookmarkTree {
    /// Build a tree directly from parsed roots. Mostly useful in tests.
    pub fn from_roots(roots: IndexMap<String, BookmarkNode>) -> Self {
        Self { roots }
    }

    /// Find the first folder named exactly `name`.
    ///
    /// Roots are visited in file order and each root's children are searched
    /// pre-order; the root nodes themselves are not candidates. Repeated
    /// calls on the same tree return the same node.
    pub fn find_folder(&self, name: &str) -> Option<&BookmarkNode> {
        for root in self.roots.values() {
            if let BookmarkNode::Folder { children, .. } = root {
                for child in children {
                    if let Some(found) = search_node(child, name) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// Every folder's path in the tree, ancestor names joined by `/`,
    /// pre-order of discovery. Informational listing only.
    pub fn folder_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for root in self.roots.values() {
            collect_folder_paths(root, "", &mut paths);
        }
        paths
    }
}

impl BookmarkNode {
    /// Flatten this folder's subtree into an ordered entry list.
    ///
    /// Pre-order depth-first: every `url` node becomes one entry in traversal
    /// order; folder nodes are recursed into but not emitted. Missing names
    /// default to `"Untitled"`, missing URLs to the empty string: the store
    /// guarantees neither field.
    pub fn flatten(&self) -> Vec<BookmarkEntry> {
        let mut entries = Vec::new();
        extract_urls(self, &mut entries);
        entries
    }

    /// The node's display name.
    pub fn name(&self) -> &str {
        match self {
            BookmarkNode::Folder { name, .. } => name,
            BookmarkNode::Url { name, .. } => name,
        }
    }
}

fn search_node<'a>(node: &'a BookmarkNode, folder_name: &str) -> Option<&'a BookmarkNode> {
    if let BookmarkNode::Folder { name, children } = node {
        if name == folder_name {
            return Some(node);
        }
        for child in children {
            if let Some(found) = search_node(child, folder_name) {
                return Some(found);
            }
        }
    }
    None
}

fn extract_urls(node: &BookmarkNode, entries: &mut Vec<BookmarkEntry>) {
    match node {
        BookmarkNode::Url {
            name,
            url,
            date_added,
        } => {
            entries.push(BookmarkEntry {
                name: if name.is_empty() {
                    "Untitled".to_string()
                } else {
                    name.clone()
                },
                url: url.clone(),
                date_added: date_added.clone(),
            });
        }
        BookmarkNode::Folder { children, .. } => {
            for child in children {
                extract_urls(child, entries);
            }
        }
    }
}

fn collect_folder_paths(node: &BookmarkNode, prefix: &str, paths: &mut Vec<String>) {
    if let BookmarkNode::Folder { name, children } = node {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        paths.push(path.clone());
        for child in children {
            collect_folder_paths(child, &path, paths);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> BookmarkTree {
        let json = r#"{
            "roots": {
                "bookmark_bar": {
                    "type": "folder",
                    "name": "Bookmarks bar",
                    "children": [
                        {
                            "type": "folder",
                            "name": "Research",
                            "children": [
                                {"type": "url", "name": "Alpha", "url": "http://a.test", "date_added": "13350000000000000"},
                                {
                                    "type": "folder",
                                    "name": "Nested",
                                    "children": [
                                        {"type": "url", "name": "Gamma", "url": "http://c.test", "date_added": ""}
                                    ]
                                },
                                {"type": "url", "name": "Beta", "url": "http://b.test", "date_added": ""}
                            ]
                        },
                        {"type": "url", "name": "Loose", "url": "http://loose.test", "date_added": ""}
                    ]
                },
                "other": {
                    "type": "folder",
                    "name": "Other favorites",
                    "children": [
                        {
                            "type": "folder",
                            "name": "Research",
                            "children": [
                                {"type": "url", "name": "Shadowed", "url": "http://shadow.test", "date_added": ""}
                            ]
                        }
                    ]
                }
            }
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn find_folder_matches_exactly() {
        let tree = sample_tree();
        let folder = tree.find_folder("Research").unwrap();
        assert_eq!(folder.name(), "Research");
        // case-sensitive
        assert!(tree.find_folder("research").is_none());
        assert!(tree.find_folder("Nowhere").is_none());
    }

    #[test]
    fn find_folder_first_match_wins_by_root_order() {
        let tree = sample_tree();
        // Both roots contain a "Research" folder; bookmark_bar comes first in
        // the file, so its subtree wins.
        let folder = tree.find_folder("Research").unwrap();
        let entries = folder.flatten();
        assert!(entries.iter().any(|e| e.url == "http://a.test"));
        assert!(!entries.iter().any(|e| e.url == "http://shadow.test"));
    }

    #[test]
    fn find_folder_is_deterministic() {
        let tree = sample_tree();
        let a = tree.find_folder("Research").unwrap().flatten();
        let b = tree.find_folder("Research").unwrap().flatten();
        assert_eq!(a, b);
    }

    #[test]
    fn flatten_is_preorder_urls_only() {
        let tree = sample_tree();
        let entries = tree.find_folder("Research").unwrap().flatten();
        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        // Alpha, then the nested folder's Gamma, then Beta: document order.
        assert_eq!(urls, vec!["http://a.test", "http://c.test", "http://b.test"]);
        // folder nodes are not emitted, urls outside the subtree are excluded
        assert!(!urls.contains(&"http://loose.test"));
    }

    #[test]
    fn flatten_defaults_missing_fields() {
        let node: BookmarkNode = serde_json::from_str(
            r#"{"type": "folder", "name": "f", "children": [{"type": "url"}]}"#,
        )
        .unwrap();
        let entries = node.flatten();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Untitled");
        assert_eq!(entries[0].url, "");
    }

    #[test]
    fn folder_paths_are_preorder_and_slash_joined() {
        let tree = sample_tree();
        let paths = tree.folder_paths();
        assert_eq!(
            paths,
            vec![
                "Bookmarks bar",
                "Bookmarks bar/Research",
                "Bookmarks bar/Research/Nested",
                "Other favorites",
                "Other favorites/Research",
            ]
        );
    }

    #[test]
    fn open_missing_store_is_store_not_found() {
        let err = FavoritesStore::open("/nonexistent/Bookmarks").unwrap_err();
        assert!(matches!(err, Fav2PdfError::StoreNotFound { .. }));
    }

    #[test]
    fn open_malformed_store_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bookmarks");
        std::fs::write(&path, "{not json").unwrap();
        let err = FavoritesStore::open(&path).unwrap_err();
        assert!(matches!(err, Fav2PdfError::StoreParse { .. }));
    }

    #[test]
    fn default_store_path_ends_with_bookmarks() {
        let path = default_store_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "Bookmarks");
    }
}
