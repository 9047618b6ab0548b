//! File-based preference store
//!
//! Keeps one pretty-printed JSON document per application id. Commits
//! re-read the file so that keys written by other processes are kept.

use super::{apply_staged, Document, PreferenceStore, PrefsResult, Staged};
use crate::node::Node;
use std::fs;
use std::path::{Path, PathBuf};

/// JSON document preference store
pub struct FilePreferenceStore {
    path: PathBuf,
    staged: Staged,
}

impl FilePreferenceStore {
    /// Store for `app_id` inside a preferences directory
    pub fn new<P: AsRef<Path>>(dir: P, app_id: &str) -> Self {
        Self::open(dir.as_ref().join(format!("{}.json", app_id)))
    }

    /// Store backed by an explicit document path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            staged: Staged::new(),
        }
    }

    /// Get the path to the preference document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the committed document; a missing or blank file is empty
    fn read_document(&self) -> PrefsResult<Document> {
        if !self.path.exists() {
            return Ok(Document::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Document::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Replace the document on disk via a temporary file and rename
    fn write_document(&self, document: &Document) -> PrefsResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn copy_value(&self, key: &str) -> PrefsResult<Option<Node>> {
        if let Some(staged) = self.staged.get(key) {
            return Ok(staged.clone());
        }

        Ok(self.read_document()?.remove(key))
    }

    fn set_value(&mut self, key: &str, value: Option<Node>) -> PrefsResult<()> {
        self.staged.insert(key.to_string(), value);
        Ok(())
    }

    fn synchronize(&mut self) -> PrefsResult<()> {
        if self.staged.is_empty() {
            return Ok(());
        }

        let mut document = self.read_document()?;
        let count = self.staged.len();
        apply_staged(&mut document, std::mem::take(&mut self.staged));
        self.write_document(&document)?;

        log::info!("Committed {} preference key(s) to {:?}", count, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = FilePreferenceStore::new(temp.path(), "com.example.test");

        assert_eq!(store.copy_value("Target Nodes").unwrap(), None);
        assert!(store.path().ends_with("com.example.test.json"));
    }

    #[test]
    fn test_staged_value_visible_before_commit() {
        let temp = TempDir::new().unwrap();
        let mut store = FilePreferenceStore::new(temp.path(), "app");
        let other = FilePreferenceStore::new(temp.path(), "app");

        store.set_value("key", Some(Node::from("value"))).unwrap();
        assert_eq!(store.copy_value("key").unwrap(), Some(Node::from("value")));
        assert_eq!(other.copy_value("key").unwrap(), None);

        store.synchronize().unwrap();
        assert_eq!(other.copy_value("key").unwrap(), Some(Node::from("value")));
    }

    #[test]
    fn test_commit_keeps_keys_from_other_writers() {
        let temp = TempDir::new().unwrap();
        let mut first = FilePreferenceStore::new(temp.path(), "app");
        let mut second = FilePreferenceStore::new(temp.path(), "app");

        first.set_value("a", Some(Node::from("1"))).unwrap();
        first.synchronize().unwrap();

        second.set_value("b", Some(Node::from("2"))).unwrap();
        second.synchronize().unwrap();

        let reader = FilePreferenceStore::new(temp.path(), "app");
        assert_eq!(reader.copy_value("a").unwrap(), Some(Node::from("1")));
        assert_eq!(reader.copy_value("b").unwrap(), Some(Node::from("2")));
    }

    #[test]
    fn test_removal_on_commit() {
        let temp = TempDir::new().unwrap();
        let mut store = FilePreferenceStore::new(temp.path(), "app");

        store.set_value("a", Some(Node::dict())).unwrap();
        store.synchronize().unwrap();

        store.set_value("a", None).unwrap();
        assert_eq!(store.copy_value("a").unwrap(), None);
        store.synchronize().unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.trim(), "{}");
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.json");
        fs::write(&path, "not json").unwrap();

        let store = FilePreferenceStore::open(&path);
        assert!(store.copy_value("a").is_err());
    }
}
