//! Read-only access to the app-group store.
//!
//! The owning app is the only writer of this namespace. The widget side gets
//! a [`SharedStore`], which has no write methods at all, so the single-writer
//! rule holds at the type level rather than by convention.
//!
//! # Defensive Design
//!
//! The owning app may be mid-publish, never launched, or on an older build,
//! so loading handles:
//! - Missing file (first run → empty store)
//! - Empty file (empty store)
//! - Corrupt JSON (empty store, log warning)
//! - Keys holding the wrong JSON type (reported as absent)

use std::cell::OnceCell;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use habit_widget_protocol::StoreDocument;

/// Narrow read interface over a process-shared key/value namespace.
///
/// Every read has a defined default: absent keys return `None`.
pub trait SharedStore {
    fn read_string(&self, key: &str) -> Option<String>;
    fn read_int(&self, key: &str) -> Option<i64>;
}

impl<T: SharedStore + ?Sized> SharedStore for &T {
    fn read_string(&self, key: &str) -> Option<String> {
        (**self).read_string(key)
    }

    fn read_int(&self, key: &str) -> Option<i64> {
        (**self).read_int(key)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// File-Backed Store
// ═══════════════════════════════════════════════════════════════════════════════

/// The app-group store as seen by one widget activation.
///
/// The document is read at most once, on the first key read. Every key read
/// in the activation comes from that one version, and the writer replaces
/// the file by rename, so a read never observes a half-written document.
#[derive(Debug)]
pub struct AppGroupStore {
    file_path: PathBuf,
    document: OnceCell<StoreDocument>,
}

impl AppGroupStore {
    /// Opens the store without touching disk.
    pub fn open(file_path: &Path) -> Self {
        AppGroupStore {
            file_path: file_path.to_path_buf(),
            document: OnceCell::new(),
        }
    }

    /// Opens the store and reads the document immediately.
    pub fn load(file_path: &Path) -> Self {
        let store = Self::open(file_path);
        store.document();
        store
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn document(&self) -> &StoreDocument {
        self.document.get_or_init(|| read_document(&self.file_path))
    }
}

fn read_document(file_path: &Path) -> StoreDocument {
    let content = match fs_err::read_to_string(file_path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %file_path.display(), "App-group store not yet published");
            return StoreDocument::new();
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to read app-group store, treating as empty");
            return StoreDocument::new();
        }
    };

    if content.trim().is_empty() {
        return StoreDocument::new();
    }

    match serde_json::from_str::<StoreDocument>(&content) {
        Ok(document) => document,
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %file_path.display(),
                "Failed to parse app-group store, treating as empty"
            );
            StoreDocument::new()
        }
    }
}

impl SharedStore for AppGroupStore {
    fn read_string(&self, key: &str) -> Option<String> {
        self.document().get_string(key).map(str::to_string)
    }

    fn read_int(&self, key: &str) -> Option<i64> {
        self.document().get_int(key)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// In-Memory Store
// ═══════════════════════════════════════════════════════════════════════════════

/// Store backed by a document built in memory. Used by tests and previews.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: StoreDocument,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: StoreDocument) -> Self {
        Self { document }
    }
}

impl SharedStore for MemoryStore {
    fn read_string(&self, key: &str) -> Option<String> {
        self.document.get_string(key).map(str::to_string)
    }

    fn read_int(&self, key: &str) -> Option<i64> {
        self.document.get_int(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habit_widget_protocol::{HABITS_KEY, HABIT_COUNT_KEY};
    use tempfile::TempDir;

    fn write_store(content: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shared-store.json");
        std::fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let temp = TempDir::new().unwrap();
        let store = AppGroupStore::load(&temp.path().join("nope.json"));
        assert_eq!(store.read_string(HABITS_KEY), None);
        assert_eq!(store.read_int(HABIT_COUNT_KEY), None);
    }

    #[test]
    fn test_empty_file_reads_as_empty() {
        let (_temp, path) = write_store("   \n");
        let store = AppGroupStore::load(&path);
        assert_eq!(store.read_string(HABITS_KEY), None);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let (_temp, path) = write_store("{\"habits\": ");
        let store = AppGroupStore::load(&path);
        assert_eq!(store.read_string(HABITS_KEY), None);
        assert_eq!(store.read_int(HABIT_COUNT_KEY), None);
    }

    #[test]
    fn test_non_object_document_reads_as_empty() {
        let (_temp, path) = write_store("[1, 2, 3]");
        let store = AppGroupStore::load(&path);
        assert_eq!(store.read_int(HABIT_COUNT_KEY), None);
    }

    #[test]
    fn test_reads_published_values() {
        let (_temp, path) = write_store(r#"{"habits":"[]","habitCount":2}"#);
        let store = AppGroupStore::load(&path);
        assert_eq!(store.read_string(HABITS_KEY).as_deref(), Some("[]"));
        assert_eq!(store.read_int(HABIT_COUNT_KEY), Some(2));
        assert_eq!(store.file_path(), path.as_path());
    }

    #[test]
    fn test_wrong_type_reads_as_absent() {
        let (_temp, path) = write_store(r#"{"habits":[{"id":"a"}],"habitCount":"lots"}"#);
        let store = AppGroupStore::load(&path);
        assert_eq!(store.read_string(HABITS_KEY), None);
        assert_eq!(store.read_int(HABIT_COUNT_KEY), None);
    }

    #[test]
    fn test_load_is_a_single_version() {
        let (_temp, path) = write_store(r#"{"habitCount":1}"#);
        let store = AppGroupStore::load(&path);

        std::fs::write(&path, r#"{"habitCount":9}"#).unwrap();

        assert_eq!(store.read_int(HABIT_COUNT_KEY), Some(1));
    }

    #[test]
    fn test_open_defers_read_until_first_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shared-store.json");
        let store = AppGroupStore::open(&path);

        std::fs::write(&path, r#"{"habitCount":5}"#).unwrap();

        assert_eq!(store.read_int(HABIT_COUNT_KEY), Some(5));
    }

    #[test]
    fn test_memory_store_reads_document() {
        let mut document = StoreDocument::new();
        document.set_int(HABIT_COUNT_KEY, 3);
        let store = MemoryStore::from_document(document);
        assert_eq!(store.read_int(HABIT_COUNT_KEY), Some(3));
        assert_eq!(MemoryStore::new().read_int(HABIT_COUNT_KEY), None);
    }
}
