use std::{
    cell::RefCell,
    fmt,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::{
    book::Book,
    checkout::Checkout,
    error::{LibraryError, Result},
    member::Member,
};

/// Serializable representation of the whole library
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
    /// Every book, ordered by ISBN
    #[serde(default)]
    pub books: Vec<Book>,
    /// Every member, ordered by member ID
    #[serde(default)]
    pub members: Vec<Member>,
    /// Every checkout, ordered by checkout sequence
    #[serde(default)]
    pub checkouts: Vec<Checkout>,
    /// Last checkout sequence number handed out
    #[serde(default)]
    pub checkout_counter: u32,
}

/// Durable home for library snapshots
pub trait SnapshotStore: fmt::Debug {
    /// Read the stored snapshot. `Ok(None)` means nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot exists but cannot be read or parsed.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Replace the stored snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Keeps the snapshot as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    /// Target file
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the snapshot is staged in before the rename
    fn staging_path(&self) -> PathBuf {
        let mut staged = self.path.clone().into_os_string();
        staged.push(".tmp");
        PathBuf::from(staged)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        log::debug!("Loading library data from {}", self.path.display());

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LibraryError::LoadError(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let snapshot = serde_json::from_str(&contents).map_err(|e| {
            LibraryError::LoadError(format!("Failed to parse {}: {e}", self.path.display()))
        })?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let serialized = serde_json::to_string_pretty(snapshot)
            .map_err(|e| LibraryError::PersistenceError(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LibraryError::PersistenceError(format!(
                    "Failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let staging = self.staging_path();
        let mut file = File::create(&staging).map_err(|e| {
            LibraryError::PersistenceError(format!("Failed to create file: {e}"))
        })?;
        file.write_all(serialized.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| {
                LibraryError::PersistenceError(format!("Failed to write to file: {e}"))
            })?;
        drop(file);

        fs::rename(&staging, &self.path).map_err(|e| {
            LibraryError::PersistenceError(format!(
                "Failed to replace {}: {e}",
                self.path.display()
            ))
        })?;

        log::debug!("Saved library data to {}", self.path.display());
        Ok(())
    }
}

/// Holds the snapshot in memory; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Last saved snapshot
    slot: Rc<RefCell<Option<Snapshot>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a snapshot already saved
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(snapshot))),
        }
    }

    /// Copy of the last saved snapshot
    #[must_use]
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.slot.borrow().clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.snapshot())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.slot.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sample_snapshot() -> Snapshot {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or(NaiveDate::MIN);
        Snapshot {
            books: vec![Book::new("X", "Title", "Author", "Genre", 2)],
            members: vec![Member::new("M1", "Ada", "ada@example.com", "555")],
            checkouts: vec![Checkout::new("CO000001", "M1", "X", date, 14)],
            checkout_counter: 1,
        }
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir();
        assert!(dir.is_ok());
        if let Ok(dir) = dir {
            let store = JsonFileStore::new(dir.path().join("absent.json"));
            assert!(matches!(store.load(), Ok(None)));
        }
    }

    #[test]
    fn test_file_round_trip() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let store = JsonFileStore::new(dir.path().join("nested").join("library.json"));
        let snapshot = sample_snapshot();
        assert!(store.save(&snapshot).is_ok());
        assert!(!store.staging_path().exists());
        assert_eq!(store.load().ok().flatten(), Some(snapshot));
    }

    #[test]
    fn test_dates_are_iso_strings() {
        let json = serde_json::to_string(&sample_snapshot()).unwrap_or_default();
        assert!(json.contains("\"checkout_date\":\"2024-06-01\""));
        assert!(json.contains("\"due_date\":\"2024-06-15\""));
    }

    #[test]
    fn test_corrupt_file_is_a_load_error() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let path = dir.path().join("library.json");
        assert!(fs::write(&path, "{ not json").is_ok());
        let store = JsonFileStore::new(path);
        assert!(matches!(store.load(), Err(LibraryError::LoadError(_))));
    }

    #[test]
    fn test_memory_store_clones_share_slot() {
        let store = MemoryStore::new();
        let handle = store.clone();
        assert!(store.save(&sample_snapshot()).is_ok());
        assert_eq!(handle.snapshot().map(|s| s.checkout_counter), Some(1));
    }
}
