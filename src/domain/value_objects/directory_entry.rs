//! Directory listing entries returned by `list` operations

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{SyncError, SyncResult};

/// Type of a listed entry, classified without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Other,
}

type Reader = Arc<dyn Fn() -> SyncResult<Vec<u8>> + Send + Sync>;

/// One entry of a directory listing.
///
/// File entries may carry a lazy download accessor; nothing is read until
/// [`DirectoryEntry::download`] is called.
#[derive(Clone)]
pub struct DirectoryEntry {
    pub name: String,
    /// Path relative to the listed root, `/`-prefixed
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    reader: Option<Reader>,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            size: 0,
            modified: None,
            reader: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_modified(mut self, modified: Option<DateTime<Utc>>) -> Self {
        self.modified = modified;
        self
    }

    /// Attach a lazy accessor returning the entry's content
    pub fn with_reader<F>(mut self, reader: F) -> Self
    where
        F: Fn() -> SyncResult<Vec<u8>> + Send + Sync + 'static,
    {
        self.reader = Some(Arc::new(reader));
        self
    }

    pub fn can_download(&self) -> bool {
        self.reader.is_some()
    }

    /// Read the entry's content through its accessor
    pub fn download(&self) -> SyncResult<Vec<u8>> {
        match &self.reader {
            Some(reader) => reader(),
            None => Err(SyncError::file_operation(
                super::OperationKind::Download,
                &self.path,
                "entry has no content accessor",
            )),
        }
    }
}

impl fmt::Debug for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryEntry")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("size", &self.size)
            .field("modified", &self.modified)
            .field("downloadable", &self.reader.is_some())
            .finish()
    }
}

/// Entries of one listed directory
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    /// Requested directory, `/`-prefixed relative to the target root
    pub dir: String,
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryListing {
    pub fn files(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::File)
    }

    pub fn directories(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Directory)
    }
}
