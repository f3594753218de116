//! Documents and per-file locks.
//!
//! The navigation engine reads every file through a [`DocumentManager`]:
//! it maps request URIs to paths, hands out the current content, and
//! serializes access to one file with a lock whose guard is released when
//! dropped.
//!
//! [`Documents`] is the in-memory implementation used by hosts that keep
//! open buffers, and by tests.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use lsp_types::{Url, WorkspaceEdit};
use nav_syntax::{LineCol, LineIndex, Span};
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};

use crate::edit::{ChangeSet, EditConflict};

/// Failure to read, lock or edit a document.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("no document at {}", path.display())]
    NotFound { path: PathBuf },
    #[error("`{uri}` is not a file URI")]
    InvalidUri { uri: Url },
    #[error("timed out after {timeout:?} waiting for the lock on {}", path.display())]
    LockTimeout { path: PathBuf, timeout: Duration },
    #[error("edit range {start:?}..{end:?} is outside {}", path.display())]
    InvalidRange {
        path: PathBuf,
        start: LineCol,
        end: LineCol,
    },
    #[error("conflicting edits for {}: {conflict}", path.display())]
    Conflict {
        path: PathBuf,
        conflict: EditConflict,
    },
}

/// Access to file content and per-file locks.
pub trait DocumentManager: Send + Sync {
    /// Map a request URI to a file path.
    fn path_from_uri(&self, uri: &Url) -> Option<PathBuf>;

    /// Current content of the file at `path`.
    fn content(&self, path: &Path) -> Result<Arc<str>, DocumentError>;

    /// Acquire the exclusive lock for `path`, waiting at most `timeout`.
    fn lock(&self, path: &Path, timeout: Duration) -> Result<DocumentLock, DocumentError>;
}

/// Scoped guard for one file. The lock is released on drop.
#[must_use = "the document is unlocked as soon as the guard is dropped"]
pub struct DocumentLock {
    path: PathBuf,
    _guard: ArcMutexGuard<RawMutex, ()>,
}

impl DocumentLock {
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        tracing::trace!(path = %self.path.display(), "document lock released");
    }
}

impl fmt::Debug for DocumentLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentLock").field("path", &self.path).finish()
    }
}

/// One mutex per path, created on first use.
#[derive(Default)]
pub struct LockTable {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl LockTable {
    pub fn new() -> Self {
        LockTable::default()
    }

    /// Lock `path`, waiting at most `timeout`.
    pub fn acquire(&self, path: &Path, timeout: Duration) -> Result<DocumentLock, DocumentError> {
        // Clone the mutex out so the map shard is not held while waiting.
        let mutex = Arc::clone(&self.locks.entry(path.to_path_buf()).or_default());
        match mutex.try_lock_arc_for(timeout) {
            Some(guard) => {
                tracing::trace!(path = %path.display(), "document lock acquired");
                Ok(DocumentLock {
                    path: path.to_path_buf(),
                    _guard: guard,
                })
            }
            None => Err(DocumentError::LockTimeout {
                path: path.to_path_buf(),
                timeout,
            }),
        }
    }

    pub fn is_locked(&self, path: &Path) -> bool {
        self.locks.get(path).is_some_and(|m| m.is_locked())
    }

    /// Number of paths currently locked.
    pub fn held(&self) -> usize {
        self.locks.iter().filter(|m| m.value().is_locked()).count()
    }
}

impl fmt::Debug for LockTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockTable")
            .field("paths", &self.locks.len())
            .field("held", &self.held())
            .finish()
    }
}

/// In-memory document store.
#[derive(Debug, Default)]
pub struct Documents {
    files: DashMap<PathBuf, Arc<str>>,
    locks: LockTable,
}

impl Documents {
    pub fn new() -> Self {
        Documents::default()
    }

    /// Insert or replace a document.
    pub fn open(&self, path: impl Into<PathBuf>, text: impl Into<Arc<str>>) {
        self.files.insert(path.into(), text.into());
    }

    /// Replace a document's content under its lock.
    pub fn update(
        &self,
        path: &Path,
        text: impl Into<Arc<str>>,
        timeout: Duration,
    ) -> Result<(), DocumentError> {
        let _lock = self.locks.acquire(path, timeout)?;
        self.files.insert(path.to_path_buf(), text.into());
        Ok(())
    }

    pub fn close(&self, path: &Path) -> Option<Arc<str>> {
        self.files.remove(path).map(|(_, text)| text)
    }

    pub fn get(&self, path: &Path) -> Option<Arc<str>> {
        self.files.get(path).map(|text| Arc::clone(&text))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[inline]
    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    /// Apply every file's edits from a workspace edit.
    ///
    /// Files are processed in URI order. Each file is edited atomically
    /// under its own lock; a failure leaves files already processed
    /// edited. Returns the number of files changed.
    pub fn apply_workspace_edit(
        &self,
        edit: &WorkspaceEdit,
        timeout: Duration,
    ) -> Result<usize, DocumentError> {
        let Some(changes) = &edit.changes else {
            return Ok(0);
        };
        let mut uris: Vec<&Url> = changes.keys().collect();
        uris.sort();

        for uri in &uris {
            let path = self
                .path_from_uri(uri)
                .ok_or_else(|| DocumentError::InvalidUri { uri: (*uri).clone() })?;
            let _lock = self.locks.acquire(&path, timeout)?;
            let text = self.content(&path)?;

            let index = LineIndex::new(&text);
            let mut set = ChangeSet::new();
            for text_edit in &changes[*uri] {
                let start = LineCol::new(text_edit.range.start.line, text_edit.range.start.character);
                let end = LineCol::new(text_edit.range.end.line, text_edit.range.end.character);
                let span = match (index.offset(start), index.offset(end)) {
                    (Some(s), Some(e)) if s <= e => Span::new(s, e),
                    _ => {
                        return Err(DocumentError::InvalidRange { path, start, end });
                    }
                };
                set.replace(span, text_edit.new_text.clone());
            }

            let updated = set
                .apply_checked(&text)
                .map_err(|conflict| DocumentError::Conflict {
                    path: path.clone(),
                    conflict,
                })?;
            tracing::debug!(path = %path.display(), edits = set.len(), "applied edits");
            self.files.insert(path, Arc::from(updated));
        }
        Ok(uris.len())
    }
}

impl DocumentManager for Documents {
    fn path_from_uri(&self, uri: &Url) -> Option<PathBuf> {
        uri.to_file_path().ok()
    }

    fn content(&self, path: &Path) -> Result<Arc<str>, DocumentError> {
        self.get(path).ok_or_else(|| DocumentError::NotFound {
            path: path.to_path_buf(),
        })
    }

    fn lock(&self, path: &Path, timeout: Duration) -> Result<DocumentLock, DocumentError> {
        self.locks.acquire(path, timeout)
    }
}
