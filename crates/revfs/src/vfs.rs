//! Filesystem capability contract consumed by the host.
//!
//! The host opens paths, stats them, and lists directories; it does not know
//! or care what backs the view. All paths are interpreted relative to the
//! filesystem root — a leading `/` is accepted and ignored.

use std::path::Path;
use std::time::SystemTime;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::file::{DirView, FileView};

/// Kind of tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Unified entry metadata, as returned by `stat()` and directory listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Name of the entry (not full path); `/` for the root directory.
    pub name: String,
    /// Kind of entry.
    pub kind: EntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Modification time, if the backing store records one.
    pub modified: Option<SystemTime>,
    /// Unix mode bits (e.g. 0o100644), if the backing store records them.
    pub mode: Option<u32>,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Handle returned by [`Filesystem::open`].
///
/// An explicit tagged variant: a regular file carries a seekable,
/// fully-materialized view; a directory carries its already-materialized
/// listing and never goes through stream adaptation.
#[derive(Debug)]
pub enum File {
    Regular(FileView),
    Directory(DirView),
}

impl File {
    /// Metadata captured when the entry was opened.
    pub fn metadata(&self) -> &Metadata {
        match self {
            File::Regular(view) => view.metadata(),
            File::Directory(view) => view.metadata(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, File::Directory(_))
    }
}

/// Abstract filesystem interface.
///
/// Read operations are required; the write half has default implementations
/// that refuse, so read-only backends implement only what they serve.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Open a path, yielding a file or directory handle.
    async fn open(&self, path: &Path) -> Result<File>;

    /// Read the entire contents of a regular file.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Get metadata for a file or directory.
    async fn stat(&self, path: &Path) -> Result<Metadata>;

    /// List entries in a directory, in the order the backing store keeps
    /// them (for tree-backed stores, lexicographic by entry name).
    async fn read_dir(&self, path: &Path) -> Result<Vec<Metadata>>;

    /// Returns true if this filesystem is read-only.
    fn read_only(&self) -> bool;

    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> bool {
        self.stat(path).await.is_ok()
    }

    /// Write data to a file. Refused unless a backend overrides it.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let _ = (path, data);
        Err(Error::ReadOnly)
    }

    /// Create a directory. Refused unless a backend overrides it.
    async fn mkdir(&self, path: &Path) -> Result<()> {
        let _ = path;
        Err(Error::ReadOnly)
    }

    /// Remove a file or directory. Refused unless a backend overrides it.
    async fn remove(&self, path: &Path) -> Result<()> {
        let _ = path;
        Err(Error::ReadOnly)
    }
}
