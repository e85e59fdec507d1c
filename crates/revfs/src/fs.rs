//! Git-backed implementation of the filesystem capability contract.
//!
//! The front door: a host request for a path first asks the resolver for the
//! current snapshot, then opens the path within it. Directories come back
//! unmodified; regular files are drained through the seekable adapter. The
//! core is blocking (libgit2), so every async trait method hops onto the
//! blocking pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task;

use crate::config::RevisionFsConfig;
use crate::error::{Error, Result};
use crate::file::DirView;
use crate::resolve::RevisionSource;
use crate::snapshot::{Node, Snapshot};
use crate::vfs::{File, Filesystem, Metadata};

/// Read-only filesystem serving the tree of one resolved revision.
///
/// One instance owns one repository handle and one cache slot. Independently
/// configured instances never share a cache, even over the same repository
/// path.
#[derive(Debug)]
pub struct GitRevisionFs {
    source: Arc<RevisionSource>,
}

impl GitRevisionFs {
    /// Open the configured repository and fix the revision spec of record.
    ///
    /// Fails fast: a bad repository path or rejected configuration means the
    /// filesystem never becomes ready.
    pub fn provision(config: &RevisionFsConfig) -> Result<Self> {
        config.validate()?;
        let source = RevisionSource::open(&config.repository, config.revision())?;
        Ok(Self {
            source: Arc::new(source),
        })
    }

    /// The revision spec of record.
    pub fn revision(&self) -> &str {
        self.source.revision()
    }

    /// Snapshot build count; see [`RevisionSource::rebuilds`].
    pub fn rebuilds(&self) -> u64 {
        self.source.rebuilds()
    }

    /// Resolve the configured revision and return the current snapshot.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>> {
        let source = Arc::clone(&self.source);
        task::spawn_blocking(move || source.snapshot()).await?
    }

    fn open_blocking(source: &RevisionSource, path: &Path) -> Result<File> {
        let snapshot = source.snapshot()?;
        let (key, node) = snapshot.node(path)?;
        match node {
            Node::Directory => {
                let metadata = snapshot.metadata(path)?;
                let entries = snapshot.read_dir(path)?;
                Ok(File::Directory(DirView::new(metadata, entries)))
            }
            Node::File { id, .. } => {
                let metadata = snapshot.metadata(path)?;
                let view = source.materialize(id, metadata, Path::new(&key))?;
                Ok(File::Regular(view))
            }
        }
    }
}

#[async_trait]
impl Filesystem for GitRevisionFs {
    async fn open(&self, path: &Path) -> Result<File> {
        let source = Arc::clone(&self.source);
        let path = path.to_path_buf();
        task::spawn_blocking(move || Self::open_blocking(&source, &path)).await?
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match self.open(path).await? {
            File::Regular(view) => Ok(view.into_contents()),
            File::Directory(_) => Err(Error::IsADirectory(path.to_path_buf())),
        }
    }

    async fn stat(&self, path: &Path) -> Result<Metadata> {
        let source = Arc::clone(&self.source);
        let path: PathBuf = path.to_path_buf();
        task::spawn_blocking(move || {
            let snapshot = source.snapshot()?;
            snapshot.metadata(&path)
        })
        .await?
    }

    async fn read_dir(&self, path: &Path) -> Result<Vec<Metadata>> {
        let source = Arc::clone(&self.source);
        let path: PathBuf = path.to_path_buf();
        task::spawn_blocking(move || {
            let snapshot = source.snapshot()?;
            snapshot.read_dir(&path)
        })
        .await?
    }

    fn read_only(&self) -> bool {
        true
    }
}
