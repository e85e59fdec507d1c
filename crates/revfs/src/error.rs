//! Error taxonomy for revision-view filesystems.
//!
//! Provisioning failures (`Config`, `RepositoryOpen`) are fatal: the
//! filesystem never becomes ready. Everything else is raised per request and
//! propagated to the caller unchanged — no retries, and a failed resolution
//! never evicts a previously good snapshot.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong between provisioning and a served byte.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration was rejected before the repository was touched.
    #[error("configuration: {0}")]
    Config(String),

    /// The configured path does not contain a usable repository.
    #[error("failed to open repository at {path}")]
    RepositoryOpen {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    /// The revision spec names nothing in the repository (bad ref, dangling
    /// tag, truncated or ambiguous hash).
    #[error("failed to resolve revision {spec:?}")]
    RevisionResolution {
        spec: String,
        #[source]
        source: git2::Error,
    },

    /// The resolved commit is missing or corrupt in the object store.
    #[error("failed to look up commit {id}")]
    CommitLookup {
        id: git2::Oid,
        #[source]
        source: git2::Error,
    },

    /// The commit's root tree (or an object reachable from it) is missing or
    /// corrupt.
    #[error("failed to look up tree object {id}")]
    TreeLookup {
        id: git2::Oid,
        #[source]
        source: git2::Error,
    },

    /// Path absent in the snapshot. A normal, expected outcome.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Listing was requested on a regular file.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// File content was requested on a directory.
    #[error("is a directory: {}", .0.display())]
    IsADirectory(PathBuf),

    /// The blob stream failed while materializing file content.
    #[error("failed to read object content for {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A mutation was attempted on the read-only view.
    #[error("filesystem is read-only")]
    ReadOnly,

    /// A blocking worker task died before completing.
    #[error("filesystem worker task failed")]
    Worker(#[from] tokio::task::JoinError),
}

impl Error {
    /// The closest `std::io::ErrorKind`, for hosts that render errors through
    /// `std::io` conventions.
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            Error::Config(_) => io::ErrorKind::InvalidInput,
            Error::RepositoryOpen { .. } | Error::RevisionResolution { .. } => {
                io::ErrorKind::InvalidInput
            }
            Error::CommitLookup { .. } | Error::TreeLookup { .. } => io::ErrorKind::InvalidData,
            Error::NotFound(_) => io::ErrorKind::NotFound,
            Error::NotADirectory(_) => io::ErrorKind::NotADirectory,
            Error::IsADirectory(_) => io::ErrorKind::IsADirectory,
            Error::Read { source, .. } => source.kind(),
            Error::ReadOnly => io::ErrorKind::PermissionDenied,
            Error::Worker(_) => io::ErrorKind::Other,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(err.io_kind(), err)
    }
}
