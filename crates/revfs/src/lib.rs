//! revfs: a read-only, hierarchical file view of one git revision.
//!
//! This crate provides:
//!
//! - **Capability contract**: the [`Filesystem`] trait a host consumes —
//!   open-by-path, stat-by-path, directory listing. The host never learns
//!   that the backing store is a commit graph rather than a disk.
//! - **Revision resolver & snapshot cache**: [`RevisionSource`] re-resolves
//!   the configured revision spec on every access (movable refs must track
//!   the live repository) and caches only the materialized tree, keyed by
//!   the resolved commit id.
//! - **Seekable file adapter**: [`FileView`] drains the object store's
//!   forward-only blob streams into memory once, then serves random-access
//!   reads without touching the repository again.
//!
//! ```no_run
//! use revfs::{Filesystem, GitRevisionFs, RevisionFsConfig};
//! use std::path::Path;
//!
//! # async fn demo() -> revfs::Result<()> {
//! let config = RevisionFsConfig::new("/srv/docs.git").with_revision("main");
//! let fs = GitRevisionFs::provision(&config)?;
//! let readme = fs.read(Path::new("/README.md")).await?;
//! # let _ = readme;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod file;
pub mod fs;
pub mod resolve;
pub mod snapshot;
pub mod vfs;

pub use config::RevisionFsConfig;
pub use error::{Error, Result};
pub use file::{DirView, FileView};
pub use fs::GitRevisionFs;
pub use resolve::RevisionSource;
pub use snapshot::Snapshot;
pub use vfs::{EntryKind, File, Filesystem, Metadata};
