//! Revision resolution and snapshot caching.
//!
//! The revision spec is re-resolved on every access: movable refs (branches,
//! `HEAD`, `HEAD~N` once the branch advances) must reflect the live
//! repository. Only the expensive tree materialization is cached, and only
//! while the resolved commit id is provably unchanged.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use git2::{Oid, Repository};
use tracing::{debug, error, info};

use crate::config::DEFAULT_REVISION;
use crate::error::{Error, Result};
use crate::file::FileView;
use crate::snapshot::Snapshot;
use crate::vfs::Metadata;

/// Owns the repository handle and the single snapshot cache slot.
///
/// The repository is opened once and lives for the source's lifetime. The
/// cache holds at most one `(commit id, snapshot)` pair; it is only ever
/// replaced wholesale, never mutated in place, and the compare-and-replace
/// step is one critical section. The same mutex supplies the `Sync` bound
/// the underlying repository handle lacks.
pub struct RevisionSource {
    revision: String,
    state: Mutex<State>,
    rebuilds: AtomicU64,
}

struct State {
    repo: Repository,
    cached: Option<(Oid, Arc<Snapshot>)>,
}

impl RevisionSource {
    /// Open the repository at `path` and fix `revision` as the spec of
    /// record. An empty spec normalizes to `HEAD`.
    pub fn open(path: &Path, revision: &str) -> Result<Self> {
        let repo = Repository::open(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to open repository");
            Error::RepositoryOpen {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        let revision = if revision.is_empty() {
            info!("revision unset, defaulting to {DEFAULT_REVISION}");
            DEFAULT_REVISION.to_string()
        } else {
            revision.to_string()
        };
        Ok(Self {
            revision,
            state: Mutex::new(State { repo, cached: None }),
            rebuilds: AtomicU64::new(0),
        })
    }

    /// The revision spec of record.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// How many snapshots have been built over this source's lifetime.
    /// Increments exactly when a resolution misses the cache.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }

    /// Resolve the revision spec and return the current snapshot.
    ///
    /// Cache hit (resolved id unchanged, byte-for-byte) returns the cached
    /// snapshot without rebuilding. A failed resolution leaves the cached
    /// pair untouched, so a transiently broken ref does not evict a
    /// previously good snapshot.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        let mut state = self.lock();

        let id = resolve(&state.repo, &self.revision)?;
        if let Some((cached_id, snapshot)) = &state.cached {
            if *cached_id == id {
                return Ok(Arc::clone(snapshot));
            }
        }

        let snapshot = {
            let commit = state.repo.find_commit(id).map_err(|e| {
                error!(%id, error = %e, "failed to get commit object");
                Error::CommitLookup { id, source: e }
            })?;
            Arc::new(Snapshot::build(&state.repo, &commit)?)
        };
        debug!(%id, entries = snapshot.len(), "materialized tree snapshot");
        state.cached = Some((id, Arc::clone(&snapshot)));
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        Ok(snapshot)
    }

    /// Drain the blob behind a file entry into a seekable view.
    ///
    /// Happens outside the snapshot: the view belongs to the caller that
    /// opened it and is independent of any later cache replacement.
    pub(crate) fn materialize(&self, id: Oid, metadata: Metadata, path: &Path) -> Result<FileView> {
        let state = self.lock();
        let odb = state.repo.odb().map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;
        let (reader, _, _) = odb.reader(id).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;
        FileView::from_reader(reader, metadata, path)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // The guarded state stays consistent across a panic: the cached pair
        // is only ever replaced wholesale.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RevisionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionSource")
            .field("revision", &self.revision)
            .field("rebuilds", &self.rebuilds())
            .finish_non_exhaustive()
    }
}

/// Resolve a revision spec to the commit it names.
///
/// Annotated tags peel to their target commit; a spec naming a non-commit
/// object (e.g. a blob hash) fails resolution.
fn resolve(repo: &Repository, spec: &str) -> Result<Oid> {
    let object = repo.revparse_single(spec).map_err(|e| {
        error!(revision = spec, error = %e, "failed to resolve revision");
        Error::RevisionResolution {
            spec: spec.to_string(),
            source: e,
        }
    })?;
    let commit = object.peel_to_commit().map_err(|e| {
        error!(revision = spec, error = %e, "revision does not name a commit");
        Error::RevisionResolution {
            spec: spec.to_string(),
            source: e,
        }
    })?;
    Ok(commit.id())
}
