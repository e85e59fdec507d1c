//! Configuration surface.
//!
//! Two recognized options: `repository` (required) and `revision` (optional,
//! defaults to `HEAD`). Unrecognized option names are a configuration-time
//! error — `deny_unknown_fields` rejects them at deserialization.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Revision spec of record when none is configured.
pub const DEFAULT_REVISION: &str = "HEAD";

/// Options for [`GitRevisionFs::provision`](crate::GitRevisionFs::provision).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevisionFsConfig {
    /// Filesystem path to the repository root (plain or bare).
    pub repository: PathBuf,

    /// Revision spec: branch, tag, short or long hash, `HEAD`, or a relative
    /// ref like `HEAD~2`. Fixed for the lifetime of the provisioned
    /// filesystem; only its *resolution outcome* may vary across calls.
    #[serde(default)]
    pub revision: Option<String>,
}

impl RevisionFsConfig {
    /// Config pointing at `repository`, revision defaulting to `HEAD`.
    pub fn new(repository: impl Into<PathBuf>) -> Self {
        Self {
            repository: repository.into(),
            revision: None,
        }
    }

    /// Replace the revision spec.
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    /// Parse from a JSON document, as supplied by a host's config loader.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// The revision spec of record: the configured value, or `HEAD` when the
    /// option is absent or empty.
    pub fn revision(&self) -> &str {
        match self.revision.as_deref() {
            Some(rev) if !rev.is_empty() => rev,
            _ => DEFAULT_REVISION,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.repository.as_os_str().is_empty() {
            return Err(Error::Config("repository must be set".into()));
        }
        Ok(())
    }
}
