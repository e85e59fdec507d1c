//! Materialized directory-tree view of one commit.
//!
//! A [`Snapshot`] is built once per resolved commit: a single pre-order walk
//! of the commit's tree records every entry in a sorted path index, so
//! lookups and directory listings never touch the repository. Blob sizes come
//! from object headers — content is only loaded when a file is opened.
//!
//! Snapshots are immutable and safe to share across concurrent readers.

use std::collections::BTreeMap;
use std::path::{Component, Path};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use git2::{Commit, ObjectType, Oid, Repository, TreeWalkMode, TreeWalkResult};

use crate::error::{Error, Result};
use crate::vfs::{EntryKind, Metadata};

/// One entry in the snapshot index.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    File { id: Oid, size: u64, mode: u32 },
    Directory,
}

/// Immutable view of the tree recorded by one commit.
///
/// Every entry reports the commit's authoring time as its modification time:
/// the whole tree is one point in history, not a collection of files with
/// independent lifetimes.
#[derive(Debug)]
pub struct Snapshot {
    commit: Oid,
    timestamp: SystemTime,
    /// Normalized path (`"docs/readme.txt"`, `""` for the root) → node.
    nodes: BTreeMap<String, Node>,
}

impl Snapshot {
    /// Walk `commit`'s tree and build the path index.
    pub(crate) fn build(repo: &Repository, commit: &Commit<'_>) -> Result<Self> {
        let id = commit.id();
        let tree = commit.tree().map_err(|e| Error::TreeLookup { id, source: e })?;
        let odb = repo.odb().map_err(|e| Error::TreeLookup { id, source: e })?;

        let mut nodes = BTreeMap::new();
        nodes.insert(String::new(), Node::Directory);

        let mut failure: Option<Error> = None;
        let walked = tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            let name = String::from_utf8_lossy(entry.name_bytes());
            let path = format!("{root}{name}");
            match entry.kind() {
                Some(ObjectType::Tree) => {
                    nodes.insert(path, Node::Directory);
                }
                Some(ObjectType::Blob) => match odb.read_header(entry.id()) {
                    Ok((size, _)) => {
                        nodes.insert(
                            path,
                            Node::File {
                                id: entry.id(),
                                size: size as u64,
                                mode: entry.filemode() as u32,
                            },
                        );
                    }
                    Err(e) => {
                        failure = Some(Error::TreeLookup {
                            id: entry.id(),
                            source: e,
                        });
                        return TreeWalkResult::Abort;
                    }
                },
                // Submodule (commit) entries have no content in the local
                // object store; other kinds cannot appear in a tree.
                _ => {}
            }
            TreeWalkResult::Ok
        });
        if let Some(err) = failure {
            return Err(err);
        }
        walked.map_err(|e| Error::TreeLookup { id, source: e })?;

        Ok(Self {
            commit: id,
            timestamp: epoch_to_system_time(commit.author().when().seconds()),
            nodes,
        })
    }

    /// The commit this snapshot was built from.
    pub fn id(&self) -> Oid {
        self.commit
    }

    /// The commit's authoring time, stamped on every entry.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Number of entries in the index, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Normalize a path to index form: strip the leading `/`, resolve `.`
    /// and `..`, join components with `/`.
    fn normalize(path: &Path) -> String {
        let mut parts: Vec<String> = Vec::new();
        for component in path.components() {
            match component {
                Component::ParentDir => {
                    parts.pop();
                }
                Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
                _ => {}
            }
        }
        parts.join("/")
    }

    pub(crate) fn node(&self, path: &Path) -> Result<(String, Node)> {
        let key = Self::normalize(path);
        match self.nodes.get(&key) {
            Some(node) => Ok((key, node.clone())),
            None => Err(Error::NotFound(path.to_path_buf())),
        }
    }

    /// Metadata for the entry at `path`.
    pub fn metadata(&self, path: &Path) -> Result<Metadata> {
        let (key, node) = self.node(path)?;
        Ok(self.metadata_for(&key, &node))
    }

    /// Ordered listing of the directory at `path`.
    pub fn read_dir(&self, path: &Path) -> Result<Vec<Metadata>> {
        let (key, node) = self.node(path)?;
        if matches!(node, Node::File { .. }) {
            return Err(Error::NotADirectory(path.to_path_buf()));
        }

        let prefix = if key.is_empty() {
            String::new()
        } else {
            format!("{key}/")
        };
        let mut entries = Vec::new();
        for (child_key, child) in self.nodes.range(prefix.clone()..) {
            if !child_key.starts_with(&prefix) {
                break;
            }
            let rest = &child_key[prefix.len()..];
            if rest.is_empty() || rest.contains('/') {
                continue;
            }
            entries.push(self.metadata_for(child_key, child));
        }
        Ok(entries)
    }

    fn metadata_for(&self, key: &str, node: &Node) -> Metadata {
        let name = key
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty())
            .unwrap_or("/")
            .to_string();
        match node {
            Node::File { size, mode, .. } => Metadata {
                name,
                kind: EntryKind::File,
                size: *size,
                modified: Some(self.timestamp),
                mode: Some(*mode),
            },
            Node::Directory => Metadata {
                name,
                kind: EntryKind::Directory,
                size: 0,
                modified: Some(self.timestamp),
                mode: Some(0o040000),
            },
        }
    }
}

fn epoch_to_system_time(seconds: i64) -> SystemTime {
    if seconds >= 0 {
        UNIX_EPOCH + Duration::from_secs(seconds as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs(seconds.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("docs/readme.txt", "docs/readme.txt")]
    #[case::leading_slash("/docs/readme.txt", "docs/readme.txt")]
    #[case::cur_dir("docs/./readme.txt", "docs/readme.txt")]
    #[case::parent_dir("docs/../src/main.rs", "src/main.rs")]
    #[case::root("/", "")]
    #[case::empty("", "")]
    #[case::parent_past_root("../../etc/passwd", "etc/passwd")]
    fn normalize_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Snapshot::normalize(Path::new(input)), expected);
    }

    #[test]
    fn epoch_conversion_round_trips() {
        let ts = epoch_to_system_time(1_600_000_000);
        assert_eq!(
            ts.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).ok(),
            Some(1_600_000_000)
        );
    }

    #[test]
    fn negative_epoch_is_before_unix_epoch() {
        let ts = epoch_to_system_time(-1);
        assert!(ts < UNIX_EPOCH);
    }
}
