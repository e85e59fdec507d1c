//! Seekable in-memory file handles.
//!
//! The object store yields forward-only decompression streams for blob
//! content, while hosts expect random access (range requests, re-reads).
//! [`FileView`] performs the only correct adaptation available without
//! internal seek support in the store: drain the stream once at open time,
//! then serve every read and seek from the captured buffer.

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Error, Result};
use crate::vfs::Metadata;

/// A regular file fully materialized into memory.
///
/// After construction the handle never touches the repository again: `Read`,
/// `Seek`, and [`metadata`](FileView::metadata) operate purely against the
/// buffer and the metadata captured at open time.
#[derive(Debug)]
pub struct FileView {
    content: Cursor<Vec<u8>>,
    metadata: Metadata,
}

impl FileView {
    /// Drain `reader` to exhaustion, capturing `metadata` for the handle's
    /// lifetime. A mid-drain stream failure propagates as [`Error::Read`].
    pub fn from_reader(mut reader: impl Read, metadata: Metadata, path: &Path) -> Result<Self> {
        let mut buf = Vec::with_capacity(metadata.size as usize);
        reader.read_to_end(&mut buf).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            content: Cursor::new(buf),
            metadata,
        })
    }

    /// Metadata captured at open time.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The full content, regardless of the current read position.
    pub fn contents(&self) -> &[u8] {
        self.content.get_ref()
    }

    /// Consume the handle, yielding the content buffer.
    pub fn into_contents(self) -> Vec<u8> {
        self.content.into_inner()
    }

    /// No-op: the handle holds no external resource. Dropping is equivalent.
    pub fn close(self) {}
}

impl Read for FileView {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.content.read(buf)
    }
}

impl Seek for FileView {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.content.seek(pos)
    }
}

/// A directory handle.
///
/// The listing was already materialized by the tree walk; no stream
/// adaptation applies.
#[derive(Debug)]
pub struct DirView {
    metadata: Metadata,
    entries: Vec<Metadata>,
}

impl DirView {
    pub(crate) fn new(metadata: Metadata, entries: Vec<Metadata>) -> Self {
        Self { metadata, entries }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Entries in listing order.
    pub fn entries(&self) -> &[Metadata] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Metadata> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::EntryKind;

    fn file_metadata(name: &str, size: u64) -> Metadata {
        Metadata {
            name: name.to_string(),
            kind: EntryKind::File,
            size,
            modified: None,
            mode: Some(0o100644),
        }
    }

    /// A reader that fails partway through, like a corrupt object stream.
    struct FailingReader {
        served: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served == 0 {
                self.served = 3;
                buf[..3].copy_from_slice(b"abc");
                Ok(3)
            } else {
                Err(io::Error::new(io::ErrorKind::InvalidData, "inflate failed"))
            }
        }
    }

    #[test]
    fn seek_and_read_round_trip_matches_linear_read() {
        let content = b"the quick brown fox";
        let mut view = FileView::from_reader(
            &content[..],
            file_metadata("fox.txt", content.len() as u64),
            Path::new("fox.txt"),
        )
        .unwrap();

        let mut head = [0u8; 9];
        view.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"the quick");

        view.seek(SeekFrom::Start(4)).unwrap();
        let mut word = [0u8; 5];
        view.read_exact(&mut word).unwrap();
        assert_eq!(&word, b"quick");

        view.seek(SeekFrom::End(-3)).unwrap();
        let mut tail = Vec::new();
        view.read_to_end(&mut tail).unwrap();
        assert_eq!(tail, b"fox");

        view.seek(SeekFrom::Start(0)).unwrap();
        let mut linear = Vec::new();
        view.read_to_end(&mut linear).unwrap();
        assert_eq!(linear, content);
    }

    #[test]
    fn seek_past_end_reads_nothing() {
        let mut view = FileView::from_reader(
            &b"hello"[..],
            file_metadata("hello.txt", 5),
            Path::new("hello.txt"),
        )
        .unwrap();

        view.seek(SeekFrom::Start(100)).unwrap();
        let mut buf = Vec::new();
        let n = view.read_to_end(&mut buf).unwrap();
        assert_eq!(n, 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn relative_seek() {
        let mut view = FileView::from_reader(
            &b"0123456789"[..],
            file_metadata("digits", 10),
            Path::new("digits"),
        )
        .unwrap();

        view.seek(SeekFrom::Start(6)).unwrap();
        view.seek(SeekFrom::Current(-4)).unwrap();
        let mut buf = [0u8; 2];
        view.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"23");
    }

    #[test]
    fn failed_drain_propagates_as_read_error() {
        let result = FileView::from_reader(
            FailingReader { served: 0 },
            file_metadata("bad.bin", 64),
            Path::new("bad.bin"),
        );
        assert!(matches!(result, Err(Error::Read { .. })));
    }

    #[test]
    fn metadata_is_the_captured_value() {
        let view = FileView::from_reader(
            &b"hello"[..],
            file_metadata("hello.txt", 5),
            Path::new("hello.txt"),
        )
        .unwrap();
        assert_eq!(view.metadata().name, "hello.txt");
        assert_eq!(view.metadata().size, 5);
        view.close();
    }
}
