//! Dropped-item model for drag-and-drop ingest.
//!
//! A drop arrives either as a plain list of files or as a tree of entries
//! whose directories are listed batch-by-batch through [`DirectoryReader`].

use std::fmt;

use async_trait::async_trait;

use crate::Result;

/// A file handed over by a drop, with its payload already read.
#[derive(Debug, Clone)]
pub struct DroppedFile {
    /// Display name, usually the source filename.
    pub name: String,
    /// MIME type as reported by the drop source. May be empty.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    /// Create a dropped file with an explicit MIME type.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Create a dropped file, guessing the MIME type from the filename.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        Self {
            name,
            mime_type,
            bytes,
        }
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// The MIME type to classify by.
    ///
    /// Drop sources routinely report an empty type for files they do not
    /// recognize; fall back to guessing from the filename extension.
    pub fn effective_mime(&self) -> String {
        if !self.mime_type.trim().is_empty() {
            return self.mime_type.clone();
        }
        mime_guess::from_path(&self.name)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string()
    }
}

/// Batched directory listing.
///
/// `read_batch` is called repeatedly; an empty batch signals that the
/// directory is exhausted. Platforms are free to return the listing in
/// several slices, so one call is never assumed to be complete.
#[async_trait]
pub trait DirectoryReader: Send {
    /// Read the next batch of entries, or an empty vec when done.
    async fn read_batch(&mut self) -> Result<Vec<DropEntry>>;
}

/// One node of a dropped entry tree.
pub enum DropEntry {
    /// A regular file.
    File(DroppedFile),
    /// A directory, listed lazily through its reader.
    Directory(Box<dyn DirectoryReader>),
}

impl DropEntry {
    /// Wrap a reader as a directory entry.
    pub fn directory(reader: impl DirectoryReader + 'static) -> Self {
        Self::Directory(Box::new(reader))
    }
}

impl fmt::Debug for DropEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropEntry::File(file) => f.debug_tuple("File").field(&file.name).finish(),
            DropEntry::Directory(_) => f.write_str("Directory(..)"),
        }
    }
}

/// A complete drop, in whichever shape the platform delivered it.
#[derive(Debug)]
pub enum DropPayload {
    /// Flat file list with no directory structure.
    Files(Vec<DroppedFile>),
    /// Entry tree that may contain directories.
    Entries(Vec<DropEntry>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_guesses_mime() {
        let audio = DroppedFile::from_bytes("track.mp3", vec![1, 2]);
        assert_eq!(audio.mime_type, "audio/mpeg");

        let image = DroppedFile::from_bytes("cover.png", vec![3]);
        assert_eq!(image.mime_type, "image/png");

        let unknown = DroppedFile::from_bytes("mystery.xyzzy", vec![]);
        assert_eq!(unknown.mime_type, "application/octet-stream");
    }

    #[test]
    fn test_effective_mime_prefers_reported_type() {
        let file = DroppedFile::new("weird.mp3", "image/png", vec![]);
        assert_eq!(file.effective_mime(), "image/png");
    }

    #[test]
    fn test_effective_mime_falls_back_to_extension() {
        let file = DroppedFile::new("track.mp3", "", vec![]);
        assert_eq!(file.effective_mime(), "audio/mpeg");

        let blank = DroppedFile::new("notes", "  ", vec![]);
        assert_eq!(blank.effective_mime(), "application/octet-stream");
    }

    #[test]
    fn test_size() {
        let file = DroppedFile::new("a.bin", "application/octet-stream", vec![0; 42]);
        assert_eq!(file.size(), 42);
    }
}
