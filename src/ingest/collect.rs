//! Flattening and screening of drop payloads.
//!
//! A drop may contain whole directory trees. [`flatten`] walks them level by
//! level and returns the plain files; [`screen`] then applies the accepted
//! category filter and the per-batch cap before anything is uploaded.

use futures::future;
use tracing::debug;

use crate::ingest::{DirectoryReader, DropEntry, DropPayload, DroppedFile};
use crate::media::{classify_mime, CategorySet, MAX_BATCH_FILES};
use crate::Result;

/// Read a directory to exhaustion.
///
/// Readers may return their listing in several batches; keep asking until
/// one comes back empty.
async fn drain(mut reader: Box<dyn DirectoryReader>) -> Result<Vec<DropEntry>> {
    let mut entries = Vec::new();
    loop {
        let batch = reader.read_batch().await?;
        if batch.is_empty() {
            break;
        }
        entries.extend(batch);
    }
    Ok(entries)
}

/// Flatten a drop payload into its files.
///
/// Directory trees are traversed breadth-first without recursion: every
/// directory of the current level is drained, sibling directories
/// concurrently, and the union of their entries becomes the next level.
/// File order is stable within a level.
pub async fn flatten(payload: DropPayload) -> Result<Vec<DroppedFile>> {
    let mut level = match payload {
        DropPayload::Files(files) => return Ok(files),
        DropPayload::Entries(entries) => entries,
    };

    let mut files = Vec::new();
    while !level.is_empty() {
        let mut readers = Vec::new();
        for entry in level {
            match entry {
                DropEntry::File(file) => files.push(file),
                DropEntry::Directory(reader) => readers.push(drain(reader)),
            }
        }

        let mut next = Vec::new();
        for drained in future::join_all(readers).await {
            next.extend(drained?);
        }
        level = next;
    }

    debug!("Flattened drop into {} file(s)", files.len());
    Ok(files)
}

/// Result of screening a flattened drop.
#[derive(Debug, Default)]
pub struct ScreenedBatch {
    /// Files that passed the filter, capped at [`MAX_BATCH_FILES`].
    pub accepted: Vec<DroppedFile>,
    /// Files dropped because their category is not accepted.
    pub rejected: usize,
    /// Accepted files dropped because the batch cap was already full.
    pub truncated: usize,
}

/// Filter files by accepted category and cap the batch size.
///
/// The cap counts only files that passed the category filter, so an
/// oversized drop full of junk can still yield a full batch of usable
/// files.
pub fn screen(files: Vec<DroppedFile>, accept: &CategorySet) -> ScreenedBatch {
    let mut batch = ScreenedBatch::default();
    for file in files {
        if !accept.accepts(classify_mime(&file.effective_mime())) {
            batch.rejected += 1;
            continue;
        }
        if batch.accepted.len() < MAX_BATCH_FILES {
            batch.accepted.push(file);
        } else {
            batch.truncated += 1;
        }
    }
    batch
}
