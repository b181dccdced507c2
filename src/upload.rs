//! Sequential upload pipeline.
//!
//! Takes a screened batch of dropped files and persists each one: blob write
//! first, then the metadata row. Files upload one at a time so a single
//! aggregate progress value makes sense and the backend sees bounded load.

use std::path::Path;

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::ingest::DroppedFile;
use crate::media::{classify_mime, FileRecord, FileRepository, NewFile};
use crate::storage::BlobStore;
use crate::{Result, VaultError};

/// Default per-file size cap, matching the config default of 50 MB.
pub const DEFAULT_MAX_FILE_BYTES: usize = 50 * 1024 * 1024;

/// Extract the file extension from a filename.
///
/// Returns "bin" if no extension is found.
fn extract_extension(filename: &str) -> &str {
    Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("bin")
}

/// Uploads batches of dropped files for one owner.
pub struct UploadPipeline<'a> {
    pool: &'a SqlitePool,
    blobs: &'a dyn BlobStore,
    max_file_bytes: usize,
}

impl<'a> UploadPipeline<'a> {
    /// Create a pipeline with the default per-file size cap.
    pub fn new(pool: &'a SqlitePool, blobs: &'a dyn BlobStore) -> Self {
        Self {
            pool,
            blobs,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    /// Override the per-file size cap.
    pub fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// Upload a batch of files into `folder_id` (or the library root).
    ///
    /// Files are processed strictly in order, one at a time. For each file
    /// the blob is written before its metadata row, and `progress` observes a
    /// non-decreasing percentage that reaches 100 when the whole batch
    /// succeeded. A failure aborts the batch; files persisted before it stay
    /// persisted.
    pub async fn upload<F>(
        &self,
        owner_id: &str,
        folder_id: Option<&str>,
        files: &[DroppedFile],
        mut progress: F,
    ) -> Result<Vec<FileRecord>>
    where
        F: FnMut(u8),
    {
        if files.is_empty() {
            return Err(VaultError::NoFiles);
        }

        let repo = FileRepository::new(self.pool);
        let total = files.len();
        let mut uploaded = Vec::with_capacity(total);

        for (i, file) in files.iter().enumerate() {
            if file.size() > self.max_file_bytes {
                return Err(VaultError::Validation(format!(
                    "\"{}\" exceeds the {} byte upload limit",
                    file.name, self.max_file_bytes
                )));
            }

            progress(step_percent(i, total, false));

            // The row id is generated up front so the storage key can embed it.
            let mut new_file = NewFile::new(owner_id, &file.name)
                .with_category(classify_mime(&file.effective_mime()))
                .with_size(file.size() as i64);
            let key = format!(
                "{}/{}.{}",
                owner_id,
                new_file.id,
                extract_extension(&file.name)
            );

            if let Err(e) = self.blobs.put(&key, &file.bytes, true).await {
                return Err(VaultError::StorageWrite {
                    name: file.name.clone(),
                    detail: e.to_string(),
                });
            }
            let url = self.blobs.public_url(&key);
            debug!("Stored blob {} ({} bytes)", key, file.size());

            new_file = new_file.with_storage(key, url);
            if let Some(folder_id) = folder_id {
                new_file = new_file.with_folder(folder_id);
            }

            let record = repo.create(&new_file).await?;
            uploaded.push(record);

            progress(step_percent(i, total, true));
        }

        info!(
            "Uploaded {} file(s) for {} into {}",
            uploaded.len(),
            owner_id,
            folder_id.unwrap_or("root")
        );
        Ok(uploaded)
    }
}

/// Aggregate progress after the half or full step of file `i` out of `total`.
fn step_percent(i: usize, total: usize, complete: bool) -> u8 {
    let done = if complete {
        i as f64 + 1.0
    } else {
        i as f64 + 0.5
    };
    (done / total as f64 * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::media::MediaCategory;
    use crate::storage::LocalBlobStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    async fn setup() -> (Database, TempDir, LocalBlobStore) {
        let db = Database::open_in_memory().await.unwrap();
        let temp = TempDir::new().unwrap();
        let store = LocalBlobStore::new(temp.path(), "http://localhost:9000/blobs").unwrap();
        (db, temp, store)
    }

    fn audio(name: &str, bytes: &[u8]) -> DroppedFile {
        DroppedFile::new(name, "audio/mpeg", bytes.to_vec())
    }

    /// Store double that starts failing after a set number of writes.
    struct FailAfter {
        inner: LocalBlobStore,
        allowed: AtomicUsize,
    }

    #[async_trait]
    impl BlobStore for FailAfter {
        async fn put(&self, key: &str, content: &[u8], overwrite: bool) -> crate::Result<()> {
            if self.allowed.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err()
            {
                return Err(VaultError::StorageWrite {
                    name: key.to_string(),
                    detail: "disk full".to_string(),
                });
            }
            self.inner.put(key, content, overwrite).await
        }

        async fn remove(&self, keys: &[String]) -> crate::Result<u64> {
            self.inner.remove(keys).await
        }

        fn public_url(&self, key: &str) -> String {
            self.inner.public_url(key)
        }
    }

    #[tokio::test]
    async fn test_upload_batch() {
        let (db, _temp, store) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &store);

        let files = vec![audio("one.mp3", b"aaaa"), audio("two.mp3", b"bbbbbb")];
        let records = pipeline
            .upload("owner-1", None, &files, |_| {})
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "one.mp3");
        assert_eq!(records[0].category, MediaCategory::Audio);
        assert_eq!(records[0].size_bytes, 4);
        assert_eq!(
            records[0].storage_key,
            format!("owner-1/{}.mp3", records[0].id)
        );
        assert_eq!(
            records[0].public_url,
            format!("http://localhost:9000/blobs/owner-1/{}.mp3", records[0].id)
        );
        assert!(records[0].folder_id.is_none());
        assert!(store.exists(&records[0].storage_key));
        assert!(store.exists(&records[1].storage_key));
    }

    #[tokio::test]
    async fn test_upload_empty_batch() {
        let (db, _temp, store) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &store);

        let result = pipeline.upload("owner-1", None, &[], |_| {}).await;
        assert!(matches!(result, Err(VaultError::NoFiles)));
    }

    #[tokio::test]
    async fn test_upload_into_folder() {
        let (db, _temp, store) = setup().await;
        let folder = crate::media::FolderRepository::new(db.pool())
            .create(&crate::media::NewFolder::new("owner-1", "Beats"))
            .await
            .unwrap();

        let pipeline = UploadPipeline::new(db.pool(), &store);
        let records = pipeline
            .upload("owner-1", Some(&folder.id), &[audio("in.mp3", b"x")], |_| {})
            .await
            .unwrap();

        assert_eq!(records[0].folder_id, Some(folder.id));
    }

    #[tokio::test]
    async fn test_progress_sequence() {
        let (db, _temp, store) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &store);

        let files: Vec<DroppedFile> = (0..4)
            .map(|i| audio(&format!("t{i}.mp3"), b"data"))
            .collect();

        let mut seen = Vec::new();
        pipeline
            .upload("owner-1", None, &files, |p| seen.push(p))
            .await
            .unwrap();

        assert_eq!(seen, vec![13, 25, 38, 50, 63, 75, 88, 100]);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_single_file_progress_ends_at_100() {
        let (db, _temp, store) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &store);

        let mut seen = Vec::new();
        pipeline
            .upload("owner-1", None, &[audio("only.mp3", b"x")], |p| seen.push(p))
            .await
            .unwrap();

        assert_eq!(seen, vec![50, 100]);
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_files() {
        let (db, temp, _unused) = setup().await;
        let store = FailAfter {
            inner: LocalBlobStore::new(temp.path(), "http://localhost:9000/blobs").unwrap(),
            allowed: AtomicUsize::new(1),
        };
        let pipeline = UploadPipeline::new(db.pool(), &store);

        let files = vec![audio("first.mp3", b"a"), audio("second.mp3", b"b")];
        let result = pipeline.upload("owner-1", None, &files, |_| {}).await;

        match result {
            Err(VaultError::StorageWrite { name, .. }) => assert_eq!(name, "second.mp3"),
            other => panic!("expected StorageWrite, got {other:?}"),
        }

        // The first file stays persisted
        let remaining = FileRepository::new(db.pool())
            .list_for_owner("owner-1")
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "first.mp3");
    }

    #[tokio::test]
    async fn test_oversized_file_rejected() {
        let (db, _temp, store) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &store).with_max_file_bytes(4);

        let files = vec![audio("big.mp3", b"too many bytes")];
        let result = pipeline.upload("owner-1", None, &files, |_| {}).await;
        assert!(matches!(result, Err(VaultError::Validation(_))));

        let rows = FileRepository::new(db.pool())
            .count_for_owner("owner-1")
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_missing_extension_defaults_to_bin() {
        let (db, _temp, store) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &store);

        let records = pipeline
            .upload(
                "owner-1",
                None,
                &[DroppedFile::new("README", "text/plain", vec![1])],
                |_| {},
            )
            .await
            .unwrap();

        assert!(records[0].storage_key.ends_with(".bin"));
        assert_eq!(records[0].category, MediaCategory::Other);
    }

    #[test]
    fn test_extract_extension() {
        assert_eq!(extract_extension("track.mp3"), "mp3");
        assert_eq!(extract_extension("cover.PNG"), "PNG");
        assert_eq!(extract_extension("no_ext"), "bin");
        assert_eq!(extract_extension("archive.tar.gz"), "gz");
        assert_eq!(extract_extension(".hidden"), "bin");
    }

    #[test]
    fn test_step_percent() {
        assert_eq!(step_percent(0, 1, false), 50);
        assert_eq!(step_percent(0, 1, true), 100);
        assert_eq!(step_percent(0, 3, false), 17);
        assert_eq!(step_percent(2, 3, true), 100);
    }
}
