//! Library mutations for trackvault.
//!
//! [`LibraryService`] owns the write paths of the library: folder creation,
//! reparenting (drag-move), rename, star, deletion and storage usage. It
//! coordinates the metadata repositories with the blob store; read paths for
//! browsing live in [`crate::browser`].

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::media::{
    FileRecord, FileRepository, FileUpdate, FolderRecord, FolderRepository, FolderUpdate,
    NewFolder, MAX_NAME_LENGTH,
};
use crate::storage::BlobStore;
use crate::{Result, VaultError};

/// What kind of library item an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// An uploaded file.
    File,
    /// A folder.
    Folder,
}

/// Typed identifier of a library item.
///
/// Selections and drag payloads carry these instead of bare id strings so a
/// mutation always knows which table it targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ItemKey {
    /// Item kind.
    pub kind: ItemKind,
    /// Item ID.
    pub id: String,
}

impl ItemKey {
    /// Key for a file.
    pub fn file(id: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::File,
            id: id.into(),
        }
    }

    /// Key for a folder.
    pub fn folder(id: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Folder,
            id: id.into(),
        }
    }
}

/// Result of a multi-item move.
#[derive(Debug, Clone, Default)]
pub struct MoveOutcome {
    /// Items successfully reparented.
    pub moved: usize,
    /// Per-item failure messages, in payload order.
    pub failures: Vec<String>,
}

impl MoveOutcome {
    /// Whether every item moved.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of a folder deletion.
#[derive(Debug, Clone)]
pub struct FolderDeletion {
    /// Name of the deleted folder.
    pub name: String,
    /// Number of contained files removed with it.
    pub files_removed: u64,
}

/// Validate and normalize a user-supplied name.
///
/// Names are trimmed; empty or over-long results are rejected.
fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(VaultError::Validation("name cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(VaultError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Write-path service for the media library.
pub struct LibraryService<'a> {
    pool: &'a SqlitePool,
    blobs: &'a dyn BlobStore,
}

impl<'a> LibraryService<'a> {
    /// Create a new LibraryService over a pool and a blob store.
    pub fn new(pool: &'a SqlitePool, blobs: &'a dyn BlobStore) -> Self {
        Self { pool, blobs }
    }

    fn files(&self) -> FileRepository<'a> {
        FileRepository::new(self.pool)
    }

    fn folders(&self) -> FolderRepository<'a> {
        FolderRepository::new(self.pool)
    }

    /// Create a folder, optionally under a parent.
    pub async fn create_folder(
        &self,
        owner_id: &str,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<FolderRecord> {
        let name = validate_name(name)?;

        if let Some(parent_id) = parent_id {
            let parent = self
                .folders()
                .get_by_id(parent_id)
                .await?
                .ok_or_else(|| VaultError::NotFound("folder".to_string()))?;
            if parent.owner_id != owner_id {
                return Err(VaultError::NotFound("folder".to_string()));
            }
        }

        let mut new_folder = NewFolder::new(owner_id, name);
        if let Some(parent_id) = parent_id {
            new_folder = new_folder.with_parent(parent_id);
        }

        let folder = self.folders().create(&new_folder).await?;
        info!("Created folder \"{}\" ({})", folder.name, folder.id);
        Ok(folder)
    }

    /// Rename a file or folder.
    ///
    /// Returns the stored name. The media category of a file is never
    /// re-derived on rename.
    pub async fn rename_item(&self, key: &ItemKey, new_name: &str) -> Result<String> {
        let name = validate_name(new_name)?;

        match key.kind {
            ItemKind::File => {
                let updated = self
                    .files()
                    .update(&key.id, &FileUpdate::new().name(name.clone()))
                    .await?
                    .ok_or_else(|| VaultError::NotFound("file".to_string()))?;
                debug!("Renamed file {} to \"{}\"", key.id, updated.name);
                Ok(updated.name)
            }
            ItemKind::Folder => {
                let updated = self
                    .folders()
                    .update(&key.id, &FolderUpdate::new().name(name.clone()))
                    .await?
                    .ok_or_else(|| VaultError::NotFound("folder".to_string()))?;
                debug!("Renamed folder {} to \"{}\"", key.id, updated.name);
                Ok(updated.name)
            }
        }
    }

    /// Flip the starred flag of a file or folder.
    ///
    /// Returns the item's name and its new starred state.
    pub async fn toggle_star(&self, key: &ItemKey) -> Result<(String, bool)> {
        match key.kind {
            ItemKind::File => {
                let current = self
                    .files()
                    .get_by_id(&key.id)
                    .await?
                    .ok_or_else(|| VaultError::NotFound("file".to_string()))?;
                let updated = self
                    .files()
                    .update(&key.id, &FileUpdate::new().starred(!current.starred))
                    .await?
                    .ok_or_else(|| VaultError::NotFound("file".to_string()))?;
                Ok((updated.name, updated.starred))
            }
            ItemKind::Folder => {
                let current = self
                    .folders()
                    .get_by_id(&key.id)
                    .await?
                    .ok_or_else(|| VaultError::NotFound("folder".to_string()))?;
                let updated = self
                    .folders()
                    .update(&key.id, &FolderUpdate::new().starred(!current.starred))
                    .await?
                    .ok_or_else(|| VaultError::NotFound("folder".to_string()))?;
                Ok((updated.name, updated.starred))
            }
        }
    }

    /// Reparent a batch of items into a target folder, or to the library
    /// root when `target_id` is None.
    ///
    /// Each item is moved by an independent sequential mutation. Items that
    /// fail (missing rows, moves that would make a folder its own ancestor)
    /// are recorded in the outcome without rolling back earlier moves.
    pub async fn move_items(
        &self,
        owner_id: &str,
        items: &[ItemKey],
        target_id: Option<&str>,
    ) -> Result<MoveOutcome> {
        if let Some(target_id) = target_id {
            let target = self
                .folders()
                .get_by_id(target_id)
                .await?
                .ok_or_else(|| VaultError::NotFound("target folder".to_string()))?;
            if target.owner_id != owner_id {
                return Err(VaultError::NotFound("target folder".to_string()));
            }
        }

        let mut outcome = MoveOutcome::default();

        for item in items {
            match self.move_one(owner_id, item, target_id).await {
                Ok(()) => outcome.moved += 1,
                Err(e) => {
                    warn!("Move of {:?} {} failed: {}", item.kind, item.id, e);
                    outcome.failures.push(e.to_string());
                }
            }
        }

        info!(
            "Moved {} of {} item(s) into {}",
            outcome.moved,
            items.len(),
            target_id.unwrap_or("root")
        );
        Ok(outcome)
    }

    async fn move_one(&self, owner_id: &str, item: &ItemKey, target_id: Option<&str>) -> Result<()> {
        match item.kind {
            ItemKind::File => {
                let file = self
                    .files()
                    .get_by_id(&item.id)
                    .await?
                    .filter(|f| f.owner_id == owner_id)
                    .ok_or_else(|| VaultError::NotFound("file".to_string()))?;

                self.files()
                    .update(
                        &file.id,
                        &FileUpdate::new().folder_id(target_id.map(String::from)),
                    )
                    .await?;
                Ok(())
            }
            ItemKind::Folder => {
                let folder = self
                    .folders()
                    .get_by_id(&item.id)
                    .await?
                    .filter(|f| f.owner_id == owner_id)
                    .ok_or_else(|| VaultError::NotFound("folder".to_string()))?;

                if let Some(target_id) = target_id {
                    // A folder must never become its own ancestor.
                    if self
                        .folders()
                        .is_self_or_descendant(&folder.id, target_id)
                        .await?
                    {
                        return Err(VaultError::Validation(format!(
                            "cannot move \"{}\" into itself",
                            folder.name
                        )));
                    }
                }

                self.folders()
                    .update(
                        &folder.id,
                        &FolderUpdate::new().parent_id(target_id.map(String::from)),
                    )
                    .await?;
                Ok(())
            }
        }
    }

    /// Delete a file: blob first, then the metadata row.
    ///
    /// If the blob removal fails the row is kept, so the library never
    /// references bytes that were destroyed while losing track of bytes that
    /// still exist.
    pub async fn delete_file(&self, id: &str) -> Result<FileRecord> {
        let file = self
            .files()
            .get_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))?;

        self.blobs.remove(&[file.storage_key.clone()]).await?;
        self.files().delete(id).await?;

        info!("Deleted file \"{}\" ({})", file.name, file.id);
        Ok(file)
    }

    /// Delete a folder and the files directly inside it.
    ///
    /// Order: contained blobs as one batch, then their rows as one batch,
    /// then the folder row. A blob failure aborts before any row is touched.
    /// Subfolders are not cascaded; the schema reparents them to the root.
    pub async fn delete_folder(&self, id: &str) -> Result<FolderDeletion> {
        let folder = self
            .folders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFound("folder".to_string()))?;

        let contained = self
            .files()
            .list_by_folder(&folder.owner_id, &folder.id)
            .await?;

        let mut files_removed = 0;
        if !contained.is_empty() {
            let keys: Vec<String> = contained.iter().map(|f| f.storage_key.clone()).collect();
            self.blobs.remove(&keys).await?;

            let ids: Vec<String> = contained.iter().map(|f| f.id.clone()).collect();
            files_removed = self.files().delete_many(&ids).await?;
        }

        self.folders().delete(&folder.id).await?;

        info!(
            "Deleted folder \"{}\" and {} contained file(s)",
            folder.name, files_removed
        );
        Ok(FolderDeletion {
            name: folder.name,
            files_removed,
        })
    }

    /// Total stored bytes for an owner.
    pub async fn storage_usage(&self, owner_id: &str) -> Result<i64> {
        self.files().total_size(owner_id).await
    }
}
