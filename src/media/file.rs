//! File metadata types and repository for the trackvault library.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, SqlitePool};
use uuid::Uuid;

use crate::media::MediaCategory;
use crate::{Result, VaultError};

/// Metadata row for an uploaded file.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID (UUID).
    pub id: String,
    /// Owning creator.
    pub owner_id: String,
    /// Display name, mutable via rename.
    pub name: String,
    /// Media category, derived from the MIME type at upload time.
    #[sqlx(try_from = "String")]
    pub category: MediaCategory,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Blob store key ({owner_id}/{file_id}.{ext}).
    pub storage_key: String,
    /// Public retrieval URL.
    pub public_url: String,
    /// Containing folder ID (None for library root).
    pub folder_id: Option<String>,
    /// Whether the file is starred.
    pub starred: bool,
    /// When the file was uploaded.
    pub created_at: String,
    /// When the file was last modified.
    pub updated_at: String,
}

impl FileRecord {
    /// Get the created_at as DateTime<Utc>.
    pub fn created_at_datetime(&self) -> DateTime<Utc> {
        crate::datetime::parse_stored(&self.created_at).unwrap_or_else(Utc::now)
    }

    /// Get the updated_at as DateTime<Utc>.
    pub fn updated_at_datetime(&self) -> DateTime<Utc> {
        crate::datetime::parse_stored(&self.updated_at).unwrap_or_else(Utc::now)
    }

    /// Modified timestamp rendered in the display timezone, for listings.
    pub fn modified_label(&self, timezone: &str) -> String {
        crate::datetime::format_datetime_default(&self.updated_at, timezone)
    }
}

/// Data for creating a new file row.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// File ID, generated up front so the storage key can embed it.
    pub id: String,
    /// Owning creator.
    pub owner_id: String,
    /// Display name.
    pub name: String,
    /// Media category.
    pub category: MediaCategory,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Blob store key.
    pub storage_key: String,
    /// Public retrieval URL.
    pub public_url: String,
    /// Containing folder ID.
    pub folder_id: Option<String>,
}

impl NewFile {
    /// Create a new NewFile with a fresh ID and empty storage fields.
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: name.into(),
            category: MediaCategory::Other,
            size_bytes: 0,
            storage_key: String::new(),
            public_url: String::new(),
            folder_id: None,
        }
    }

    /// Set the media category.
    pub fn with_category(mut self, category: MediaCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the file size.
    pub fn with_size(mut self, size_bytes: i64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Set the storage key and public URL.
    pub fn with_storage(mut self, key: impl Into<String>, url: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self.public_url = url.into();
        self
    }

    /// Set the containing folder.
    pub fn with_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }
}

/// Builder for updating a file row.
#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New containing folder (Some(None) moves to root).
    pub folder_id: Option<Option<String>>,
    /// New starred flag.
    pub starred: Option<bool>,
}

impl FileUpdate {
    /// Create a new FileUpdate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the containing folder ID.
    pub fn folder_id(mut self, folder_id: Option<String>) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    /// Set the starred flag.
    pub fn starred(mut self, starred: bool) -> Self {
        self.starred = Some(starred);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.folder_id.is_none() && self.starred.is_none()
    }
}

const FILE_COLUMNS: &str = "id, owner_id, name, category, size_bytes, storage_key, public_url, folder_id, starred, created_at, updated_at";

/// Repository for file metadata operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new file row.
    pub async fn create(&self, file: &NewFile) -> Result<FileRecord> {
        sqlx::query(
            "INSERT INTO files (id, owner_id, name, category, size_bytes, storage_key, public_url, folder_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&file.id)
        .bind(&file.owner_id)
        .bind(&file.name)
        .bind(file.category.as_str())
        .bind(file.size_bytes)
        .bind(&file.storage_key)
        .bind(&file.public_url)
        .bind(&file.folder_id)
        .execute(self.pool)
        .await
        .map_err(|e| VaultError::Metadata(e.to_string()))?;

        self.get_by_id(&file.id)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))
    }

    /// Get a file by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        let query = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?");
        let file = sqlx::query_as::<_, FileRecord>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(file)
    }

    /// List an owner's root files (folder_id is NULL).
    pub async fn list_root(&self, owner_id: &str) -> Result<Vec<FileRecord>> {
        let query = format!(
            "SELECT {FILE_COLUMNS} FROM files
             WHERE owner_id = ? AND folder_id IS NULL
             ORDER BY name COLLATE NOCASE, id"
        );
        let files = sqlx::query_as::<_, FileRecord>(&query)
            .bind(owner_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(files)
    }

    /// List the files inside a folder.
    pub async fn list_by_folder(&self, owner_id: &str, folder_id: &str) -> Result<Vec<FileRecord>> {
        let query = format!(
            "SELECT {FILE_COLUMNS} FROM files
             WHERE owner_id = ? AND folder_id = ?
             ORDER BY name COLLATE NOCASE, id"
        );
        let files = sqlx::query_as::<_, FileRecord>(&query)
            .bind(owner_id)
            .bind(folder_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(files)
    }

    /// List all of an owner's files regardless of folder.
    ///
    /// Used by flat pickers that offer the whole library.
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>> {
        let query = format!(
            "SELECT {FILE_COLUMNS} FROM files
             WHERE owner_id = ?
             ORDER BY name COLLATE NOCASE, id"
        );
        let files = sqlx::query_as::<_, FileRecord>(&query)
            .bind(owner_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(files)
    }

    /// List an owner's starred files.
    pub async fn list_starred(&self, owner_id: &str) -> Result<Vec<FileRecord>> {
        let query = format!(
            "SELECT {FILE_COLUMNS} FROM files
             WHERE owner_id = ? AND starred = 1
             ORDER BY name COLLATE NOCASE, id"
        );
        let files = sqlx::query_as::<_, FileRecord>(&query)
            .bind(owner_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(files)
    }

    /// Update a file row.
    ///
    /// Any change also bumps `updated_at`.
    pub async fn update(&self, id: &str, update: &FileUpdate) -> Result<Option<FileRecord>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE files SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }

        if let Some(ref folder_id) = update.folder_id {
            separated.push("folder_id = ");
            separated.push_bind_unseparated(folder_id.clone());
        }

        if let Some(starred) = update.starred {
            separated.push("starred = ");
            separated.push_bind_unseparated(starred);
        }

        separated.push("updated_at = datetime('now')");

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Metadata(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a file row by ID.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete multiple file rows in one statement.
    ///
    /// Returns the number of rows deleted.
    pub async fn delete_many(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("DELETE FROM files WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        query.push(")");

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Total stored bytes for an owner.
    pub async fn total_size(&self, owner_id: &str) -> Result<i64> {
        let total: (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(size_bytes), 0) FROM files WHERE owner_id = ?")
                .bind(owner_id)
                .fetch_one(self.pool)
                .await
                .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(total.0)
    }

    /// Count an owner's files.
    pub async fn count_for_owner(&self, owner_id: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::media::{FolderRepository, NewFolder};

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn sample_file(owner: &str, name: &str) -> NewFile {
        let file = NewFile::new(owner, name)
            .with_category(MediaCategory::Audio)
            .with_size(2048);
        let key = format!("{}/{}.mp3", owner, file.id);
        let url = format!("http://localhost:9000/blobs/{key}");
        file.with_storage(key, url)
    }

    #[tokio::test]
    async fn test_create_file() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let new_file = sample_file("owner-1", "demo.mp3");
        let file = repo.create(&new_file).await.unwrap();

        assert_eq!(file.id, new_file.id);
        assert_eq!(file.owner_id, "owner-1");
        assert_eq!(file.name, "demo.mp3");
        assert_eq!(file.category, MediaCategory::Audio);
        assert_eq!(file.size_bytes, 2048);
        assert_eq!(file.storage_key, new_file.storage_key);
        assert_eq!(file.public_url, new_file.public_url);
        assert!(file.folder_id.is_none());
        assert!(!file.starred);
    }

    #[tokio::test]
    async fn test_create_file_in_folder() {
        let db = setup_db().await;
        let folders = FolderRepository::new(db.pool());
        let files = FileRepository::new(db.pool());

        let folder = folders.create(&NewFolder::new("owner-1", "Beats")).await.unwrap();
        let file = files
            .create(&sample_file("owner-1", "kick.wav").with_folder(&folder.id))
            .await
            .unwrap();

        assert_eq!(file.folder_id, Some(folder.id.clone()));

        let in_folder = files.list_by_folder("owner-1", &folder.id).await.unwrap();
        assert_eq!(in_folder.len(), 1);

        let at_root = files.list_root("owner-1").await.unwrap();
        assert!(at_root.is_empty());
    }

    #[tokio::test]
    async fn test_listings_are_owner_scoped() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        repo.create(&sample_file("owner-1", "a.mp3")).await.unwrap();
        repo.create(&sample_file("owner-1", "b.mp3")).await.unwrap();
        repo.create(&sample_file("owner-2", "c.mp3")).await.unwrap();

        assert_eq!(repo.list_root("owner-1").await.unwrap().len(), 2);
        assert_eq!(repo.list_for_owner("owner-1").await.unwrap().len(), 2);
        assert_eq!(repo.list_for_owner("owner-2").await.unwrap().len(), 1);
        assert_eq!(repo.count_for_owner("owner-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_file_rename() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let file = repo.create(&sample_file("owner-1", "old.mp3")).await.unwrap();
        let updated = repo
            .update(&file.id, &FileUpdate::new().name("new.mp3"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "new.mp3");
        // Rename never re-derives the category
        assert_eq!(updated.category, MediaCategory::Audio);
    }

    #[tokio::test]
    async fn test_update_file_move_to_folder_and_back() {
        let db = setup_db().await;
        let folders = FolderRepository::new(db.pool());
        let files = FileRepository::new(db.pool());

        let folder = folders.create(&NewFolder::new("owner-1", "Stems")).await.unwrap();
        let file = files.create(&sample_file("owner-1", "bass.wav")).await.unwrap();

        let moved = files
            .update(&file.id, &FileUpdate::new().folder_id(Some(folder.id.clone())))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.folder_id, Some(folder.id.clone()));

        let back = files
            .update(&file.id, &FileUpdate::new().folder_id(None))
            .await
            .unwrap()
            .unwrap();
        assert!(back.folder_id.is_none());
    }

    #[tokio::test]
    async fn test_update_file_star() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let file = repo.create(&sample_file("owner-1", "fav.mp3")).await.unwrap();
        let updated = repo
            .update(&file.id, &FileUpdate::new().starred(true))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.starred);

        let starred = repo.list_starred("owner-1").await.unwrap();
        assert_eq!(starred.len(), 1);
        assert_eq!(starred[0].id, file.id);
    }

    #[tokio::test]
    async fn test_delete_file() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let file = repo.create(&sample_file("owner-1", "gone.mp3")).await.unwrap();
        assert!(repo.delete(&file.id).await.unwrap());
        assert!(!repo.delete(&file.id).await.unwrap());
        assert!(repo.get_by_id(&file.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_many() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let a = repo.create(&sample_file("owner-1", "a.mp3")).await.unwrap();
        let b = repo.create(&sample_file("owner-1", "b.mp3")).await.unwrap();
        let keep = repo.create(&sample_file("owner-1", "keep.mp3")).await.unwrap();

        let removed = repo
            .delete_many(&[a.id.clone(), b.id.clone()])
            .await
            .unwrap();
        assert_eq!(removed, 2);

        assert!(repo.get_by_id(&a.id).await.unwrap().is_none());
        assert!(repo.get_by_id(&keep.id).await.unwrap().is_some());

        // Empty input is a no-op
        assert_eq!(repo.delete_many(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_total_size() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        assert_eq!(repo.total_size("owner-1").await.unwrap(), 0);

        repo.create(&sample_file("owner-1", "a.mp3").with_size(1000))
            .await
            .unwrap();
        repo.create(&sample_file("owner-1", "b.mp3").with_size(500))
            .await
            .unwrap();
        repo.create(&sample_file("owner-2", "c.mp3").with_size(9999))
            .await
            .unwrap();

        assert_eq!(repo.total_size("owner-1").await.unwrap(), 1500);
    }

    #[test]
    fn test_modified_label() {
        let file = FileRecord {
            id: "f1".to_string(),
            owner_id: "owner-1".to_string(),
            name: "demo.mp3".to_string(),
            category: MediaCategory::Audio,
            size_bytes: 1,
            storage_key: "owner-1/f1.mp3".to_string(),
            public_url: "http://localhost:9000/blobs/owner-1/f1.mp3".to_string(),
            folder_id: None,
            starred: false,
            created_at: "2024-01-15 10:30:00".to_string(),
            updated_at: "2024-01-15 10:30:00".to_string(),
        };

        assert_eq!(file.modified_label("Asia/Tokyo"), "2024/01/15 19:30");
        assert_eq!(file.modified_label("UTC"), "2024/01/15 10:30");
    }

    #[test]
    fn test_new_file_builder() {
        let file = NewFile::new("owner-1", "track.mp3")
            .with_category(MediaCategory::Audio)
            .with_size(123)
            .with_storage("owner-1/abc.mp3", "http://cdn/owner-1/abc.mp3")
            .with_folder("folder-1");

        assert_eq!(file.owner_id, "owner-1");
        assert_eq!(file.category, MediaCategory::Audio);
        assert_eq!(file.size_bytes, 123);
        assert_eq!(file.storage_key, "owner-1/abc.mp3");
        assert_eq!(file.public_url, "http://cdn/owner-1/abc.mp3");
        assert_eq!(file.folder_id, Some("folder-1".to_string()));
    }

    #[test]
    fn test_file_update_builder() {
        let update = FileUpdate::new()
            .name("renamed.mp3")
            .folder_id(None)
            .starred(false);

        assert_eq!(update.name, Some("renamed.mp3".to_string()));
        assert_eq!(update.folder_id, Some(None));
        assert_eq!(update.starred, Some(false));
        assert!(!update.is_empty());
        assert!(FileUpdate::new().is_empty());
    }
}
