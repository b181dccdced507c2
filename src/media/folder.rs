//! Folder types and repository for the trackvault library.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, SqlitePool};
use uuid::Uuid;

use crate::{Result, VaultError};

/// A folder in the media library.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FolderRecord {
    /// Unique folder ID (UUID).
    pub id: String,
    /// Owning creator.
    pub owner_id: String,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<String>,
    /// Whether the folder is starred.
    pub starred: bool,
    /// When the folder was created.
    pub created_at: String,
    /// When the folder was last modified.
    pub updated_at: String,
}

impl FolderRecord {
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

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Folder ID, generated up front.
    pub id: String,
    /// Owning creator.
    pub owner_id: String,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<String>,
}

impl NewFolder {
    /// Create a new NewFolder at the library root.
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: name.into(),
            parent_id: None,
        }
    }

    /// Set the parent folder.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Builder for updating a folder.
#[derive(Debug, Clone, Default)]
pub struct FolderUpdate {
    /// New folder name.
    pub name: Option<String>,
    /// New parent folder ID (Some(None) moves to root).
    pub parent_id: Option<Option<String>>,
    /// New starred flag.
    pub starred: Option<bool>,
}

impl FolderUpdate {
    /// Create a new FolderUpdate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the parent folder ID.
    pub fn parent_id(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the starred flag.
    pub fn starred(mut self, starred: bool) -> Self {
        self.starred = Some(starred);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent_id.is_none() && self.starred.is_none()
    }
}

/// Repository for folder operations.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new folder.
    pub async fn create(&self, folder: &NewFolder) -> Result<FolderRecord> {
        sqlx::query(
            "INSERT INTO folders (id, owner_id, name, parent_id)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&folder.id)
        .bind(&folder.owner_id)
        .bind(&folder.name)
        .bind(&folder.parent_id)
        .execute(self.pool)
        .await
        .map_err(|e| VaultError::Metadata(e.to_string()))?;

        self.get_by_id(&folder.id)
            .await?
            .ok_or_else(|| VaultError::NotFound("folder".to_string()))
    }

    /// Get a folder by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<FolderRecord>> {
        let folder = sqlx::query_as::<_, FolderRecord>(
            "SELECT id, owner_id, name, parent_id, starred, created_at, updated_at
             FROM folders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(folder)
    }

    /// List an owner's root folders (parent_id is NULL).
    pub async fn list_root(&self, owner_id: &str) -> Result<Vec<FolderRecord>> {
        let folders = sqlx::query_as::<_, FolderRecord>(
            "SELECT id, owner_id, name, parent_id, starred, created_at, updated_at
             FROM folders WHERE owner_id = ? AND parent_id IS NULL
             ORDER BY name COLLATE NOCASE, id",
        )
        .bind(owner_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(folders)
    }

    /// List child folders of a parent folder.
    pub async fn list_by_parent(&self, owner_id: &str, parent_id: &str) -> Result<Vec<FolderRecord>> {
        let folders = sqlx::query_as::<_, FolderRecord>(
            "SELECT id, owner_id, name, parent_id, starred, created_at, updated_at
             FROM folders WHERE owner_id = ? AND parent_id = ?
             ORDER BY name COLLATE NOCASE, id",
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(folders)
    }

    /// List an owner's starred folders.
    pub async fn list_starred(&self, owner_id: &str) -> Result<Vec<FolderRecord>> {
        let folders = sqlx::query_as::<_, FolderRecord>(
            "SELECT id, owner_id, name, parent_id, starred, created_at, updated_at
             FROM folders WHERE owner_id = ? AND starred = 1
             ORDER BY name COLLATE NOCASE, id",
        )
        .bind(owner_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(folders)
    }

    /// Update a folder.
    ///
    /// Any change also bumps `updated_at`.
    pub async fn update(&self, id: &str, update: &FolderUpdate) -> Result<Option<FolderRecord>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE folders SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }

        if let Some(ref parent_id) = update.parent_id {
            separated.push("parent_id = ");
            separated.push_bind_unseparated(parent_id.clone());
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

    /// Delete a folder by ID.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Metadata(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Get the path from root to a folder.
    ///
    /// Walks `parent_id` links iteratively. Returns an empty path when the
    /// folder does not exist.
    pub async fn get_path(&self, id: &str) -> Result<Vec<FolderRecord>> {
        let mut path: Vec<FolderRecord> = Vec::new();
        let mut current_id = Some(id.to_string());

        while let Some(folder_id) = current_id {
            // Stop if stored data somehow contains a parent cycle
            if path.iter().any(|f| f.id == folder_id) {
                break;
            }
            if let Some(folder) = self.get_by_id(&folder_id).await? {
                current_id = folder.parent_id.clone();
                path.push(folder);
            } else {
                break;
            }
        }

        path.reverse();
        Ok(path)
    }

    /// Check whether `candidate_id` is `ancestor_id` itself or one of its
    /// descendants. Used to refuse reparent operations that would create a
    /// cycle.
    pub async fn is_self_or_descendant(&self, ancestor_id: &str, candidate_id: &str) -> Result<bool> {
        if ancestor_id == candidate_id {
            return Ok(true);
        }

        let path = self.get_path(candidate_id).await?;
        Ok(path.iter().any(|f| f.id == ancestor_id))
    }
}
