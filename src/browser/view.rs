//! Cached library projection: current listings, breadcrumbs, search and
//! sorting.
//!
//! [`LibraryView`] holds what the browser surface renders. `refresh` pulls
//! the listings for the current location from the database; search and sort
//! are applied in memory on access, so changing them never hits storage.

use std::cmp::Ordering;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::media::{FileRecord, FileRepository, FolderRecord, FolderRepository};
use crate::Result;

/// Column the listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Display name, case-insensitive. Defaults ascending.
    Name,
    /// Last modification time. Defaults descending (newest first).
    Modified,
    /// File size. Defaults descending (largest first).
    Size,
}

impl SortKey {
    fn default_ascending(self) -> bool {
        matches!(self, SortKey::Name)
    }
}

/// One breadcrumb segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub id: String,
    pub name: String,
}

/// Browsing state for one owner's library.
#[derive(Debug)]
pub struct LibraryView {
    crumbs: Vec<Crumb>,
    search: String,
    sort_key: SortKey,
    ascending: bool,
    folders: Vec<FolderRecord>,
    files: Vec<FileRecord>,
    root_files: Vec<FileRecord>,
}

impl Default for LibraryView {
    fn default() -> Self {
        Self {
            crumbs: Vec::new(),
            search: String::new(),
            sort_key: SortKey::Name,
            ascending: true,
            folders: Vec::new(),
            files: Vec::new(),
            root_files: Vec::new(),
        }
    }
}

impl LibraryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The folder currently opened, or None at the library root.
    pub fn current_folder(&self) -> Option<&str> {
        self.crumbs.last().map(|c| c.id.as_str())
    }

    pub fn is_root(&self) -> bool {
        self.crumbs.is_empty()
    }

    /// Breadcrumb path, root-first.
    pub fn crumbs(&self) -> &[Crumb] {
        &self.crumbs
    }

    /// Re-fetch the listings for the current location.
    ///
    /// The breadcrumb path is rebuilt from storage first, so renames and
    /// reparenting done since the last refresh show through; when the current
    /// folder no longer exists the view falls back to the root.
    pub async fn refresh(&mut self, pool: &SqlitePool, owner_id: &str) -> Result<()> {
        let folder_repo = FolderRepository::new(pool);
        let file_repo = FileRepository::new(pool);

        if let Some(current) = self.current_folder().map(String::from) {
            let path = folder_repo.get_path(&current).await?;
            self.crumbs = path
                .into_iter()
                .filter(|f| f.owner_id == owner_id)
                .map(|f| Crumb {
                    id: f.id,
                    name: f.name,
                })
                .collect();
        }

        match self.current_folder().map(String::from) {
            Some(folder_id) => {
                self.folders = folder_repo.list_by_parent(owner_id, &folder_id).await?;
                self.files = file_repo.list_by_folder(owner_id, &folder_id).await?;
                self.root_files = file_repo.list_root(owner_id).await?;
            }
            None => {
                self.folders = folder_repo.list_root(owner_id).await?;
                self.files = file_repo.list_root(owner_id).await?;
                self.root_files.clear();
            }
        }
        Ok(())
    }

    /// Open a folder one level down. Call `refresh` afterwards.
    pub fn enter_folder(&mut self, folder: &FolderRecord) {
        self.crumbs.push(Crumb {
            id: folder.id.clone(),
            name: folder.name.clone(),
        });
    }

    /// Jump to breadcrumb `index`, dropping everything after it.
    pub fn crumb_to(&mut self, index: usize) {
        if index < self.crumbs.len() {
            self.crumbs.truncate(index + 1);
        }
    }

    /// Back to the library root.
    pub fn go_root(&mut self) {
        self.crumbs.clear();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Set the name filter. Matching is a case-insensitive substring test.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn sort_ascending(&self) -> bool {
        self.ascending
    }

    /// Activate a sort column.
    ///
    /// Selecting the already-active column flips the direction; a new column
    /// starts in its default direction.
    pub fn select_sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.ascending = !self.ascending;
        } else {
            self.sort_key = key;
            self.ascending = key.default_ascending();
        }
    }

    /// Folders at the current location, filtered and sorted.
    pub fn child_folders(&self) -> Vec<&FolderRecord> {
        let query = self.search.trim().to_lowercase();
        let mut folders: Vec<&FolderRecord> = self
            .folders
            .iter()
            .filter(|f| query.is_empty() || f.name.to_lowercase().contains(&query))
            .collect();
        folders.sort_by(|a, b| self.compare_folders(a, b));
        folders
    }

    /// Files at the current location, filtered and sorted.
    pub fn child_files(&self) -> Vec<&FileRecord> {
        let query = self.search.trim().to_lowercase();
        let mut files: Vec<&FileRecord> = self
            .files
            .iter()
            .filter(|f| query.is_empty() || f.name.to_lowercase().contains(&query))
            .collect();
        files.sort_by(|a, b| self.compare_files(a, b));
        files
    }

    /// Root-level files, populated only while inside a folder.
    ///
    /// Backs the "files outside this folder" affordances; neither searched
    /// nor sorted.
    pub fn root_files(&self) -> &[FileRecord] {
        &self.root_files
    }

    fn directed(&self, ord: Ordering) -> Ordering {
        if self.ascending {
            ord
        } else {
            ord.reverse()
        }
    }

    fn compare_files(&self, a: &FileRecord, b: &FileRecord) -> Ordering {
        let ord = match self.sort_key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Modified => a.updated_at.cmp(&b.updated_at),
            SortKey::Size => a.size_bytes.cmp(&b.size_bytes),
        };
        self.directed(ord)
    }

    fn compare_folders(&self, a: &FolderRecord, b: &FolderRecord) -> Ordering {
        match self.sort_key {
            SortKey::Name => self.directed(a.name.to_lowercase().cmp(&b.name.to_lowercase())),
            SortKey::Modified => self.directed(a.updated_at.cmp(&b.updated_at)),
            // Folders have no size; keep them in name order under the size key
            SortKey::Size => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        }
    }
}
