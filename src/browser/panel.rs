//! The files panel: operation boundary between a UI and the library engine.
//!
//! [`FilesPanel`] owns the browsing state (view, selection, drag, rename),
//! the notice log the UI drains, and the authenticated owner. Every
//! operation catches its own errors: failures are logged and surfaced as
//! exactly one user-facing notice, never propagated to the caller.

use std::sync::Arc;

use tracing::{error, warn};

use crate::browser::{DragState, DropTarget, LibraryView, RenameState, Selection, SortKey};
use crate::db::Database;
use crate::ingest::{flatten, screen, DropPayload};
use crate::media::{
    CategorySet, FileRepository, FolderRepository, ItemKey, ItemKind, LibraryService,
    MAX_BATCH_FILES,
};
use crate::notify::{Notice, NoticeLog};
use crate::storage::BlobStore;
use crate::upload::{UploadPipeline, DEFAULT_MAX_FILE_BYTES};
use crate::VaultError;

/// Stateful entry point for one browser surface.
pub struct FilesPanel {
    db: Arc<Database>,
    blobs: Arc<dyn BlobStore>,
    accept: CategorySet,
    max_file_bytes: usize,
    owner: Option<String>,
    view: LibraryView,
    selection: Selection,
    drag: DragState,
    rename: RenameState,
    notices: NoticeLog,
    progress: Option<u8>,
    storage_used: i64,
}

impl FilesPanel {
    /// Create a panel with no signed-in owner.
    pub fn new(db: Arc<Database>, blobs: Arc<dyn BlobStore>, accept: CategorySet) -> Self {
        Self {
            db,
            blobs,
            accept,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            owner: None,
            view: LibraryView::new(),
            selection: Selection::new(),
            drag: DragState::new(),
            rename: RenameState::new(),
            notices: NoticeLog::new(),
            progress: None,
            storage_used: 0,
        }
    }

    /// Override the per-file upload size cap.
    pub fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// Attach an authenticated owner and load their library.
    pub async fn sign_in(&mut self, owner_id: impl Into<String>) {
        self.reset_browsing_state();
        self.owner = Some(owner_id.into());
        self.refresh().await;
    }

    /// Detach the owner and drop all browsing state.
    pub fn sign_out(&mut self) {
        self.owner = None;
        self.reset_browsing_state();
        self.storage_used = 0;
    }

    fn reset_browsing_state(&mut self) {
        self.view = LibraryView::new();
        self.selection.clear();
        self.drag.cancel();
        self.rename.cancel();
        self.progress = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.owner.is_some()
    }

    pub fn view(&self) -> &LibraryView {
        &self.view
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn rename_state(&self) -> &RenameState {
        &self.rename
    }

    /// Aggregate upload progress, present only while a batch is running.
    pub fn progress(&self) -> Option<u8> {
        self.progress
    }

    /// Total stored bytes for the signed-in owner.
    pub fn storage_used(&self) -> i64 {
        self.storage_used
    }

    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    /// Hand pending notices to the UI.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// The owner id, or an auth notice when nobody is signed in.
    fn authed(&mut self) -> Option<String> {
        match self.owner.clone() {
            Some(owner) => Some(owner),
            None => {
                self.notices
                    .push(Notice::error(VaultError::AuthRequired.to_string()));
                None
            }
        }
    }

    /// Re-fetch the view listings and the storage usage.
    ///
    /// Failures here are logged but not surfaced: a refresh runs on the tail
    /// of other operations, which already produced their own notice.
    pub async fn refresh(&mut self) {
        let Some(owner) = self.owner.clone() else {
            return;
        };
        if let Err(e) = self.view.refresh(self.db.pool(), &owner).await {
            warn!("View refresh failed: {e}");
        }
        match FileRepository::new(self.db.pool()).total_size(&owner).await {
            Ok(total) => self.storage_used = total,
            Err(e) => warn!("Storage usage query failed: {e}"),
        }
    }

    // ----- navigation -----

    /// Open a folder and show its contents.
    pub async fn open_folder(&mut self, folder_id: &str) {
        let Some(owner) = self.authed() else { return };

        let found = {
            let repo = FolderRepository::new(self.db.pool());
            repo.get_by_id(folder_id).await
        };

        match found {
            Ok(Some(folder)) if folder.owner_id == owner => {
                self.view.enter_folder(&folder);
                self.refresh().await;
            }
            Ok(_) => {
                self.notices.push(Notice::warning("Folder not found"));
            }
            Err(e) => {
                error!("Opening folder {folder_id} failed: {e}");
                self.notices
                    .push(Notice::error(format!("Could not open folder: {e}")));
            }
        }
    }

    /// Jump to a breadcrumb segment.
    pub async fn crumb_to(&mut self, index: usize) {
        self.view.crumb_to(index);
        self.refresh().await;
    }

    /// Back to the library root.
    pub async fn go_root(&mut self) {
        self.view.go_root();
        self.refresh().await;
    }

    /// Set the name filter.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.view.set_search(query);
    }

    /// Activate a sort column (re-selecting flips direction).
    pub fn select_sort(&mut self, key: SortKey) {
        self.view.select_sort(key);
    }

    // ----- selection -----

    pub fn toggle_select(&mut self, key: ItemKey) {
        self.selection.toggle(key);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ----- drag-move -----

    /// Start dragging an item; a multi-selection travels together.
    pub fn begin_drag(&mut self, item: ItemKey) {
        self.drag.begin(item, &self.selection);
    }

    pub fn drag_enter(&mut self, target: DropTarget) {
        self.drag.enter(target);
    }

    pub fn drag_leave(&mut self) {
        self.drag.leave();
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn active_drop_target(&self) -> Option<&DropTarget> {
        self.drag.active_target()
    }

    /// Complete an item drag: reparent the payload into the drop target.
    pub async fn handle_move_drop(&mut self) {
        let Some((payload, target)) = self.drag.take_drop() else {
            return;
        };
        let Some(owner) = self.authed() else { return };

        let target_id = match &target {
            DropTarget::Root => None,
            DropTarget::Folder(id) => Some(id.as_str()),
        };

        let result = {
            let service = LibraryService::new(self.db.pool(), self.blobs.as_ref());
            service.move_items(&owner, &payload, target_id).await
        };

        match result {
            Ok(outcome) if outcome.is_clean() => {
                self.notices
                    .push(Notice::success(format!("Moved {} item(s)", outcome.moved)));
                self.selection.clear();
            }
            Ok(outcome) => {
                let detail = outcome
                    .failures
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "unknown error".to_string());
                error!(
                    "Move finished with {} failure(s): {}",
                    outcome.failures.len(),
                    detail
                );
                self.notices.push(Notice::error(format!(
                    "Moved {} of {} item(s): {detail}",
                    outcome.moved,
                    payload.len()
                )));
            }
            Err(e) => {
                error!("Move failed: {e}");
                self.notices.push(Notice::error(format!("Move failed: {e}")));
            }
        }
        self.refresh().await;
    }

    // ----- ingest & upload -----

    /// Ingest a drop of native OS files and upload what passes screening.
    ///
    /// `target_folder` is the folder card the drop landed on; None uploads
    /// into the currently open location.
    pub async fn handle_file_drop(&mut self, payload: DropPayload, target_folder: Option<&str>) {
        let Some(owner) = self.authed() else { return };

        // Check the destination folder before reading any dropped bytes
        let folder = target_folder
            .map(String::from)
            .or_else(|| self.view.current_folder().map(String::from));
        if let Some(folder_id) = &folder {
            let found = {
                let repo = FolderRepository::new(self.db.pool());
                repo.get_by_id(folder_id).await
            };
            match found {
                Ok(Some(f)) if f.owner_id == owner => {}
                Ok(_) => {
                    self.notices.push(Notice::warning("Folder not found"));
                    return;
                }
                Err(e) => {
                    error!("Resolving drop folder {folder_id} failed: {e}");
                    self.notices
                        .push(Notice::error(format!("Upload failed: {e}")));
                    return;
                }
            }
        }

        let files = match flatten(payload).await {
            Ok(files) => files,
            Err(e) => {
                error!("Reading dropped entries failed: {e}");
                self.notices
                    .push(Notice::error(format!("Drop failed: {e}")));
                return;
            }
        };

        let screened = screen(files, &self.accept);
        if screened.rejected > 0 {
            self.notices.push(Notice::warning(format!(
                "Skipped {} unsupported file(s)",
                screened.rejected
            )));
        }
        if screened.truncated > 0 {
            self.notices.push(Notice::warning(format!(
                "Only the first {MAX_BATCH_FILES} files in a drop are uploaded"
            )));
        }
        if screened.accepted.is_empty() {
            self.notices
                .push(Notice::warning("No supported files in that drop"));
            return;
        }

        let result = {
            let pipeline = UploadPipeline::new(self.db.pool(), self.blobs.as_ref())
                .with_max_file_bytes(self.max_file_bytes);
            let progress = &mut self.progress;
            pipeline
                .upload(&owner, folder.as_deref(), &screened.accepted, |p| {
                    *progress = Some(p)
                })
                .await
        };
        self.progress = None;

        match result {
            Ok(uploaded) => {
                self.notices.push(Notice::success(format!(
                    "Uploaded {} file(s)",
                    uploaded.len()
                )));
                self.selection.clear();
            }
            Err(e) => {
                error!("Upload failed: {e}");
                self.notices
                    .push(Notice::error(format!("Upload failed: {e}")));
            }
        }
        self.refresh().await;
    }

    // ----- folders -----

    /// Create a folder at the current location.
    pub async fn create_folder(&mut self, name: &str) {
        let Some(owner) = self.authed() else { return };
        let parent = self.view.current_folder().map(String::from);

        let result = {
            let service = LibraryService::new(self.db.pool(), self.blobs.as_ref());
            service.create_folder(&owner, name, parent.as_deref()).await
        };

        match result {
            Ok(folder) => {
                self.notices
                    .push(Notice::success(format!("Created folder \"{}\"", folder.name)));
                self.refresh().await;
            }
            Err(VaultError::Validation(msg)) => {
                self.notices.push(Notice::warning(msg));
            }
            Err(e) => {
                error!("Folder creation failed: {e}");
                self.notices
                    .push(Notice::error(format!("Could not create folder: {e}")));
            }
        }
    }

    // ----- rename -----

    /// Open the inline editor for `key`, seeded with the current name.
    pub fn begin_rename(&mut self, key: ItemKey, current_name: &str) {
        self.rename.begin(key, current_name);
    }

    /// Update the rename buffer.
    pub fn edit_rename(&mut self, text: &str) {
        self.rename.edit(text);
    }

    /// Close the editor without committing.
    pub fn cancel_rename(&mut self) {
        self.rename.cancel();
    }

    /// Commit the rename buffer.
    ///
    /// An empty trimmed buffer is rejected with a validation notice and
    /// leaves the stored name untouched. The editor closes either way.
    pub async fn commit_rename(&mut self) {
        let Some((key, buffer)) = self.rename.take_commit() else {
            return;
        };
        if self.authed().is_none() {
            return;
        }

        let result = {
            let service = LibraryService::new(self.db.pool(), self.blobs.as_ref());
            service.rename_item(&key, &buffer).await
        };

        match result {
            Ok(name) => {
                self.notices
                    .push(Notice::success(format!("Renamed to \"{name}\"")));
                self.refresh().await;
            }
            Err(VaultError::Validation(msg)) => {
                self.notices.push(Notice::warning(msg));
            }
            Err(e) => {
                error!("Rename failed: {e}");
                self.notices
                    .push(Notice::error(format!("Rename failed: {e}")));
            }
        }
    }

    // ----- star -----

    /// Flip the starred flag of an item.
    pub async fn toggle_star(&mut self, key: ItemKey) {
        if self.authed().is_none() {
            return;
        }

        let result = {
            let service = LibraryService::new(self.db.pool(), self.blobs.as_ref());
            service.toggle_star(&key).await
        };

        match result {
            Ok((name, true)) => {
                self.notices
                    .push(Notice::success(format!("Starred \"{name}\"")));
                self.refresh().await;
            }
            Ok((name, false)) => {
                self.notices
                    .push(Notice::success(format!("Unstarred \"{name}\"")));
                self.refresh().await;
            }
            Err(e) => {
                error!("Star toggle failed: {e}");
                self.notices
                    .push(Notice::error(format!("Could not update star: {e}")));
            }
        }
    }

    // ----- deletion -----

    /// Permanently delete an item. Folder deletion takes the folder's direct
    /// files with it.
    pub async fn delete_item(&mut self, key: ItemKey) {
        if self.authed().is_none() {
            return;
        }

        let result = {
            let service = LibraryService::new(self.db.pool(), self.blobs.as_ref());
            match key.kind {
                ItemKind::File => service
                    .delete_file(&key.id)
                    .await
                    .map(|file| format!("Deleted \"{}\"", file.name)),
                ItemKind::Folder => service.delete_folder(&key.id).await.map(|deletion| {
                    format!(
                        "Deleted \"{}\" and {} file(s)",
                        deletion.name, deletion.files_removed
                    )
                }),
            }
        };

        match result {
            Ok(message) => {
                self.selection.remove(&key);
                self.notices.push(Notice::success(message));
                self.refresh().await;
            }
            Err(e) => {
                error!("Deletion failed: {e}");
                self.notices
                    .push(Notice::error(format!("Delete failed: {e}")));
            }
        }
    }
}
