//! TRACKVAULT - Media library engine for a creator storefront
//!
//! Folder hierarchy, drag-and-drop ingest and batch upload over a SQLite
//! metadata store and a pluggable blob store.

pub mod browser;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod media;
pub mod notify;
pub mod storage;
pub mod upload;

pub use browser::{
    Crumb, DragState, DropTarget, FilesPanel, LibraryView, RenameState, Selection, SortKey,
};
pub use config::Config;
pub use db::Database;
pub use error::{Result, VaultError};
pub use ingest::{
    flatten, screen, DirectoryReader, DropEntry, DropPayload, DroppedFile, ScreenedBatch,
};
pub use media::{
    classify_mime, extension_label, CategorySet, FileRecord, FileRepository, FileUpdate,
    FolderDeletion, FolderRecord, FolderRepository, FolderUpdate, ItemKey, ItemKind,
    LibraryService, MediaCategory, MoveOutcome, NewFile, NewFolder, MAX_BATCH_FILES,
    MAX_NAME_LENGTH,
};
pub use notify::{Notice, NoticeKind, NoticeLog};
pub use storage::{BlobStore, LocalBlobStore};
pub use upload::UploadPipeline;
