//! Media library module for trackvault.
//!
//! This module provides the library's domain layer:
//! - MIME-based media type classification
//! - Folder and file metadata repositories
//! - Library mutations (move, rename, star, delete, create folder)

mod category;
mod file;
mod folder;
mod service;

pub use category::{classify_mime, extension_label, CategorySet, MediaCategory};
pub use file::{FileRecord, FileRepository, FileUpdate, NewFile};
pub use folder::{FolderRecord, FolderRepository, FolderUpdate, NewFolder};
pub use service::{FolderDeletion, ItemKey, ItemKind, LibraryService, MoveOutcome};

/// Maximum number of files accepted from a single drop.
pub const MAX_BATCH_FILES: usize = 10;

/// Maximum length for file/folder names (in characters).
pub const MAX_NAME_LENGTH: usize = 100;
