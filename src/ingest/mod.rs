//! Drag-and-drop ingest: dropped-entry model, tree flattening and batch
//! screening.

mod collect;
mod entry;

pub use collect::{flatten, screen, ScreenedBatch};
pub use entry::{DirectoryReader, DropEntry, DropPayload, DroppedFile};
