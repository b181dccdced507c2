//! Browser surface: view projection, selection, drag-move, rename and the
//! files panel that ties them together.

mod drag;
mod panel;
mod rename;
mod selection;
mod view;

pub use drag::{DragState, DropTarget};
pub use panel::FilesPanel;
pub use rename::RenameState;
pub use selection::Selection;
pub use view::{Crumb, LibraryView, SortKey};
