//! Drag-move state machine.
//!
//! Tracks what is being dragged and which drop zone is highlighted. Drop
//! zones are nested DOM-like surfaces, so plain enter/leave toggling would
//! flicker whenever the pointer crosses a child element; a hover-depth
//! counter keeps the highlight stable until the outermost leave.

use crate::browser::Selection;
use crate::media::ItemKey;

/// Where a drag may be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// The library root drop zone.
    Root,
    /// A folder card, by folder id.
    Folder(String),
}

/// State of an in-progress item drag.
#[derive(Debug, Default)]
pub struct DragState {
    payload: Vec<ItemKey>,
    target: Option<DropTarget>,
    hover_depth: u32,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging `item`.
    ///
    /// When the grabbed item belongs to a multi-selection the whole
    /// selection travels with it; otherwise the payload is just the item.
    pub fn begin(&mut self, item: ItemKey, selection: &Selection) {
        self.payload = if selection.len() > 1 && selection.contains(&item) {
            selection.items().to_vec()
        } else {
            vec![item]
        };
        self.target = None;
        self.hover_depth = 0;
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        !self.payload.is_empty()
    }

    /// Items travelling with the drag.
    pub fn payload(&self) -> &[ItemKey] {
        &self.payload
    }

    /// Pointer entered a drop zone (or one of its child elements).
    pub fn enter(&mut self, target: DropTarget) {
        if self.target.as_ref() == Some(&target) {
            self.hover_depth += 1;
        } else {
            self.target = Some(target);
            self.hover_depth = 1;
        }
    }

    /// Pointer left a drop zone element.
    pub fn leave(&mut self) {
        self.hover_depth = self.hover_depth.saturating_sub(1);
        if self.hover_depth == 0 {
            self.target = None;
        }
    }

    /// The drop zone currently highlighted, if any.
    pub fn active_target(&self) -> Option<&DropTarget> {
        self.target.as_ref()
    }

    /// Consume the drop: payload plus target.
    ///
    /// Resets the state unconditionally, so a drop outside any zone simply
    /// ends the drag.
    pub fn take_drop(&mut self) -> Option<(Vec<ItemKey>, DropTarget)> {
        let payload = std::mem::take(&mut self.payload);
        let target = self.target.take();
        self.hover_depth = 0;

        match target {
            Some(target) if !payload.is_empty() => Some((payload, target)),
            _ => None,
        }
    }

    /// Abort the drag without a drop.
    pub fn cancel(&mut self) {
        self.payload.clear();
        self.target = None;
        self.hover_depth = 0;
    }
}
