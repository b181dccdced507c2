//! Multi-select state for the file browser.

use crate::media::ItemKey;

/// An insertion-ordered set of selected items.
///
/// Order matters: batch operations (drag-move) process items in the order
/// they were selected.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    items: Vec<ItemKey>,
}

impl Selection {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `key`. Returns true when the item is now selected.
    pub fn toggle(&mut self, key: ItemKey) -> bool {
        if let Some(pos) = self.items.iter().position(|k| *k == key) {
            self.items.remove(pos);
            false
        } else {
            self.items.push(key);
            true
        }
    }

    /// Drop `key` from the selection if present.
    pub fn remove(&mut self, key: &ItemKey) {
        self.items.retain(|k| k != key);
    }

    /// Whether `key` is selected.
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.items.iter().any(|k| k == key)
    }

    /// Selected items in selection order.
    pub fn items(&self) -> &[ItemKey] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut selection = Selection::new();

        assert!(selection.toggle(ItemKey::file("f1")));
        assert!(selection.contains(&ItemKey::file("f1")));
        assert_eq!(selection.len(), 1);

        assert!(!selection.toggle(ItemKey::file("f1")));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_kind_distinguishes_items() {
        // A file and a folder sharing an id are distinct selections
        let mut selection = Selection::new();
        selection.toggle(ItemKey::file("x"));
        selection.toggle(ItemKey::folder("x"));
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut selection = Selection::new();
        selection.toggle(ItemKey::file("a"));
        selection.toggle(ItemKey::folder("b"));
        selection.toggle(ItemKey::file("c"));
        selection.toggle(ItemKey::folder("b"));

        let ids: Vec<&str> = selection.items().iter().map(|k| k.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut selection = Selection::new();
        selection.toggle(ItemKey::file("a"));
        selection.toggle(ItemKey::file("b"));

        selection.remove(&ItemKey::file("a"));
        assert!(!selection.contains(&ItemKey::file("a")));
        assert_eq!(selection.len(), 1);

        selection.clear();
        assert!(selection.is_empty());
    }
}
