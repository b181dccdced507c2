//! Inline-rename state machine.
//!
//! At most one item is ever in edit mode. The buffer holds the edited text;
//! nothing is written to storage until the commit is taken and handed to the
//! library service.

use crate::media::ItemKey;

/// Rename editor state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RenameState {
    /// No rename in progress.
    #[default]
    Idle,
    /// `key` is being renamed; `buffer` holds the edited text.
    Editing { key: ItemKey, buffer: String },
}

impl RenameState {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The item being edited, if any.
    pub fn editing_key(&self) -> Option<&ItemKey> {
        match self {
            Self::Idle => None,
            Self::Editing { key, .. } => Some(key),
        }
    }

    /// Current buffer contents, if editing.
    pub fn buffer(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Editing { buffer, .. } => Some(buffer),
        }
    }

    /// Start editing `key`, seeding the buffer with the current name.
    ///
    /// Starting a rename while another is open abandons the first edit.
    pub fn begin(&mut self, key: ItemKey, current_name: impl Into<String>) {
        *self = Self::Editing {
            key,
            buffer: current_name.into(),
        };
    }

    /// Replace the buffer. Ignored when idle.
    pub fn edit(&mut self, text: impl Into<String>) {
        if let Self::Editing { buffer, .. } = self {
            *buffer = text.into();
        }
    }

    /// Abandon the edit, discarding the buffer.
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    /// End the edit and hand back what should be committed.
    ///
    /// The state always returns to idle; validation of the buffer is the
    /// caller's job.
    pub fn take_commit(&mut self) -> Option<(ItemKey, String)> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Editing { key, buffer } => Some((key, buffer)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_seeds_buffer() {
        let mut state = RenameState::new();
        assert!(state.is_idle());

        state.begin(ItemKey::file("f1"), "track.mp3");
        assert_eq!(state.editing_key(), Some(&ItemKey::file("f1")));
        assert_eq!(state.buffer(), Some("track.mp3"));
    }

    #[test]
    fn test_edit_updates_buffer() {
        let mut state = RenameState::new();
        state.begin(ItemKey::file("f1"), "old");
        state.edit("new name");
        assert_eq!(state.buffer(), Some("new name"));
    }

    #[test]
    fn test_edit_when_idle_is_ignored() {
        let mut state = RenameState::new();
        state.edit("nothing");
        assert!(state.is_idle());
    }

    #[test]
    fn test_cancel_discards() {
        let mut state = RenameState::new();
        state.begin(ItemKey::folder("d1"), "Demos");
        state.cancel();
        assert!(state.is_idle());
        assert!(state.take_commit().is_none());
    }

    #[test]
    fn test_take_commit_returns_and_idles() {
        let mut state = RenameState::new();
        state.begin(ItemKey::file("f1"), "old");
        state.edit("final");

        let (key, buffer) = state.take_commit().unwrap();
        assert_eq!(key, ItemKey::file("f1"));
        assert_eq!(buffer, "final");
        assert!(state.is_idle());
    }

    #[test]
    fn test_second_begin_replaces_first() {
        let mut state = RenameState::new();
        state.begin(ItemKey::file("f1"), "one");
        state.begin(ItemKey::folder("d1"), "two");

        let (key, buffer) = state.take_commit().unwrap();
        assert_eq!(key, ItemKey::folder("d1"));
        assert_eq!(buffer, "two");
    }
}
