//! User-facing notices for trackvault.
//!
//! Engine operations report their outcomes as notices. The embedding UI
//! drains the log and renders toasts however it likes; the engine never
//! blocks on presentation.

use serde::Serialize;

/// Visual tone of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// Operation completed.
    Success,
    /// Operation completed with caveats (cap hit, nothing accepted).
    Warning,
    /// Operation failed.
    Error,
}

/// A single user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Visual tone.
    pub kind: NoticeKind,
    /// Message text, ready for display.
    pub message: String,
}

impl Notice {
    /// Build a success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    /// Build a warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }

    /// Build an error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Ordered queue of pending notices.
#[derive(Debug, Default)]
pub struct NoticeLog {
    entries: Vec<Notice>,
}

impl NoticeLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notice.
    pub fn push(&mut self, notice: Notice) {
        self.entries.push(notice);
    }

    /// Take all pending notices, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.entries)
    }

    /// Peek at pending notices without consuming them.
    pub fn pending(&self) -> &[Notice] {
        &self.entries
    }

    /// Number of pending notices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Notice::success("ok").kind, NoticeKind::Success);
        assert_eq!(Notice::warning("hm").kind, NoticeKind::Warning);
        assert_eq!(Notice::error("no").kind, NoticeKind::Error);
        assert_eq!(Notice::success("ok").message, "ok");
    }

    #[test]
    fn test_push_and_drain_preserves_order() {
        let mut log = NoticeLog::new();
        log.push(Notice::success("first"));
        log.push(Notice::error("second"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.pending()[0].message, "first");

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].message, "second");
        assert!(log.is_empty());
    }

    #[test]
    fn test_drain_empty() {
        let mut log = NoticeLog::new();
        assert!(log.drain().is_empty());
    }
}
