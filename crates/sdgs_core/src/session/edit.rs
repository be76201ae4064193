//! Single-slot edit-session tracker.
//!
//! Transitions:
//! - `none -> editing(id)` on `start`.
//! - `editing(id) -> none` on `finish(id)`, `cancel`, or `invalidate(id)`.
//! - `start` while editing replaces the target; there is one editor.

use crate::model::record::RecordId;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditSession {
    target: Option<RecordId>,
}

impl EditSession {
    pub fn target(&self) -> Option<&RecordId> {
        self.target.as_ref()
    }

    pub fn is_editing(&self, id: &RecordId) -> bool {
        self.target.as_ref() == Some(id)
    }

    /// Returns the replaced target, if any.
    pub fn start(&mut self, id: RecordId) -> Option<RecordId> {
        self.target.replace(id)
    }

    pub fn cancel(&mut self) -> Option<RecordId> {
        self.target.take()
    }

    /// Clears the slot after a successful submit of `id`.
    pub fn finish(&mut self, id: &RecordId) -> bool {
        self.invalidate(id)
    }

    /// Clears the slot only when it references `id`.
    pub fn invalidate(&mut self, id: &RecordId) -> bool {
        if self.is_editing(id) {
            self.target = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EditSession;
    use crate::model::record::RecordId;

    #[test]
    fn invalidate_only_clears_matching_target() {
        let a = RecordId::derive("A", 2020);
        let b = RecordId::derive("B", 2020);
        let mut edit = EditSession::default();

        assert_eq!(edit.start(a.clone()), None);
        assert!(!edit.invalidate(&b));
        assert_eq!(edit.target(), Some(&a));

        assert!(edit.invalidate(&a));
        assert_eq!(edit.target(), None);
    }

    #[test]
    fn start_replaces_previous_target() {
        let a = RecordId::derive("A", 2020);
        let b = RecordId::derive("B", 2021);
        let mut edit = EditSession::default();

        edit.start(a.clone());
        assert_eq!(edit.start(b.clone()), Some(a));
        assert!(edit.is_editing(&b));
        assert_eq!(edit.cancel(), Some(b));
        assert_eq!(edit.cancel(), None);
    }
}
