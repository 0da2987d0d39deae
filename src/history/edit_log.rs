//! Undo/redo log of edit identifiers.
//!
//! The log only moves ids between two stacks; callers decide what an id
//! means (a removed text span, a removed path, an inpainted rectangle).
//!
//! ```text
//! record(a), record(b)     undo: [a, b]   redo: []
//! undo() -> b              undo: [a]      redo: [b]
//! record(c)                undo: [a, c]   redo: []      (b is discarded)
//! ```
//!
//! An id is never in both stacks at once. Undo and redo on an empty stack
//! return `None` and change nothing, so callers may invoke them freely.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// Flat form of the log, as persisted next to the edited document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditLogSnapshot {
    #[serde(default)]
    pub undo_stack: Vec<String>,
    #[serde(default)]
    pub redo_stack: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditLogStore {
    /// Applied edits, oldest first.
    undo_stack: Vec<String>,
    /// Undone edits, most recently undone last.
    redo_stack: Vec<String>,
}

impl EditLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a persisted log. Rejects snapshots that list an id in both stacks.
    pub fn from_snapshot(snapshot: EditLogSnapshot) -> Result<Self, HistoryError> {
        let applied: HashSet<&str> = snapshot.undo_stack.iter().map(String::as_str).collect();
        if let Some(id) = snapshot
            .redo_stack
            .iter()
            .find(|id| applied.contains(id.as_str()))
        {
            return Err(HistoryError::conflicting(id.clone()));
        }

        Ok(Self {
            undo_stack: snapshot.undo_stack,
            redo_stack: snapshot.redo_stack,
        })
    }

    pub fn snapshot(&self) -> EditLogSnapshot {
        EditLogSnapshot {
            undo_stack: self.undo_stack.clone(),
            redo_stack: self.redo_stack.clone(),
        }
    }

    /// Record a new forward edit. Outstanding redo history is discarded.
    pub fn record_edit(&mut self, edit_id: impl Into<String>) {
        self.undo_stack.push(edit_id.into());
        self.redo_stack.clear();
    }

    /// Record several edits produced by one action, in order.
    pub fn record_edits<I, S>(&mut self, edit_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.undo_stack
            .extend(edit_ids.into_iter().map(Into::into));
        self.redo_stack.clear();
    }

    pub fn undo(&mut self) -> Option<String> {
        let edit_id = self.undo_stack.pop()?;
        self.redo_stack.push(edit_id.clone());
        Some(edit_id)
    }

    pub fn redo(&mut self) -> Option<String> {
        let edit_id = self.redo_stack.pop()?;
        self.undo_stack.push(edit_id.clone());
        Some(edit_id)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// The edit is currently in effect.
    pub fn is_applied(&self, edit_id: &str) -> bool {
        self.undo_stack.iter().any(|id| id == edit_id)
    }

    /// The edit was undone and will be dropped by the next forward edit.
    pub fn is_discarded_on_next_edit(&self, edit_id: &str) -> bool {
        self.redo_stack.iter().any(|id| id == edit_id)
    }

    /// The id sits in either stack.
    pub fn contains(&self, edit_id: &str) -> bool {
        self.is_applied(edit_id) || self.is_discarded_on_next_edit(edit_id)
    }

    pub fn undo_stack(&self) -> &[String] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[String] {
        &self.redo_stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_undo_and_redo_are_noops() {
        let mut log = EditLogStore::new();
        assert_eq!(log.undo(), None);
        assert_eq!(log.redo(), None);
        assert!(log.undo_stack().is_empty());
        assert!(log.redo_stack().is_empty());
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut log = EditLogStore::new();
        log.record_edit("x1");
        log.record_edit("x2");

        assert_eq!(log.undo().as_deref(), Some("x2"));
        assert_eq!(log.undo().as_deref(), Some("x1"));
        assert_eq!(log.redo().as_deref(), Some("x1"));
        assert_eq!(log.undo_stack(), ["x1"]);
        assert_eq!(log.redo_stack(), ["x2"]);

        assert_eq!(log.redo().as_deref(), Some("x2"));
        assert_eq!(log.undo_stack(), ["x1", "x2"]);
        assert!(log.redo_stack().is_empty());
    }

    #[test]
    fn new_edit_discards_redo_history() {
        let mut log = EditLogStore::new();
        log.record_edit("x1");
        log.undo();
        assert_eq!(log.redo_stack(), ["x1"]);

        log.record_edit("x2");

        assert_eq!(log.undo_stack(), ["x2"]);
        assert!(log.redo_stack().is_empty());
        assert_eq!(log.redo(), None);
    }

    #[test]
    fn redo_after_undo_restores_same_edit() {
        let mut log = EditLogStore::new();
        log.record_edit("a");
        log.record_edit("b");
        let undone = log.undo();
        assert_eq!(log.redo(), undone);
        assert_eq!(log.undo_stack(), ["a", "b"]);
    }

    #[test]
    fn batch_edit_clears_redo_once_and_keeps_order() {
        let mut log = EditLogStore::new();
        log.record_edit("old");
        log.undo();

        log.record_edits(["r1", "r2", "r3"]);

        assert_eq!(log.undo_stack(), ["r1", "r2", "r3"]);
        assert!(!log.can_redo());
        assert_eq!(log.undo().as_deref(), Some("r3"));
    }

    #[test]
    fn applied_and_pending_flags_follow_the_stacks() {
        let mut log = EditLogStore::new();
        log.record_edit("a");
        log.record_edit("b");
        log.undo();

        assert!(log.is_applied("a"));
        assert!(!log.is_applied("b"));
        assert!(log.is_discarded_on_next_edit("b"));
        assert!(log.can_undo() && log.can_redo());
    }

    #[test]
    fn snapshot_round_trip() {
        let mut log = EditLogStore::new();
        log.record_edits(["a", "b", "c"]);
        log.undo();

        let snapshot = log.snapshot();
        assert_eq!(
            serde_json::to_value(&snapshot).unwrap(),
            serde_json::json!({ "undoStack": ["a", "b"], "redoStack": ["c"] })
        );

        let restored = EditLogStore::from_snapshot(snapshot).unwrap();
        assert_eq!(restored, log);
    }

    #[test]
    fn snapshot_missing_redo_stack_defaults_to_empty() {
        let snapshot: EditLogSnapshot = serde_json::from_str(r#"{"undoStack":["a"]}"#).unwrap();
        let log = EditLogStore::from_snapshot(snapshot).unwrap();
        assert_eq!(log.undo_stack(), ["a"]);
        assert!(!log.can_redo());
    }

    #[test]
    fn conflicting_snapshot_is_rejected() {
        let snapshot = EditLogSnapshot {
            undo_stack: vec!["a".into(), "b".into()],
            redo_stack: vec!["b".into()],
        };
        assert_eq!(
            EditLogStore::from_snapshot(snapshot),
            Err(HistoryError::ConflictingSnapshot { id: "b".into() })
        );
    }
}
