use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::history::edit_log::EditLogStore;
use crate::history::ids::IdGenerator;

/// Content that can be removed from a document as part of an undoable edit.
/// Entries get their edit id when the edit that removes them is recorded;
/// an id the entry arrives with is overwritten.
pub trait EditTagged {
    fn edit_id(&self) -> Option<&str>;
    fn set_edit_id(&mut self, edit_id: String);
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextRemoval {
    #[serde(default)]
    pub id: Option<String>,
    pub page: u32,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PathRemoval {
    #[serde(default)]
    pub id: Option<String>,
    pub page: u32,
    /// SVG path data.
    pub d: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    #[serde(default)]
    pub id: Option<String>,
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

macro_rules! impl_edit_tagged {
    ($($ty:ty),*) => {
        $(
            impl EditTagged for $ty {
                fn edit_id(&self) -> Option<&str> {
                    self.id.as_deref()
                }

                fn set_edit_id(&mut self, edit_id: String) {
                    self.id = Some(edit_id);
                }
            }
        )*
    };
}

impl_edit_tagged!(TextRemoval, PathRemoval, Rectangle);

/// Removal edits made to one document, plus the log that makes them undoable.
///
/// Removal lists keep every entry ever recorded; an entry is in effect only
/// while its edit id sits in the undo stack. Entries whose edit was undone
/// are dropped once a new edit discards the redo history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovalEdits {
    pub text_to_remove: Vec<TextRemoval>,
    pub paths_to_remove: Vec<PathRemoval>,
    pub inpainted_rectangles: Vec<Rectangle>,
    pub deleted_pages: BTreeSet<u32>,
    pub edit_log: EditLogStore,
}

impl RemovalEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove text spans and paths as one edit. Returns the edit id.
    pub fn remove_content(
        &mut self,
        text: Vec<TextRemoval>,
        paths: Vec<PathRemoval>,
        ids: &mut impl IdGenerator,
    ) -> String {
        self.discard_redo_content();
        let edit_id = self.fresh_id(ids, &HashSet::new());

        self.text_to_remove
            .extend(tag_all(text, || edit_id.clone()));
        self.paths_to_remove
            .extend(tag_all(paths, || edit_id.clone()));

        self.edit_log.record_edit(edit_id.clone());
        edit_id
    }

    /// Append inpainted rectangles, each its own edit, recorded as one batch.
    pub fn add_inpainted_rectangles(
        &mut self,
        rectangles: Vec<Rectangle>,
        ids: &mut impl IdGenerator,
    ) -> Vec<String> {
        self.discard_redo_content();

        let mut edit_ids = Vec::with_capacity(rectangles.len());
        let mut taken = HashSet::new();
        for mut rect in rectangles {
            let edit_id = self.fresh_id(ids, &taken);
            taken.insert(edit_id.clone());
            rect.set_edit_id(edit_id.clone());
            self.inpainted_rectangles.push(rect);
            edit_ids.push(edit_id);
        }

        self.edit_log.record_edits(edit_ids.clone());
        edit_ids
    }

    pub fn undo(&mut self) -> Option<String> {
        self.edit_log.undo()
    }

    pub fn redo(&mut self) -> Option<String> {
        self.edit_log.redo()
    }

    pub fn visible_text_removals(&self) -> Vec<&TextRemoval> {
        self.applied(&self.text_to_remove)
    }

    pub fn visible_path_removals(&self) -> Vec<&PathRemoval> {
        self.applied(&self.paths_to_remove)
    }

    pub fn visible_rectangles(&self) -> Vec<&Rectangle> {
        self.applied(&self.inpainted_rectangles)
    }

    /// Returns false when the page was already deleted.
    pub fn delete_page(&mut self, page: u32) -> bool {
        self.deleted_pages.insert(page)
    }

    /// Returns false when the page was not deleted.
    pub fn restore_page(&mut self, page: u32) -> bool {
        self.deleted_pages.remove(&page)
    }

    fn applied<'a, T: EditTagged>(&self, entries: &'a [T]) -> Vec<&'a T> {
        entries
            .iter()
            .filter(|entry| {
                entry
                    .edit_id()
                    .is_some_and(|id| self.edit_log.is_applied(id))
            })
            .collect()
    }

    /// Next generated id that neither stack nor `taken` already holds. An id
    /// repeated in the undo stack would end up in both stacks after one undo.
    fn fresh_id(&self, ids: &mut impl IdGenerator, taken: &HashSet<String>) -> String {
        loop {
            let candidate = ids.next_id();
            if !self.edit_log.contains(&candidate) && !taken.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Drop content whose edit is about to fall out of the redo history.
    fn discard_redo_content(&mut self) {
        let log = &self.edit_log;
        let keep = |id: Option<&str>| !id.is_some_and(|id| log.is_discarded_on_next_edit(id));
        self.text_to_remove.retain(|entry| keep(entry.edit_id()));
        self.paths_to_remove.retain(|entry| keep(entry.edit_id()));
        self.inpainted_rectangles
            .retain(|entry| keep(entry.edit_id()));
    }
}

fn tag_all<T, F>(entries: Vec<T>, mut next_id: F) -> Vec<T>
where
    T: EditTagged,
    F: FnMut() -> String,
{
    entries
        .into_iter()
        .map(|mut entry| {
            entry.set_edit_id(next_id());
            entry
        })
        .collect()
}
