use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::{EditLogSnapshot, PathRemoval, Rectangle, RemovalEdits, TextRemoval};

/// An editable document (e.g. a property brochure) and its removal edits.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub source_url: Option<String>,
    pub edits: RemovalEdits,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Serializable view of a document for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub id: String,
    pub title: String,
    pub source_url: Option<String>,
    pub visible_text: Vec<TextRemoval>,
    pub visible_paths: Vec<PathRemoval>,
    pub visible_rectangles: Vec<Rectangle>,
    pub deleted_pages: BTreeSet<u32>,
    pub edit_log: EditLogSnapshot,
    pub can_undo: bool,
    pub can_redo: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for DocumentView {
    fn from(doc: &Document) -> Self {
        let edits = &doc.edits;
        DocumentView {
            id: doc.id.clone(),
            title: doc.title.clone(),
            source_url: doc.source_url.clone(),
            visible_text: edits.visible_text_removals().into_iter().cloned().collect(),
            visible_paths: edits.visible_path_removals().into_iter().cloned().collect(),
            visible_rectangles: edits.visible_rectangles().into_iter().cloned().collect(),
            deleted_pages: edits.deleted_pages.clone(),
            edit_log: edits.edit_log.snapshot(),
            can_undo: edits.edit_log.can_undo(),
            can_redo: edits.edit_log.can_redo(),
            updated_at: doc.updated_at,
        }
    }
}
