use serde::{Deserialize, Serialize};

use crate::{
    db::models::DocumentView,
    history::{PathRemoval, Rectangle, TextRemoval, UuidIds},
    AppState,
};

/// Content selected for removal in one editor action.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalInput {
    #[serde(default)]
    pub text: Vec<TextRemoval>,
    #[serde(default)]
    pub paths: Vec<PathRemoval>,
    #[serde(default)]
    pub rectangles: Vec<Rectangle>,
}

/// Outcome of an undo/redo/edit call: the affected edit id (if any) and the
/// document as it now stands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub edit_ids: Vec<String>,
    pub document: DocumentView,
}

pub async fn create_document(
    state: &AppState,
    title: String,
    source_url: Option<String>,
) -> Result<DocumentView, String> {
    let doc = state
        .db
        .create_document(title, source_url)
        .await
        .map_err(|e| e.to_string())?;
    Ok(DocumentView::from(&doc))
}

pub async fn get_document(state: &AppState, document_id: String) -> Result<DocumentView, String> {
    let doc = state
        .db
        .get_document(&document_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("document {document_id} not found"))?;
    Ok(DocumentView::from(&doc))
}

/// Apply a removal: text spans and paths share one edit, inpainted
/// rectangles each get their own.
pub async fn remove_document_content(
    state: &AppState,
    document_id: String,
    input: RemovalInput,
) -> Result<EditOutcome, String> {
    let (doc, edit_ids) = state
        .db
        .modify_document(&document_id, move |edits| {
            let mut ids = UuidIds;
            let mut recorded = Vec::new();
            if !input.text.is_empty() || !input.paths.is_empty() {
                recorded.push(edits.remove_content(input.text, input.paths, &mut ids));
            }
            if !input.rectangles.is_empty() {
                recorded.extend(edits.add_inpainted_rectangles(input.rectangles, &mut ids));
            }
            recorded
        })
        .await
        .map_err(|e| e.to_string())?;

    Ok(EditOutcome {
        edit_ids,
        document: DocumentView::from(&doc),
    })
}

pub async fn undo_document_edit(state: &AppState, document_id: String) -> Result<EditOutcome, String> {
    let (doc, undone) = state
        .db
        .modify_document(&document_id, |edits| edits.undo())
        .await
        .map_err(|e| e.to_string())?;

    Ok(EditOutcome {
        edit_ids: undone.into_iter().collect(),
        document: DocumentView::from(&doc),
    })
}

pub async fn redo_document_edit(state: &AppState, document_id: String) -> Result<EditOutcome, String> {
    let (doc, redone) = state
        .db
        .modify_document(&document_id, |edits| edits.redo())
        .await
        .map_err(|e| e.to_string())?;

    Ok(EditOutcome {
        edit_ids: redone.into_iter().collect(),
        document: DocumentView::from(&doc),
    })
}

pub async fn set_page_deleted(
    state: &AppState,
    document_id: String,
    page: u32,
    deleted: bool,
) -> Result<DocumentView, String> {
    let (doc, _) = state
        .db
        .modify_document(&document_id, move |edits| {
            if deleted {
                edits.delete_page(page)
            } else {
                edits.restore_page(page)
            }
        })
        .await
        .map_err(|e| e.to_string())?;
    Ok(DocumentView::from(&doc))
}

pub async fn delete_document(state: &AppState, document_id: String) -> Result<(), String> {
    let existed = state
        .db
        .delete_document(&document_id)
        .await
        .map_err(|e| e.to_string())?;
    if existed {
        Ok(())
    } else {
        Err(format!("document {document_id} not found"))
    }
}
