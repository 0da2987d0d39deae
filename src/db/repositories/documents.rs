use std::collections::BTreeSet;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_json, to_json},
    models::Document,
};
use crate::history::{EditLogSnapshot, EditLogStore, RemovalEdits};

const SELECT_DOCUMENT: &str = "SELECT id, title, source_url, text_to_remove, paths_to_remove,
        inpainted_rectangles, deleted_pages, undo_stack, redo_stack, created_at, updated_at
     FROM documents
     WHERE id = ?1";

fn row_to_document(row: &Row) -> Result<Document> {
    let text_to_remove: String = row.get("text_to_remove")?;
    let paths_to_remove: String = row.get("paths_to_remove")?;
    let inpainted_rectangles: String = row.get("inpainted_rectangles")?;
    let deleted_pages: String = row.get("deleted_pages")?;
    let undo_stack: String = row.get("undo_stack")?;
    let redo_stack: String = row.get("redo_stack")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    let edit_log = EditLogStore::from_snapshot(EditLogSnapshot {
        undo_stack: parse_json(&undo_stack, "undo_stack")?,
        redo_stack: parse_json(&redo_stack, "redo_stack")?,
    })
    .context("stored edit log is inconsistent")?;

    Ok(Document {
        id: row.get("id")?,
        title: row.get("title")?,
        source_url: row.get("source_url")?,
        edits: RemovalEdits {
            text_to_remove: parse_json(&text_to_remove, "text_to_remove")?,
            paths_to_remove: parse_json(&paths_to_remove, "paths_to_remove")?,
            inpainted_rectangles: parse_json(&inpainted_rectangles, "inpainted_rectangles")?,
            deleted_pages: parse_json::<BTreeSet<u32>>(&deleted_pages, "deleted_pages")?,
            edit_log,
        },
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn load_document(conn: &Connection, document_id: &str) -> Result<Option<Document>> {
    let mut stmt = conn.prepare(SELECT_DOCUMENT)?;
    let mut rows = stmt.query(params![document_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_document(row)?)),
        None => Ok(None),
    }
}

fn store_edits(conn: &Connection, document_id: &str, edits: &RemovalEdits) -> Result<()> {
    let snapshot = edits.edit_log.snapshot();
    let rows_affected = conn.execute(
        "UPDATE documents
         SET text_to_remove = ?1,
             paths_to_remove = ?2,
             inpainted_rectangles = ?3,
             deleted_pages = ?4,
             undo_stack = ?5,
             redo_stack = ?6,
             updated_at = ?7
         WHERE id = ?8",
        params![
            to_json(&edits.text_to_remove, "text_to_remove")?,
            to_json(&edits.paths_to_remove, "paths_to_remove")?,
            to_json(&edits.inpainted_rectangles, "inpainted_rectangles")?,
            to_json(&edits.deleted_pages, "deleted_pages")?,
            to_json(&snapshot.undo_stack, "undo_stack")?,
            to_json(&snapshot.redo_stack, "redo_stack")?,
            Utc::now().to_rfc3339(),
            document_id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(anyhow!("document {document_id} not found"));
    }
    Ok(())
}

impl Database {
    pub async fn create_document(&self, title: String, source_url: Option<String>) -> Result<Document> {
        self.execute(move |conn| {
            let now = Utc::now();
            let id = uuid::Uuid::new_v4().to_string();

            conn.execute(
                "INSERT INTO documents (id, title, source_url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, title, source_url, now.to_rfc3339(), now.to_rfc3339()],
            )?;

            load_document(conn, &id)?.ok_or_else(|| anyhow!("document not found after insert"))
        })
        .await
    }

    pub async fn get_document(&self, document_id: &str) -> Result<Option<Document>> {
        let document_id = document_id.to_string();
        self.execute(move |conn| load_document(conn, &document_id))
            .await
    }

    /// Load, mutate and persist a document's edits inside one DB task so that
    /// concurrent edits to the same document are applied one after another.
    /// A mutation that leaves the edit log unloadable is rolled back.
    pub async fn modify_document<F, T>(&self, document_id: &str, mutate: F) -> Result<(Document, T)>
    where
        F: FnOnce(&mut RemovalEdits) -> T + Send + 'static,
        T: Send + 'static,
    {
        let document_id = document_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let mut document = load_document(&tx, &document_id)?
                .ok_or_else(|| anyhow!("document {document_id} not found"))?;

            let output = mutate(&mut document.edits);
            EditLogStore::from_snapshot(document.edits.edit_log.snapshot())
                .context("edit rejected: it would leave the edit log inconsistent")?;
            store_edits(&tx, &document_id, &document.edits)?;
            tx.commit()?;

            let document = load_document(conn, &document_id)?
                .ok_or_else(|| anyhow!("document {document_id} vanished after update"))?;
            Ok((document, output))
        })
        .await
    }

    pub async fn delete_document(&self, document_id: &str) -> Result<bool> {
        let document_id = document_id.to_string();
        self.execute(move |conn| {
            let existed = conn
                .query_row(
                    "SELECT 1 FROM documents WHERE id = ?1",
                    params![document_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            conn.execute("DELETE FROM documents WHERE id = ?1", params![document_id])?;
            Ok(existed)
        })
        .await
    }
}
