use anyhow::{anyhow, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::parse_datetime,
    models::{Call, CallAnnotation, CallMessage, MessageRole},
};
use crate::timeline::AnnotationKind;

fn row_to_call(row: &Row) -> Result<Call> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Call {
        id: row.get("id")?,
        agent_id: row.get("agent_id")?,
        transcribed_locally: row.get("transcribed_locally")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn row_to_message(row: &Row) -> Result<CallMessage> {
    let role: String = row.get("role")?;

    Ok(CallMessage {
        id: row.get("id")?,
        role: MessageRole::parse(&role).ok_or_else(|| anyhow!("unknown message role {role}"))?,
        content: row.get("content")?,
        seconds_from_start: row.get("seconds_from_start")?,
        duration: row.get("duration")?,
    })
}

fn row_to_annotation(row: &Row) -> Result<CallAnnotation> {
    let kind: String = row.get("kind")?;

    Ok(CallAnnotation {
        id: row.get("id")?,
        kind: AnnotationKind::parse(&kind)
            .ok_or_else(|| anyhow!("unknown annotation kind {kind}"))?,
        name: row.get("name")?,
        seconds_from_start: row.get("seconds_from_start")?,
        duration: row.get("duration")?,
        success: row.get("success")?,
    })
}

impl Database {
    /// Store a call with its transcript and annotations in one transaction.
    pub async fn insert_call(
        &self,
        call: &Call,
        messages: &[CallMessage],
        annotations: &[CallAnnotation],
    ) -> Result<()> {
        let call = call.clone();
        let messages = messages.to_vec();
        let annotations = annotations.to_vec();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO calls (id, agent_id, transcribed_locally, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    call.id,
                    call.agent_id,
                    call.transcribed_locally,
                    call.created_at.to_rfc3339(),
                    call.updated_at.to_rfc3339(),
                ],
            )?;

            for message in &messages {
                tx.execute(
                    "INSERT INTO call_messages (id, call_id, role, content, seconds_from_start, duration)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        message.id,
                        call.id,
                        message.role.as_str(),
                        message.content,
                        message.seconds_from_start,
                        message.duration,
                    ],
                )?;
            }

            // `position` keeps the caller's annotation order, which the
            // mapper uses to order annotations on each item.
            for (position, annotation) in annotations.iter().enumerate() {
                tx.execute(
                    "INSERT INTO call_annotations (id, call_id, kind, name, seconds_from_start, duration, success, position)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        annotation.id,
                        call.id,
                        annotation.kind.as_str(),
                        annotation.name,
                        annotation.seconds_from_start,
                        annotation.duration,
                        annotation.success,
                        position as i64,
                    ],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn get_call(&self, call_id: &str) -> Result<Option<Call>> {
        let call_id = call_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, agent_id, transcribed_locally, created_at, updated_at
                 FROM calls
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![call_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_call(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Messages of a call ordered by start time.
    pub async fn get_call_messages(&self, call_id: &str) -> Result<Vec<CallMessage>> {
        let call_id = call_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, role, content, seconds_from_start, duration
                 FROM call_messages
                 WHERE call_id = ?1
                 ORDER BY seconds_from_start ASC",
            )?;

            let mut rows = stmt.query(params![call_id])?;
            let mut messages = Vec::new();
            while let Some(row) = rows.next()? {
                messages.push(row_to_message(row)?);
            }
            Ok(messages)
        })
        .await
    }

    /// Annotations of a call in insertion order, optionally filtered by kind.
    pub async fn get_call_annotations(
        &self,
        call_id: &str,
        kind: Option<AnnotationKind>,
    ) -> Result<Vec<CallAnnotation>> {
        let call_id = call_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, kind, name, seconds_from_start, duration, success
                 FROM call_annotations
                 WHERE call_id = ?1 AND (?2 IS NULL OR kind = ?2)
                 ORDER BY position ASC",
            )?;

            let mut rows = stmt.query(params![call_id, kind.map(|k| k.as_str())])?;
            let mut annotations = Vec::new();
            while let Some(row) = rows.next()? {
                annotations.push(row_to_annotation(row)?);
            }
            Ok(annotations)
        })
        .await
    }

    pub async fn delete_call(&self, call_id: &str) -> Result<bool> {
        let call_id = call_id.to_string();
        self.execute(move |conn| {
            let existed = conn
                .query_row("SELECT 1 FROM calls WHERE id = ?1", params![call_id], |_| Ok(()))
                .optional()?
                .is_some();
            conn.execute("DELETE FROM calls WHERE id = ?1", params![call_id])?;
            Ok(existed)
        })
        .await
    }
}
