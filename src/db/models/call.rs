use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timeline::{Annotation, AnnotationKind, TimedItem};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Bot,
    ToolCalls,
    ToolCallResult,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Bot => "bot",
            MessageRole::ToolCalls => "tool_calls",
            MessageRole::ToolCallResult => "tool_call_result",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "system" => Some(MessageRole::System),
            "user" => Some(MessageRole::User),
            "bot" => Some(MessageRole::Bot),
            "tool_calls" => Some(MessageRole::ToolCalls),
            "tool_call_result" => Some(MessageRole::ToolCallResult),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: String,
    pub agent_id: Option<String>,
    /// Timestamps are already relative to the recording start.
    #[serde(default)]
    pub transcribed_locally: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallMessage {
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    pub seconds_from_start: f64,
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallAnnotation {
    pub id: String,
    pub kind: AnnotationKind,
    #[serde(default)]
    pub name: Option<String>,
    pub seconds_from_start: f64,
    pub duration: f64,
    #[serde(default)]
    pub success: Option<bool>,
}

impl From<&CallAnnotation> for Annotation {
    fn from(value: &CallAnnotation) -> Self {
        Annotation {
            id: value.id.clone(),
            start_time: value.seconds_from_start,
            duration: value.duration,
            success: value.success,
            kind: value.kind,
        }
    }
}

/// Messages shown in the transcript: system messages dropped, sorted by
/// start time. Position `i` here is item index `i` in [`transcript_items`].
pub fn transcript_messages(messages: &[CallMessage]) -> Vec<CallMessage> {
    let mut spoken: Vec<CallMessage> = messages
        .iter()
        .filter(|message| message.role != MessageRole::System)
        .cloned()
        .collect();
    spoken.sort_by(|a, b| a.seconds_from_start.total_cmp(&b.seconds_from_start));
    spoken
}

/// Transcript sequence for the mapper, one item per transcript message.
pub fn transcript_items(messages: &[CallMessage]) -> Vec<TimedItem> {
    transcript_messages(messages)
        .iter()
        .enumerate()
        .map(|(index, message)| TimedItem {
            index,
            start_time: message.seconds_from_start,
            duration: message.duration,
        })
        .collect()
}
