use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    db::models::{transcript_items, transcript_messages, Call, CallAnnotation, CallMessage},
    log_info,
    log_warn,
    timeline::{
        compute_overlaps, compute_overlaps_checked, item_highlights,
        playback::{
            active_annotation_items, active_item_index, latency_before_items, transcript_offset,
        },
        Annotation, AnnotationKind, ItemHighlight, OverlapMap, TimedItem, TimelineConfig,
    },
    AppState,
};

const ENABLE_LOGS: bool = true;

/// Raw mapper input, as read from a JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineInput {
    pub items: Vec<TimedItem>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub active_annotation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapReport {
    pub overlaps: OverlapMap,
    pub highlights: BTreeMap<usize, ItemHighlight>,
    /// Item index to the id of the latency block that ends where it starts.
    pub latency_before: BTreeMap<usize, String>,
    pub active_items: Vec<usize>,
}

/// A stored call plus everything the transcript view derives from it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTimeline {
    pub call_id: String,
    pub offset_from_start: f64,
    /// Transcript messages; `messages[i]` is the message behind `items[i]`.
    pub messages: Vec<CallMessage>,
    pub items: Vec<TimedItem>,
    pub report: OverlapReport,
    /// Item playing at the requested playback time, if one was given.
    pub active_item: Option<usize>,
}

/// Call payload accepted by `import_call`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallImport {
    pub id: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub transcribed_locally: bool,
    pub messages: Vec<CallMessage>,
    #[serde(default)]
    pub annotations: Vec<CallAnnotation>,
}

/// Build the report for one transcript.
///
/// Only evaluation and interruption annotations take part in range merging;
/// latency blocks are attached to the item they precede instead.
pub fn build_report(
    config: &TimelineConfig,
    items: &[TimedItem],
    annotations: &[Annotation],
    active_annotation_id: Option<&str>,
) -> Result<OverlapReport, String> {
    let (latency_blocks, ranged): (Vec<Annotation>, Vec<Annotation>) = annotations
        .iter()
        .cloned()
        .partition(|a| a.kind == AnnotationKind::Latency);

    let overlaps = if config.strict_validation {
        compute_overlaps_checked(items, &ranged).map_err(|e| e.to_string())?
    } else {
        compute_overlaps(items, &ranged)
    };

    let latency_map =
        latency_before_items(items, &latency_blocks, config.latency_match_tolerance_secs);
    let active_items = active_annotation_id
        .map(|id| active_annotation_items(items, &ranged, &latency_map, id))
        .unwrap_or_default();

    Ok(OverlapReport {
        highlights: item_highlights(&overlaps),
        latency_before: latency_map
            .iter()
            .map(|(index, block)| (*index, block.id.clone()))
            .collect(),
        active_items: active_items.into_iter().collect(),
        overlaps,
    })
}

pub fn compute_overlap_report(
    state: &AppState,
    input: &TimelineInput,
) -> Result<OverlapReport, String> {
    let config = state.settings.timeline();
    build_report(
        &config,
        &input.items,
        &input.annotations,
        input.active_annotation_id.as_deref(),
    )
}

pub async fn import_call(state: &AppState, input: CallImport) -> Result<Call, String> {
    let now = Utc::now();
    let call = Call {
        id: input.id,
        agent_id: input.agent_id,
        transcribed_locally: input.transcribed_locally,
        created_at: now,
        updated_at: now,
    };

    state
        .db
        .insert_call(&call, &input.messages, &input.annotations)
        .await
        .map_err(|e| e.to_string())?;

    log_info!(
        "Imported call {} with {} messages and {} annotations",
        call.id,
        input.messages.len(),
        input.annotations.len()
    );
    Ok(call)
}

/// Load a stored call and derive its timeline. `playback_time` is in
/// seconds from the start of the recording.
pub async fn get_call_timeline(
    state: &AppState,
    call_id: String,
    active_annotation_id: Option<String>,
    playback_time: Option<f64>,
) -> Result<CallTimeline, String> {
    let db = &state.db;
    let call = db
        .get_call(&call_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("call {call_id} not found"))?;

    let messages = transcript_messages(
        &db.get_call_messages(&call_id)
            .await
            .map_err(|e| e.to_string())?,
    );
    let annotations: Vec<Annotation> = db
        .get_call_annotations(&call_id, None)
        .await
        .map_err(|e| e.to_string())?
        .iter()
        .map(Annotation::from)
        .collect();

    let items = transcript_items(&messages);
    if items.is_empty() {
        log_warn!("Call {call_id} has no transcript messages");
    }

    let config = state.settings.timeline();
    let report = build_report(&config, &items, &annotations, active_annotation_id.as_deref())?;
    let offset_from_start = transcript_offset(&items, call.transcribed_locally);
    let active_item = playback_time
        .and_then(|t| active_item_index(&items, t, offset_from_start, config.playback_mode));

    Ok(CallTimeline {
        call_id: call.id,
        offset_from_start,
        messages,
        items,
        report,
        active_item,
    })
}

/// Remove a stored call with its messages and annotations.
pub async fn delete_call(state: &AppState, call_id: String) -> Result<(), String> {
    let existed = state
        .db
        .delete_call(&call_id)
        .await
        .map_err(|e| e.to_string())?;
    if !existed {
        return Err(format!("call {call_id} not found"));
    }

    log_info!("Deleted call {call_id}");
    Ok(())
}
