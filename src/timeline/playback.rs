use std::collections::{BTreeMap, BTreeSet};

use crate::timeline::config::PlaybackMode;
use crate::timeline::overlap::annotation_overlaps_item;
use crate::timeline::types::{effective_end, Annotation, AnnotationKind, TimedItem};

/// Seconds between the start of the recording and the first transcript item.
///
/// Locally transcribed calls already carry recording-relative timestamps, so
/// their offset is zero.
pub fn transcript_offset(items: &[TimedItem], transcribed_locally: bool) -> f64 {
    if transcribed_locally {
        return 0.0;
    }
    items.first().map(|item| item.start_time).unwrap_or(0.0)
}

/// Position of the item that is playing at `current_time` (recording time).
pub fn active_item_index(
    items: &[TimedItem],
    current_time: f64,
    offset: f64,
    mode: PlaybackMode,
) -> Option<usize> {
    (0..items.len()).find(|&position| {
        let start = items[position].start_time - offset;
        let next_start = effective_end(items, position) - offset;

        match mode {
            PlaybackMode::Test => current_time >= start && current_time < next_start,
            PlaybackMode::Latency => {
                let own_end = items[position]
                    .duration
                    .map(|duration| start + duration)
                    .unwrap_or(next_start);
                // The silence after the previous item counts toward this one.
                let window_start = match position {
                    0 => 0.0,
                    _ => items[position - 1].start_time - offset,
                };
                (current_time >= window_start || current_time >= start)
                    && current_time < own_end
                    && current_time < next_start
            }
        }
    })
}

/// For each item, the first latency block that ends where the item starts.
pub fn latency_before_items<'a>(
    items: &[TimedItem],
    latency_blocks: &'a [Annotation],
    tolerance: f64,
) -> BTreeMap<usize, &'a Annotation> {
    let mut map = BTreeMap::new();
    for (position, item) in items.iter().enumerate() {
        let preceding = latency_blocks.iter().find(|block| {
            block.kind == AnnotationKind::Latency
                && (block.end_time() - item.start_time).abs() <= tolerance
        });
        if let Some(block) = preceding {
            map.insert(position, block);
        }
    }
    map
}

/// Items to emphasize while `active_id` is hovered: those the annotation
/// directly overlaps (before any merging) plus those its latency block precedes.
pub fn active_annotation_items(
    items: &[TimedItem],
    annotations: &[Annotation],
    latency_map: &BTreeMap<usize, &Annotation>,
    active_id: &str,
) -> BTreeSet<usize> {
    let mut active = BTreeSet::new();

    if let Some(annotation) = annotations.iter().find(|a| a.id == active_id) {
        for position in 0..items.len() {
            if annotation_overlaps_item(annotation, items, position) {
                active.insert(position);
            }
        }
    }

    for (position, block) in latency_map {
        if block.id == active_id {
            active.insert(*position);
        }
    }

    active
}
