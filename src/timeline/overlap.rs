use std::collections::HashSet;

use crate::error::TimelineError;
use crate::log_debug;
use crate::timeline::merge::merge_ranges;
use crate::timeline::types::{effective_end, Annotation, OverlapMap, OverlapRange, TimedItem};

const ENABLE_LOGS: bool = true;

/// Does `annotation` share time with the item at `position`?
///
/// Half-open on both sides, so touching boundaries do not count. A
/// zero-length annotation is a point and belongs to the item whose
/// `[start, end)` contains it.
pub fn annotation_overlaps_item(
    annotation: &Annotation,
    items: &[TimedItem],
    position: usize,
) -> bool {
    let Some(item) = items.get(position) else {
        return false;
    };
    let item_end = effective_end(items, position);

    if annotation.duration == 0.0 {
        return annotation.start_time >= item.start_time && annotation.start_time < item_end;
    }

    annotation.start_time < item_end && annotation.end_time() > item.start_time
}

/// Min/max position of the items an annotation directly overlaps.
pub fn initial_span(annotation: &Annotation, items: &[TimedItem]) -> Option<OverlapRange> {
    let mut span: Option<OverlapRange> = None;
    for position in 0..items.len() {
        if annotation_overlaps_item(annotation, items, position) {
            span = Some(match span {
                Some(range) => range.union(&OverlapRange::new(position, position)),
                None => OverlapRange::new(position, position),
            });
        }
    }
    span
}

/// Map annotations onto transcript items.
///
/// `items` must already be sorted by start time; they are not re-sorted.
/// Annotations whose spans intersect share one merged range and each of them
/// is listed on every item in that range.
pub fn compute_overlaps(items: &[TimedItem], annotations: &[Annotation]) -> OverlapMap {
    let spans: Vec<Option<OverlapRange>> = annotations
        .iter()
        .map(|annotation| initial_span(annotation, items))
        .collect();

    let merged = merge_ranges(&spans);

    let mut map = OverlapMap::default();
    for (annotation, range) in annotations.iter().zip(merged) {
        let Some(range) = range else {
            log_debug!(
                "annotation {} overlaps no transcript item; dropped",
                annotation.id
            );
            continue;
        };

        map.annotation_to_range.insert(annotation.id.clone(), range);
        for index in range.first_index..=range.last_index {
            map.item_to_annotations
                .entry(index)
                .or_default()
                .push(annotation.clone());
        }
    }

    log_debug!(
        "mapped {} of {} annotations across {} items",
        map.annotation_to_range.len(),
        annotations.len(),
        map.item_to_annotations.len()
    );

    map
}

/// Reject input that the mapper would otherwise handle best-effort.
pub fn validate_input(items: &[TimedItem], annotations: &[Annotation]) -> Result<(), TimelineError> {
    let mut previous: Option<f64> = None;
    for (position, item) in items.iter().enumerate() {
        if !item.start_time.is_finite() {
            return Err(TimelineError::invalid_input(format!(
                "item {position} has a non-finite start time"
            )));
        }
        if let Some(prev) = previous {
            if item.start_time < prev {
                return Err(TimelineError::invalid_input(format!(
                    "item {position} starts at {} before the previous item at {prev}",
                    item.start_time
                )));
            }
        }
        if let Some(duration) = item.duration {
            if !duration.is_finite() || duration < 0.0 {
                return Err(TimelineError::invalid_input(format!(
                    "item {position} has invalid duration {duration}"
                )));
            }
        }
        previous = Some(item.start_time);
    }

    let mut seen = HashSet::new();
    for annotation in annotations {
        if !annotation.start_time.is_finite() {
            return Err(TimelineError::invalid_input(format!(
                "annotation {} has a non-finite start time",
                annotation.id
            )));
        }
        if !annotation.duration.is_finite() || annotation.duration < 0.0 {
            return Err(TimelineError::invalid_input(format!(
                "annotation {} has invalid duration {}",
                annotation.id, annotation.duration
            )));
        }
        if !seen.insert(annotation.id.as_str()) {
            return Err(TimelineError::invalid_input(format!(
                "duplicate annotation id {}",
                annotation.id
            )));
        }
    }

    Ok(())
}

/// [`compute_overlaps`] behind [`validate_input`].
pub fn compute_overlaps_checked(
    items: &[TimedItem],
    annotations: &[Annotation],
) -> Result<OverlapMap, TimelineError> {
    validate_input(items, annotations)?;
    Ok(compute_overlaps(items, annotations))
}
