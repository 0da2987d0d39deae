use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of an ordered transcript. Its time range runs until the next
/// item's start, or forever for the last item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimedItem {
    pub index: usize,
    pub start_time: f64,
    /// Spoken length of the item, only consulted by latency-mode playback.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl TimedItem {
    pub fn new(index: usize, start_time: f64) -> Self {
        Self {
            index,
            start_time,
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Build a sequence from start times, assigning indices in order.
    pub fn sequence<I>(start_times: I) -> Vec<TimedItem>
    where
        I: IntoIterator<Item = f64>,
    {
        start_times
            .into_iter()
            .enumerate()
            .map(|(index, start_time)| TimedItem::new(index, start_time))
            .collect()
    }
}

/// Effective end of the item at `position`: the next item's start, or +inf.
pub fn effective_end(items: &[TimedItem], position: usize) -> f64 {
    items
        .get(position + 1)
        .map(|next| next.start_time)
        .unwrap_or(f64::INFINITY)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    #[default]
    Evaluation,
    Latency,
    Interruption,
}

impl AnnotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Evaluation => "evaluation",
            AnnotationKind::Latency => "latency",
            AnnotationKind::Interruption => "interruption",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "evaluation" => Some(AnnotationKind::Evaluation),
            "latency" => Some(AnnotationKind::Latency),
            "interruption" => Some(AnnotationKind::Interruption),
            _ => None,
        }
    }
}

/// A time-ranged marker laid over the transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    pub start_time: f64,
    pub duration: f64,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub kind: AnnotationKind,
}

impl Annotation {
    pub fn new(id: impl Into<String>, start_time: f64, duration: f64) -> Self {
        Self {
            id: id.into(),
            start_time,
            duration,
            success: None,
            kind: AnnotationKind::Evaluation,
        }
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn with_kind(mut self, kind: AnnotationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Inclusive span of item indices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct OverlapRange {
    pub first_index: usize,
    pub last_index: usize,
}

impl OverlapRange {
    pub fn new(first_index: usize, last_index: usize) -> Self {
        Self {
            first_index,
            last_index,
        }
    }

    pub fn intersects(&self, other: &OverlapRange) -> bool {
        self.last_index >= other.first_index && self.first_index <= other.last_index
    }

    pub fn union(&self, other: &OverlapRange) -> OverlapRange {
        OverlapRange {
            first_index: self.first_index.min(other.first_index),
            last_index: self.last_index.max(other.last_index),
        }
    }
}

/// Output of the range mapper.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlapMap {
    /// Only items with at least one annotation appear here. Each list keeps
    /// the input order of the annotations.
    pub item_to_annotations: BTreeMap<usize, Vec<Annotation>>,
    pub annotation_to_range: BTreeMap<String, OverlapRange>,
}

impl OverlapMap {
    pub fn is_empty(&self) -> bool {
        self.annotation_to_range.is_empty()
    }

    pub fn annotations_for(&self, index: usize) -> &[Annotation] {
        self.item_to_annotations
            .get(&index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn range_of(&self, annotation_id: &str) -> Option<OverlapRange> {
        self.annotation_to_range.get(annotation_id).copied()
    }
}
