use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::timeline::types::{Annotation, OverlapMap};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HighlightOutcome {
    Success,
    Failure,
    Mixed,
}

impl HighlightOutcome {
    /// Classify the annotations attached to one item. A missing `success`
    /// counts as not succeeded.
    pub fn classify(annotations: &[Annotation]) -> Option<HighlightOutcome> {
        if annotations.is_empty() {
            return None;
        }
        let succeeded = |a: &Annotation| a.success.unwrap_or(false);
        if annotations.iter().all(succeeded) {
            Some(HighlightOutcome::Success)
        } else if !annotations.iter().any(succeeded) {
            Some(HighlightOutcome::Failure)
        } else {
            Some(HighlightOutcome::Mixed)
        }
    }
}

/// Render hints for one highlighted transcript item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemHighlight {
    pub outcome: HighlightOutcome,
    /// Some listed annotation's merged block starts here.
    pub is_first: bool,
    /// Some listed annotation's merged block ends here.
    pub is_last: bool,
}

pub fn item_highlights(map: &OverlapMap) -> BTreeMap<usize, ItemHighlight> {
    map.item_to_annotations
        .iter()
        .filter_map(|(&index, annotations)| {
            let outcome = HighlightOutcome::classify(annotations)?;
            let ranges = annotations.iter().filter_map(|a| map.range_of(&a.id));
            let (mut is_first, mut is_last) = (false, false);
            for range in ranges {
                is_first |= range.first_index == index;
                is_last |= range.last_index == index;
            }
            Some((
                index,
                ItemHighlight {
                    outcome,
                    is_first,
                    is_last,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::overlap::compute_overlaps;
    use crate::timeline::types::TimedItem;

    #[test]
    fn outcome_classification() {
        let ok = Annotation::new("ok", 0.0, 1.0).with_success(true);
        let bad = Annotation::new("bad", 0.0, 1.0).with_success(false);
        let unknown = Annotation::new("unknown", 0.0, 1.0);

        assert_eq!(HighlightOutcome::classify(&[]), None);
        assert_eq!(
            HighlightOutcome::classify(&[ok.clone()]),
            Some(HighlightOutcome::Success)
        );
        assert_eq!(
            HighlightOutcome::classify(&[bad.clone(), unknown.clone()]),
            Some(HighlightOutcome::Failure)
        );
        assert_eq!(
            HighlightOutcome::classify(&[ok, unknown]),
            Some(HighlightOutcome::Mixed)
        );
    }

    #[test]
    fn merged_block_marks_edges() {
        let items = TimedItem::sequence([0.0, 10.0, 20.0, 30.0]);
        let annotations = vec![
            Annotation::new("a", 5.0, 10.0).with_success(true),
            Annotation::new("b", 15.0, 10.0).with_success(true),
        ];
        let map = compute_overlaps(&items, &annotations);

        let highlights = item_highlights(&map);

        assert_eq!(highlights.len(), 3);
        assert!(highlights[&0].is_first && !highlights[&0].is_last);
        assert!(!highlights[&1].is_first && !highlights[&1].is_last);
        assert!(highlights[&2].is_last);
        assert!(!highlights.contains_key(&3));
        assert!(highlights
            .values()
            .all(|h| h.outcome == HighlightOutcome::Success));
    }
}
