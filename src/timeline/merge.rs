use crate::timeline::types::OverlapRange;

/// Resolve every span to the union of all spans it is transitively connected
/// to through intersection. `None` entries (annotations that overlapped no
/// item) stay `None`.
///
/// Spans are swept in order of their first index; a span joins the current
/// group when it starts at or before the group's last index. Sorting makes
/// chains like A-B, B-C collapse in a single pass, so no fixed-point rescan
/// is needed.
pub fn merge_ranges(spans: &[Option<OverlapRange>]) -> Vec<Option<OverlapRange>> {
    let mut ordered: Vec<(usize, OverlapRange)> = spans
        .iter()
        .enumerate()
        .filter_map(|(position, span)| span.map(|range| (position, range)))
        .collect();

    // Stable sort keeps ties in input order, which keeps the result deterministic.
    ordered.sort_by_key(|(_, range)| (range.first_index, range.last_index));

    let mut merged = vec![None; spans.len()];
    let mut group: Vec<usize> = Vec::new();
    let mut group_range: Option<OverlapRange> = None;

    for (position, range) in ordered {
        match group_range {
            Some(current) if current.intersects(&range) => {
                group_range = Some(current.union(&range));
                group.push(position);
            }
            _ => {
                flush_group(&mut merged, &mut group, group_range);
                group_range = Some(range);
                group.push(position);
            }
        }
    }
    flush_group(&mut merged, &mut group, group_range);

    merged
}

fn flush_group(
    merged: &mut [Option<OverlapRange>],
    group: &mut Vec<usize>,
    range: Option<OverlapRange>,
) {
    for position in group.drain(..) {
        merged[position] = range;
    }
}
