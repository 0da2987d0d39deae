pub mod commands;
pub mod config;
pub mod highlight;
pub mod merge;
pub mod overlap;
pub mod playback;
pub mod types;

pub use config::{PlaybackMode, TimelineConfig};
pub use highlight::{item_highlights, HighlightOutcome, ItemHighlight};
pub use overlap::{compute_overlaps, compute_overlaps_checked, validate_input};
pub use types::{Annotation, AnnotationKind, OverlapMap, OverlapRange, TimedItem};
