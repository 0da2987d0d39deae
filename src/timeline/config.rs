use serde::{Deserialize, Serialize};

/// How the playback clock is matched against transcript items.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackMode {
    /// Simulated test calls: an item is active from its start until the next one starts.
    #[default]
    Test,
    /// Latency review: silence before an item counts toward that item.
    Latency,
}

/// Tunables for the transcript timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineConfig {
    pub playback_mode: PlaybackMode,

    /// Reject unsorted items, negative durations and duplicate ids instead of
    /// producing best-effort ranges.
    pub strict_validation: bool,

    /// A latency block "precedes" an item when its end lands within this many
    /// seconds of the item's start.
    pub latency_match_tolerance_secs: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            playback_mode: PlaybackMode::Test,
            strict_validation: false,
            latency_match_tolerance_secs: 1e-6,
        }
    }
}
