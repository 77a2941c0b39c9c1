//! Mapping between the external suggestion service and canonical spans.
//!
//! The service proposes trim and speed edits from a prompt and a summary of
//! the analyzed sprite sheets. Proposals are mapped into raw spans and go
//! through the normalizer before replacing the store's lists.

use serde::{Deserialize, Serialize};
use trimline_common::{Error, Result, SpeedRange, TimeRange, TrimRange};

use crate::store::RangeStore;

/// Speed used when a speed suggestion carries no usable multiplier.
pub const DEFAULT_SUGGESTED_SPEED: f64 = 2.0;

/// Summary of the sprite-sheet analysis of the loaded source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteSummary {
    pub interval_sec: f64,
    pub total_frames: u32,
    pub sheets_count: u32,
}

impl SpriteSummary {
    /// A summary sampled every `interval_sec` over `duration`, packed into
    /// sheets of `frames_per_sheet` tiles.
    pub fn for_duration(duration: f64, interval_sec: f64, frames_per_sheet: u32) -> Self {
        let total_frames = if duration > 0.0 && interval_sec > 0.0 {
            (duration / interval_sec).floor() as u32 + 1
        } else {
            0
        };
        let per_sheet = frames_per_sheet.max(1);
        Self {
            interval_sec,
            total_frames,
            sheets_count: total_frames.div_ceil(per_sheet),
        }
    }

    fn is_usable(&self) -> bool {
        self.interval_sec > 0.0 && self.total_frames > 0 && self.sheets_count > 0
    }
}

/// Request body for the suggestion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub prompt: String,
    pub duration_sec: f64,
    pub sprite_interval_sec: f64,
    pub total_frames: u32,
    pub sheets_count: u32,
}

/// Kind of edit proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionAction {
    TrimVideo,
    SpeedVideo,
    /// Anything this engine does not understand; ignored when mapping.
    #[serde(other)]
    Unsupported,
}

/// One proposed edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub action: SuggestionAction,
    #[serde(default)]
    pub operation: String,
    pub start_sec: f64,
    pub end_sec: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_multiplier: Option<f64>,
}

/// Response body from the suggestion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub strategy: String,
}

/// Raw spans mapped from suggestions, not yet normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestedRanges {
    pub trims: Vec<TrimRange>,
    pub speeds: Vec<SpeedRange>,
}

/// Build a suggestion request, checking everything that can be checked locally.
pub fn build_request(
    prompt: &str,
    duration: f64,
    summary: Option<&SpriteSummary>,
) -> Result<SuggestRequest> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(Error::precondition(
            "Describe the edit you want before asking for suggestions.",
        ));
    }
    if duration <= 0.0 {
        return Err(Error::precondition(
            "Load a video before asking for suggestions.",
        ));
    }
    let summary = summary.filter(|s| s.is_usable()).ok_or_else(|| {
        Error::precondition("Analyze the video before asking for suggestions.")
    })?;

    Ok(SuggestRequest {
        prompt: prompt.to_string(),
        duration_sec: duration,
        sprite_interval_sec: summary.interval_sec,
        total_frames: summary.total_frames,
        sheets_count: summary.sheets_count,
    })
}

/// Split suggestions into raw trim and speed spans.
pub fn map_suggestions(suggestions: &[Suggestion]) -> SuggestedRanges {
    let mut ranges = SuggestedRanges::default();
    for suggestion in suggestions {
        match suggestion.action {
            SuggestionAction::TrimVideo => ranges
                .trims
                .push(TimeRange::new(suggestion.start_sec, suggestion.end_sec)),
            SuggestionAction::SpeedVideo => {
                let speed = suggestion
                    .speed_multiplier
                    .filter(|m| *m > 0.0)
                    .unwrap_or(DEFAULT_SUGGESTED_SPEED);
                ranges.speeds.push(SpeedRange::new(
                    suggestion.start_sec,
                    suggestion.end_sec,
                    speed,
                ));
            }
            SuggestionAction::Unsupported => {
                tracing::debug!(operation = %suggestion.operation, "Ignoring unsupported suggestion");
            }
        }
    }
    ranges
}

/// Replace the store's spans with the normalized suggestions.
pub fn apply_suggestions(store: &mut RangeStore, suggestions: &[Suggestion]) {
    let ranges = map_suggestions(suggestions);
    tracing::info!(
        trims = ranges.trims.len(),
        speeds = ranges.speeds.len(),
        "Importing suggestions"
    );
    store.import_ranges(&ranges.trims, &ranges.speeds);
}
