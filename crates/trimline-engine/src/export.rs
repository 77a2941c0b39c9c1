//! Export payload construction and render planning.
//!
//! [`serialize_export`] turns canonical spans into the request consumed by the
//! external render service. Both span lists travel as JSON-encoded strings.
//! When there are no speed spans the payload also carries an explicit
//! identity rate so the service can tell "no speed edit" from "speed edit
//! missing".

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trimline_common::{Error, Result, SpeedRange, TimeRange, TrimRange, IDENTITY_SPEED};

/// Segments no longer than this are dropped from a render plan.
pub const MIN_SEGMENT_LEN: f64 = 0.01;

/// Payload for the render service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRequest {
    /// Source media file uploaded alongside the form fields.
    #[serde(skip)]
    pub source: PathBuf,
    /// JSON array of `{start, end}`.
    pub trim_ranges: String,
    /// JSON array of `{start, end, speed}`.
    pub speed_ranges: String,
    /// Identity rate signal, present only when `speed_ranges` is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_multiplier: Option<f64>,
}

impl ExportRequest {
    /// Text form fields in submission order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("trim_ranges", self.trim_ranges.clone()),
            ("speed_ranges", self.speed_ranges.clone()),
        ];
        if let Some(multiplier) = self.speed_multiplier {
            fields.push(("speed_multiplier", multiplier.to_string()));
        }
        fields
    }
}

/// Response from the render service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResponse {
    pub output_url: String,
    pub output_name: String,
    pub removed_ranges_count: usize,
}

/// Build the export payload for canonical spans.
///
/// Fails locally, without any request, when the duration is still unknown or
/// the trims remove the whole timeline.
pub fn serialize_export(
    source: &Path,
    duration: f64,
    trims: &[TrimRange],
    speeds: &[SpeedRange],
) -> Result<ExportRequest> {
    if duration <= 0.0 {
        return Err(Error::precondition("Load a video before exporting."));
    }
    if kept_ranges(duration, trims).iter().all(|r| r.len() <= MIN_SEGMENT_LEN) {
        return Err(Error::precondition("Cannot remove the entire video range."));
    }

    let trim_ranges = serde_json::to_string(trims)
        .map_err(|e| Error::invalid_input(format!("trim ranges: {e}")))?;
    let speed_ranges = serde_json::to_string(speeds)
        .map_err(|e| Error::invalid_input(format!("speed ranges: {e}")))?;

    Ok(ExportRequest {
        source: source.to_path_buf(),
        trim_ranges,
        speed_ranges,
        speed_multiplier: speeds.is_empty().then_some(IDENTITY_SPEED),
    })
}

/// Parse a render service response body.
pub fn parse_export_response(body: &str) -> Result<ExportResponse> {
    serde_json::from_str(body).map_err(|e| Error::decode(format!("export response: {e}")))
}

/// A span of the source rendered at one rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub speed: f64,
}

impl Segment {
    pub fn new(start: f64, end: f64, speed: f64) -> Self {
        Self { start, end, speed }
    }
}

/// The complement of canonical `trims` within `[0, duration]`.
pub fn kept_ranges(duration: f64, trims: &[TrimRange]) -> Vec<TimeRange> {
    let mut kept = Vec::with_capacity(trims.len() + 1);
    let mut cursor = 0.0_f64;
    for trim in trims {
        if trim.start > cursor {
            kept.push(TimeRange::new(cursor, trim.start));
        }
        cursor = cursor.max(trim.end);
    }
    if cursor < duration {
        kept.push(TimeRange::new(cursor, duration));
    }
    kept
}

/// Split the kept timeline into segments at speed span boundaries.
///
/// Uncovered stretches play at natural speed. Expects canonical spans.
pub fn plan_segments(duration: f64, trims: &[TrimRange], speeds: &[SpeedRange]) -> Vec<Segment> {
    let mut segments = Vec::new();
    for keep in kept_ranges(duration, trims) {
        let mut cursor = keep.start;
        for span in speeds {
            if span.end <= keep.start {
                continue;
            }
            if span.start >= keep.end {
                break;
            }
            let start = keep.start.max(span.start);
            let end = keep.end.min(span.end);
            if end <= start {
                continue;
            }
            if start > cursor {
                segments.push(Segment::new(cursor, start, IDENTITY_SPEED));
            }
            segments.push(Segment { start, end, speed: span.speed });
            cursor = end;
        }
        if cursor < keep.end {
            segments.push(Segment::new(cursor, keep.end, IDENTITY_SPEED));
        }
    }
    segments.retain(|s| s.end - s.start > MIN_SEGMENT_LEN);
    segments
}

/// Length of the rendered result for a plan.
pub fn output_duration(segments: &[Segment]) -> f64 {
    segments.iter().map(|s| (s.end - s.start) / s.speed).sum()
}
