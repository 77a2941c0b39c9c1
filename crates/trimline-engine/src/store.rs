//! Owner of canonical spans, duration, and transient playback fields.
//!
//! Every span-mutating command normalizes before storing, so readers only
//! ever observe canonical lists. Playback fields (position, playing flag,
//! volume, mute) are written by the playback controller.

use trimline_common::{clamp_time, SpeedRange, TimeRange, TrimRange};

use crate::normalize::{normalize_speeds, normalize_trims};

/// Live playback fields published to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Display position in seconds; never inside a trim span.
    pub position: f64,
    pub playing: bool,
    /// Volume in `[0, 1]`.
    pub volume: f64,
    pub muted: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            position: 0.0,
            playing: false,
            volume: 1.0,
            muted: false,
        }
    }
}

/// Canonical range state for one loaded source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeStore {
    duration: f64,
    trims: Vec<TrimRange>,
    speeds: Vec<SpeedRange>,
    playback: PlaybackState,
    /// Bumped whenever spans or duration change.
    revision: u64,
}

impl RangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a known duration, as after metadata has loaded.
    pub fn with_duration(duration: f64) -> Self {
        let mut store = Self::new();
        store.set_duration(duration);
        store
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn trims(&self) -> &[TrimRange] {
        &self.trims
    }

    pub fn speeds(&self) -> &[SpeedRange] {
        &self.speeds
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn position(&self) -> f64 {
        self.playback.position
    }

    pub fn is_playing(&self) -> bool {
        self.playback.playing
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace all trim spans.
    pub fn set_trim_ranges(&mut self, ranges: &[TimeRange]) {
        let canonical = normalize_trims(ranges, self.duration);
        tracing::debug!(raw = ranges.len(), canonical = canonical.len(), "Set trim ranges");
        self.replace_trims(canonical);
    }

    /// Replace all speed spans.
    pub fn set_speed_ranges(&mut self, ranges: &[SpeedRange]) {
        let canonical = normalize_speeds(ranges, self.duration);
        tracing::debug!(raw = ranges.len(), canonical = canonical.len(), "Set speed ranges");
        self.replace_speeds(canonical);
    }

    /// Replace all trim spans with a single span.
    pub fn set_trim_range(&mut self, start: f64, end: f64) {
        self.set_trim_ranges(&[TimeRange::new(start, end)]);
    }

    /// Add a trim span, merging with neighbours as needed.
    pub fn add_trim_range(&mut self, range: TimeRange) {
        let mut ranges = self.trims.clone();
        ranges.push(range);
        self.set_trim_ranges(&ranges);
    }

    /// Add a speed span, merging with neighbours as needed.
    pub fn add_speed_range(&mut self, range: SpeedRange) {
        let mut ranges = self.speeds.clone();
        ranges.push(range);
        self.set_speed_ranges(&ranges);
    }

    /// Replace both span lists at once.
    pub fn import_ranges(&mut self, trims: &[TimeRange], speeds: &[SpeedRange]) {
        self.set_trim_ranges(trims);
        self.set_speed_ranges(speeds);
    }

    /// Remove every span but keep the duration and playback state.
    pub fn clear_ranges(&mut self) {
        self.replace_trims(Vec::new());
        self.replace_speeds(Vec::new());
    }

    /// Record the duration of the loaded source.
    ///
    /// A new duration resets all spans and the position; re-applying the
    /// current duration leaves everything untouched.
    pub fn set_duration(&mut self, duration: f64) {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        if duration == self.duration {
            return;
        }
        tracing::debug!(duration, "Set duration");
        self.duration = duration;
        self.trims.clear();
        self.speeds.clear();
        self.playback.position = 0.0;
        self.revision += 1;
    }

    /// Forget the loaded source: duration, spans and playback position.
    pub fn reset(&mut self) {
        self.duration = 0.0;
        self.trims.clear();
        self.speeds.clear();
        self.playback.position = 0.0;
        self.playback.playing = false;
        self.revision += 1;
    }

    pub(crate) fn set_position(&mut self, position: f64) {
        self.playback.position = clamp_time(position, self.duration);
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.playback.playing = playing;
    }

    pub(crate) fn set_volume(&mut self, volume: f64) {
        self.playback.volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
    }

    pub(crate) fn set_muted(&mut self, muted: bool) {
        self.playback.muted = muted;
    }

    fn replace_trims(&mut self, canonical: Vec<TrimRange>) {
        if canonical != self.trims {
            self.trims = canonical;
            self.revision += 1;
        }
    }

    fn replace_speeds(&mut self, canonical: Vec<SpeedRange>) {
        if canonical != self.speeds {
            self.speeds = canonical;
            self.revision += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: f64, end: f64) -> TimeRange {
        TimeRange::new(start, end)
    }

    #[test]
    fn set_trim_ranges_stores_canonical_form() {
        let mut store = RangeStore::with_duration(10.0);
        store.set_trim_ranges(&[r(1.0, 3.0), r(2.98, 4.0), r(8.0, 12.0)]);
        assert_eq!(store.trims(), &[r(1.0, 4.0), r(8.0, 10.0)]);
    }

    #[test]
    fn set_speed_ranges_scenarios() {
        let mut store = RangeStore::with_duration(10.0);

        store.set_speed_ranges(&[SpeedRange::new(3.0, 1.0, 2.0)]);
        assert_eq!(store.speeds(), &[SpeedRange::new(1.0, 3.0, 2.0)]);

        store.set_speed_ranges(&[SpeedRange::new(0.0, 2.0, 0.1)]);
        assert_eq!(store.speeds(), &[SpeedRange::new(0.0, 2.0, 0.25)]);

        store.set_speed_ranges(&[SpeedRange::new(3.0, 5.0, 20.0)]);
        assert_eq!(store.speeds(), &[SpeedRange::new(3.0, 5.0, 16.0)]);
    }

    #[test]
    fn set_trim_range_is_single_span_convenience() {
        let mut store = RangeStore::with_duration(10.0);
        store.set_trim_ranges(&[r(1.0, 2.0), r(5.0, 6.0)]);
        store.set_trim_range(9.0, 7.0);
        assert_eq!(store.trims(), &[r(7.0, 9.0)]);
    }

    #[test]
    fn commands_are_idempotent() {
        let mut store = RangeStore::with_duration(10.0);
        store.set_trim_ranges(&[r(1.0, 3.0), r(2.0, 5.0)]);
        let revision = store.revision();
        let trims = store.trims().to_vec();

        store.set_trim_ranges(&[r(1.0, 3.0), r(2.0, 5.0)]);
        assert_eq!(store.trims(), trims.as_slice());
        assert_eq!(store.revision(), revision);

        store.set_duration(10.0);
        assert_eq!(store.trims(), trims.as_slice());
    }

    #[test]
    fn add_trim_range_merges_with_existing() {
        let mut store = RangeStore::with_duration(10.0);
        store.add_trim_range(r(1.0, 2.0));
        store.add_trim_range(r(2.01, 3.0));
        store.add_trim_range(r(6.0, 7.0));
        assert_eq!(store.trims(), &[r(1.0, 3.0), r(6.0, 7.0)]);
    }

    #[test]
    fn new_duration_clears_spans_and_position() {
        let mut store = RangeStore::with_duration(10.0);
        store.set_trim_range(1.0, 2.0);
        store.add_speed_range(SpeedRange::new(3.0, 4.0, 2.0));
        store.set_position(5.0);

        store.set_duration(20.0);
        assert!(store.trims().is_empty());
        assert!(store.speeds().is_empty());
        assert_eq!(store.position(), 0.0);
        assert_eq!(store.duration(), 20.0);
    }

    #[test]
    fn reset_forgets_source() {
        let mut store = RangeStore::with_duration(10.0);
        store.set_trim_range(1.0, 2.0);
        store.set_playing(true);
        store.reset();
        assert_eq!(store.duration(), 0.0);
        assert!(store.trims().is_empty());
        assert!(!store.is_playing());
    }

    #[test]
    fn spans_before_metadata_are_floor_clamped() {
        let mut store = RangeStore::new();
        store.set_trim_ranges(&[r(-1.0, 30.0)]);
        assert_eq!(store.trims(), &[r(0.0, 30.0)]);
    }

    #[test]
    fn volume_is_clamped() {
        let mut store = RangeStore::new();
        store.set_volume(1.5);
        assert_eq!(store.playback().volume, 1.0);
        store.set_volume(-0.5);
        assert_eq!(store.playback().volume, 0.0);
    }
}
