//! Range types and the constants that define canonical form.
//!
//! All positions are seconds on the source timeline. A duration of `0` means
//! the media metadata has not loaded yet; clamping then only enforces the floor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum separation between two canonical spans; closer spans are merged.
pub const MIN_GAP: f64 = 0.05;

/// Trim spans must be strictly longer than this to survive normalization.
pub const MIN_TRIM_LEN: f64 = 0.05;

/// Speed spans must be strictly longer than this to survive normalization.
pub const MIN_SPEED_LEN: f64 = 0.1;

/// Distance past a trim span's end where the playhead is parked after a skip.
pub const EXIT_EPSILON: f64 = 0.02;

/// Lead-in before a trim span's start where a skip already triggers.
pub const SKIP_EPSILON: f64 = 0.05;

/// Slowest allowed speed multiplier.
pub const MIN_SPEED: f64 = 0.25;

/// Fastest allowed speed multiplier.
pub const MAX_SPEED: f64 = 16.0;

/// Natural playback rate.
pub const IDENTITY_SPEED: f64 = 1.0;

/// Clamp a position into `[0, duration]`.
///
/// When `duration` is not yet known (`<= 0`) there is no ceiling and only
/// `max(0, t)` is applied. Non-finite input collapses to `0`.
pub fn clamp_time(t: f64, duration: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    if duration > 0.0 {
        t.clamp(0.0, duration)
    } else {
        t.max(0.0)
    }
}

/// Clamp a speed multiplier into `[MIN_SPEED, MAX_SPEED]`.
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        return IDENTITY_SPEED;
    }
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

/// A span of the timeline in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

/// A span removed from playback and from the exported result.
pub type TrimRange = TimeRange;

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }

    /// Half-open containment: `start <= t < end`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }

    /// Open containment: `start < t < end`.
    pub fn strictly_contains(&self, t: f64) -> bool {
        self.start < t && t < self.end
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}-{:.3}", self.start, self.end)
    }
}

/// A span played and exported at a non-default rate multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub start: f64,
    pub end: f64,
    pub speed: f64,
}

impl SpeedRange {
    pub fn new(start: f64, end: f64, speed: f64) -> Self {
        Self { start, end, speed }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }

    /// Half-open containment: `start <= t < end`.
    pub fn contains(&self, t: f64) -> bool {
        self.range().contains(t)
    }
}

impl fmt::Display for SpeedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}x", self.range(), self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_time_with_duration() {
        assert_eq!(clamp_time(-1.0, 10.0), 0.0);
        assert_eq!(clamp_time(4.5, 10.0), 4.5);
        assert_eq!(clamp_time(12.0, 10.0), 10.0);
    }

    #[test]
    fn test_clamp_time_unknown_duration_is_floor_only() {
        assert_eq!(clamp_time(-3.0, 0.0), 0.0);
        assert_eq!(clamp_time(120.0, 0.0), 120.0);
        assert_eq!(clamp_time(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn test_clamp_speed() {
        assert_eq!(clamp_speed(0.1), MIN_SPEED);
        assert_eq!(clamp_speed(20.0), MAX_SPEED);
        assert_eq!(clamp_speed(1.5), 1.5);
        assert_eq!(clamp_speed(f64::INFINITY), MAX_SPEED);
        assert_eq!(clamp_speed(f64::NAN), IDENTITY_SPEED);
    }

    #[test]
    fn test_containment() {
        let range = TimeRange::new(2.0, 4.0);
        assert!(range.contains(2.0));
        assert!(!range.contains(4.0));
        assert!(!range.strictly_contains(2.0));
        assert!(range.strictly_contains(3.0));
        assert_eq!(range.midpoint(), 3.0);
    }

    #[test]
    fn test_wire_shape() {
        let trim = TrimRange::new(1.0, 4.0);
        assert_eq!(
            serde_json::to_value(trim).unwrap(),
            serde_json::json!({"start": 1.0, "end": 4.0})
        );

        let speed = SpeedRange::new(1.0, 3.0, 2.0);
        assert_eq!(
            serde_json::to_value(speed).unwrap(),
            serde_json::json!({"start": 1.0, "end": 3.0, "speed": 2.0})
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeRange::new(1.0, 4.0).to_string(), "1.000-4.000");
        assert_eq!(SpeedRange::new(1.0, 3.0, 2.0).to_string(), "1.000-3.000@2x");
    }
}
