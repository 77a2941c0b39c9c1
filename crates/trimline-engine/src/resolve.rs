//! Position resolution against canonical trim spans.
//!
//! Physical positions come from the media handle and may briefly sit inside a
//! trim span between ticks. Display positions are what observers see. Seek
//! targets are physical positions that never land strictly inside a trim span.

use trimline_common::{
    clamp_time, SpeedRange, TrimRange, EXIT_EPSILON, IDENTITY_SPEED, SKIP_EPSILON,
};

/// Map a physical position to the display position.
///
/// The controller parks the playhead [`EXIT_EPSILON`] past a gap's end so the
/// skip does not re-trigger; positions in `(gap.end, gap.end + EXIT_EPSILON]`
/// therefore snap back to `gap.end`.
pub fn display_position(physical: f64, trims: &[TrimRange]) -> f64 {
    trims
        .iter()
        .find(|gap| physical > gap.end && physical <= gap.end + EXIT_EPSILON)
        .map_or(physical, |gap| gap.end)
}

/// Resolve a requested seek to a valid physical position.
///
/// A target strictly inside a trim span resolves to the nearer boundary: the
/// span's start when the target lies before its midpoint, otherwise just past
/// its end.
pub fn resolve_seek(requested: f64, trims: &[TrimRange], duration: f64) -> f64 {
    let t = clamp_time(requested, duration);
    match containing_trim(t, trims) {
        Some(gap) if t < gap.midpoint() => gap.start,
        Some(gap) => gap_exit(gap, duration),
        None => t,
    }
}

/// The trim span a playing position should skip, if any.
///
/// Matches `p` in `[gap.start - SKIP_EPSILON, gap.end - EXIT_EPSILON)`, so a
/// playhead about to enter a gap skips it while one already parked past the
/// gap's end does not.
pub fn skip_target(physical: f64, trims: &[TrimRange]) -> Option<&TrimRange> {
    trims.iter().find(|gap| {
        physical >= gap.start - SKIP_EPSILON && physical < gap.end - EXIT_EPSILON
    })
}

/// Where the playhead is parked after leaving `gap`.
pub fn gap_exit(gap: &TrimRange, duration: f64) -> f64 {
    clamp_time(gap.end + EXIT_EPSILON, duration)
}

/// The trim span strictly containing `t`, if any.
pub fn containing_trim(t: f64, trims: &[TrimRange]) -> Option<&TrimRange> {
    trims.iter().find(|gap| gap.strictly_contains(t))
}

/// Rate multiplier in effect at `t`; the first span by ascending start wins.
pub fn rate_at(t: f64, speeds: &[SpeedRange]) -> f64 {
    speeds
        .iter()
        .find(|span| span.contains(t))
        .map_or(IDENTITY_SPEED, |span| span.speed)
}
