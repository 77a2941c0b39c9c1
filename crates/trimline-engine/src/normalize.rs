//! Reduction of raw, user-edited spans to canonical form.
//!
//! Input spans may be inverted, out of bounds, zero-length or overlapping.
//! Output spans are clamped into `[0, duration]`, longer than the layer's
//! minimum length, sorted by start, and separated by more than [`MIN_GAP`].
//! Nothing here fails: degenerate spans are dropped.

use trimline_common::{
    clamp_speed, clamp_time, SpeedRange, TimeRange, TrimRange, MIN_GAP, MIN_SPEED_LEN,
    MIN_TRIM_LEN,
};

/// A span the normalizer can reshape.
trait Span: Copy {
    fn bounds(&self) -> (f64, f64);
    fn with_bounds(self, start: f64, end: f64) -> Self;
}

impl Span for TimeRange {
    fn bounds(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    fn with_bounds(self, start: f64, end: f64) -> Self {
        TimeRange::new(start, end)
    }
}

impl Span for SpeedRange {
    fn bounds(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    fn with_bounds(self, start: f64, end: f64) -> Self {
        SpeedRange::new(start, end, self.speed)
    }
}

/// Normalize trim spans against `duration`.
pub fn normalize_trims(ranges: &[TimeRange], duration: f64) -> Vec<TrimRange> {
    canonicalize(ranges.iter().copied(), duration, MIN_TRIM_LEN)
}

/// Normalize speed spans against `duration`, clamping each multiplier first.
///
/// When spans merge, the merged span keeps the speed of the span with the
/// smallest start.
pub fn normalize_speeds(ranges: &[SpeedRange], duration: f64) -> Vec<SpeedRange> {
    let clamped = ranges
        .iter()
        .map(|r| SpeedRange::new(r.start, r.end, clamp_speed(r.speed)));
    canonicalize(clamped, duration, MIN_SPEED_LEN)
}

fn canonicalize<S: Span>(
    spans: impl IntoIterator<Item = S>,
    duration: f64,
    min_len: f64,
) -> Vec<S> {
    let mut bounded: Vec<S> = spans
        .into_iter()
        .filter_map(|span| {
            let (a, b) = span.bounds();
            if !a.is_finite() || !b.is_finite() {
                return None;
            }
            let start = clamp_time(a.min(b), duration);
            let end = clamp_time(a.max(b), duration);
            (end - start > min_len).then(|| span.with_bounds(start, end))
        })
        .collect();

    // Stable, so equal starts keep input order.
    bounded.sort_by(|x, y| x.bounds().0.total_cmp(&y.bounds().0));

    let mut merged: Vec<S> = Vec::with_capacity(bounded.len());
    for span in bounded {
        let (start, end) = span.bounds();
        match merged.last_mut() {
            Some(acc) if start <= acc.bounds().1 + MIN_GAP => {
                let (acc_start, acc_end) = acc.bounds();
                *acc = acc.with_bounds(acc_start, acc_end.max(end));
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Check the canonical-form invariant for an already normalized list.
pub fn is_canonical(ranges: &[TimeRange], duration: f64, min_len: f64) -> bool {
    let bounded = ranges.iter().all(|r| {
        r.start >= 0.0
            && r.start <= r.end
            && (duration <= 0.0 || r.end <= duration)
            && r.len() > min_len
    });
    let separated = ranges
        .windows(2)
        .all(|pair| pair[1].start > pair[0].end + MIN_GAP);
    bounded && separated
}

#[cfg(test)]
mod tests {
    use super::*;
    use trimline_common::{MAX_SPEED, MIN_SPEED};

    fn r(start: f64, end: f64) -> TimeRange {
        TimeRange::new(start, end)
    }

    #[test]
    fn merges_overlaps_and_clamps_to_duration() {
        let out = normalize_trims(&[r(1.0, 3.0), r(2.98, 4.0), r(8.0, 12.0)], 10.0);
        assert_eq!(out, vec![r(1.0, 4.0), r(8.0, 10.0)]);
    }

    #[test]
    fn merges_spans_closer_than_min_gap() {
        let out = normalize_trims(&[r(1.0, 2.0), r(2.04, 3.0)], 10.0);
        assert_eq!(out, vec![r(1.0, 3.0)]);

        let out = normalize_trims(&[r(1.0, 2.0), r(2.2, 3.0)], 10.0);
        assert_eq!(out, vec![r(1.0, 2.0), r(2.2, 3.0)]);
    }

    #[test]
    fn swaps_inverted_and_sorts() {
        let out = normalize_trims(&[r(7.0, 5.0), r(3.0, 1.0)], 10.0);
        assert_eq!(out, vec![r(1.0, 3.0), r(5.0, 7.0)]);
    }

    #[test]
    fn drops_degenerate_spans() {
        let out = normalize_trims(
            &[
                r(2.0, 2.0),
                r(3.0, 3.04),
                r(-5.0, -1.0),
                r(11.0, 14.0),
                r(f64::NAN, 4.0),
                r(1.0, f64::INFINITY),
            ],
            10.0,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn contained_span_does_not_shrink_accumulator() {
        let out = normalize_trims(&[r(1.0, 6.0), r(2.0, 3.0)], 10.0);
        assert_eq!(out, vec![r(1.0, 6.0)]);
    }

    #[test]
    fn unknown_duration_clamps_floor_only() {
        let out = normalize_trims(&[r(-2.0, 1.0), r(40.0, 50.0)], 0.0);
        assert_eq!(out, vec![r(0.0, 1.0), r(40.0, 50.0)]);
    }

    #[test]
    fn speed_spans_are_normalized_and_clamped() {
        let out = normalize_speeds(&[SpeedRange::new(3.0, 1.0, 2.0)], 10.0);
        assert_eq!(out, vec![SpeedRange::new(1.0, 3.0, 2.0)]);

        let out = normalize_speeds(&[SpeedRange::new(0.0, 2.0, 0.1)], 10.0);
        assert_eq!(out, vec![SpeedRange::new(0.0, 2.0, MIN_SPEED)]);

        let out = normalize_speeds(&[SpeedRange::new(3.0, 5.0, 20.0)], 10.0);
        assert_eq!(out, vec![SpeedRange::new(3.0, 5.0, MAX_SPEED)]);
    }

    #[test]
    fn speed_spans_use_longer_minimum_length() {
        let out = normalize_speeds(&[SpeedRange::new(1.0, 1.08, 2.0)], 10.0);
        assert!(out.is_empty());

        let out = normalize_trims(&[r(1.0, 1.08)], 10.0);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn overlapping_speed_spans_keep_earliest_speed() {
        let out = normalize_speeds(
            &[SpeedRange::new(2.0, 5.0, 4.0), SpeedRange::new(1.0, 3.0, 2.0)],
            10.0,
        );
        assert_eq!(out, vec![SpeedRange::new(1.0, 5.0, 2.0)]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = vec![
            vec![r(1.0, 3.0), r(2.98, 4.0), r(8.0, 12.0)],
            vec![r(9.9, 0.2), r(0.0, 0.01), r(4.0, 4.06)],
            vec![r(0.0, 1.0), r(1.05, 2.0), r(2.1, 3.0), r(3.149, 4.0)],
            vec![r(5.0, 6.0), r(5.5, 5.6), r(-1.0, 0.5)],
        ];
        for input in inputs {
            let once = normalize_trims(&input, 10.0);
            let twice = normalize_trims(&once, 10.0);
            assert_eq!(once, twice);
            assert!(is_canonical(&once, 10.0, MIN_TRIM_LEN), "{once:?}");
        }
    }

    #[test]
    fn speed_normalization_is_idempotent() {
        let input = vec![
            SpeedRange::new(0.0, 2.0, 0.1),
            SpeedRange::new(2.03, 3.0, 3.0),
            SpeedRange::new(7.0, 15.0, 30.0),
        ];
        let once = normalize_speeds(&input, 10.0);
        assert_eq!(normalize_speeds(&once, 10.0), once);
    }
}
