// crates/lumina-core/src/helpers/interval.rs
//
// Pure geometry over half-open `[start, start + duration)` intervals.
//
// Everything here is total: out-of-range inputs are clamped, never rejected.
// Video clips and audio clips both implement `Span`, so the same ripple code
// runs on either track, but always on ONE track at a time.

use uuid::Uuid;

use crate::helpers::time::snap_to_step;

/// Anything that occupies a half-open span of timeline seconds.
pub trait Span {
    fn id(&self) -> Uuid;
    fn start(&self) -> f64;
    fn duration(&self) -> f64;
    fn set_start(&mut self, start: f64);

    #[inline]
    fn end(&self) -> f64 {
        self.start() + self.duration()
    }
}

/// Strict intersection test. Touching endpoints (`a.end == b.start`) do not
/// overlap.
#[inline]
pub fn overlaps<A: Span + ?Sized, B: Span + ?Sized>(a: &A, b: &B) -> bool {
    a.start() < b.end() && b.start() < a.end()
}

/// `start <= t < end`, the playback-time membership test.
#[inline]
pub fn contains<S: Span + ?Sized>(span: &S, t: f64) -> bool {
    t >= span.start() && t < span.end()
}

/// `start + eps < t < end - eps`, the playhead test used by split / trim /
/// delete so a playhead sitting on (or jittering around) a boundary never
/// selects the neighbouring clip.
#[inline]
pub fn contains_strict<S: Span + ?Sized>(span: &S, t: f64, eps: f64) -> bool {
    t > span.start() + eps && t < span.end() - eps
}

/// Sort by start ascending. Stable, so equal starts keep insertion order.
pub fn sort_by_start<S: Span>(spans: &mut [S]) {
    spans.sort_by(|a, b| a.start().total_cmp(&b.start()));
}

/// Move `moved_id` to `desired_start` and cascade forward.
///
/// 1. `desired_start` is clamped to `>= 0` and snapped to `step`.
/// 2. All spans are sorted by start.
/// 3. Walking left to right, every span's start is forced to be `>=` the
///    previous span's end. Spans are only ever pushed later; gaps left behind
///    are never closed.
///
/// Returns `false` (and leaves `spans` untouched) when `moved_id` is absent.
pub fn ripple_reposition<S: Span>(
    spans:         &mut Vec<S>,
    moved_id:      Uuid,
    desired_start: f64,
    step:          f64,
) -> bool {
    let Some(moved) = spans.iter_mut().find(|s| s.id() == moved_id) else {
        return false;
    };

    let desired = if desired_start.is_finite() { desired_start.max(0.0) } else { 0.0 };
    moved.set_start(snap_to_step(desired, step).max(0.0));

    sort_by_start(spans);
    cascade_forward(spans);
    true
}

/// Forward-cascade pass over already-sorted spans.
pub fn cascade_forward<S: Span>(spans: &mut [S]) {
    let mut prev_end = f64::NEG_INFINITY;
    for span in spans.iter_mut() {
        if span.start() < prev_end {
            span.set_start(prev_end);
        }
        prev_end = span.end();
    }
}

/// True when no two spans in the slice overlap.
pub fn is_non_overlapping<S: Span>(spans: &[S]) -> bool {
    spans.iter().enumerate().all(|(i, a)| {
        spans[i + 1..].iter().all(|b| !overlaps(a, b))
    })
}

/// Latest end across all spans, or 0.0 for an empty slice.
pub fn max_end<S: Span>(spans: &[S]) -> f64 {
    spans.iter().map(|s| s.end()).fold(0.0_f64, f64::max)
}
