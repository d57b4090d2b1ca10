// crates/lumina-core/src/helpers/time.rs
//
// Time formatting and frame quantization shared by the store, the clock and
// the app's log output. All timeline times are f64 seconds.

/// Format seconds as `MM:SS:FF` (minutes, seconds, frames at 30 fps).
///
/// ```
/// use lumina_core::helpers::time::format_time;
/// assert_eq!(format_time(0.0),    "00:00:00");
/// assert_eq!(format_time(61.5),   "01:01:15");
/// assert_eq!(format_time(3599.0), "59:59:00");
/// ```
pub fn format_time(s: f64) -> String {
    let s  = s.max(0.0);
    let m  = (s / 60.0) as u32;
    let sc = (s % 60.0) as u32;
    let fr = ((s * 30.0) as u32) % 30;
    format!("{m:02}:{sc:02}:{fr:02}")
}

/// Format seconds as a compact human-readable duration.
///
/// ```
/// use lumina_core::helpers::time::format_duration;
/// assert_eq!(format_duration(4.2),    "4.2s");
/// assert_eq!(format_duration(187.0),  "3:07");
/// assert_eq!(format_duration(3875.0), "1:04:35");
/// ```
pub fn format_duration(secs: f64) -> String {
    if secs >= 3600.0 {
        format!(
            "{}:{:02}:{:02}",
            secs as u64 / 3600,
            (secs as u64 % 3600) / 60,
            secs as u64 % 60,
        )
    } else if secs >= 60.0 {
        format!("{}:{:02}", secs as u64 / 60, secs as u64 % 60)
    } else {
        format!("{secs:.1}s")
    }
}

/// Snap `t` to the nearest multiple of `step`.
///
/// When `1 / step` is (within rounding) an integer frame rate the division is
/// done against that integer, so `snap_to_step(2.0, 1.0 / 60.0)` is exactly
/// `2.0` rather than `1.9999999999999998`. Repeated snaps are idempotent.
pub fn snap_to_step(t: f64, step: f64) -> f64 {
    if !(step.is_finite() && step > 0.0) || !t.is_finite() {
        return t;
    }
    let rate = 1.0 / step;
    if (rate - rate.round()).abs() < 1e-6 {
        let rate = rate.round();
        (t * rate).round() / rate
    } else {
        (t / step).round() * step
    }
}

/// True when `a` and `b` are within `eps` of each other.
#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
