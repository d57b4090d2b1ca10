// crates/lumina-core/src/transitions/helpers.rs
//
// Math utilities for transition implementors. Plain f32 in, f32 out.

// ── Clamp / lerp ─────────────────────────────────────────────────────────────

/// Clamp `v` to [0.0, 1.0]. NaN maps to 0.0.
#[inline]
pub fn clamp01(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Linear interpolation between `a` and `b` at `t` ∈ [0, 1].
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ── Easing curves ─────────────────────────────────────────────────────────────
//
// All take `t` ∈ [0.0, 1.0] and return a remapped value in [0.0, 1.0].

/// Smooth-step cubic ease-in/out. Zero derivative at both endpoints.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = clamp01(t);
    t * t * (3.0 - 2.0 * t)
}

/// Ease out, decelerates to the end.
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = clamp01(t);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// No easing.
#[inline]
pub fn linear(t: f32) -> f32 {
    clamp01(t)
}
