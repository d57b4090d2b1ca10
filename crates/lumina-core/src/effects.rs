// crates/lumina-core/src/effects.rs
//
// Visual effect pipeline: a pure function from
//   (global adjustments, effective filter, per-clip transitions, global fades,
//    time) → VisualOutput { opacity, transform, filter chain }.
//
// No pixels are touched here. The presenter applies the descriptor verbatim,
// and the export capture records the very same descriptor, so preview and
// render cannot diverge.
//
// Filter chain order is fixed:
//   1. brightness / contrast / saturate (always present, 100 = neutral)
//   2. effective filter (clip override, else global fallback)
//   3. transition blur, when a blur-based transition is active

use serde::Serialize;

use crate::config::EditorConfig;
use crate::filters::{Filter, FilterChain, FilterOp};
use crate::resolver::ActiveVideo;
use crate::state::{Clip, PlaybackState};
use crate::transitions::{self, TransitionEdge, TransitionFrame, Transform2D};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(into = "VisualDescriptor")]
pub struct VisualOutput {
    /// 0..1
    pub opacity:   f32,
    pub transform: Transform2D,
    pub filter:    FilterChain,
}

impl Default for VisualOutput {
    fn default() -> Self {
        Self {
            opacity:   1.0,
            transform: Transform2D::IDENTITY,
            filter:    FilterChain::default(),
        }
    }
}

/// Flat, serializable form handed to presenters and the export capture.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisualDescriptor {
    pub opacity:   f32,
    pub transform: String,
    pub filter:    String,
}

impl From<&VisualOutput> for VisualDescriptor {
    fn from(v: &VisualOutput) -> Self {
        Self {
            opacity:   v.opacity,
            transform: v.transform.to_string(),
            filter:    v.filter.to_string(),
        }
    }
}

impl From<VisualOutput> for VisualDescriptor {
    fn from(v: VisualOutput) -> Self {
        VisualDescriptor::from(&v)
    }
}

/// Opacity multiplier of the global fade-in / fade-out at `t` over the
/// playback window `[0, total]`.
pub fn global_fade(t: f64, total: f64, fade_in: f64, fade_out: f64) -> f32 {
    let mut k = 1.0_f64;
    if fade_in > 0.0 && t < fade_in {
        k *= (t / fade_in).max(0.0);
    }
    if fade_out > 0.0 && t > total - fade_out {
        k *= ((total - t) / fade_out).max(0.0);
    }
    k.clamp(0.0, 1.0) as f32
}

/// Combined entry + exit transition contribution for `clip` at
/// `time_in_clip`. Neutral outside both windows.
pub fn transition_state(clip: &Clip, time_in_clip: f64, cfg: &EditorConfig) -> TransitionFrame {
    let window = cfg.transition_duration;
    let time_left = clip.timeline_duration - time_in_clip;
    let mut out = TransitionFrame::NEUTRAL;

    if let Some(kind) = clip.transition_in {
        if time_in_clip < window {
            let f = transitions::frame(kind, (time_in_clip / window) as f32, TransitionEdge::In, cfg.max_dissolve_blur);
            out = combine(out, f);
        }
    }
    if let Some(kind) = clip.transition_out {
        if time_left < window {
            let f = transitions::frame(kind, (time_left / window) as f32, TransitionEdge::Out, cfg.max_dissolve_blur);
            out = combine(out, f);
        }
    }
    out
}

fn combine(a: TransitionFrame, b: TransitionFrame) -> TransitionFrame {
    TransitionFrame {
        opacity:   a.opacity * b.opacity,
        transform: a.transform.then(b.transform),
        blur_px:   a.blur_px + b.blur_px,
    }
}

/// The filter chain for a clip (or the empty track) under the given globals.
pub fn filter_chain(playback: &PlaybackState, clip_filter: Option<&Filter>) -> FilterChain {
    let mut chain = FilterChain::default();
    chain.push(FilterOp::Brightness(playback.brightness));
    chain.push(FilterOp::Contrast(playback.contrast));
    chain.push(FilterOp::Saturate(playback.saturation));
    let clip_filter = clip_filter.unwrap_or(&Filter::None);
    chain.extend_with(Filter::effective(clip_filter, &playback.filter));
    chain
}

/// Full per-tick visual output at timeline time `t`.
pub fn compose(
    playback: &PlaybackState,
    active:   Option<&ActiveVideo<'_>>,
    t:        f64,
    total:    f64,
    cfg:      &EditorConfig,
) -> VisualOutput {
    let mut chain = filter_chain(playback, active.map(|a| &a.clip.filter));
    let fade = global_fade(t, total, playback.fade_in, playback.fade_out);

    let tr = active
        .map(|a| transition_state(a.clip, a.time_in_clip, cfg))
        .unwrap_or(TransitionFrame::NEUTRAL);
    if tr.blur_px > 0.0 {
        chain.push(FilterOp::Blur(tr.blur_px));
    }

    VisualOutput {
        opacity:   (fade * tr.opacity).clamp(0.0, 1.0),
        transform: tr.transform,
        filter:    chain,
    }
}
