// crates/lumina-core/src/transitions/blur_dissolve.rs
//
// Blur radius decays from `max_blur` to zero while opacity rises with `p`.

use crate::transitions::helpers::{clamp01, ease_in_out};
use crate::transitions::{TransitionEdge, TransitionFrame, TransitionKind, VisualTransition};

pub struct BlurDissolve;

impl VisualTransition for BlurDissolve {
    fn kind(&self) -> TransitionKind {
        TransitionKind::BlurDissolve
    }

    fn label(&self) -> &'static str {
        "Blur Dissolve"
    }

    fn frame(&self, p: f32, _edge: TransitionEdge, max_blur: f32) -> TransitionFrame {
        let p = clamp01(p);
        TransitionFrame {
            opacity: ease_in_out(p),
            blur_px: max_blur.max(0.0) * (1.0 - p),
            ..TransitionFrame::NEUTRAL
        }
    }
}
