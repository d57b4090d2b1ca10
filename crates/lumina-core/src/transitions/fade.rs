// crates/lumina-core/src/transitions/fade.rs
//
// Opacity ramp at the clip boundary. Linear in `p` on both edges.

use crate::transitions::helpers::linear;
use crate::transitions::{TransitionEdge, TransitionFrame, TransitionKind, VisualTransition};

pub struct Fade;

impl VisualTransition for Fade {
    fn kind(&self) -> TransitionKind {
        TransitionKind::Fade
    }

    fn label(&self) -> &'static str {
        "Fade"
    }

    fn frame(&self, p: f32, _edge: TransitionEdge, _max_blur: f32) -> TransitionFrame {
        TransitionFrame {
            opacity: linear(p),
            ..TransitionFrame::NEUTRAL
        }
    }
}
