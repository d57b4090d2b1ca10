// crates/lumina-core/src/transitions/slide.rs
//
// Horizontal slides. Translation is `(1 - p) * 100 %` of the frame width.
//
// The name is the direction of travel:
//   slide-left : enters from the right edge, exits through the left edge
//   slide-right: enters from the left edge, exits through the right edge

use crate::transitions::helpers::clamp01;
use crate::transitions::{TransitionEdge, TransitionFrame, TransitionKind, Transform2D, VisualTransition};

/// Offset magnitude in percent for progress `p`.
#[inline]
fn offset(p: f32) -> f32 {
    (1.0 - clamp01(p)) * 100.0
}

fn slide_frame(signed_offset: f32) -> TransitionFrame {
    TransitionFrame {
        transform: Transform2D { translate_x_pct: signed_offset, ..Transform2D::IDENTITY },
        ..TransitionFrame::NEUTRAL
    }
}

pub struct SlideLeft;

impl VisualTransition for SlideLeft {
    fn kind(&self) -> TransitionKind {
        TransitionKind::SlideLeft
    }

    fn label(&self) -> &'static str {
        "Slide Left"
    }

    fn frame(&self, p: f32, edge: TransitionEdge, _max_blur: f32) -> TransitionFrame {
        let x = match edge {
            TransitionEdge::In  => offset(p),
            TransitionEdge::Out => -offset(p),
        };
        slide_frame(x)
    }
}

pub struct SlideRight;

impl VisualTransition for SlideRight {
    fn kind(&self) -> TransitionKind {
        TransitionKind::SlideRight
    }

    fn label(&self) -> &'static str {
        "Slide Right"
    }

    fn frame(&self, p: f32, edge: TransitionEdge, _max_blur: f32) -> TransitionFrame {
        let x = match edge {
            TransitionEdge::In  => -offset(p),
            TransitionEdge::Out => offset(p),
        };
        slide_frame(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_left_enters_from_the_right() {
        let f = SlideLeft.frame(0.0, TransitionEdge::In, 0.0);
        assert_eq!(f.transform.translate_x_pct, 100.0);
        let f = SlideLeft.frame(0.5, TransitionEdge::In, 0.0);
        assert_eq!(f.transform.translate_x_pct, 50.0);
        assert_eq!(f.opacity, 1.0);
    }

    #[test]
    fn slide_left_exits_to_the_left() {
        let f = SlideLeft.frame(0.25, TransitionEdge::Out, 0.0);
        assert_eq!(f.transform.translate_x_pct, -75.0);
    }

    #[test]
    fn slide_right_mirrors_slide_left() {
        for p in [0.0, 0.3, 0.9] {
            for edge in [TransitionEdge::In, TransitionEdge::Out] {
                let l = SlideLeft.frame(p, edge, 0.0).transform.translate_x_pct;
                let r = SlideRight.frame(p, edge, 0.0).transform.translate_x_pct;
                assert!((l + r).abs() < 1e-6);
            }
        }
    }
}
