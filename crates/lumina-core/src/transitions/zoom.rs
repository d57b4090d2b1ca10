// crates/lumina-core/src/transitions/zoom.rs
//
// Scale interpolation toward 1.0 at full progress.
//
//   zoom-in : entry grows from ZOOM_SMALL, exit keeps growing toward ZOOM_LARGE
//   zoom-out: entry shrinks from ZOOM_LARGE, exit keeps shrinking toward ZOOM_SMALL

use crate::transitions::helpers::{ease_out, lerp};
use crate::transitions::{TransitionEdge, TransitionFrame, TransitionKind, Transform2D, VisualTransition};

const ZOOM_SMALL: f32 = 0.8;
const ZOOM_LARGE: f32 = 1.2;

fn zoom_frame(from: f32, p: f32) -> TransitionFrame {
    TransitionFrame {
        transform: Transform2D { scale: lerp(from, 1.0, ease_out(p)), ..Transform2D::IDENTITY },
        ..TransitionFrame::NEUTRAL
    }
}

pub struct ZoomIn;

impl VisualTransition for ZoomIn {
    fn kind(&self) -> TransitionKind {
        TransitionKind::ZoomIn
    }

    fn label(&self) -> &'static str {
        "Zoom In"
    }

    fn frame(&self, p: f32, edge: TransitionEdge, _max_blur: f32) -> TransitionFrame {
        match edge {
            TransitionEdge::In  => zoom_frame(ZOOM_SMALL, p),
            TransitionEdge::Out => zoom_frame(ZOOM_LARGE, p),
        }
    }
}

pub struct ZoomOut;

impl VisualTransition for ZoomOut {
    fn kind(&self) -> TransitionKind {
        TransitionKind::ZoomOut
    }

    fn label(&self) -> &'static str {
        "Zoom Out"
    }

    fn frame(&self, p: f32, edge: TransitionEdge, _max_blur: f32) -> TransitionFrame {
        match edge {
            TransitionEdge::In  => zoom_frame(ZOOM_LARGE, p),
            TransitionEdge::Out => zoom_frame(ZOOM_SMALL, p),
        }
    }
}
