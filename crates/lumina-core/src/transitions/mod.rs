// crates/lumina-core/src/transitions/mod.rs
//
// Per-clip entry/exit transitions.
//
// ╔══════════════════════════════════════════════════════════════╗
// ║  HOW TO ADD A TRANSITION                                     ║
// ╚══════════════════════════════════════════════════════════════╝
//
//   1. Create `transitions/my_transition.rs`, impl `VisualTransition`.
//   2. Add a `TransitionKind` variant (+ its wire name).
//   3. Add the module / struct to `declare_transitions!` below.
//
// ── Architecture ─────────────────────────────────────────────────────────────
//
//   Layer 1: `TransitionKind`: the closed, serialized tag stored on clips.
//             Wire names are kebab-case ("slide-left"): never rename them.
//
//   Layer 2: `VisualTransition` trait: maps boundary progress `p` to a
//             (opacity, transform, blur) triple. No pixels, no buffers.
//
//   Layer 3: Registry: built once from `declare_transitions!`, O(1) lookup
//             by kind. `frame()` is the only call site the effect pipeline
//             needs.
//
// Progress convention, for BOTH edges:
//   p = 0.0 → exactly on the clip boundary (fully "out")
//   p = 1.0 → a full transition window away from it (fully "in")
// Entry: p = time_in_clip / window.  Exit: p = time_left / window.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub mod helpers;

macro_rules! declare_transitions {
    ( $( $module:ident => [ $( $struct:ident ),+ $(,)? ] ),* $(,)? ) => {
        $( mod $module; )*

        fn make_entries() -> Vec<Box<dyn VisualTransition>> {
            vec![ $( $( Box::new($module::$struct) as Box<dyn VisualTransition> ),+ ),* ]
        }
    };
}

declare_transitions! {
    fade          => [Fade],
    slide         => [SlideLeft, SlideRight],
    zoom          => [ZoomIn, ZoomOut],
    blur_dissolve => [BlurDissolve],
}

// ── Serialized tag ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    Fade,
    SlideLeft,
    SlideRight,
    ZoomIn,
    ZoomOut,
    BlurDissolve,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 6] = [
        TransitionKind::Fade,
        TransitionKind::SlideLeft,
        TransitionKind::SlideRight,
        TransitionKind::ZoomIn,
        TransitionKind::ZoomOut,
        TransitionKind::BlurDissolve,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TransitionKind::Fade         => "fade",
            TransitionKind::SlideLeft    => "slide-left",
            TransitionKind::SlideRight   => "slide-right",
            TransitionKind::ZoomIn       => "zoom-in",
            TransitionKind::ZoomOut      => "zoom-out",
            TransitionKind::BlurDissolve => "blur-dissolve",
        }
    }

    /// Parse a wire name. `"none"` / empty → `Ok(None)` (clear the slot).
    pub fn parse(s: &str) -> Result<Option<Self>, UnknownTransition> {
        let t = s.trim();
        if t.is_empty() || t.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(t))
            .map(Some)
            .ok_or_else(|| UnknownTransition(t.to_string()))
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transition `{0}`")]
pub struct UnknownTransition(pub String);

/// Which side of a clip a transition sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEdge {
    In,
    Out,
}

// ── Output descriptor ─────────────────────────────────────────────────────────

/// 2D transform applied verbatim by the presenter. Translation is a
/// percentage of the frame size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub translate_x_pct: f32,
    pub translate_y_pct: f32,
    pub scale:           f32,
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D {
        translate_x_pct: 0.0,
        translate_y_pct: 0.0,
        scale:           1.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Compose: translations add, scales multiply.
    pub fn then(self, other: Transform2D) -> Transform2D {
        Transform2D {
            translate_x_pct: self.translate_x_pct + other.translate_x_pct,
            translate_y_pct: self.translate_y_pct + other.translate_y_pct,
            scale:           self.scale * other.scale,
        }
    }
}

impl Default for Transform2D {
    fn default() -> Self { Self::IDENTITY }
}

impl fmt::Display for Transform2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return f.write_str("none");
        }
        write!(
            f,
            "translate({:.2}%, {:.2}%) scale({:.3})",
            self.translate_x_pct, self.translate_y_pct, self.scale,
        )
    }
}

/// What one transition contributes to a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionFrame {
    pub opacity:   f32,
    pub transform: Transform2D,
    pub blur_px:   f32,
}

impl TransitionFrame {
    pub const NEUTRAL: TransitionFrame = TransitionFrame {
        opacity:   1.0,
        transform: Transform2D::IDENTITY,
        blur_px:   0.0,
    };
}

// ── VisualTransition trait ────────────────────────────────────────────────────

/// Parameter-computation contract for one transition kind.
///
/// Implementors are zero-size structs. `frame()` is called once per tick per
/// active edge and must be a pure function of its arguments.
pub trait VisualTransition: Send + Sync {
    fn kind(&self) -> TransitionKind;

    /// Human-readable label (e.g. `"Slide Left"`).
    fn label(&self) -> &'static str;

    /// Map boundary progress `p` ∈ [0, 1] to a frame contribution.
    /// `max_blur` is the configured blur radius for blur-based kinds.
    fn frame(&self, p: f32, edge: TransitionEdge, max_blur: f32) -> TransitionFrame;
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// All registered transitions in stable display order.
pub fn registered() -> Vec<Box<dyn VisualTransition>> {
    make_entries()
}

/// Registry keyed by kind, built once.
pub fn registry() -> &'static HashMap<TransitionKind, Box<dyn VisualTransition>> {
    static REGISTRY: OnceLock<HashMap<TransitionKind, Box<dyn VisualTransition>>> = OnceLock::new();
    REGISTRY.get_or_init(|| make_entries().into_iter().map(|t| (t.kind(), t)).collect())
}

/// Frame contribution of `kind` at progress `p`. `p` is clamped to [0, 1].
pub fn frame(kind: TransitionKind, p: f32, edge: TransitionEdge, max_blur: f32) -> TransitionFrame {
    let p = helpers::clamp01(p);
    registry()
        .get(&kind)
        .map(|t| t.frame(p, edge, max_blur))
        .unwrap_or(TransitionFrame::NEUTRAL)
}
