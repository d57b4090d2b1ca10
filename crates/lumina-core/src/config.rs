// crates/lumina-core/src/config.rs
//
// Every tunable the engine consults. Serialized with `#[serde(default)]` so a
// config file only needs the keys it overrides; missing keys take the values
// in `Default`.
//
// `validated()` clamps nonsensical values instead of rejecting them; the
// engine must always come up in a renderable state.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Shortest duration (s) a trim may leave a clip with.
    pub min_clip_duration:       f64,
    /// Quantization step (s) applied to positions before ripple.
    pub frame_step:              f64,
    /// Boundary guard (s) for "strictly contains the playhead" tests.
    pub boundary_epsilon:        f64,
    /// Minimum reported timeline length (s) so an empty ruler stays usable.
    pub timeline_floor:          f64,
    /// Fixed per-clip transition window (s).
    pub transition_duration:     f64,
    /// Max snapshots kept on the undo stack.
    pub history_capacity:        usize,
    /// Audio follower drift (s) tolerated before a resync seek.
    pub audio_drift_tolerance:   f64,
    /// Drift from zero (s) tolerated on an inactive, parked follower.
    pub audio_idle_tolerance:    f64,
    /// Minimum interval between published playback-state updates.
    pub publish_interval_ms:     u64,
    /// Minimum interval between applied drag positions.
    pub drag_throttle_ms:        u64,
    /// Timeline duration given to still images on import.
    pub image_duration:          f64,
    /// Duration used for video whose probe failed.
    pub probe_fallback_duration: f64,
    /// Blur radius (px) at the start of a blur-dissolve.
    pub max_dissolve_blur:       f32,
    /// Target tick rate of the playback driver.
    pub tick_hz:                 u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_clip_duration:       1.0,
            frame_step:              1.0 / 60.0,
            boundary_epsilon:        0.01,
            timeline_floor:          10.0,
            transition_duration:     0.5,
            history_capacity:        50,
            audio_drift_tolerance:   0.15,
            audio_idle_tolerance:    0.05,
            publish_interval_ms:     50,
            drag_throttle_ms:        16,
            image_duration:          5.0,
            probe_fallback_duration: 10.0,
            max_dissolve_blur:       10.0,
            tick_hz:                 60,
        }
    }
}

impl EditorConfig {
    /// Read a JSON config file. Keys absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let cfg: EditorConfig = serde_json::from_str(&text)?;
        Ok(cfg.validated())
    }

    /// Replace out-of-range values with the defaults (or the nearest sane value).
    pub fn validated(mut self) -> Self {
        let d = EditorConfig::default();
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };

        self.min_clip_duration       = positive(self.min_clip_duration, d.min_clip_duration);
        self.frame_step              = positive(self.frame_step, d.frame_step);
        self.boundary_epsilon        = if self.boundary_epsilon.is_finite() {
            self.boundary_epsilon.max(0.0)
        } else {
            d.boundary_epsilon
        };
        self.timeline_floor          = if self.timeline_floor.is_finite() {
            self.timeline_floor.max(0.0)
        } else {
            d.timeline_floor
        };
        self.transition_duration     = positive(self.transition_duration, d.transition_duration);
        self.history_capacity        = self.history_capacity.max(1);
        self.audio_drift_tolerance   = positive(self.audio_drift_tolerance, d.audio_drift_tolerance);
        self.audio_idle_tolerance    = positive(self.audio_idle_tolerance, d.audio_idle_tolerance);
        self.image_duration          = positive(self.image_duration, d.image_duration);
        self.probe_fallback_duration = positive(self.probe_fallback_duration, d.probe_fallback_duration);
        if !self.max_dissolve_blur.is_finite() || self.max_dissolve_blur < 0.0 {
            self.max_dissolve_blur = d.max_dissolve_blur;
        }
        self.tick_hz = self.tick_hz.clamp(1, 240);
        self
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }

    pub fn drag_throttle(&self) -> Duration {
        Duration::from_millis(self.drag_throttle_ms)
    }

    /// Wall-clock length of one driver tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz.max(1) as f64)
    }
}
