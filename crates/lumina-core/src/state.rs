// crates/lumina-core/src/state.rs
// Pure project data, no runtime handles, no media bytes.
// Serializable via serde. Edit operations live in timeline.rs; this file only
// defines the shapes and their constructors.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filters::Filter;
use crate::helpers::interval::Span;
use crate::transitions::TransitionKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipKind {
    Video,
    Image,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioKind {
    Music,
    Voiceover,
}

/// What an imported file turns into on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Image,
    Audio,
}

impl MediaKind {
    /// Classify by file extension (case-insensitive, no leading dot).
    /// Anything unrecognised is treated as video.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp"   => MediaKind::Image,
            "mp3" | "wav" | "aac" | "flac" | "ogg" | "m4a"    => MediaKind::Audio,
            _ => MediaKind::Video,
        }
    }
}

/// Handle to source media owned by the external media store. The core never
/// reads the bytes behind it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub id:   Uuid,
    pub name: String,
}

impl MediaRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), name: name.into() }
    }
}

/// A video or still-image span placed on the video track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id:                Uuid,
    pub kind:              ClipKind,
    pub media:             MediaRef,
    pub timeline_start:    f64,
    pub timeline_duration: f64,
    /// Seconds into the source where playback of this clip begins.
    pub source_offset:     f64,
    #[serde(default)]
    pub mute:              bool,
    #[serde(default)]
    pub filter:            Filter,
    #[serde(default)]
    pub transition_in:     Option<TransitionKind>,
    #[serde(default)]
    pub transition_out:    Option<TransitionKind>,
}

impl Clip {
    pub fn new(kind: ClipKind, media: MediaRef, timeline_start: f64, timeline_duration: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            media,
            timeline_start,
            timeline_duration,
            source_offset:  0.0,
            mute:           false,
            filter:         Filter::None,
            transition_in:  None,
            transition_out: None,
        }
    }

    /// Source position that corresponds to timeline time `t`.
    #[inline]
    pub fn source_position(&self, t: f64) -> f64 {
        (t - self.timeline_start) + self.source_offset
    }
}

/// A music or voiceover span on the (overlap-tolerant) audio track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub id:                Uuid,
    pub kind:              AudioKind,
    pub media:             MediaRef,
    pub timeline_start:    f64,
    pub timeline_duration: f64,
    pub source_offset:     f64,
    /// Per-clip gain 0..1, multiplied with the global volume.
    #[serde(default = "default_audio_volume")]
    pub volume:            f32,
    #[serde(default)]
    pub mute:              bool,
}

fn default_audio_volume() -> f32 { 0.8 }

impl AudioClip {
    pub fn new(kind: AudioKind, media: MediaRef, timeline_start: f64, timeline_duration: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            media,
            timeline_start,
            timeline_duration,
            source_offset: 0.0,
            volume:        default_audio_volume(),
            mute:          false,
        }
    }

    #[inline]
    pub fn source_position(&self, t: f64) -> f64 {
        (t - self.timeline_start) + self.source_offset
    }
}

/// A subtitle cue. Not subject to ripple; cues may overlap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subtitle {
    pub id:                Uuid,
    pub text:              String,
    pub timeline_start:    f64,
    pub timeline_duration: f64,
}

impl Subtitle {
    pub fn new(text: impl Into<String>, timeline_start: f64, timeline_duration: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            timeline_start,
            timeline_duration,
        }
    }
}

macro_rules! impl_span {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Span for $ty {
                #[inline] fn id(&self) -> Uuid { self.id }
                #[inline] fn start(&self) -> f64 { self.timeline_start }
                #[inline] fn duration(&self) -> f64 { self.timeline_duration }
                #[inline] fn set_start(&mut self, start: f64) { self.timeline_start = start; }
            }
        )*
    };
}

impl_span!(Clip, AudioClip, Subtitle);

/// The canonical edit model: one video track, one audio track, one cue list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Sorted by `timeline_start`; never overlapping.
    pub clips:          Vec<Clip>,
    /// Sorted by `timeline_start`; never overlapping within the audio track.
    pub audio_clips:    Vec<AudioClip>,
    #[serde(default)]
    pub subtitles:      Vec<Subtitle>,
    /// Derived: `max(floor, latest end)`. Refreshed by `recalculate_duration`.
    #[serde(default)]
    pub total_duration: f64,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            clips:          Vec::new(),
            audio_clips:    Vec::new(),
            subtitles:      Vec::new(),
            total_duration: 0.0,
        }
    }
}

/// Snapshot of the three edit collections, the unit the undo history stores.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineSnapshot {
    pub clips:       Vec<Clip>,
    pub audio_clips: Vec<AudioClip>,
    pub subtitles:   Vec<Subtitle>,
}

impl Timeline {
    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            clips:       self.clips.clone(),
            audio_clips: self.audio_clips.clone(),
            subtitles:   self.subtitles.clone(),
        }
    }

    pub fn restore(&mut self, snap: TimelineSnapshot) {
        self.clips       = snap.clips;
        self.audio_clips = snap.audio_clips;
        self.subtitles   = snap.subtitles;
    }

    pub fn clip(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn audio_clip(&self, id: Uuid) -> Option<&AudioClip> {
        self.audio_clips.iter().find(|c| c.id == id)
    }
}

/// Global playback parameters. Adjustments are percentages (100 = neutral).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackState {
    pub current_time:  f64,
    pub is_playing:    bool,
    /// 0.25 – 3.0
    pub playback_rate: f64,
    /// 0 – 1
    pub volume:        f32,
    pub brightness:    f32,
    pub contrast:      f32,
    pub saturation:    f32,
    /// Global fade-in length (s) at the start of the playback window.
    pub fade_in:       f64,
    /// Global fade-out length (s) at the end of the playback window.
    pub fade_out:      f64,
    /// Fallback filter when a clip has none of its own.
    pub filter:        Filter,
}

pub const MIN_PLAYBACK_RATE: f64 = 0.25;
pub const MAX_PLAYBACK_RATE: f64 = 3.0;

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_time:  0.0,
            is_playing:    false,
            playback_rate: 1.0,
            volume:        1.0,
            brightness:    100.0,
            contrast:      100.0,
            saturation:    100.0,
            fade_in:       0.0,
            fade_out:      0.0,
            filter:        Filter::None,
        }
    }
}

impl PlaybackState {
    pub fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = if rate.is_finite() {
            rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE)
        } else {
            1.0
        };
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 1.0 };
    }

    /// Adjustments clamp to 0–200 %.
    pub fn set_adjustments(&mut self, brightness: f32, contrast: f32, saturation: f32) {
        let pct = |v: f32| if v.is_finite() { v.clamp(0.0, 200.0) } else { 100.0 };
        self.brightness = pct(brightness);
        self.contrast   = pct(contrast);
        self.saturation = pct(saturation);
    }

    pub fn set_fade(&mut self, fade_in: f64, fade_out: f64) {
        let secs = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.fade_in  = secs(fade_in);
        self.fade_out = secs(fade_out);
    }
}
