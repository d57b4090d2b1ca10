// crates/lumina-core/src/audio_mix.rs
//
// Audio mix resolver and follower drift correction.
//
// `resolve_mix` is pure: it says, for time T, which sources should be audible,
// at what gain, from which source position, at what rate. `sync_followers`
// then nudges real media elements (anything implementing `MediaFollower`)
// toward that target:
//
//   active clip  : volume + rate set every tick; position re-seeked only when
//                   it drifted past `audio_drift_tolerance` (small corrections
//                   cause audible stutter)
//   inactive clip: paused; parked back at 0 when it drifted past
//                   `audio_idle_tolerance`
//   vanished clip: (e.g. after undo) reported so the owner can drop it

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::resolver::{active_audio, active_clip};
use crate::state::{AudioClip, Clip, ClipKind, PlaybackState, Timeline};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MixTrack {
    /// The embedded audio of the active video clip.
    Video,
    Audio,
}

/// One audible source at one instant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MixEntry {
    pub clip_id:  Uuid,
    pub media_id: Uuid,
    pub track:    MixTrack,
    /// 0..1, already multiplied by the global volume.
    pub volume:   f32,
    /// Seconds into the source.
    pub position: f64,
    pub rate:     f64,
}

/// `mute ? 0 : clamp01(clip_volume * global)`.
#[inline]
pub fn effective_volume(mute: bool, clip_volume: f32, global: f32) -> f32 {
    if mute { 0.0 } else { (clip_volume * global).clamp(0.0, 1.0) }
}

pub fn audio_entry(clip: &AudioClip, playback: &PlaybackState) -> MixEntry {
    let t = playback.current_time;
    MixEntry {
        clip_id:  clip.id,
        media_id: clip.media.id,
        track:    MixTrack::Audio,
        volume:   effective_volume(clip.mute, clip.volume, playback.volume),
        position: clip.source_position(t),
        rate:     playback.playback_rate,
    }
}

fn video_entry(clip: &Clip, playback: &PlaybackState) -> MixEntry {
    let t = playback.current_time;
    MixEntry {
        clip_id:  clip.id,
        media_id: clip.media.id,
        track:    MixTrack::Video,
        volume:   effective_volume(clip.mute, 1.0, playback.volume),
        position: clip.source_position(t),
        rate:     playback.playback_rate,
    }
}

/// Everything audible at `playback.current_time`: the active video clip's own
/// audio (images have none) followed by every active audio-track clip.
pub fn resolve_mix(timeline: &Timeline, playback: &PlaybackState) -> Vec<MixEntry> {
    let t = playback.current_time;
    let mut mix = Vec::new();
    if let Some(c) = active_clip(timeline, t).filter(|c| c.kind == ClipKind::Video) {
        mix.push(video_entry(c, playback));
    }
    mix.extend(active_audio(timeline, t).into_iter().map(|a| audio_entry(a, playback)));
    mix
}

// ── Followers ─────────────────────────────────────────────────────────────────

/// A media element with its own clock that must follow the timeline clock.
pub trait MediaFollower {
    /// Current source position in seconds.
    fn position(&self) -> f64;
    fn seek(&mut self, position: f64);
    fn is_playing(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn set_rate(&mut self, rate: f64);
}

/// What one `sync_followers` pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Active followers re-seeked because drift exceeded the tolerance.
    pub resynced: Vec<Uuid>,
    /// Inactive followers reset to 0.
    pub parked:   Vec<Uuid>,
    /// Follower ids with no matching audio clip any more.
    pub stale:    Vec<Uuid>,
}

/// Drive every follower (keyed by audio clip id) toward the resolved mix.
pub fn sync_followers<F: MediaFollower>(
    followers: &mut HashMap<Uuid, F>,
    timeline:  &Timeline,
    playback:  &PlaybackState,
    cfg:       &EditorConfig,
) -> SyncReport {
    let mut report = SyncReport::default();
    let active: HashMap<Uuid, MixEntry> = active_audio(timeline, playback.current_time)
        .into_iter()
        .map(|a| (a.id, audio_entry(a, playback)))
        .collect();

    for (id, f) in followers.iter_mut() {
        match active.get(id) {
            Some(entry) => {
                f.set_volume(entry.volume);
                f.set_rate(entry.rate);
                if (f.position() - entry.position).abs() > cfg.audio_drift_tolerance {
                    f.seek(entry.position);
                    report.resynced.push(*id);
                }
                match (playback.is_playing, f.is_playing()) {
                    (true, false) => f.play(),
                    (false, true) => f.pause(),
                    _ => {}
                }
            }
            None => {
                if f.is_playing() {
                    f.pause();
                }
                if f.position().abs() > cfg.audio_idle_tolerance {
                    f.seek(0.0);
                    report.parked.push(*id);
                }
                if timeline.audio_clip(*id).is_none() {
                    report.stale.push(*id);
                }
            }
        }
    }
    report.resynced.sort();
    report.parked.sort();
    report.stale.sort();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AudioKind, ClipKind, MediaRef};

    #[derive(Default)]
    struct FakeElement {
        pos:     f64,
        playing: bool,
        volume:  f32,
        rate:    f64,
        seeks:   usize,
    }

    impl MediaFollower for FakeElement {
        fn position(&self) -> f64 { self.pos }
        fn seek(&mut self, position: f64) { self.pos = position; self.seeks += 1; }
        fn is_playing(&self) -> bool { self.playing }
        fn play(&mut self) { self.playing = true; }
        fn pause(&mut self) { self.playing = false; }
        fn set_volume(&mut self, volume: f32) { self.volume = volume; }
        fn set_rate(&mut self, rate: f64) { self.rate = rate; }
    }

    fn setup() -> (Timeline, Uuid) {
        let mut tl = Timeline::default();
        let mut a = AudioClip::new(AudioKind::Music, MediaRef::new("m.mp3"), 2.0, 10.0);
        a.source_offset = 1.0;
        let id = a.id;
        tl.audio_clips.push(a);
        (tl, id)
    }

    #[test]
    fn volume_is_clamped_product_or_zero_when_muted() {
        assert!((effective_volume(false, 0.8, 0.5) - 0.4).abs() < 1e-6);
        assert_eq!(effective_volume(true, 0.8, 1.0), 0.0);
        assert_eq!(effective_volume(false, 2.0, 1.0), 1.0);
    }

    #[test]
    fn mix_lists_video_then_audio() {
        let (mut tl, _) = setup();
        tl.clips.push(Clip::new(ClipKind::Video, MediaRef::new("v.mp4"), 0.0, 10.0));
        let p = PlaybackState { current_time: 4.0, playback_rate: 1.5, ..PlaybackState::default() };
        let mix = resolve_mix(&tl, &p);
        assert_eq!(mix.len(), 2);
        assert_eq!(mix[0].track, MixTrack::Video);
        assert_eq!(mix[1].position, 3.0);
        assert_eq!(mix[1].rate, 1.5);
    }

    #[test]
    fn images_contribute_no_audio() {
        let mut tl = Timeline::default();
        tl.clips.push(Clip::new(ClipKind::Image, MediaRef::new("p.png"), 0.0, 5.0));
        let p = PlaybackState { current_time: 1.0, ..PlaybackState::default() };
        assert!(resolve_mix(&tl, &p).is_empty());
    }

    #[test]
    fn small_drift_is_left_alone() {
        let (tl, id) = setup();
        let p = PlaybackState { current_time: 4.0, is_playing: true, ..PlaybackState::default() };
        let mut followers = HashMap::from([(id, FakeElement { pos: 3.1, ..FakeElement::default() })]);
        let report = sync_followers(&mut followers, &tl, &p, &EditorConfig::default());
        assert!(report.resynced.is_empty());
        let f = &followers[&id];
        assert_eq!(f.seeks, 0);
        assert!(f.playing);
        assert!((f.volume - 0.8).abs() < 1e-6);
    }

    #[test]
    fn large_drift_resyncs() {
        let (tl, id) = setup();
        let p = PlaybackState { current_time: 4.0, is_playing: true, ..PlaybackState::default() };
        let mut followers = HashMap::from([(id, FakeElement { pos: 3.5, ..FakeElement::default() })]);
        let report = sync_followers(&mut followers, &tl, &p, &EditorConfig::default());
        assert_eq!(report.resynced, vec![id]);
        assert_eq!(followers[&id].pos, 3.0);
    }

    #[test]
    fn inactive_followers_are_paused_and_parked() {
        let (tl, id) = setup();
        let p = PlaybackState { current_time: 20.0, is_playing: true, ..PlaybackState::default() };
        let mut followers = HashMap::from([(id, FakeElement { pos: 5.0, playing: true, ..FakeElement::default() })]);
        let report = sync_followers(&mut followers, &tl, &p, &EditorConfig::default());
        assert_eq!(report.parked, vec![id]);
        assert!(report.stale.is_empty());
        assert!(!followers[&id].playing);
        assert_eq!(followers[&id].pos, 0.0);
    }

    #[test]
    fn removed_clip_is_reported_stale() {
        let (tl, _) = setup();
        let ghost = Uuid::new_v4();
        let p = PlaybackState::default();
        let mut followers = HashMap::from([(ghost, FakeElement::default())]);
        let report = sync_followers(&mut followers, &tl, &p, &EditorConfig::default());
        assert_eq!(report.stale, vec![ghost]);
        assert!(report.parked.is_empty());
    }
}
