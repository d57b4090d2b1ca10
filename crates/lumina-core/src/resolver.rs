// crates/lumina-core/src/resolver.rs
//
// "What plays at time T" queries over an immutable `Timeline`.
//
// All functions borrow the timeline and return references tied to it, so
// callers can keep reading other fields in the same expression. A gap in the
// video track is a normal answer (`None`), not an error.

use crate::helpers::interval::contains;
use crate::state::{AudioClip, Clip, Subtitle, Timeline};

/// The active video/image clip and where to seek its source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveVideo<'a> {
    pub clip:        &'a Clip,
    /// Seconds into the source media.
    pub seek_offset: f64,
    /// Seconds since the clip's timeline start.
    pub time_in_clip: f64,
}

/// The clip whose `[start, end)` contains `t`. If several match (only
/// possible when the no-overlap rule was bypassed) the latest start wins.
pub fn active_clip(timeline: &Timeline, t: f64) -> Option<&Clip> {
    timeline
        .clips
        .iter()
        .filter(|c| contains(*c, t))
        .fold(None, |best: Option<&Clip>, c| match best {
            Some(b) if b.timeline_start >= c.timeline_start => Some(b),
            _ => Some(c),
        })
}

pub fn active_video(timeline: &Timeline, t: f64) -> Option<ActiveVideo<'_>> {
    active_clip(timeline, t).map(|clip| ActiveVideo {
        clip,
        seek_offset:  clip.source_position(t),
        time_in_clip: t - clip.timeline_start,
    })
}

/// Every audio clip whose interval contains `t`, in track order.
pub fn active_audio(timeline: &Timeline, t: f64) -> Vec<&AudioClip> {
    timeline.audio_clips.iter().filter(|a| contains(*a, t)).collect()
}

/// First cue (in stored order) whose interval contains `t`.
pub fn active_subtitle(timeline: &Timeline, t: f64) -> Option<&Subtitle> {
    timeline.subtitles.iter().find(|s| contains(*s, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AudioKind, ClipKind, MediaRef};

    fn clip(start: f64, duration: f64) -> Clip {
        Clip::new(ClipKind::Video, MediaRef::new("v.mp4"), start, duration)
    }

    #[test]
    fn gap_resolves_to_none() {
        let mut tl = Timeline::default();
        tl.clips.push(clip(0.0, 2.0));
        tl.clips.push(clip(5.0, 2.0));
        assert!(active_clip(&tl, 3.0).is_none());
        assert!(active_clip(&tl, 2.0).is_none());
        assert_eq!(active_clip(&tl, 5.0).map(|c| c.timeline_start), Some(5.0));
    }

    #[test]
    fn latest_start_wins_on_overlap() {
        let mut tl = Timeline::default();
        tl.clips.push(clip(0.0, 10.0));
        tl.clips.push(clip(4.0, 2.0));
        tl.clips.push(clip(1.0, 8.0));
        assert_eq!(active_clip(&tl, 5.0).map(|c| c.timeline_start), Some(4.0));
    }

    #[test]
    fn seek_offset_includes_source_offset() {
        let mut tl = Timeline::default();
        let mut c = clip(2.0, 8.0);
        c.source_offset = 1.5;
        tl.clips.push(c);
        let v = active_video(&tl, 3.0).unwrap();
        assert_eq!(v.seek_offset, 2.5);
        assert_eq!(v.time_in_clip, 1.0);
    }

    #[test]
    fn overlapping_audio_all_active() {
        let mut tl = Timeline::default();
        tl.audio_clips.push(AudioClip::new(AudioKind::Music, MediaRef::new("m.mp3"), 0.0, 10.0));
        tl.audio_clips.push(AudioClip::new(AudioKind::Voiceover, MediaRef::new("vo.wav"), 2.0, 3.0));
        assert_eq!(active_audio(&tl, 3.0).len(), 2);
        assert_eq!(active_audio(&tl, 6.0).len(), 1);
    }

    #[test]
    fn first_subtitle_wins() {
        let mut tl = Timeline::default();
        tl.subtitles.push(Subtitle::new("one", 0.0, 5.0));
        tl.subtitles.push(Subtitle::new("two", 1.0, 5.0));
        assert_eq!(active_subtitle(&tl, 2.0).map(|s| s.text.as_str()), Some("one"));
        assert!(active_subtitle(&tl, 8.0).is_none());
    }
}
