// crates/lumina-core/src/timeline.rs
//
// Invariant-preserving edit operations on `Timeline`.
//
// Every operation here is total: out-of-range inputs are clamped, unknown ids
// are reported through the return value (false / 0), nothing panics. After any
// structural change both tracks are sorted by start and non-overlapping; the
// caller (EditorSession) refreshes `total_duration` and the playhead clamp.
//
// Video clips and audio clips ripple independently, never against each other.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::filters::Filter;
use crate::helpers::interval::{self, contains_strict, max_end, ripple_reposition, sort_by_start, Span};
use crate::helpers::time::approx_eq;
use crate::state::{AudioClip, Clip, Subtitle, Timeline};
use crate::transitions::{TransitionEdge, TransitionKind};

/// Which boundary slot(s) a transition edit writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSelector {
    In,
    Out,
    #[default]
    Both,
}

impl EdgeSelector {
    fn covers(self, edge: TransitionEdge) -> bool {
        matches!(
            (self, edge),
            (EdgeSelector::Both, _)
                | (EdgeSelector::In, TransitionEdge::In)
                | (EdgeSelector::Out, TransitionEdge::Out)
        )
    }
}

/// A timeline range `[start, end)` to keep in `keep_only_ranges`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end:   f64,
}

impl TimeRange {
    pub fn len(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }
}

/// A duration is insertable only when it is finite and strictly positive.
#[inline]
pub fn is_valid_duration(d: f64) -> bool {
    d.is_finite() && d > 0.0
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

// ── Trim / split primitives shared by both tracks ─────────────────────────────

/// Shrink amount for a left trim to `to_time`, clamped by the duration floor.
/// `None` when the clip is already at or below the floor.
fn left_trim_amount<S: Span>(span: &S, to_time: f64, min: f64) -> Option<f64> {
    let d = span.duration();
    if d <= min {
        return None;
    }
    let shrink = (to_time - span.start()).clamp(0.0, d - min);
    (shrink > 0.0).then_some(shrink)
}

/// New duration for a right trim to `to_time`, clamped by the duration floor.
fn right_trim_duration<S: Span>(span: &S, to_time: f64, min: f64) -> Option<f64> {
    let d = span.duration();
    if d <= min {
        return None;
    }
    let new_d = (to_time - span.start()).clamp(min, d);
    (new_d < d).then_some(new_d)
}

/// Map `[start, end)` through the kept ranges. Each entry is
/// `(new_start, piece_duration, cut_from_source_start)`.
fn map_through_ranges(start: f64, end: f64, ranges: &[(TimeRange, f64)]) -> Vec<(f64, f64, f64)> {
    let mut out = Vec::new();
    for (r, base) in ranges {
        let is = start.max(r.start);
        let ie = end.min(r.end);
        if ie - is > 1e-9 {
            out.push((base + (is - r.start), ie - is, is - start));
        }
    }
    out
}

/// Sort by start, merge overlapping / touching ranges, drop empty ones.
pub fn normalize_ranges(ranges: &[TimeRange]) -> Vec<TimeRange> {
    let mut v: Vec<TimeRange> = ranges
        .iter()
        .filter(|r| r.start.is_finite() && r.end.is_finite())
        .map(|r| TimeRange { start: r.start.max(0.0), end: r.end.max(0.0) })
        .filter(|r| !r.is_empty())
        .collect();
    v.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<TimeRange> = Vec::with_capacity(v.len());
    for r in v {
        match merged.last_mut() {
            Some(last) if r.start <= last.end => last.end = last.end.max(r.end),
            _ => merged.push(r),
        }
    }
    merged
}

impl Timeline {
    // ── Lookup ────────────────────────────────────────────────────────────────

    pub fn clip_mut(&mut self, id: Uuid) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    pub fn audio_clip_mut(&mut self, id: Uuid) -> Option<&mut AudioClip> {
        self.audio_clips.iter_mut().find(|c| c.id == id)
    }

    /// True if `id` names a clip on either track or a subtitle cue.
    pub fn contains_id(&self, id: Uuid) -> bool {
        self.clip(id).is_some()
            || self.audio_clip(id).is_some()
            || self.subtitles.iter().any(|s| s.id == id)
    }

    // ── Insert ────────────────────────────────────────────────────────────────

    /// Place `clip` at `insert_at` (default: end of the video track). Rejected
    /// (returns `None`) when its duration is non-finite or non-positive.
    pub fn add_clip(&mut self, mut clip: Clip, insert_at: Option<f64>, cfg: &EditorConfig) -> Option<Uuid> {
        if !is_valid_duration(clip.timeline_duration) {
            debug!("[store] rejected clip {} with duration {}", clip.media.name, clip.timeline_duration);
            return None;
        }
        let at = insert_at.unwrap_or_else(|| max_end(&self.clips));
        let id = clip.id;
        clip.source_offset = finite_or(clip.source_offset, 0.0).max(0.0);
        self.clips.push(clip);
        ripple_reposition(&mut self.clips, id, at, cfg.frame_step);
        debug!("[store] add clip {id} at {at:.3}");
        Some(id)
    }

    /// Audio counterpart of `add_clip`; default position is the end of the
    /// audio track.
    pub fn add_audio_clip(&mut self, mut clip: AudioClip, insert_at: Option<f64>, cfg: &EditorConfig) -> Option<Uuid> {
        if !is_valid_duration(clip.timeline_duration) {
            debug!("[store] rejected audio {} with duration {}", clip.media.name, clip.timeline_duration);
            return None;
        }
        let at = insert_at.unwrap_or_else(|| max_end(&self.audio_clips));
        let id = clip.id;
        clip.source_offset = finite_or(clip.source_offset, 0.0).max(0.0);
        clip.volume = if clip.volume.is_finite() { clip.volume.clamp(0.0, 1.0) } else { 0.8 };
        self.audio_clips.push(clip);
        ripple_reposition(&mut self.audio_clips, id, at, cfg.frame_step);
        debug!("[store] add audio {id} at {at:.3}");
        Some(id)
    }

    /// Cues may overlap, so no ripple; only kept in start order.
    pub fn add_subtitle(&mut self, cue: Subtitle) -> Option<Uuid> {
        if !is_valid_duration(cue.timeline_duration) || !cue.timeline_start.is_finite() {
            return None;
        }
        let id = cue.id;
        self.subtitles.push(Subtitle { timeline_start: cue.timeline_start.max(0.0), ..cue });
        sort_by_start(&mut self.subtitles);
        Some(id)
    }

    // ── Move ──────────────────────────────────────────────────────────────────

    pub fn move_clip(&mut self, id: Uuid, desired_start: f64, cfg: &EditorConfig) -> bool {
        let moved = ripple_reposition(&mut self.clips, id, desired_start, cfg.frame_step);
        if moved {
            debug!("[store] move clip {id} → {desired_start:.3}");
        }
        moved
    }

    pub fn move_audio_clip(&mut self, id: Uuid, desired_start: f64, cfg: &EditorConfig) -> bool {
        let moved = ripple_reposition(&mut self.audio_clips, id, desired_start, cfg.frame_step);
        if moved {
            debug!("[store] move audio {id} → {desired_start:.3}");
        }
        moved
    }

    // ── Trim ──────────────────────────────────────────────────────────────────

    /// Trim the head of every clip (both tracks) that strictly contains
    /// `to_time`, or only `target` when given. Returns the number trimmed.
    pub fn trim_left(&mut self, to_time: f64, target: Option<Uuid>, cfg: &EditorConfig) -> usize {
        if !to_time.is_finite() {
            return 0;
        }
        let (eps, min) = (cfg.boundary_epsilon, cfg.min_clip_duration);
        let selected = |id: Uuid| target.map_or(true, |t| t == id);
        let mut n = 0;

        for c in self.clips.iter_mut().filter(|c| selected(c.id) && contains_strict(&**c, to_time, eps)) {
            if let Some(shrink) = left_trim_amount(&*c, to_time, min) {
                c.timeline_start    += shrink;
                c.timeline_duration -= shrink;
                c.source_offset     += shrink;
                n += 1;
            }
        }
        for a in self.audio_clips.iter_mut().filter(|a| selected(a.id) && contains_strict(&**a, to_time, eps)) {
            if let Some(shrink) = left_trim_amount(&*a, to_time, min) {
                a.timeline_start    += shrink;
                a.timeline_duration -= shrink;
                a.source_offset     += shrink;
                n += 1;
            }
        }
        if n > 0 {
            debug!("[store] trim-left {n} clip(s) at {to_time:.3}");
        }
        n
    }

    /// Shorten every clip (both tracks) that strictly contains `to_time` so
    /// it ends there, or only `target` when given.
    pub fn trim_right(&mut self, to_time: f64, target: Option<Uuid>, cfg: &EditorConfig) -> usize {
        if !to_time.is_finite() {
            return 0;
        }
        let (eps, min) = (cfg.boundary_epsilon, cfg.min_clip_duration);
        let selected = |id: Uuid| target.map_or(true, |t| t == id);
        let mut n = 0;

        for c in self.clips.iter_mut().filter(|c| selected(c.id) && contains_strict(&**c, to_time, eps)) {
            if let Some(d) = right_trim_duration(&*c, to_time, min) {
                c.timeline_duration = d;
                n += 1;
            }
        }
        for a in self.audio_clips.iter_mut().filter(|a| selected(a.id) && contains_strict(&**a, to_time, eps)) {
            if let Some(d) = right_trim_duration(&*a, to_time, min) {
                a.timeline_duration = d;
                n += 1;
            }
        }
        if n > 0 {
            debug!("[store] trim-right {n} clip(s) at {to_time:.3}");
        }
        n
    }

    /// Remove `head` seconds from the start and `tail` seconds from the end of
    /// one clip. The combined cut never takes the clip below the floor.
    pub fn trim_clip(&mut self, id: Uuid, head: f64, tail: f64, cfg: &EditorConfig) -> bool {
        let head = finite_or(head, 0.0).max(0.0);
        let tail = finite_or(tail, 0.0).max(0.0);
        let min = cfg.min_clip_duration;

        fn cut(start: &mut f64, dur: &mut f64, offset: &mut f64, head: f64, tail: f64, min: f64) {
            if *dur <= min {
                return;
            }
            let h = head.min(*dur - min);
            *start  += h;
            *offset += h;
            *dur    -= h;
            let t = tail.min(*dur - min);
            *dur -= t;
        }

        if let Some(c) = self.clip_mut(id) {
            cut(&mut c.timeline_start, &mut c.timeline_duration, &mut c.source_offset, head, tail, min);
            debug!("[store] trim clip {id} head={head:.3} tail={tail:.3}");
            return true;
        }
        if let Some(a) = self.audio_clip_mut(id) {
            cut(&mut a.timeline_start, &mut a.timeline_duration, &mut a.source_offset, head, tail, min);
            debug!("[store] trim audio {id} head={head:.3} tail={tail:.3}");
            return true;
        }
        false
    }

    // ── Split / delete ────────────────────────────────────────────────────────

    /// Replace every clip (both tracks) strictly containing `t`, or only
    /// `target`, with a left piece `[start, t)` and a right piece `[t, end)`.
    /// The left piece keeps the original id. Returns the number split.
    pub fn split_at(&mut self, t: f64, target: Option<Uuid>, cfg: &EditorConfig) -> usize {
        self.split_pieces(t, target, cfg).len()
    }

    /// `split_at`, reporting `(left_id, right_id)` for every clip split.
    pub fn split_pieces(&mut self, t: f64, target: Option<Uuid>, cfg: &EditorConfig) -> Vec<(Uuid, Uuid)> {
        if !t.is_finite() {
            return Vec::new();
        }
        let eps = cfg.boundary_epsilon;
        let selected = |id: Uuid| target.map_or(true, |tid| tid == id);

        let mut pairs = Vec::new();
        let mut right_video = Vec::new();
        for c in self.clips.iter_mut().filter(|c| selected(c.id) && contains_strict(&**c, t, eps)) {
            let cut = t - c.timeline_start;
            let mut right = c.clone();
            right.id                = Uuid::new_v4();
            right.timeline_start    = t;
            right.timeline_duration = c.timeline_duration - cut;
            right.source_offset     = c.source_offset + cut;
            right.transition_in     = None;
            c.timeline_duration     = cut;
            c.transition_out        = None;
            pairs.push((c.id, right.id));
            right_video.push(right);
        }

        let mut right_audio = Vec::new();
        for a in self.audio_clips.iter_mut().filter(|a| selected(a.id) && contains_strict(&**a, t, eps)) {
            let cut = t - a.timeline_start;
            let mut right = a.clone();
            right.id                = Uuid::new_v4();
            right.timeline_start    = t;
            right.timeline_duration = a.timeline_duration - cut;
            right.source_offset     = a.source_offset + cut;
            a.timeline_duration     = cut;
            pairs.push((a.id, right.id));
            right_audio.push(right);
        }

        let n = right_video.len() + right_audio.len();
        self.clips.extend(right_video);
        self.audio_clips.extend(right_audio);
        sort_by_start(&mut self.clips);
        sort_by_start(&mut self.audio_clips);
        if n > 0 {
            debug!("[store] split {n} clip(s) at {t:.3}");
        }
        pairs
    }

    /// Remove every clip (both tracks) strictly containing `t`. Survivors keep
    /// their positions.
    pub fn delete_at(&mut self, t: f64, cfg: &EditorConfig) -> usize {
        if !t.is_finite() {
            return 0;
        }
        let eps = cfg.boundary_epsilon;
        let before = self.clips.len() + self.audio_clips.len();
        self.clips.retain(|c| !contains_strict(c, t, eps));
        self.audio_clips.retain(|a| !contains_strict(a, t, eps));
        let n = before - (self.clips.len() + self.audio_clips.len());
        if n > 0 {
            debug!("[store] delete {n} clip(s) at {t:.3}");
        }
        n
    }

    /// Remove one clip, audio clip or cue by id. No ripple.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.clips.len() + self.audio_clips.len() + self.subtitles.len();
        self.clips.retain(|c| c.id != id);
        self.audio_clips.retain(|a| a.id != id);
        self.subtitles.retain(|s| s.id != id);
        let removed = before != self.clips.len() + self.audio_clips.len() + self.subtitles.len();
        if removed {
            debug!("[store] remove {id}");
        }
        removed
    }

    // ── Field updates ─────────────────────────────────────────────────────────

    pub fn set_clip_filter(&mut self, id: Uuid, filter: Filter) -> bool {
        match self.clip_mut(id) {
            Some(c) => {
                c.filter = filter;
                true
            }
            None => false,
        }
    }

    /// Set (or clear, with `None`) the transition slot(s) of one clip.
    pub fn set_clip_transition(
        &mut self,
        id:    Uuid,
        edges: EdgeSelector,
        kind:  Option<TransitionKind>,
    ) -> bool {
        let Some(c) = self.clip_mut(id) else { return false };
        if edges.covers(TransitionEdge::In) {
            c.transition_in = kind;
        }
        if edges.covers(TransitionEdge::Out) {
            c.transition_out = kind;
        }
        true
    }

    /// Apply `kind` at every boundary where one video clip ends exactly where
    /// the next begins. Returns the number of joins touched.
    pub fn set_boundary_transitions(
        &mut self,
        edges: EdgeSelector,
        kind:  Option<TransitionKind>,
        cfg:   &EditorConfig,
    ) -> usize {
        let eps = cfg.boundary_epsilon;
        let mut joins = 0;
        for i in 1..self.clips.len() {
            let (head, tail) = self.clips.split_at_mut(i);
            let prev = &mut head[i - 1];
            let next = &mut tail[0];
            if !approx_eq(prev.end(), next.timeline_start, eps) {
                continue;
            }
            if edges.covers(TransitionEdge::Out) {
                prev.transition_out = kind;
            }
            if edges.covers(TransitionEdge::In) {
                next.transition_in = kind;
            }
            joins += 1;
        }
        joins
    }

    /// Flip `mute` on a clip of either track. Returns the new value.
    pub fn toggle_mute(&mut self, id: Uuid) -> Option<bool> {
        if let Some(c) = self.clip_mut(id) {
            c.mute = !c.mute;
            return Some(c.mute);
        }
        if let Some(a) = self.audio_clip_mut(id) {
            a.mute = !a.mute;
            return Some(a.mute);
        }
        None
    }

    pub fn set_clip_volume(&mut self, id: Uuid, volume: f32) -> bool {
        match self.audio_clip_mut(id) {
            Some(a) => {
                a.volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { a.volume };
                true
            }
            None => false,
        }
    }

    // ── Derived values ────────────────────────────────────────────────────────

    /// `max(floor, latest end over both tracks)`, stored and returned.
    pub fn recalculate_duration(&mut self, cfg: &EditorConfig) -> f64 {
        let end = max_end(&self.clips).max(max_end(&self.audio_clips));
        self.total_duration = end.max(cfg.timeline_floor);
        self.total_duration
    }

    /// Re-establish sort order and the no-overlap rule on both tracks, e.g.
    /// after deserializing a project from an untrusted source.
    pub fn normalize(&mut self) {
        self.clips.retain(|c| is_valid_duration(c.timeline_duration) && c.timeline_start.is_finite());
        self.audio_clips.retain(|a| is_valid_duration(a.timeline_duration) && a.timeline_start.is_finite());
        for c in &mut self.clips {
            c.timeline_start = c.timeline_start.max(0.0);
        }
        for a in &mut self.audio_clips {
            a.timeline_start = a.timeline_start.max(0.0);
        }
        sort_by_start(&mut self.clips);
        sort_by_start(&mut self.audio_clips);
        sort_by_start(&mut self.subtitles);
        interval::cascade_forward(&mut self.clips);
        interval::cascade_forward(&mut self.audio_clips);
    }

    // ── Highlights ────────────────────────────────────────────────────────────

    /// Keep only `ranges` of the timeline and lay them back to back from 0.
    ///
    /// Every track (video, audio, cues) goes through the same mapping.
    /// `transition` is written on both sides of each inner join between two
    /// kept ranges; `filter` is set on every kept video piece. Returns the
    /// number of ranges kept after merging.
    pub fn keep_only_ranges(
        &mut self,
        ranges:     &[TimeRange],
        transition: Option<TransitionKind>,
        filter:     Option<Filter>,
        cfg:        &EditorConfig,
    ) -> usize {
        let merged = normalize_ranges(ranges);
        if merged.is_empty() {
            return 0;
        }

        let mut based = Vec::with_capacity(merged.len());
        let mut base = 0.0;
        for r in &merged {
            based.push((*r, base));
            base += r.len();
        }

        let mut clips = Vec::new();
        for c in &self.clips {
            let pieces = map_through_ranges(c.timeline_start, c.end(), &based);
            let last = pieces.len().saturating_sub(1);
            for (i, (start, dur, cut)) in pieces.into_iter().enumerate() {
                let mut p = c.clone();
                if i > 0 {
                    p.id = Uuid::new_v4();
                }
                p.timeline_start    = start;
                p.timeline_duration = dur;
                p.source_offset     = c.source_offset + cut;
                if cut > 1e-9 {
                    p.transition_in = None;
                }
                if i < last || cut + dur < c.timeline_duration - 1e-9 {
                    p.transition_out = None;
                }
                if let Some(f) = &filter {
                    p.filter = f.clone();
                }
                clips.push(p);
            }
        }

        let mut audio = Vec::new();
        for a in &self.audio_clips {
            for (i, (start, dur, cut)) in map_through_ranges(a.timeline_start, a.end(), &based).into_iter().enumerate() {
                let mut p = a.clone();
                if i > 0 {
                    p.id = Uuid::new_v4();
                }
                p.timeline_start    = start;
                p.timeline_duration = dur;
                p.source_offset     = a.source_offset + cut;
                audio.push(p);
            }
        }

        let mut cues = Vec::new();
        for s in &self.subtitles {
            for (i, (start, dur, _)) in map_through_ranges(s.timeline_start, s.end(), &based).into_iter().enumerate() {
                let mut p = s.clone();
                if i > 0 {
                    p.id = Uuid::new_v4();
                }
                p.timeline_start    = start;
                p.timeline_duration = dur;
                cues.push(p);
            }
        }

        self.clips       = clips;
        self.audio_clips = audio;
        self.subtitles   = cues;
        sort_by_start(&mut self.clips);
        sort_by_start(&mut self.audio_clips);
        sort_by_start(&mut self.subtitles);
        interval::cascade_forward(&mut self.clips);
        interval::cascade_forward(&mut self.audio_clips);

        if let Some(kind) = transition {
            let eps = cfg.boundary_epsilon;
            let joins: Vec<f64> = based.iter().skip(1).map(|(_, b)| *b).collect();
            for c in &mut self.clips {
                if joins.iter().any(|j| (c.end() - j).abs() <= eps) {
                    c.transition_out = Some(kind);
                }
                if joins.iter().any(|j| (c.timeline_start - j).abs() <= eps) {
                    c.transition_in = Some(kind);
                }
            }
        }

        debug!("[store] kept {} range(s), new length {base:.3}", merged.len());
        merged.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterPreset;
    use crate::helpers::interval::is_non_overlapping;
    use crate::state::{AudioKind, ClipKind, MediaRef};

    fn cfg() -> EditorConfig {
        EditorConfig::default()
    }

    fn video(start: f64, duration: f64) -> Clip {
        Clip::new(ClipKind::Video, MediaRef::new("v.mp4"), start, duration)
    }

    fn timeline_with(spans: &[(f64, f64)]) -> (Timeline, Vec<Uuid>) {
        let mut tl = Timeline::default();
        let ids = spans.iter().map(|&(s, d)| {
            let c = video(s, d);
            let id = c.id;
            tl.clips.push(c);
            id
        }).collect();
        (tl, ids)
    }

    #[test]
    fn add_clip_defaults_to_track_end() {
        let (mut tl, _) = timeline_with(&[(0.0, 4.0)]);
        let id = tl.add_clip(video(0.0, 3.0), None, &cfg()).unwrap();
        assert_eq!(tl.clip(id).unwrap().timeline_start, 4.0);
    }

    #[test]
    fn add_clip_rejects_unprobed_durations() {
        let mut tl = Timeline::default();
        assert!(tl.add_clip(video(0.0, f64::NAN), None, &cfg()).is_none());
        assert!(tl.add_clip(video(0.0, 0.0), None, &cfg()).is_none());
        assert!(tl.add_clip(video(0.0, -2.0), None, &cfg()).is_none());
        assert!(tl.clips.is_empty());
    }

    #[test]
    fn add_clip_into_occupied_space_ripples() {
        let (mut tl, _) = timeline_with(&[(0.0, 5.0)]);
        tl.add_clip(video(0.0, 2.0), Some(3.0), &cfg()).unwrap();
        assert!(is_non_overlapping(&tl.clips));
        assert_eq!(tl.clips[1].timeline_start, 5.0);
    }

    #[test]
    fn trim_left_moves_start_and_offset() {
        let (mut tl, _) = timeline_with(&[(2.0, 8.0)]);
        assert_eq!(tl.trim_left(5.0, None, &cfg()), 1);
        let c = &tl.clips[0];
        assert_eq!((c.timeline_start, c.timeline_duration, c.source_offset), (5.0, 5.0, 3.0));
    }

    #[test]
    fn trim_left_clamps_to_floor() {
        let (mut tl, _) = timeline_with(&[(0.0, 3.0)]);
        tl.trim_left(2.9, None, &cfg());
        let c = &tl.clips[0];
        assert!((c.timeline_duration - 1.0).abs() < 1e-12);
        assert!((c.timeline_start - 2.0).abs() < 1e-12);
        assert!((c.source_offset - 2.0).abs() < 1e-12);
    }

    #[test]
    fn trim_right_only_shortens() {
        let (mut tl, _) = timeline_with(&[(2.0, 8.0)]);
        tl.trim_right(6.0, None, &cfg());
        let c = &tl.clips[0];
        assert_eq!((c.timeline_start, c.timeline_duration, c.source_offset), (2.0, 4.0, 0.0));
        tl.trim_right(2.2, None, &cfg());
        assert_eq!(tl.clips[0].timeline_duration, 1.0);
    }

    #[test]
    fn trim_ignores_boundary_playhead() {
        let (mut tl, _) = timeline_with(&[(0.0, 5.0), (5.0, 5.0)]);
        assert_eq!(tl.trim_right(5.005, None, &cfg()), 0);
        assert_eq!(tl.trim_left(5.0, None, &cfg()), 0);
    }

    #[test]
    fn clip_under_floor_is_not_trimmed() {
        let (mut tl, _) = timeline_with(&[(0.0, 0.8)]);
        assert_eq!(tl.trim_right(0.4, None, &cfg()), 0);
        assert_eq!(tl.clips[0].timeline_duration, 0.8);
    }

    #[test]
    fn trim_clip_respects_floor_on_both_ends() {
        let (mut tl, ids) = timeline_with(&[(0.0, 4.0)]);
        assert!(tl.trim_clip(ids[0], 1.0, 10.0, &cfg()));
        let c = &tl.clips[0];
        assert_eq!((c.timeline_start, c.timeline_duration, c.source_offset), (1.0, 1.0, 1.0));
        assert!(!tl.trim_clip(Uuid::new_v4(), 1.0, 1.0, &cfg()));
    }

    #[test]
    fn split_clears_inner_transitions() {
        let (mut tl, ids) = timeline_with(&[(0.0, 10.0)]);
        tl.set_clip_transition(ids[0], EdgeSelector::Both, Some(TransitionKind::Fade));
        assert_eq!(tl.split_at(4.0, None, &cfg()), 1);
        let (l, r) = (&tl.clips[0], &tl.clips[1]);
        assert_eq!(l.id, ids[0]);
        assert_eq!((l.timeline_start, l.timeline_duration, l.source_offset), (0.0, 4.0, 0.0));
        assert_eq!((r.timeline_start, r.timeline_duration, r.source_offset), (4.0, 6.0, 4.0));
        assert_eq!(l.transition_in, Some(TransitionKind::Fade));
        assert_eq!(l.transition_out, None);
        assert_eq!(r.transition_in, None);
        assert_eq!(r.transition_out, Some(TransitionKind::Fade));
    }

    #[test]
    fn split_covers_the_audio_track() {
        let mut tl = Timeline::default();
        tl.audio_clips.push(AudioClip::new(AudioKind::Music, MediaRef::new("m.mp3"), 0.0, 6.0));
        assert_eq!(tl.split_at(2.0, None, &cfg()), 1);
        assert_eq!(tl.audio_clips.len(), 2);
        assert_eq!(tl.audio_clips[1].source_offset, 2.0);
    }

    #[test]
    fn targeted_split_leaves_others_alone() {
        let mut tl = Timeline::default();
        let v = video(0.0, 10.0);
        let vid = v.id;
        tl.clips.push(v);
        tl.audio_clips.push(AudioClip::new(AudioKind::Music, MediaRef::new("m.mp3"), 0.0, 10.0));
        assert_eq!(tl.split_at(5.0, Some(vid), &cfg()), 1);
        assert_eq!(tl.clips.len(), 2);
        assert_eq!(tl.audio_clips.len(), 1);
    }

    #[test]
    fn delete_leaves_a_gap() {
        let (mut tl, ids) = timeline_with(&[(0.0, 5.0), (5.0, 5.0), (10.0, 5.0)]);
        assert_eq!(tl.delete_at(7.0, &cfg()), 1);
        assert_eq!(tl.clips.len(), 2);
        assert_eq!(tl.clips[1].id, ids[2]);
        assert_eq!(tl.clips[1].timeline_start, 10.0);
    }

    #[test]
    fn boundary_transitions_only_touch_adjacent_clips() {
        let (mut tl, _) = timeline_with(&[(0.0, 5.0), (5.0, 5.0), (12.0, 3.0)]);
        let n = tl.set_boundary_transitions(EdgeSelector::Both, Some(TransitionKind::ZoomIn), &cfg());
        assert_eq!(n, 1);
        assert_eq!(tl.clips[0].transition_out, Some(TransitionKind::ZoomIn));
        assert_eq!(tl.clips[1].transition_in, Some(TransitionKind::ZoomIn));
        assert_eq!(tl.clips[1].transition_out, None);
        assert_eq!(tl.clips[2].transition_in, None);
    }

    #[test]
    fn duration_has_a_floor() {
        let mut tl = Timeline::default();
        assert_eq!(tl.recalculate_duration(&cfg()), 10.0);
        tl.audio_clips.push(AudioClip::new(AudioKind::Music, MediaRef::new("m.mp3"), 8.0, 7.0));
        assert_eq!(tl.recalculate_duration(&cfg()), 15.0);
    }

    #[test]
    fn toggle_mute_and_volume() {
        let mut tl = Timeline::default();
        let a = AudioClip::new(AudioKind::Voiceover, MediaRef::new("vo.wav"), 0.0, 2.0);
        let id = a.id;
        tl.audio_clips.push(a);
        assert_eq!(tl.toggle_mute(id), Some(true));
        assert!(tl.set_clip_volume(id, 4.0));
        assert_eq!(tl.audio_clip(id).unwrap().volume, 1.0);
        assert_eq!(tl.toggle_mute(Uuid::new_v4()), None);
    }

    #[test]
    fn ranges_merge_and_drop_empties() {
        let r = normalize_ranges(&[
            TimeRange { start: 5.0, end: 8.0 },
            TimeRange { start: 1.0, end: 3.0 },
            TimeRange { start: 2.0, end: 4.0 },
            TimeRange { start: 9.0, end: 9.0 },
        ]);
        assert_eq!(r, vec![TimeRange { start: 1.0, end: 4.0 }, TimeRange { start: 5.0, end: 8.0 }]);
    }

    #[test]
    fn keep_only_ranges_packs_pieces_from_zero() {
        let (mut tl, _) = timeline_with(&[(0.0, 10.0), (10.0, 10.0)]);
        tl.subtitles.push(Subtitle::new("hi", 12.0, 2.0));
        let kept = tl.keep_only_ranges(
            &[TimeRange { start: 2.0, end: 4.0 }, TimeRange { start: 11.0, end: 15.0 }],
            Some(TransitionKind::Fade),
            Some(Filter::Preset(FilterPreset::Warm)),
            &cfg(),
        );
        assert_eq!(kept, 2);
        assert_eq!(tl.clips.len(), 2);
        let (a, b) = (&tl.clips[0], &tl.clips[1]);
        assert_eq!((a.timeline_start, a.timeline_duration, a.source_offset), (0.0, 2.0, 2.0));
        assert_eq!((b.timeline_start, b.timeline_duration, b.source_offset), (2.0, 4.0, 1.0));
        assert_eq!(a.transition_out, Some(TransitionKind::Fade));
        assert_eq!(b.transition_in, Some(TransitionKind::Fade));
        assert_eq!(a.transition_in, None);
        assert_eq!(b.filter, Filter::Preset(FilterPreset::Warm));
        assert_eq!(tl.subtitles[0].timeline_start, 3.0);
        assert_eq!(tl.subtitles[0].timeline_duration, 2.0);
    }

    #[test]
    fn keep_only_with_no_ranges_is_noop() {
        let (mut tl, _) = timeline_with(&[(0.0, 10.0)]);
        let before = tl.snapshot();
        assert_eq!(tl.keep_only_ranges(&[], None, None, &cfg()), 0);
        assert_eq!(tl.snapshot(), before);
    }
}
