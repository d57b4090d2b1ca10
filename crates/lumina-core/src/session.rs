// crates/lumina-core/src/session.rs
//
// EditorSession: the one owned aggregate behind every editor surface.
//
// It holds the Timeline, PlaybackState, undo History, the PlaybackClock and
// (optionally) an ExportController. Every mutation goes through a session
// method; there is no other path to the data, so Resolver reads and edits can
// never interleave mid-mutation.
//
// Per call:
//   apply(action)  : one EditAction from any origin. Snapshot is taken
//                     before, pushed only if the timeline actually changed.
//   tick(dt)       : advance the clock, resolve the frame, feed the export.
//   begin/drag/end/cancel_gesture: throttled drag edits, one undo entry each.
//
// After any structural change `refresh()` recomputes total_duration and
// clamps the playhead into it.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audio_mix::{resolve_mix, MixEntry};
use crate::clock::{PlaybackClock, TickOutcome};
use crate::commands::{parse_clip_ref, ActionOutcome, ClipRef, EditAction};
use crate::config::EditorConfig;
use crate::drag::DragThrottle;
use crate::effects::{compose, VisualOutput};
use crate::error::{ExportError, ProbeError};
use crate::export::{ExportController, ExportPhase, ExportReport, ExportRequest};
use crate::filters::Filter;
use crate::helpers::interval::contains_strict;
use crate::history::History;
use crate::resolver::{active_subtitle, active_video};
use crate::state::{
    AudioClip, AudioKind, Clip, ClipKind, MediaKind, MediaRef, PlaybackState, Timeline, TimelineSnapshot,
};
use crate::subtitles::cleanup_cues;
use crate::timeline::is_valid_duration;
use crate::transitions::TransitionKind;

// ── Per-tick output ───────────────────────────────────────────────────────────

/// The active video clip as the presenter needs it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VideoRef {
    pub clip_id:     Uuid,
    pub media:       MediaRef,
    pub kind:        ClipKind,
    /// Seconds into the source.
    pub seek_offset: f64,
}

/// Everything a presenter (or the export capture) needs for one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FrameParams {
    pub time:     f64,
    /// `None` in a gap: show the idle state.
    pub video:    Option<VideoRef>,
    pub visual:   VisualOutput,
    pub audio:    Vec<MixEntry>,
    pub subtitle: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickResult {
    pub frame:   FrameParams,
    pub clock:   TickOutcome,
    /// Set on the tick an export finishes (delivered or failed).
    pub export:  Option<ExportReport>,
}

/// Serialized project: the timeline plus global playback parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub timeline: Timeline,
    #[serde(default)]
    pub playback: PlaybackState,
}

// ── Gestures ──────────────────────────────────────────────────────────────────

/// What a drag gesture edits. The dragged value is a timeline time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    MoveClip(Uuid),
    MoveAudioClip(Uuid),
    TrimLeft(Uuid),
    TrimRight(Uuid),
}

#[derive(Debug)]
struct Gesture {
    kind:     GestureKind,
    /// Timeline as it was on pointer-down; goes to history only if the drag
    /// changed something.
    before:   TimelineSnapshot,
    throttle: DragThrottle<f64>,
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct EditorSession {
    timeline: Timeline,
    playback: PlaybackState,
    history:  History,
    config:   EditorConfig,
    clock:    PlaybackClock,
    export:   Option<ExportController>,
    gesture:  Option<Gesture>,
    /// Pieces of the latest chain of targeted splits, in time order.
    /// `split_{i}` references resolve here.
    split_chain: Vec<Uuid>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        let config = config.validated();
        let mut s = Self {
            timeline: Timeline::default(),
            playback: PlaybackState::default(),
            history:  History::new(config.history_capacity),
            clock:    PlaybackClock::new(config.publish_interval()),
            export:   None,
            gesture:  None,
            split_chain: Vec::new(),
            config,
        };
        s.refresh();
        s
    }

    /// Replace the whole project (e.g. after loading from disk). History is
    /// cleared; the timeline is re-normalized.
    pub fn load_project(&mut self, project: Project) {
        let Project { mut timeline, playback } = project;
        timeline.normalize();
        self.timeline = timeline;
        self.playback = PlaybackState { is_playing: false, ..playback };
        self.playback.set_playback_rate(self.playback.playback_rate);
        self.history.clear();
        self.gesture = None;
        self.split_chain.clear();
        self.refresh();
        info!(
            "[session] loaded project: {} clip(s), {} audio, {} cue(s)",
            self.timeline.clips.len(),
            self.timeline.audio_clips.len(),
            self.timeline.subtitles.len(),
        );
    }

    pub fn project(&self) -> Project {
        Project { timeline: self.timeline.clone(), playback: self.playback.clone() }
    }

    // ── Read access ───────────────────────────────────────────────────────────

    pub fn timeline(&self) -> &Timeline { &self.timeline }
    pub fn playback(&self) -> &PlaybackState { &self.playback }
    pub fn config(&self) -> &EditorConfig { &self.config }
    pub fn total_duration(&self) -> f64 { self.timeline.total_duration }
    pub fn can_undo(&self) -> bool { self.history.can_undo() }
    pub fn can_redo(&self) -> bool { self.history.can_redo() }

    // ── Derived state ─────────────────────────────────────────────────────────

    /// Recompute `total_duration` and clamp the playhead into it.
    pub fn refresh(&mut self) -> f64 {
        let total = self.timeline.recalculate_duration(&self.config);
        if self.playback.current_time > total {
            self.playback.current_time = total;
        }
        self.clock.mark_dirty();
        total
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    /// Apply one action from any origin.
    ///
    /// While an export is running the clock belongs to it: transport and
    /// timeline edits are refused until it finishes or is cancelled.
    pub fn apply(&mut self, action: EditAction) -> ActionOutcome {
        let name = action.name();
        if self.export_phase() != ExportPhase::Idle && interrupts_export(&action) {
            warn!("[session] {name}: export in progress");
            return ActionOutcome::Invalid("export in progress".into());
        }
        if action.is_timeline_edit() {
            self.end_gesture();
        }
        let before = action.is_timeline_edit().then(|| self.timeline.snapshot());
        let outcome = self.dispatch(action);

        if let Some(before) = before {
            if self.timeline.snapshot() != before {
                self.history.push(before);
            }
            self.refresh();
        }

        match &outcome {
            ActionOutcome::Applied   => debug!("[session] {name} applied"),
            ActionOutcome::Unchanged => debug!("[session] {name}: nothing to change"),
            ActionOutcome::NoTarget  => warn!("[session] {name}: target clip not found"),
            ActionOutcome::Invalid(m) => warn!("[session] {name}: {m}"),
        }
        outcome
    }

    /// Apply a batch in order; returns one outcome per action.
    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = EditAction>) -> Vec<ActionOutcome> {
        actions.into_iter().map(|a| self.apply(a)).collect()
    }

    fn dispatch(&mut self, action: EditAction) -> ActionOutcome {
        let cfg = &self.config;
        let total = self.timeline.total_duration;

        match action {
            EditAction::SeekTo { timestamp } => {
                self.clock.seek(&mut self.playback, timestamp, total);
                ActionOutcome::Applied
            }

            EditAction::ApplyFilter { value, target_clip_id } => {
                self.set_filter(Filter::parse(&value), target_clip_id.as_deref())
            }
            EditAction::SetCustomFilter { value, target_clip_id } => {
                let raw = value.trim();
                let filter = if raw.is_empty() { Filter::None } else { Filter::Custom(raw.to_string()) };
                self.set_filter(filter, target_clip_id.as_deref())
            }

            EditAction::SetTransition { value, target_clip_id, edge } => {
                let kind = match TransitionKind::parse(&value) {
                    Ok(k) => k,
                    Err(e) => return ActionOutcome::Invalid(e.to_string()),
                };
                match target_clip_id {
                    Some(r) => match self.resolve_ref(&r) {
                        Some(id) => ActionOutcome::from_found(self.timeline.set_clip_transition(id, edge, kind)),
                        None => ActionOutcome::NoTarget,
                    },
                    None => ActionOutcome::from_count(self.timeline.set_boundary_transitions(edge, kind, cfg)),
                }
            }

            EditAction::TrimClip { target_clip_id, start_offset, end_offset } => {
                match self.resolve_ref(&target_clip_id) {
                    Some(id) => ActionOutcome::from_found(self.timeline.trim_clip(id, start_offset, end_offset, cfg)),
                    None => ActionOutcome::NoTarget,
                }
            }

            EditAction::SplitClip { timestamp, target_clip_id } => match target_clip_id {
                Some(r) => match self.resolve_ref(&r).filter(|id| self.timeline.contains_id(*id)) {
                    Some(id) => self.split_targeted(id, timestamp),
                    None => ActionOutcome::NoTarget,
                },
                None => ActionOutcome::from_count(self.timeline.split_at(timestamp, None, cfg)),
            },

            EditAction::RemoveClip { target_clip_id } => match self.resolve_ref(&target_clip_id) {
                Some(id) => ActionOutcome::from_found(self.timeline.remove(id)),
                None => ActionOutcome::NoTarget,
            },

            EditAction::SetSpeed { value } => {
                self.playback.set_playback_rate(value);
                ActionOutcome::Applied
            }
            EditAction::SetVolume { value } => {
                self.playback.set_volume(value as f32);
                ActionOutcome::Applied
            }

            EditAction::KeepOnlyHighlights { ranges, transition, filter } => {
                let transition = match transition.as_deref().map(TransitionKind::parse).transpose() {
                    Ok(t) => t.flatten(),
                    Err(e) => return ActionOutcome::Invalid(e.to_string()),
                };
                let filter = filter.as_deref().map(Filter::parse);
                ActionOutcome::from_count(self.timeline.keep_only_ranges(&ranges, transition, filter, cfg))
            }

            EditAction::AddSubtitles { cues } => {
                if cues.is_empty() {
                    return ActionOutcome::Unchanged;
                }
                self.timeline.subtitles = cleanup_cues(&cues);
                ActionOutcome::Applied
            }

            EditAction::MoveClip { id, start } => {
                ActionOutcome::from_found(self.timeline.move_clip(id, start, cfg))
            }
            EditAction::MoveAudioClip { id, start } => {
                ActionOutcome::from_found(self.timeline.move_audio_clip(id, start, cfg))
            }

            EditAction::TrimLeft { time, id } => {
                if id.is_some_and(|id| !self.timeline.contains_id(id)) {
                    return ActionOutcome::NoTarget;
                }
                ActionOutcome::from_count(self.timeline.trim_left(time, id, cfg))
            }
            EditAction::TrimRight { time, id } => {
                if id.is_some_and(|id| !self.timeline.contains_id(id)) {
                    return ActionOutcome::NoTarget;
                }
                ActionOutcome::from_count(self.timeline.trim_right(time, id, cfg))
            }

            EditAction::SplitAtPlayhead {} => {
                let t = self.playback.current_time;
                ActionOutcome::from_count(self.timeline.split_at(t, None, cfg))
            }
            EditAction::DeleteAtPlayhead {} => {
                let t = self.playback.current_time;
                ActionOutcome::from_count(self.timeline.delete_at(t, cfg))
            }

            EditAction::ToggleMute { id } => ActionOutcome::from_found(self.timeline.toggle_mute(id).is_some()),
            EditAction::SetClipVolume { id, volume } => {
                ActionOutcome::from_found(self.timeline.set_clip_volume(id, volume))
            }

            EditAction::SetAdjustments { brightness, contrast, saturation } => {
                self.playback.set_adjustments(brightness, contrast, saturation);
                ActionOutcome::Applied
            }
            EditAction::SetFade { fade_in, fade_out } => {
                self.playback.set_fade(fade_in, fade_out);
                ActionOutcome::Applied
            }

            EditAction::Play {} => {
                self.clock.play(&mut self.playback, total);
                ActionOutcome::Applied
            }
            EditAction::Pause {} => {
                self.clock.pause(&mut self.playback);
                ActionOutcome::Applied
            }
            EditAction::Undo {} => {
                if self.undo() { ActionOutcome::Applied } else { ActionOutcome::Unchanged }
            }
            EditAction::Redo {} => {
                if self.redo() { ActionOutcome::Applied } else { ActionOutcome::Unchanged }
            }
        }
    }

    fn set_filter(&mut self, filter: Filter, target: Option<&str>) -> ActionOutcome {
        match target {
            Some(r) => match self.resolve_ref(r) {
                Some(id) => ActionOutcome::from_found(self.timeline.set_clip_filter(id, filter)),
                None => ActionOutcome::NoTarget,
            },
            None => {
                self.playback.filter = filter;
                ActionOutcome::Applied
            }
        }
    }

    fn resolve_ref(&self, r: &str) -> Option<Uuid> {
        match parse_clip_ref(r)? {
            ClipRef::Id(id) => Some(id),
            ClipRef::SplitPiece(i) => self.split_chain.get(i).copied(),
        }
    }

    /// Split one clip at `t`. An id from the current split chain stands for
    /// the whole chain, so the interpreter can keep cutting "the" clip by the
    /// id it started with; the piece under `t` is the one split.
    fn split_targeted(&mut self, id: Uuid, t: f64) -> ActionOutcome {
        let eps = self.config.boundary_epsilon;
        let in_chain = self.split_chain.contains(&id);
        let target = if in_chain {
            let tl = &self.timeline;
            self.split_chain.iter().copied().find(|&p| {
                tl.clip(p).map(|c| contains_strict(c, t, eps))
                    .or_else(|| tl.audio_clip(p).map(|a| contains_strict(a, t, eps)))
                    .unwrap_or(false)
            })
        } else {
            Some(id)
        };
        let Some(target) = target else { return ActionOutcome::Unchanged };

        let Some(&(left, right)) = self.timeline.split_pieces(t, Some(target), &self.config).first() else {
            return ActionOutcome::Unchanged;
        };
        if !in_chain {
            self.split_chain = vec![left];
        }
        if let Some(pos) = self.split_chain.iter().position(|&p| p == left) {
            self.split_chain.insert(pos + 1, right);
        }
        ActionOutcome::Applied
    }

    // ── Undo / redo ───────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.end_gesture();
        let current = self.timeline.snapshot();
        match self.history.undo(current) {
            Some(prev) => {
                self.timeline.restore(prev);
                self.refresh();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.end_gesture();
        let current = self.timeline.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.timeline.restore(next);
                self.refresh();
                true
            }
            None => false,
        }
    }

    // ── Import ────────────────────────────────────────────────────────────────

    /// Turn a finished probe into a clip. Stills always get the configured
    /// image duration; a failed probe falls back to the configured video
    /// duration; a non-finite or non-positive result is not inserted.
    /// Audio is appended to the end of the audio track as music.
    pub fn import_probed(
        &mut self,
        media:     MediaRef,
        kind:      MediaKind,
        outcome:   Result<f64, ProbeError>,
        insert_at: Option<f64>,
    ) -> Option<Uuid> {
        let duration = match (kind, outcome) {
            (MediaKind::Image, _) => self.config.image_duration,
            (_, Ok(d)) => d,
            (_, Err(e)) => {
                warn!("[import] {}: {e}; using {:.1}s", media.name, self.config.probe_fallback_duration);
                self.config.probe_fallback_duration
            }
        };
        if !is_valid_duration(duration) {
            warn!("[import] {}: unusable duration {duration}, not inserted", media.name);
            return None;
        }

        let before = self.timeline.snapshot();
        let name = media.name.clone();
        let id = match kind {
            MediaKind::Audio => {
                let clip = AudioClip::new(AudioKind::Music, media, 0.0, duration);
                self.timeline.add_audio_clip(clip, None, &self.config)
            }
            MediaKind::Video | MediaKind::Image => {
                let ck = if kind == MediaKind::Image { ClipKind::Image } else { ClipKind::Video };
                let clip = Clip::new(ck, media, 0.0, duration);
                self.timeline.add_clip(clip, insert_at, &self.config)
            }
        }?;
        self.history.push(before);
        self.refresh();
        info!("[import] {name} → {id} ({duration:.2}s)");
        Some(id)
    }

    // ── Gestures ──────────────────────────────────────────────────────────────

    /// Start a drag. The whole drag becomes at most one undo entry, filed
    /// when it ends. An unfinished previous gesture is ended first. Refused
    /// while an export is running.
    pub fn begin_gesture(&mut self, kind: GestureKind) -> bool {
        if self.export_phase() != ExportPhase::Idle {
            warn!("[session] gesture refused: export in progress");
            return false;
        }
        self.end_gesture();
        self.gesture = Some(Gesture {
            kind,
            before:   self.timeline.snapshot(),
            throttle: DragThrottle::new(self.config.drag_throttle()),
        });
        true
    }

    /// Offer the latest drag position; applied at most once per throttle
    /// interval. Returns true if a position was applied now.
    pub fn drag_update(&mut self, value: f64, now: Instant) -> bool {
        let Some(g) = self.gesture.as_mut() else { return false };
        g.throttle.offer(value);
        let kind = g.kind;
        match g.throttle.take_due(now) {
            Some(v) => {
                self.apply_gesture_value(kind, v);
                true
            }
            None => false,
        }
    }

    /// Pointer-up: apply the last pending position and close the gesture.
    /// A drag that changed nothing leaves history (redo included) untouched.
    pub fn end_gesture(&mut self) {
        let Some(mut g) = self.gesture.take() else { return };
        if let Some(v) = g.throttle.flush() {
            self.apply_gesture_value(g.kind, v);
        }
        if g.before != self.timeline.snapshot() {
            self.history.push(g.before);
        }
        self.refresh();
    }

    /// Abandon the drag and restore the pre-gesture timeline.
    pub fn cancel_gesture(&mut self) {
        let Some(g) = self.gesture.take() else { return };
        self.timeline.restore(g.before);
        self.refresh();
    }

    fn apply_gesture_value(&mut self, kind: GestureKind, v: f64) {
        let cfg = &self.config;
        match kind {
            GestureKind::MoveClip(id)      => { self.timeline.move_clip(id, v, cfg); }
            GestureKind::MoveAudioClip(id) => { self.timeline.move_audio_clip(id, v, cfg); }
            GestureKind::TrimLeft(id)      => { self.timeline.trim_left(v, Some(id), cfg); }
            GestureKind::TrimRight(id)     => { self.timeline.trim_right(v, Some(id), cfg); }
        }
        self.refresh();
    }

    // ── Playback ──────────────────────────────────────────────────────────────

    /// The frame at the current playhead, without advancing anything.
    pub fn frame_params(&self) -> FrameParams {
        let t = self.playback.current_time;
        let active = active_video(&self.timeline, t);
        let visual = compose(&self.playback, active.as_ref(), t, self.timeline.total_duration, &self.config);
        FrameParams {
            time: t,
            video: active.map(|a| VideoRef {
                clip_id:     a.clip.id,
                media:       a.clip.media.clone(),
                kind:        a.clip.kind,
                seek_offset: a.seek_offset,
            }),
            visual,
            audio: resolve_mix(&self.timeline, &self.playback),
            subtitle: active_subtitle(&self.timeline, t).map(|s| s.text.clone()),
        }
    }

    /// One scheduling tick of wall-clock length `dt`.
    pub fn tick(&mut self, dt: Duration) -> TickResult {
        let total = self.timeline.total_duration;
        let clock = self.clock.tick(&mut self.playback, total, dt);
        let frame = self.frame_params();

        let mut export = None;
        if let Some(ctl) = self.export.as_mut() {
            match ctl.advance(&frame, total, clock.reached_end) {
                Ok(ExportPhase::Finalizing) => {
                    export = Some(ctl.finalize().unwrap_or_else(ExportReport::Failed));
                }
                Ok(_) => {}
                Err(e) => {
                    self.playback.is_playing = false;
                    export = Some(ExportReport::Failed(e));
                }
            }
        }
        TickResult { frame, clock, export }
    }

    // ── Export ────────────────────────────────────────────────────────────────

    pub fn attach_export(&mut self, controller: ExportController) {
        self.export = Some(controller);
    }

    pub fn export_phase(&self) -> ExportPhase {
        self.export.as_ref().map_or(ExportPhase::Idle, ExportController::phase)
    }

    pub fn export_progress(&self) -> f64 {
        self.export.as_ref().map_or(0.0, ExportController::progress)
    }

    /// Idle → Rendering; the frame at 0 is captured immediately.
    pub fn start_export(&mut self, request: ExportRequest) -> Result<(), ExportError> {
        if self.export.is_none() {
            return Err(ExportError::Unavailable);
        }
        if self.export_phase() == ExportPhase::Idle {
            self.end_gesture();
        }
        let total = self.refresh();
        let ctl = self.export.as_mut().ok_or(ExportError::Unavailable)?;
        ctl.start(request, &mut self.playback)?;
        let first = self.frame_params();
        let ctl = self.export.as_mut().ok_or(ExportError::Unavailable)?;
        ctl.advance(&first, total, false)?;
        Ok(())
    }

    /// Interrupt a running export; partial capture is discarded.
    pub fn cancel_export(&mut self) -> Result<(), ExportError> {
        let ctl = self.export.as_mut().ok_or(ExportError::Unavailable)?;
        ctl.cancel(&mut self.playback)
    }
}

/// Actions that would move the playhead or change what is being rendered.
fn interrupts_export(action: &EditAction) -> bool {
    action.is_timeline_edit()
        || matches!(
            action,
            EditAction::SeekTo { .. }
                | EditAction::Play {}
                | EditAction::Pause {}
                | EditAction::Undo {}
                | EditAction::Redo {}
        )
}
