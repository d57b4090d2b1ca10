// End-to-end editing scenarios against the public API.

use std::time::Duration;

use lumina_core::export::{Artifact, ExportController, ExportPhase, ExportRequest, ExportSink, FrameCapture};
use lumina_core::{
    Clip, ClipKind, EditAction, EditorConfig, EditorSession, ExportError, FrameParams, MediaKind, MediaRef,
    Timeline,
};

fn cfg() -> EditorConfig {
    EditorConfig::default()
}

fn clip(start: f64, duration: f64, offset: f64) -> Clip {
    let mut c = Clip::new(ClipKind::Video, MediaRef::new("take.mp4"), start, duration);
    c.source_offset = offset;
    c
}

fn timeline(clips: Vec<Clip>) -> Timeline {
    let mut tl = Timeline { clips, ..Timeline::default() };
    tl.recalculate_duration(&cfg());
    tl
}

fn spans(tl: &Timeline) -> Vec<(f64, f64, f64)> {
    tl.clips
        .iter()
        .map(|c| (c.timeline_start, c.timeline_duration, c.source_offset))
        .collect()
}

#[test]
fn split_at_playhead_yields_two_contiguous_pieces() {
    let mut tl = timeline(vec![clip(0.0, 10.0, 0.0)]);
    let original = tl.clips[0].id;
    assert_eq!(tl.split_at(4.0, None, &cfg()), 1);
    assert_eq!(spans(&tl), vec![(0.0, 4.0, 0.0), (4.0, 6.0, 4.0)]);
    assert_eq!(tl.clips[0].id, original);
    assert_ne!(tl.clips[1].id, original);
}

#[test]
fn move_into_occupied_span_ripples_to_previous_end() {
    let mut tl = timeline(vec![clip(0.0, 5.0, 0.0), clip(5.0, 5.0, 0.0)]);
    let b = tl.clips[1].id;
    assert!(tl.move_clip(b, 2.0, &cfg()));
    assert_eq!(tl.clip(b).map(|c| c.timeline_start), Some(5.0));
}

#[test]
fn trim_left_moves_start_and_offset_together() {
    let mut tl = timeline(vec![clip(2.0, 8.0, 0.0)]);
    assert_eq!(tl.trim_left(5.0, None, &cfg()), 1);
    assert_eq!(spans(&tl), vec![(5.0, 5.0, 3.0)]);
}

#[test]
fn empty_timeline_floors_duration() {
    let mut tl = Timeline::default();
    assert_eq!(tl.recalculate_duration(&cfg()), 10.0);
    assert_eq!(EditorSession::default().total_duration(), 10.0);
}

#[test]
fn delete_leaves_a_gap() {
    let mut s = EditorSession::default();
    for _ in 0..3 {
        s.import_probed(MediaRef::new("part.mp4"), MediaKind::Video, Ok(4.0), None);
    }
    let before: Vec<f64> = s.timeline().clips.iter().map(|c| c.timeline_start).collect();
    assert_eq!(before, vec![0.0, 4.0, 8.0]);

    s.apply(EditAction::SeekTo { timestamp: 6.0 });
    assert!(s.apply(EditAction::DeleteAtPlayhead {}).is_applied());

    let after: Vec<f64> = s.timeline().clips.iter().map(|c| c.timeline_start).collect();
    assert_eq!(after, vec![0.0, 8.0]);
    assert_eq!(s.total_duration(), 12.0);
}

// ── Export ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct CountingCapture {
    times: Vec<f64>,
}

impl FrameCapture for CountingCapture {
    fn format(&self) -> &str { "jsonl" }
    fn begin(&mut self) -> Result<(), ExportError> {
        self.times.clear();
        Ok(())
    }
    fn push(&mut self, frame: &FrameParams) -> Result<(), ExportError> {
        self.times.push(frame.time);
        Ok(())
    }
    fn stop(&mut self) -> Result<Vec<u8>, ExportError> {
        Ok(self.times.iter().map(|t| format!("{t}\n")).collect::<String>().into_bytes())
    }
    fn discard(&mut self) {
        self.times.clear();
    }
}

struct NullSink;

impl ExportSink for NullSink {
    fn deliver(&mut self, _: Artifact) -> Result<(), ExportError> {
        Ok(())
    }
}

#[test]
fn export_finalizes_exactly_once() {
    let mut s = EditorSession::default();
    s.import_probed(MediaRef::new("long.mp4"), MediaKind::Video, Ok(12.0), None);
    s.apply(EditAction::SeekTo { timestamp: 7.0 });
    s.attach_export(ExportController::new(Box::new(CountingCapture::default()), None, Box::new(NullSink)));

    let request = ExportRequest { format: "jsonl".into(), file_stem: "cut".into() };
    s.start_export(request.clone()).unwrap();
    assert_eq!(s.playback().current_time, 0.0);
    assert_eq!(s.start_export(request.clone()), Err(ExportError::AlreadyRunning));

    let mut phases = vec![s.export_phase()];
    let mut finished = 0;
    for _ in 0..1000 {
        let r = s.tick(Duration::from_millis(16));
        if r.export.is_some() {
            finished += 1;
        }
        if phases.last() != Some(&s.export_phase()) {
            phases.push(s.export_phase());
        }
    }

    assert_eq!(finished, 1);
    assert_eq!(phases, vec![ExportPhase::Rendering, ExportPhase::Idle]);
    assert_eq!(s.playback().current_time, 12.0);

    // Only an explicit start re-enters Rendering.
    s.start_export(request).unwrap();
    assert_eq!(s.export_phase(), ExportPhase::Rendering);
}

#[test]
fn interpreter_batch_applies_in_order() {
    let mut s = EditorSession::default();
    let id = s
        .import_probed(MediaRef::new("talk.mp4"), MediaKind::Video, Ok(20.0), None)
        .unwrap();
    let json = format!(
        r#"{{"actions": [
            {{"action": "split_clip", "parameters": {{"timestamp": "8"}}}},
            {{"action": "set_transition", "parameters": {{"value": "fade"}}}},
            {{"action": "apply_filter", "parameters": {{"value": "sepia", "targetClipId": "{id}"}}}},
            {{"action": "teleport", "parameters": {{}}}},
            {{"action": "set_speed", "parameters": {{"value": 9}}}}
        ]}}"#
    );
    let actions = EditAction::parse_batch(&json).unwrap();
    assert_eq!(actions.len(), 4);
    let outcomes = s.apply_all(actions);
    assert!(outcomes.iter().all(|o| o.is_applied()), "{outcomes:?}");

    let clips = &s.timeline().clips;
    assert_eq!(clips.len(), 2);
    assert!(clips[0].transition_out.is_some());
    assert!(clips[1].transition_in.is_some());
    assert_eq!(clips[0].filter.label(), "sepia");
    assert_eq!(s.playback().playback_rate, 3.0);
}
