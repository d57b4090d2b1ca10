// crates/lumina-app/src/app.rs
//
// LuminaApp: the headless shell around one EditorSession.
//
// Responsibilities, in tick order:
//   1. poll_media      : drain MediaWorker results into the session
//   2. process_actions : apply queued EditActions (UI or interpreter origin)
//   3. tick            : advance the playback clock / export
//
// The session sits behind `SharedSession` so a presenter thread can read
// frame parameters while this loop owns the writes. Every write takes the
// lock for one whole operation; readers never see a half-applied edit.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use lumina_core::export::{ExportController, ExportReport, ExportRequest};
use lumina_core::filters::FilterPreset;
use lumina_core::helpers::time::{format_duration, format_time};
use lumina_core::transitions;
use lumina_core::{
    ActionOutcome, EditAction, EditorConfig, EditorSession, FrameParams, MediaKind, MediaRef, ProbeError, Project,
};
use lumina_media::{MediaResult, MediaWorker};

use crate::capture::{DescriptorCapture, FileSink};

pub type SharedSession = Arc<Mutex<EditorSession>>;

/// Printed on stdout at the end of a run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub clips:          usize,
    pub audio_clips:    usize,
    pub subtitles:      usize,
    pub total_duration: f64,
    pub outcomes:       Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export:         Option<String>,
}

/// Names the action vocabulary accepts for `set_transition` / `apply_filter`.
#[derive(Debug, Serialize)]
pub struct EffectCatalog {
    pub transitions: Vec<TransitionEntry>,
    pub filters:     Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct TransitionEntry {
    pub name:  &'static str,
    pub label: &'static str,
}

pub fn effect_catalog() -> EffectCatalog {
    EffectCatalog {
        transitions: transitions::registered()
            .iter()
            .map(|t| TransitionEntry { name: t.kind().name(), label: t.label() })
            .collect(),
        filters: FilterPreset::ALL.iter().map(|f| f.name()).collect(),
    }
}

pub struct LuminaApp {
    session: SharedSession,
    worker:  MediaWorker,
    /// Imports not yet on the timeline, in request order.
    queue:   VecDeque<(Uuid, MediaRef)>,
    /// Finished probes waiting for an earlier request to land first.
    ready:   HashMap<Uuid, (MediaKind, Result<f64, ProbeError>)>,
    out_dir: PathBuf,
    outcomes: Vec<ActionOutcome>,
}

impl LuminaApp {
    pub fn new(config: EditorConfig, worker: MediaWorker, out_dir: impl Into<PathBuf>) -> Self {
        let out_dir = out_dir.into();
        let mut session = EditorSession::new(config);
        session.attach_export(ExportController::new(
            Box::new(DescriptorCapture::new()),
            None,
            Box::new(FileSink::new(out_dir.clone())),
        ));
        Self {
            session: Arc::new(Mutex::new(session)),
            worker,
            queue:   VecDeque::new(),
            ready:   HashMap::new(),
            out_dir,
            outcomes: Vec::new(),
        }
    }

    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    // ── Project I/O ───────────────────────────────────────────────────────────

    pub fn load_project(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).with_context(|| format!("reading project {}", path.display()))?;
        let project: Project =
            serde_json::from_str(&text).with_context(|| format!("parsing project {}", path.display()))?;
        self.session.lock().load_project(project);
        Ok(())
    }

    pub fn save_project(&self, path: &Path) -> Result<()> {
        let project = self.session.lock().project();
        let text = serde_json::to_string_pretty(&project)?;
        fs::write(path, text).with_context(|| format!("writing project {}", path.display()))?;
        info!("[app] project saved → {}", path.display());
        Ok(())
    }

    // ── Media ─────────────────────────────────────────────────────────────────

    /// Queue files for probing. Clips appear once their probe reports back,
    /// laid out in the order the files were given.
    pub fn import(&mut self, paths: &[PathBuf]) {
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            let media = MediaRef::new(name);
            self.worker.probe(media.id, path.clone());
            self.queue.push_back((media.id, media));
        }
    }

    pub fn pending_imports(&self) -> usize {
        self.queue.len()
    }

    /// Drain finished probes into the session. Returns the new clip ids.
    /// A probe that finishes early waits until every earlier import is in.
    pub fn poll_media(&mut self) -> Vec<Uuid> {
        for result in self.worker.poll() {
            match result {
                MediaResult::Probed { id, path, kind, outcome } => {
                    if self.queue.iter().any(|(q, _)| *q == id) {
                        self.ready.insert(id, (kind, outcome));
                    } else {
                        warn!("[import] unexpected probe result for {}", path.display());
                    }
                }
            }
        }
        self.place_ready(false)
    }

    /// Poll until every queued probe has reported or `timeout` passes. On
    /// timeout, finished imports are placed behind the ones still stuck.
    pub fn wait_for_imports(&mut self, timeout: Duration) -> Vec<Uuid> {
        let deadline = Instant::now() + timeout;
        let step = self.session.lock().config().tick_interval();
        let mut added = self.poll_media();
        while !self.queue.is_empty() && Instant::now() < deadline {
            std::thread::sleep(step);
            added.extend(self.poll_media());
        }
        if !self.queue.is_empty() {
            added.extend(self.place_ready(true));
            warn!("[import] {} probe(s) still pending after {timeout:?}", self.queue.len());
        }
        added
    }

    /// Insert finished probes in request order, stopping at the first one
    /// still in flight. With `skip_stuck`, in-flight requests are passed over
    /// and stay queued.
    fn place_ready(&mut self, skip_stuck: bool) -> Vec<Uuid> {
        let mut added = Vec::new();
        let mut stuck = VecDeque::new();
        while let Some((id, media)) = self.queue.pop_front() {
            match self.ready.remove(&id) {
                Some((kind, outcome)) => {
                    if let Some(clip) = self.session.lock().import_probed(media, kind, outcome, None) {
                        added.push(clip);
                    }
                }
                None if skip_stuck => stuck.push_back((id, media)),
                None => {
                    self.queue.push_front((id, media));
                    break;
                }
            }
        }
        stuck.append(&mut self.queue);
        self.queue = stuck;
        added
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    pub fn process_actions(&mut self, actions: Vec<EditAction>) -> Vec<ActionOutcome> {
        let outcomes = self.session.lock().apply_all(actions);
        self.outcomes.extend(outcomes.iter().cloned());
        outcomes
    }

    /// Parse and apply a batch from disk (`{"actions": [...]}` or an array).
    pub fn process_action_file(&mut self, path: &Path) -> Result<Vec<ActionOutcome>> {
        let text = fs::read_to_string(path).with_context(|| format!("reading actions {}", path.display()))?;
        let actions = EditAction::parse_batch(&text).with_context(|| format!("parsing actions {}", path.display()))?;
        info!("[actions] {} action(s) from {}", actions.len(), path.display());
        Ok(self.process_actions(actions))
    }

    // ── Playback / export ─────────────────────────────────────────────────────

    /// The frame a presenter would paint at `t`. Moves the playhead.
    pub fn frame_at(&mut self, t: f64) -> FrameParams {
        let mut s = self.session.lock();
        s.apply(EditAction::SeekTo { timestamp: t });
        s.frame_params()
    }

    /// Render the whole timeline. The clock runs on simulated time at the
    /// configured tick rate, so a 60 s timeline does not take 60 s.
    pub fn run_export(&mut self, format: &str, file_stem: &str) -> Result<ExportReport> {
        let mut s = self.session.lock();
        let request = ExportRequest { format: format.to_string(), file_stem: file_stem.to_string() };
        s.start_export(request)?;

        let dt = s.config().tick_interval();
        let rate = s.playback().playback_rate.max(f64::EPSILON);
        let needed = s.total_duration() / rate / dt.as_secs_f64();
        let max_ticks = needed.ceil() as u64 + 2;

        for _ in 0..max_ticks {
            if let Some(report) = s.tick(dt).export {
                return Ok(report);
            }
        }
        s.cancel_export()?;
        bail!("export did not finish within {max_ticks} ticks")
    }

    pub fn summary(&self, export: Option<&ExportReport>) -> RunSummary {
        let s = self.session.lock();
        let tl = s.timeline();
        RunSummary {
            clips:          tl.clips.len(),
            audio_clips:    tl.audio_clips.len(),
            subtitles:      tl.subtitles.len(),
            total_duration: tl.total_duration,
            outcomes:       self.outcomes.iter().map(|o| format!("{o:?}")).collect(),
            export:         export.map(|r| self.describe_export(r)),
        }
    }

    fn describe_export(&self, report: &ExportReport) -> String {
        match report {
            ExportReport::Delivered { file_name, bytes, fallback: None, .. } => {
                format!("{} ({bytes} bytes)", self.out_dir.join(file_name).display())
            }
            ExportReport::Delivered { file_name, bytes, fallback: Some(e), .. } => {
                format!("{} ({bytes} bytes, raw capture: {e})", self.out_dir.join(file_name).display())
            }
            ExportReport::Failed(e) => format!("failed: {e}"),
        }
    }

    pub fn log_state(&self) {
        let s = self.session.lock();
        info!(
            "[app] {} clip(s), {} audio, {} cue(s), {} long, playhead {}",
            s.timeline().clips.len(),
            s.timeline().audio_clips.len(),
            s.timeline().subtitles.len(),
            format_duration(s.total_duration()),
            format_time(s.playback().current_time),
        );
    }

    pub fn shutdown(&self) {
        self.worker.shutdown();
    }
}
