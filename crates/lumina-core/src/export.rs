// crates/lumina-core/src/export.rs
//
// Export / render controller.
//
// State machine:
//
//   Idle ──start()──▶ Rendering ──(clock reaches end)──▶ Finalizing ──finalize()──▶ Idle
//     ▲                   │
//     └─────cancel()──────┘   (capture discarded, nothing delivered)
//
// While Rendering, the session's playback clock drives progress: every tick's
// FrameParams is pushed into the capture, exactly as the preview painted it.
// Finalizing stops the capture and, when the requested format differs from
// the capture format, hands the bytes to a Transcoder. A transcode failure
// falls back to delivering the raw capture. Whatever happens, the controller
// ends in Idle with progress 0.
//
// Capture, transcoding and delivery are collaborator traits; the engine never
// encodes or writes anything itself.

use tracing::{info, warn};

use crate::error::ExportError;
use crate::session::FrameParams;
use crate::state::PlaybackState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Rendering,
    Finalizing,
}

/// What the caller asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRequest {
    /// Target container / codec tag, e.g. `"mp4"`.
    pub format:    String,
    /// Output name without extension.
    pub file_stem: String,
}

/// The finished product handed to the sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub format:    String,
    pub bytes:     Vec<u8>,
    pub file_name: String,
}

/// Records composited frames while Rendering.
pub trait FrameCapture: Send {
    /// Format tag of what `stop()` returns.
    fn format(&self) -> &str;
    fn begin(&mut self) -> Result<(), ExportError>;
    fn push(&mut self, frame: &FrameParams) -> Result<(), ExportError>;
    /// End capture and return the encoded bytes.
    fn stop(&mut self) -> Result<Vec<u8>, ExportError>;
    /// Throw away everything captured so far.
    fn discard(&mut self);
}

/// Converts a capture into another format.
pub trait Transcoder: Send {
    fn transcode(&mut self, bytes: &[u8], from: &str, to: &str) -> Result<Vec<u8>, ExportError>;
}

/// Receives the final artifact. The engine never persists it.
pub trait ExportSink: Send {
    fn deliver(&mut self, artifact: Artifact) -> Result<(), ExportError>;
}

/// Result of one finalize pass.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportReport {
    Delivered {
        file_name: String,
        format:    String,
        bytes:     usize,
        /// Set when the transcode failed and the raw capture went out instead.
        fallback:  Option<ExportError>,
    },
    Failed(ExportError),
}

pub struct ExportController {
    phase:      ExportPhase,
    progress:   f64,
    request:    Option<ExportRequest>,
    frames:     u64,
    capture:    Box<dyn FrameCapture>,
    transcoder: Option<Box<dyn Transcoder>>,
    sink:       Box<dyn ExportSink>,
}

impl ExportController {
    pub fn new(
        capture:    Box<dyn FrameCapture>,
        transcoder: Option<Box<dyn Transcoder>>,
        sink:       Box<dyn ExportSink>,
    ) -> Self {
        Self {
            phase: ExportPhase::Idle,
            progress: 0.0,
            request: None,
            frames: 0,
            capture,
            transcoder,
            sink,
        }
    }

    pub fn phase(&self) -> ExportPhase { self.phase }

    /// 0..1 while Rendering, 0 otherwise.
    pub fn progress(&self) -> f64 { self.progress }

    pub fn frames_captured(&self) -> u64 { self.frames }

    pub fn is_running(&self) -> bool {
        self.phase != ExportPhase::Idle
    }

    /// Idle → Rendering. Rewinds to 0 and forces playback on.
    pub fn start(&mut self, request: ExportRequest, playback: &mut PlaybackState) -> Result<(), ExportError> {
        if self.phase != ExportPhase::Idle {
            return Err(ExportError::AlreadyRunning);
        }
        self.capture.begin()?;
        info!("[export] start {}.{}", request.file_stem, request.format);
        self.request  = Some(request);
        self.phase    = ExportPhase::Rendering;
        self.progress = 0.0;
        self.frames   = 0;
        playback.current_time = 0.0;
        playback.is_playing   = true;
        Ok(())
    }

    /// Feed one rendered tick. `reached_end` comes from the clock; on that
    /// tick the controller moves to Finalizing. Returns the phase afterwards.
    ///
    /// A capture error aborts the export (discarded, back to Idle) and is
    /// returned as `Err`.
    pub fn advance(&mut self, frame: &FrameParams, total: f64, reached_end: bool) -> Result<ExportPhase, ExportError> {
        if self.phase != ExportPhase::Rendering {
            return Ok(self.phase);
        }
        if let Err(e) = self.capture.push(frame) {
            warn!("[export] capture failed at {:.3}: {e}", frame.time);
            self.abort();
            return Err(e);
        }
        self.frames += 1;
        self.progress = if total > 0.0 { (frame.time / total).clamp(0.0, 1.0) } else { 1.0 };
        if reached_end {
            info!("[export] rendering done after {} frame(s)", self.frames);
            self.phase = ExportPhase::Finalizing;
        }
        Ok(self.phase)
    }

    /// Finalizing → Idle. Delivers the transcoded artifact, or the raw capture
    /// when transcoding is unavailable or fails.
    pub fn finalize(&mut self) -> Result<ExportReport, ExportError> {
        if self.phase != ExportPhase::Finalizing {
            return Err(ExportError::NotRunning);
        }
        let report = self.run_finalize();
        self.phase    = ExportPhase::Idle;
        self.progress = 0.0;
        self.request  = None;
        match &report {
            ExportReport::Delivered { file_name, bytes, fallback, .. } => match fallback {
                Some(e) => warn!("[export] delivered raw capture {file_name} ({bytes} bytes): {e}"),
                None    => info!("[export] delivered {file_name} ({bytes} bytes)"),
            },
            ExportReport::Failed(e) => warn!("[export] finalize failed: {e}"),
        }
        Ok(report)
    }

    fn run_finalize(&mut self) -> ExportReport {
        let Some(request) = self.request.clone() else {
            return ExportReport::Failed(ExportError::NotRunning);
        };
        let raw = match self.capture.stop() {
            Ok(b) => b,
            Err(e) => return ExportReport::Failed(e),
        };
        let capture_format = self.capture.format().to_string();

        let (format, bytes, fallback) = if request.format.eq_ignore_ascii_case(&capture_format) {
            (capture_format, raw, None)
        } else {
            match self.transcoder.as_mut() {
                Some(t) => match t.transcode(&raw, &capture_format, &request.format) {
                    Ok(out) => (request.format.clone(), out, None),
                    Err(e)  => (capture_format, raw, Some(e)),
                },
                None => {
                    let e = ExportError::Transcode {
                        format: request.format.clone(),
                        msg:    "no transcoder available".into(),
                    };
                    (capture_format, raw, Some(e))
                }
            }
        };

        let artifact = Artifact {
            file_name: format!("{}.{}", request.file_stem, format),
            format:    format.clone(),
            bytes,
        };
        let file_name = artifact.file_name.clone();
        let len = artifact.bytes.len();
        match self.sink.deliver(artifact) {
            Ok(()) => ExportReport::Delivered { file_name, format, bytes: len, fallback },
            Err(e) => ExportReport::Failed(e),
        }
    }

    /// Abandon a running export (e.g. the user navigated away). Partial
    /// capture is discarded and nothing reaches the sink.
    pub fn cancel(&mut self, playback: &mut PlaybackState) -> Result<(), ExportError> {
        if self.phase == ExportPhase::Idle {
            return Err(ExportError::NotRunning);
        }
        info!("[export] cancelled after {} frame(s)", self.frames);
        self.abort();
        playback.is_playing = false;
        Ok(())
    }

    fn abort(&mut self) {
        self.capture.discard();
        self.phase    = ExportPhase::Idle;
        self.progress = 0.0;
        self.request  = None;
    }
}

impl std::fmt::Debug for ExportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportController")
            .field("phase", &self.phase)
            .field("progress", &self.progress)
            .field("request", &self.request)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory collaborators shared by unit and session tests.

    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    pub struct Shared {
        pub frames:    Arc<Mutex<Vec<f64>>>,
        pub delivered: Arc<Mutex<Vec<Artifact>>>,
        pub discarded: Arc<Mutex<usize>>,
    }

    pub struct MemCapture {
        pub shared:    Shared,
        pub fail_push: bool,
    }

    impl FrameCapture for MemCapture {
        fn format(&self) -> &str { "jsonl" }
        fn begin(&mut self) -> Result<(), ExportError> {
            self.shared.frames.lock().unwrap().clear();
            Ok(())
        }
        fn push(&mut self, frame: &FrameParams) -> Result<(), ExportError> {
            if self.fail_push {
                return Err(ExportError::Capture("disk full".into()));
            }
            self.shared.frames.lock().unwrap().push(frame.time);
            Ok(())
        }
        fn stop(&mut self) -> Result<Vec<u8>, ExportError> {
            let n = self.shared.frames.lock().unwrap().len();
            Ok(vec![0u8; n])
        }
        fn discard(&mut self) {
            self.shared.frames.lock().unwrap().clear();
            *self.shared.discarded.lock().unwrap() += 1;
        }
    }

    pub struct MemSink(pub Shared);

    impl ExportSink for MemSink {
        fn deliver(&mut self, artifact: Artifact) -> Result<(), ExportError> {
            self.0.delivered.lock().unwrap().push(artifact);
            Ok(())
        }
    }

    pub struct FailingTranscoder;

    impl Transcoder for FailingTranscoder {
        fn transcode(&mut self, _: &[u8], _: &str, to: &str) -> Result<Vec<u8>, ExportError> {
            Err(ExportError::Transcode { format: to.into(), msg: "codec missing".into() })
        }
    }

    pub struct DoublingTranscoder;

    impl Transcoder for DoublingTranscoder {
        fn transcode(&mut self, bytes: &[u8], _: &str, _: &str) -> Result<Vec<u8>, ExportError> {
            Ok(bytes.iter().chain(bytes).copied().collect())
        }
    }

    pub fn controller(shared: &Shared, transcoder: Option<Box<dyn Transcoder>>) -> ExportController {
        ExportController::new(
            Box::new(MemCapture { shared: shared.clone(), fail_push: false }),
            transcoder,
            Box::new(MemSink(shared.clone())),
        )
    }
}
