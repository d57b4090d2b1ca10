// crates/lumina-app/src/capture.rs
//
// Export collaborators for the headless shell.
//
//   DescriptorCapture: records every composited frame descriptor as one
//                       JSON line (`jsonl`). A real presenter would encode
//                       pixels here; the descriptor stream is what this
//                       binary can produce without one.
//   FileSink         : writes the finished artifact into an output dir.

use std::fs;
use std::path::PathBuf;

use tracing::info;

use lumina_core::export::{Artifact, ExportSink, FrameCapture};
use lumina_core::{ExportError, FrameParams};

pub const DESCRIPTOR_FORMAT: &str = "jsonl";

#[derive(Debug, Default)]
pub struct DescriptorCapture {
    buf:       Vec<u8>,
    recording: bool,
}

impl DescriptorCapture {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameCapture for DescriptorCapture {
    fn format(&self) -> &str {
        DESCRIPTOR_FORMAT
    }

    fn begin(&mut self) -> Result<(), ExportError> {
        self.buf.clear();
        self.recording = true;
        Ok(())
    }

    fn push(&mut self, frame: &FrameParams) -> Result<(), ExportError> {
        if !self.recording {
            return Err(ExportError::Capture("push before begin".into()));
        }
        serde_json::to_writer(&mut self.buf, frame).map_err(|e| ExportError::Capture(e.to_string()))?;
        self.buf.push(b'\n');
        Ok(())
    }

    fn stop(&mut self) -> Result<Vec<u8>, ExportError> {
        self.recording = false;
        Ok(std::mem::take(&mut self.buf))
    }

    fn discard(&mut self) {
        self.recording = false;
        self.buf.clear();
    }
}

/// Writes artifacts into `dir`, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for FileSink {
    fn deliver(&mut self, artifact: Artifact) -> Result<(), ExportError> {
        fs::create_dir_all(&self.dir).map_err(|e| ExportError::Sink(e.to_string()))?;
        let dest = self.dir.join(&artifact.file_name);
        fs::write(&dest, &artifact.bytes).map_err(|e| ExportError::Sink(format!("{}: {e}", dest.display())))?;
        info!("[export] wrote {} ({} bytes)", dest.display(), artifact.bytes.len());
        Ok(())
    }
}
