// crates/lumina-media/src/worker.rs
//
// MediaWorker: runs duration probes off the caller's thread and reports back
// over a bounded channel. The app drains `rx` once per tick (`poll`) and
// hands each outcome to `EditorSession::import_probed`.
//
// A fixed pool of PROBE_CONCURRENCY threads pulls requests off a job queue,
// so a big import never has more than PROBE_CONCURRENCY probes touching the
// disk at once and queued requests cost no threads. Dropping the worker
// closes the queue and the pool exits once the backlog is gone.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::{debug, warn};
use uuid::Uuid;

use lumina_core::{MediaKind, ProbeError};

use crate::probe::{classify_path, default_probe, MediaProbe};

const PROBE_CONCURRENCY: usize = 4;
const RESULT_CAPACITY: usize = 512;

/// Everything the worker reports back.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaResult {
    Probed {
        id:      Uuid,
        path:    PathBuf,
        kind:    MediaKind,
        outcome: Result<f64, ProbeError>,
    },
}

struct ProbeJob {
    id:   Uuid,
    path: PathBuf,
}

pub struct MediaWorker {
    pub rx:   Receiver<MediaResult>,
    jobs:     Sender<ProbeJob>,
    shutdown: Arc<AtomicBool>,
}

impl Default for MediaWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaWorker {
    pub fn new() -> Self {
        Self::with_probe(default_probe())
    }

    pub fn with_probe(probe: Arc<dyn MediaProbe>) -> Self {
        let (tx, rx) = bounded(RESULT_CAPACITY);
        let (jobs, queue) = unbounded::<ProbeJob>();
        let shutdown = Arc::new(AtomicBool::new(false));
        debug!("[probe] worker up, backend = {}, {PROBE_CONCURRENCY} threads", probe.name());

        for n in 0..PROBE_CONCURRENCY {
            let queue = queue.clone();
            let tx    = tx.clone();
            let sd    = Arc::clone(&shutdown);
            let probe = Arc::clone(&probe);
            let spawned = thread::Builder::new()
                .name(format!("lumina-probe-{n}"))
                .spawn(move || run_probes(queue, tx, probe, sd));
            if let Err(e) = spawned {
                warn!("[probe] could not start probe thread {n}: {e}");
            }
        }

        Self { rx, jobs, shutdown }
    }

    /// Queue a probe for `path`. Images are classified and reported without
    /// touching a decoder; their duration comes from the session config.
    pub fn probe(&self, id: Uuid, path: PathBuf) {
        if self.jobs.send(ProbeJob { id, path }).is_err() {
            warn!("[probe] {id}: probe pool is gone");
        }
    }

    /// Everything that has arrived since the last call. Never blocks.
    pub fn poll(&self) -> Vec<MediaResult> {
        self.rx.try_iter().collect()
    }

    /// Stop delivering results. Probes already inside a backend finish but
    /// their results are dropped; queued requests are skipped.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

/// One pool thread: probe queued files until the queue closes.
fn run_probes(
    queue: Receiver<ProbeJob>,
    tx: Sender<MediaResult>,
    probe: Arc<dyn MediaProbe>,
    sd: Arc<AtomicBool>,
) {
    for ProbeJob { id, path } in queue.iter() {
        if sd.load(Ordering::Relaxed) {
            continue;
        }
        let kind = classify_path(&path);
        let outcome = match kind {
            MediaKind::Image => Ok(0.0),
            MediaKind::Video | MediaKind::Audio => probe.probe_duration(&path),
        };
        if let Err(e) = &outcome {
            warn!("[probe] {id}: {e}");
        }
        if sd.load(Ordering::Relaxed) {
            continue;
        }
        // Receiver gone means the app is shutting down.
        if tx.send(MediaResult::Probed { id, path, kind, outcome }).is_err() {
            return;
        }
    }
}
