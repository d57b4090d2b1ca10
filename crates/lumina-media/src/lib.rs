// crates/lumina-media/src/lib.rs
//
// Media-store plumbing for lumina-core. Talks to the app through a channel
// only; the core never sees a thread or a file handle.
//
// To add a new probe backend:
//   1. Implement `MediaProbe` in probe.rs (behind a cargo feature if it pulls
//      in a native library)
//   2. Return it from `default_probe()`

pub mod probe;
pub mod worker;

pub use probe::{classify_path, default_probe, MediaProbe, NoBackendProbe};
pub use worker::{MediaResult, MediaWorker};

#[cfg(feature = "ffmpeg")]
pub use probe::FfmpegProbe;
