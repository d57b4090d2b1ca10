// crates/lumina-media/src/probe.rs
//
// Duration probing. A probe answers one question per file: how many seconds
// of media are in it. Everything else (thumbnails, waveforms) is the
// presenter's business.

use std::path::Path;
use std::sync::Arc;

use lumina_core::{MediaKind, ProbeError};

/// Something that can read a media file's duration. Called from worker
/// threads, so it must be shareable.
pub trait MediaProbe: Send + Sync {
    fn name(&self) -> &'static str;
    fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError>;
}

/// Video / image / audio by file extension.
pub fn classify_path(path: &Path) -> MediaKind {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    MediaKind::from_extension(ext)
}

/// The best probe compiled into this build.
pub fn default_probe() -> Arc<dyn MediaProbe> {
    #[cfg(feature = "ffmpeg")]
    {
        Arc::new(FfmpegProbe::new())
    }
    #[cfg(not(feature = "ffmpeg"))]
    {
        Arc::new(NoBackendProbe)
    }
}

/// Used when no decoder library is linked: confirms the file is readable,
/// then reports that its duration cannot be determined so the session
/// applies its fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBackendProbe;

impl MediaProbe for NoBackendProbe {
    fn name(&self) -> &'static str { "none" }

    fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        std::fs::metadata(path).map_err(|e| ProbeError::Open {
            path: path.to_path_buf(),
            msg:  e.to_string(),
        })?;
        Err(ProbeError::NoBackend { path: path.to_path_buf() })
    }
}

// ── FFmpeg ────────────────────────────────────────────────────────────────────

#[cfg(feature = "ffmpeg")]
pub use self::ffmpeg_probe::FfmpegProbe;

#[cfg(feature = "ffmpeg")]
mod ffmpeg_probe {
    use std::path::Path;
    use std::sync::Once;

    use ffmpeg_the_third as ffmpeg;
    use ffmpeg::format::input;
    use ffmpeg::media::Type;
    use tracing::{debug, warn};

    use lumina_core::ProbeError;

    use super::MediaProbe;

    static INIT: Once = Once::new();

    /// Reads the container duration, falling back to the best video (then
    /// audio) stream's own duration.
    #[derive(Debug, Clone, Copy)]
    pub struct FfmpegProbe;

    impl FfmpegProbe {
        pub fn new() -> Self {
            INIT.call_once(|| {
                if let Err(e) = ffmpeg::init() {
                    warn!("[probe] ffmpeg init failed: {e}");
                }
            });
            Self
        }
    }

    impl Default for FfmpegProbe {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MediaProbe for FfmpegProbe {
        fn name(&self) -> &'static str { "ffmpeg" }

        fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
            let ctx = input(path).map_err(|e| ProbeError::Open {
                path: path.to_path_buf(),
                msg:  e.to_string(),
            })?;

            let dur = ctx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
            if dur > 0.0 {
                debug!("[probe] duration {dur:.2}s ← {}", path.display());
                return Ok(dur);
            }

            if let Some(stream) = ctx.streams().best(Type::Video)
                .or_else(|| ctx.streams().best(Type::Audio))
            {
                let tb = stream.time_base();
                let d  = stream.duration() as f64 * tb.numerator() as f64
                    / tb.denominator().max(1) as f64;
                if d > 0.0 {
                    debug!("[probe] stream duration {d:.2}s ← {}", path.display());
                    return Ok(d);
                }
            }
            Err(ProbeError::UnknownDuration { path: path.to_path_buf() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(classify_path(Path::new("/clips/a.MP4")), MediaKind::Video);
        assert_eq!(classify_path(Path::new("still.jpeg")), MediaKind::Image);
        assert_eq!(classify_path(Path::new("vo.wav")), MediaKind::Audio);
        assert_eq!(classify_path(Path::new("no_extension")), MediaKind::Video);
    }

    #[test]
    fn no_backend_distinguishes_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        std::fs::write(&file, b"not really a video").unwrap();

        assert_eq!(
            NoBackendProbe.probe_duration(&file),
            Err(ProbeError::NoBackend { path: file.clone() }),
        );
        let missing = PathBuf::from(dir.path()).join("gone.mp4");
        assert!(matches!(
            NoBackendProbe.probe_duration(&missing),
            Err(ProbeError::Open { .. })
        ));
    }
}
