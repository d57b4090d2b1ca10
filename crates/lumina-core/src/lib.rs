// crates/lumina-core/src/lib.rs
//
// Timeline composition & playback engine. Pure data + algorithms:
// no threads, no I/O, no media bytes. lumina-media and lumina-app talk to
// this crate through `EditorSession` and the `EditAction` vocabulary.
//
// Layering (leaf to root):
//   helpers::interval : overlap / ripple geometry
//   state             : Clip / AudioClip / Subtitle / Timeline / PlaybackState
//   timeline          : invariant-preserving edit operations on Timeline
//   history           : bounded snapshot undo/redo
//   clock             : authoritative playback time + publish throttle
//   resolver          : "what plays at time T"
//   filters, transitions, effects: visual parameter pipeline
//   audio_mix         : per-clip gain / position / drift correction
//   export            : Idle → Rendering → Finalizing controller
//   commands          : edit-action vocabulary shared by UI and AI origins
//   session           : EditorSession aggregate owning all of the above

pub mod audio_mix;
pub mod clock;
pub mod commands;
pub mod config;
pub mod drag;
pub mod effects;
pub mod error;
pub mod export;
pub mod filters;
pub mod helpers;
pub mod history;
pub mod resolver;
pub mod session;
pub mod state;
pub mod subtitles;
pub mod timeline;
pub mod transitions;

pub use commands::{ActionOutcome, ClipRef, EditAction};
pub use config::EditorConfig;
pub use error::{ActionError, ConfigError, ExportError, ProbeError};
pub use session::{EditorSession, FrameParams, GestureKind, Project, TickResult};
pub use state::{AudioClip, AudioKind, Clip, ClipKind, MediaKind, MediaRef, PlaybackState, Subtitle, Timeline};
