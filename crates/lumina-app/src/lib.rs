// crates/lumina-app/src/lib.rs
//
// Headless application shell. `main.rs` is a thin CLI over `LuminaApp`.

pub mod app;
pub mod capture;
pub mod helpers;

pub use app::{effect_catalog, EffectCatalog, LuminaApp, RunSummary, SharedSession};
