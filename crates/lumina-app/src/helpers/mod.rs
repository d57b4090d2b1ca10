// crates/lumina-app/src/helpers/mod.rs

pub mod log;
