// crates/lumina-core/src/helpers/mod.rs

pub mod interval;
pub mod time;
