// IconForge - app/mod.rs
//
// Application layer: source loading and generation orchestration.
// Dependencies: core and platform layers.

pub mod generate;
pub mod source;
