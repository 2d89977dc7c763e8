// IconForge - platform/mod.rs
//
// Platform abstraction layer: config directories and filesystem writes.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
