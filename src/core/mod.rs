// IconForge - core/mod.rs
//
// Core engine: data model, catalog, resampling, and the format encoders.
// Works on in-memory buffers only; no filesystem access.

pub mod catalog;
pub mod icns;
pub mod ico;
pub mod manifest;
pub mod master;
pub mod model;
pub mod raster;
pub mod resample;
pub mod svg;
pub mod xpm;
