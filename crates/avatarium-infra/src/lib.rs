//! Infrastructure layer for Avatarium.
//!
//! Implements the ports defined in `avatarium-core`: the JSON record file and
//! its debounced writer, the sprite mirror / avatar directory probe, and the
//! configuration and data directory helpers.

pub mod config;
pub mod filesystem;
pub mod persistence;
pub mod probe;
