//! Logging and trace export setup for Avatarium binaries.

pub mod tracing_setup;

pub use tracing_setup::{LogFormat, init_tracing, shutdown_tracing};
