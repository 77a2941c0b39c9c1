//! Trimline - trim and speed-range editing for video timelines
//!
//! This library crate exposes configuration, the service clients and the
//! playback simulator for the binary and for integration testing.

pub mod client;
pub mod config;
pub mod simulate;

pub use trimline_common as common;
pub use trimline_engine as engine;
