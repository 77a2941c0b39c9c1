//! The live media handle the playback controller drives.
//!
//! A handle is an externally owned playback backend: a video element, a
//! decoder pipeline, or the in-process [`sim::SimulatedMedia`]. The engine
//! only needs to read and write its clock and rate, start and stop it, and
//! hear about its state changes.

pub mod sim;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use trimline_common::Result;

/// Notifications emitted by a media handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaEvent {
    /// Duration is now valid.
    MetadataLoaded,
    /// The physical clock moved.
    PositionChanged,
    /// Playback actually started.
    Started,
    Paused,
    Ended,
}

/// Capability set required from a playback backend.
pub trait MediaHandle {
    /// Physical position in seconds.
    fn position(&self) -> f64;

    fn set_position(&mut self, seconds: f64);

    /// Current rate multiplier.
    fn rate(&self) -> f64;

    fn set_rate(&mut self, rate: f64);

    /// Duration in seconds; only meaningful after [`MediaEvent::MetadataLoaded`].
    fn duration(&self) -> f64;

    /// Request playback. Success is confirmed by [`MediaEvent::Started`].
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);

    /// Subscribe to this handle's notifications.
    fn subscribe(&self) -> broadcast::Receiver<MediaEvent>;
}
