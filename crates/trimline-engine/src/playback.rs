//! Per-tick reconciliation of a live media handle against canonical spans.
//!
//! The controller is invoked on every native position notification and on
//! every scheduled frame while playing. Each tick skips trim spans the
//! playhead is in (or about to enter), applies the active speed span's rate,
//! and publishes the display position to the store.
//!
//! Nothing here fails. Without an attached handle every command is a no-op.

use trimline_common::{clamp_time, IDENTITY_SPEED};

use crate::handle::{MediaEvent, MediaHandle};
use crate::resolve::{
    containing_trim, display_position, gap_exit, rate_at, resolve_seek, skip_target,
};
use crate::store::RangeStore;

/// Rates closer than this are treated as equal.
const RATE_TOLERANCE: f64 = 1e-9;

/// Drives one media handle against a [`RangeStore`].
#[derive(Debug)]
pub struct PlaybackController<H> {
    handle: Option<H>,
}

impl<H> Default for PlaybackController<H> {
    fn default() -> Self {
        Self { handle: None }
    }
}

impl<H: MediaHandle> PlaybackController<H> {
    /// A controller with no handle attached.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handle(handle: H) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Attach a handle, returning the previous one so the caller can release it.
    pub fn attach(&mut self, handle: H) -> Option<H> {
        self.handle.replace(handle)
    }

    pub fn detach(&mut self) -> Option<H> {
        self.handle.take()
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    /// Reconcile the handle with the store once.
    ///
    /// Returns the published display position, or `None` when detached.
    pub fn tick(&mut self, store: &mut RangeStore) -> Option<f64> {
        let handle = self.handle.as_mut()?;
        let duration = store.duration();

        let mut physical = handle.position();
        if let Some(gap) = skip_target(physical, store.trims()) {
            let exit = gap_exit(gap, duration);
            tracing::trace!(from = physical, to = exit, "Skipping trimmed span");
            handle.set_position(exit);
            physical = exit;
        }

        let rate = rate_at(physical, store.speeds());
        if (handle.rate() - rate).abs() > RATE_TOLERANCE {
            tracing::trace!(position = physical, rate, "Applying rate");
            handle.set_rate(rate);
        }

        let display = display_position(physical, store.trims());
        store.set_position(display);
        Some(display)
    }

    /// Seek to the nearest valid position for `requested`.
    pub fn seek(&mut self, store: &mut RangeStore, requested: f64) -> Option<f64> {
        let handle = self.handle.as_mut()?;
        let target = resolve_seek(requested, store.trims(), store.duration());
        tracing::debug!(requested, target, "Seek");
        handle.set_position(target);
        store.set_position(display_position(target, store.trims()));
        Some(target)
    }

    /// Start playback, first leaving any trim span the playhead sits in.
    pub fn play(&mut self, store: &mut RangeStore) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        let physical = handle.position();
        if let Some(gap) = containing_trim(physical, store.trims()) {
            let exit = clamp_time(gap.end, store.duration());
            tracing::debug!(from = physical, to = exit, "Leaving trimmed span before play");
            handle.set_position(exit);
            store.set_position(exit);
        }

        if let Err(e) = handle.play() {
            tracing::warn!("Media handle refused to play: {}", e);
        }
    }

    /// Pause playback and return the handle to natural speed.
    pub fn pause(&mut self, store: &mut RangeStore) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        handle.pause();
        reset_rate(handle);
        store.set_playing(false);
    }

    /// Flip the mute flag, forwarding it to the handle when attached.
    pub fn toggle_mute(&mut self, store: &mut RangeStore) {
        let muted = !store.playback().muted;
        store.set_muted(muted);
        if let Some(handle) = self.handle.as_mut() {
            handle.set_muted(muted);
        }
    }

    /// Set the volume; any audible volume also unmutes.
    pub fn set_volume(&mut self, store: &mut RangeStore, volume: f64) {
        store.set_volume(volume);
        let volume = store.playback().volume;
        let unmute = volume > 0.0 && store.playback().muted;
        if unmute {
            store.set_muted(false);
        }
        if let Some(handle) = self.handle.as_mut() {
            handle.set_volume(volume);
            if unmute {
                handle.set_muted(false);
            }
        }
    }

    /// React to a notification from the attached handle.
    pub fn handle_event(&mut self, store: &mut RangeStore, event: MediaEvent) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        match event {
            MediaEvent::MetadataLoaded => {
                store.set_duration(handle.duration());
                self.tick(store);
            }
            MediaEvent::PositionChanged => {
                self.tick(store);
            }
            MediaEvent::Started => {
                store.set_playing(true);
                self.tick(store);
            }
            MediaEvent::Paused | MediaEvent::Ended => {
                // The clock may have entered a trim span since the last tick.
                let mut physical = handle.position();
                if let Some(gap) = containing_trim(physical, store.trims()) {
                    let exit = gap_exit(gap, store.duration());
                    tracing::debug!(from = physical, to = exit, "Leaving trimmed span on stop");
                    handle.set_position(exit);
                    physical = exit;
                }
                reset_rate(handle);
                store.set_playing(false);
                store.set_position(display_position(physical, store.trims()));
            }
        }
    }
}

fn reset_rate<H: MediaHandle>(handle: &mut H) {
    if (handle.rate() - IDENTITY_SPEED).abs() > RATE_TOLERANCE {
        handle.set_rate(IDENTITY_SPEED);
    }
}
