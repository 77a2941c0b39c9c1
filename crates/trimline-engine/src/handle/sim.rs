//! In-process media backend with a manually advanced clock.
//!
//! Used by tests and by the `simulate` command. Cloning shares the same
//! underlying media, so a host can keep a clone to advance the clock while
//! the controller owns another.

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::broadcast;
use trimline_common::{Error, Result, IDENTITY_SPEED};

use super::{MediaEvent, MediaHandle};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug)]
struct SimState {
    position: f64,
    rate: f64,
    duration: f64,
    metadata_loaded: bool,
    playing: bool,
    volume: f64,
    muted: bool,
    refuse_play: bool,
    position_writes: Vec<f64>,
    rate_writes: Vec<f64>,
}

/// A simulated media handle.
#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    state: Rc<RefCell<SimState>>,
    events: broadcast::Sender<MediaEvent>,
}

impl SimulatedMedia {
    /// Media of the given length whose metadata has not loaded yet.
    pub fn new(duration: f64) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Rc::new(RefCell::new(SimState {
                position: 0.0,
                rate: IDENTITY_SPEED,
                duration,
                metadata_loaded: false,
                playing: false,
                volume: 1.0,
                muted: false,
                refuse_play: false,
                position_writes: Vec::new(),
                rate_writes: Vec::new(),
            })),
            events,
        }
    }

    /// Media whose metadata is already available.
    pub fn loaded(duration: f64) -> Self {
        let media = Self::new(duration);
        media.state.borrow_mut().metadata_loaded = true;
        media
    }

    /// Finish loading metadata and notify subscribers.
    pub fn load_metadata(&self) {
        self.state.borrow_mut().metadata_loaded = true;
        self.emit(MediaEvent::MetadataLoaded);
    }

    /// Advance the clock by `elapsed` wall seconds, scaled by the current rate.
    ///
    /// Does nothing while paused. Reaching the end stops playback and emits
    /// [`MediaEvent::Ended`].
    pub fn advance(&self, elapsed: f64) {
        let ended = {
            let mut state = self.state.borrow_mut();
            if !state.playing {
                return;
            }
            state.position = (state.position + elapsed * state.rate).min(state.duration);
            let ended = state.position >= state.duration;
            if ended {
                state.playing = false;
            }
            ended
        };
        self.emit(MediaEvent::PositionChanged);
        if ended {
            self.emit(MediaEvent::Ended);
        }
    }

    /// Make subsequent `play` requests fail, as a browser blocking autoplay would.
    pub fn refuse_play(&self, refuse: bool) {
        self.state.borrow_mut().refuse_play = refuse;
    }

    /// Move the clock without going through the controller.
    pub fn jump_to(&self, seconds: f64) {
        self.state.borrow_mut().position = seconds;
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    pub fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    pub fn is_muted(&self) -> bool {
        self.state.borrow().muted
    }

    /// Every position written through [`MediaHandle::set_position`].
    pub fn position_writes(&self) -> Vec<f64> {
        self.state.borrow().position_writes.clone()
    }

    /// Every rate written through [`MediaHandle::set_rate`].
    pub fn rate_writes(&self) -> Vec<f64> {
        self.state.borrow().rate_writes.clone()
    }

    fn emit(&self, event: MediaEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

impl MediaHandle for SimulatedMedia {
    fn position(&self) -> f64 {
        self.state.borrow().position
    }

    fn set_position(&mut self, seconds: f64) {
        {
            let mut state = self.state.borrow_mut();
            state.position = seconds.clamp(0.0, state.duration.max(0.0));
            state.position_writes.push(seconds);
        }
        self.emit(MediaEvent::PositionChanged);
    }

    fn rate(&self) -> f64 {
        self.state.borrow().rate
    }

    fn set_rate(&mut self, rate: f64) {
        let mut state = self.state.borrow_mut();
        state.rate = rate;
        state.rate_writes.push(rate);
    }

    fn duration(&self) -> f64 {
        let state = self.state.borrow();
        if state.metadata_loaded {
            state.duration
        } else {
            0.0
        }
    }

    fn play(&mut self) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if state.refuse_play {
                return Err(Error::Playback("playback was not allowed".into()));
            }
            if state.playing {
                return Ok(());
            }
            state.playing = true;
        }
        self.emit(MediaEvent::Started);
        Ok(())
    }

    fn pause(&mut self) {
        let was_playing = std::mem::replace(&mut self.state.borrow_mut().playing, false);
        if was_playing {
            self.emit(MediaEvent::Paused);
        }
    }

    fn set_volume(&mut self, volume: f64) {
        self.state.borrow_mut().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }

    fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.events.subscribe()
    }
}
