//! An editing session: one store, one controller, one loaded source.
//!
//! The session wires the two tick triggers together. A pump task forwards
//! the handle's native notifications to the controller, and a
//! [`FrameTicker`] runs while the playing flag is set. The ticker is
//! cancelled on every transition out of playing, whenever spans or duration
//! change (a fresh one is started if still playing), and when the session is
//! dropped.
//!
//! Sessions are single-threaded: create and use them inside a
//! [`tokio::task::LocalSet`].

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use trimline_common::{SpeedRange, TimeRange, TrimRange};

use crate::drag::DragGesture;
use crate::handle::{MediaEvent, MediaHandle};
use crate::playback::PlaybackController;
use crate::store::RangeStore;
use crate::suggest::{apply_suggestions, Suggestion};
use crate::ticker::FrameTicker;

/// Default frame period (60 Hz).
pub const DEFAULT_FRAME_PERIOD: Duration = Duration::from_micros(16_667);

struct Shared<H> {
    store: RefCell<RangeStore>,
    controller: RefCell<PlaybackController<H>>,
    ticker: RefCell<Option<FrameTicker>>,
    pump: RefCell<Option<CancellationToken>>,
    frame_period: Duration,
}

impl<H: MediaHandle + 'static> Shared<H> {
    fn tick(&self) {
        let mut store = self.store.borrow_mut();
        self.controller.borrow_mut().tick(&mut store);
    }

    fn dispatch(self: &Rc<Self>, event: MediaEvent) {
        let revision = self.store.borrow().revision();
        {
            let mut store = self.store.borrow_mut();
            self.controller.borrow_mut().handle_event(&mut store, event);
        }
        let changed = self.store.borrow().revision() != revision;
        self.sync_ticker(changed);
    }

    /// Start, restart or stop the frame ticker to match the playing flag.
    fn sync_ticker(self: &Rc<Self>, deps_changed: bool) {
        let playing = self.store.borrow().is_playing();
        let mut slot = self.ticker.borrow_mut();

        if !playing || deps_changed {
            if let Some(ticker) = slot.take() {
                ticker.cancel();
                tracing::debug!(deps_changed, "Frame ticker cancelled");
            }
        }

        if playing && slot.is_none() {
            let weak: Weak<Self> = Rc::downgrade(self);
            *slot = Some(FrameTicker::spawn(self.frame_period, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.tick();
                }
            }));
            tracing::debug!("Frame ticker started");
        }
    }

    fn stop_pump(&self) {
        if let Some(token) = self.pump.borrow_mut().take() {
            token.cancel();
        }
    }

    fn start_pump(self: &Rc<Self>, mut events: tokio::sync::broadcast::Receiver<MediaEvent>) {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let weak = Rc::downgrade(self);

        tokio::task::spawn_local(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    received = events.recv() => match received {
                        Ok(event) => {
                            let Some(shared) = weak.upgrade() else { break };
                            shared.dispatch(event);
                        }
                        Err(RecvError::Lagged(missed)) => {
                            tracing::warn!(missed, "Media notifications dropped");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            tracing::trace!("Media event pump stopped");
        });

        *self.pump.borrow_mut() = Some(token);
    }
}

impl<H> Drop for Shared<H> {
    fn drop(&mut self) {
        if let Some(token) = self.pump.get_mut().take() {
            token.cancel();
        }
    }
}

/// Command surface over a [`RangeStore`] and its [`PlaybackController`].
pub struct EditSession<H: MediaHandle + 'static> {
    shared: Rc<Shared<H>>,
}

impl<H: MediaHandle + 'static> Default for EditSession<H> {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_PERIOD)
    }
}

impl<H: MediaHandle + 'static> EditSession<H> {
    /// A session with no source loaded, ticking every `frame_period` while playing.
    pub fn new(frame_period: Duration) -> Self {
        Self {
            shared: Rc::new(Shared {
                store: RefCell::new(RangeStore::new()),
                controller: RefCell::new(PlaybackController::new()),
                ticker: RefCell::new(None),
                pump: RefCell::new(None),
                frame_period,
            }),
        }
    }

    /// Load a new source, releasing the previous handle first.
    ///
    /// Duration, spans and position are reset. If the handle already knows
    /// its duration it is applied immediately; otherwise it arrives with the
    /// metadata notification.
    pub fn load_source(&self, handle: H) {
        self.unload();

        let events = handle.subscribe();
        let duration = handle.duration();
        self.shared.controller.borrow_mut().attach(handle);
        if duration > 0.0 {
            self.shared.store.borrow_mut().set_duration(duration);
        }
        self.shared.start_pump(events);
        tracing::info!(duration, "Source loaded");
    }

    /// Release the current handle and forget its spans.
    pub fn unload(&self) {
        self.shared.stop_pump();
        if let Some(ticker) = self.shared.ticker.borrow_mut().take() {
            ticker.cancel();
        }
        let previous = self.shared.controller.borrow_mut().detach();
        self.shared.store.borrow_mut().reset();
        if let Some(mut previous) = previous {
            previous.pause();
            drop(previous);
            tracing::info!("Source unloaded");
        }
    }

    /// Borrow the store.
    ///
    /// Release the guard before awaiting: the event pump and frame ticker
    /// borrow the store mutably and panic if a guard is still held.
    pub fn store(&self) -> Ref<'_, RangeStore> {
        self.shared.store.borrow()
    }

    pub fn trims(&self) -> Vec<TrimRange> {
        self.store().trims().to_vec()
    }

    pub fn speeds(&self) -> Vec<SpeedRange> {
        self.store().speeds().to_vec()
    }

    pub fn duration(&self) -> f64 {
        self.store().duration()
    }

    /// Display position.
    pub fn position(&self) -> f64 {
        self.store().position()
    }

    pub fn is_playing(&self) -> bool {
        self.store().is_playing()
    }

    /// True while a frame ticker chain is live.
    pub fn is_ticking(&self) -> bool {
        self.shared
            .ticker
            .borrow()
            .as_ref()
            .is_some_and(|t| !t.is_cancelled())
    }

    pub fn set_trim_ranges(&self, ranges: &[TimeRange]) {
        self.mutate_spans(|store| store.set_trim_ranges(ranges));
    }

    pub fn set_speed_ranges(&self, ranges: &[SpeedRange]) {
        self.mutate_spans(|store| store.set_speed_ranges(ranges));
    }

    pub fn set_trim_range(&self, start: f64, end: f64) {
        self.mutate_spans(|store| store.set_trim_range(start, end));
    }

    pub fn add_trim_range(&self, range: TimeRange) {
        self.mutate_spans(|store| store.add_trim_range(range));
    }

    pub fn add_speed_range(&self, range: SpeedRange) {
        self.mutate_spans(|store| store.add_speed_range(range));
    }

    /// Replace both span lists with normalized suggestions.
    pub fn import_suggestions(&self, suggestions: &[Suggestion]) {
        self.mutate_spans(|store| apply_suggestions(store, suggestions));
    }

    /// Commit a finished drag gesture.
    pub fn commit_drag(&self, gesture: DragGesture) -> bool {
        let mut committed = false;
        self.mutate_spans(|store| committed = gesture.commit(store));
        committed
    }

    /// Remove every span.
    pub fn reset_timeline(&self) {
        self.mutate_spans(RangeStore::clear_ranges);
    }

    pub fn seek(&self, t: f64) -> Option<f64> {
        let mut store = self.shared.store.borrow_mut();
        self.shared.controller.borrow_mut().seek(&mut store, t)
    }

    pub fn play(&self) {
        let mut store = self.shared.store.borrow_mut();
        self.shared.controller.borrow_mut().play(&mut store);
    }

    pub fn pause(&self) {
        {
            let mut store = self.shared.store.borrow_mut();
            self.shared.controller.borrow_mut().pause(&mut store);
        }
        self.shared.sync_ticker(false);
    }

    pub fn toggle_mute(&self) {
        let mut store = self.shared.store.borrow_mut();
        self.shared.controller.borrow_mut().toggle_mute(&mut store);
    }

    pub fn set_volume(&self, volume: f64) {
        let mut store = self.shared.store.borrow_mut();
        self.shared.controller.borrow_mut().set_volume(&mut store, volume);
    }

    /// Deliver a notification directly, for hosts that do not use the pump.
    pub fn notify(&self, event: MediaEvent) {
        self.shared.dispatch(event);
    }

    /// Run one reconciliation tick now.
    pub fn tick(&self) {
        self.shared.tick();
    }

    fn mutate_spans(&self, apply: impl FnOnce(&mut RangeStore)) {
        let changed = {
            let mut store = self.shared.store.borrow_mut();
            let revision = store.revision();
            apply(&mut store);
            store.revision() != revision
        };
        if changed {
            self.shared.sync_ticker(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::sim::SimulatedMedia;
    use tokio::task::LocalSet;
    use trimline_common::EXIT_EPSILON;

    const FRAME: Duration = Duration::from_millis(10);

    fn ticker_token(session: &EditSession<SimulatedMedia>) -> CancellationToken {
        session
            .shared
            .ticker
            .borrow()
            .as_ref()
            .map(FrameTicker::token)
            .expect("ticker running")
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn metadata_notification_sets_duration() {
        LocalSet::new()
            .run_until(async {
                let session = EditSession::new(FRAME);
                let media = SimulatedMedia::new(10.0);
                session.load_source(media.clone());
                assert_eq!(session.duration(), 0.0);

                media.load_metadata();
                settle().await;
                assert_eq!(session.duration(), 10.0);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn ticker_lives_only_while_playing() {
        LocalSet::new()
            .run_until(async {
                let session = EditSession::new(FRAME);
                let media = SimulatedMedia::loaded(10.0);
                session.load_source(media.clone());
                assert!(!session.is_ticking());

                session.play();
                settle().await;
                assert!(session.is_playing());
                assert!(session.is_ticking());

                session.pause();
                assert!(!session.is_ticking());
                settle().await;
                assert!(!session.is_playing());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn frame_ticks_skip_gaps_between_notifications() {
        LocalSet::new()
            .run_until(async {
                let session = EditSession::new(FRAME);
                let media = SimulatedMedia::loaded(10.0);
                session.load_source(media.clone());
                session.set_trim_range(2.0, 4.0);
                session.play();
                settle().await;

                // Clock moves without a native notification.
                media.jump_to(2.5);
                tokio::time::sleep(FRAME * 2).await;

                assert_eq!(media.position(), 4.0 + EXIT_EPSILON);
                assert_eq!(session.position(), 4.0);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn span_change_restarts_ticker() {
        LocalSet::new()
            .run_until(async {
                let session = EditSession::new(FRAME);
                let media = SimulatedMedia::loaded(10.0);
                session.load_source(media.clone());
                session.play();
                settle().await;

                let first = ticker_token(&session);
                session.set_trim_range(5.0, 6.0);
                assert!(first.is_cancelled());
                assert!(session.is_ticking());

                // Re-applying the same spans changes nothing.
                let second = ticker_token(&session);
                session.set_trim_range(5.0, 6.0);
                assert!(!second.is_cancelled());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn play_from_inside_gap_starts_past_it() {
        LocalSet::new()
            .run_until(async {
                let session = EditSession::new(FRAME);
                let media = SimulatedMedia::loaded(10.0);
                session.load_source(media.clone());
                session.set_trim_range(2.0, 4.0);
                media.jump_to(3.0);

                session.play();
                assert!(media.position() >= 4.0);
                assert_eq!(media.position_writes().first(), Some(&4.0));
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn ended_stops_ticker_and_resets_rate() {
        LocalSet::new()
            .run_until(async {
                let session = EditSession::new(FRAME);
                let media = SimulatedMedia::loaded(2.0);
                session.load_source(media.clone());
                session.set_speed_ranges(&[SpeedRange::new(0.0, 2.0, 2.0)]);
                session.play();
                settle().await;
                assert_eq!(media.rate(), 2.0);

                media.advance(1.5);
                settle().await;
                assert!(!session.is_playing());
                assert!(!session.is_ticking());
                assert_eq!(media.rate(), 1.0);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn loading_new_source_releases_previous() {
        LocalSet::new()
            .run_until(async {
                let session = EditSession::new(FRAME);
                let first = SimulatedMedia::loaded(10.0);
                session.load_source(first.clone());
                session.set_trim_range(1.0, 2.0);
                session.play();
                settle().await;

                let second = SimulatedMedia::loaded(20.0);
                session.load_source(second.clone());
                assert!(!first.is_playing());
                assert!(session.trims().is_empty());
                assert_eq!(session.duration(), 20.0);
                assert!(!session.is_ticking());

                // Late notifications from the old handle are not heard.
                first.load_metadata();
                settle().await;
                assert_eq!(session.duration(), 20.0);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn committed_drag_reaches_store_only_on_release() {
        use crate::drag::{DragLayer, DragTarget, DragTracker};

        LocalSet::new()
            .run_until(async {
                let session = EditSession::new(FRAME);
                session.load_source(SimulatedMedia::loaded(10.0));
                session.set_trim_range(2.0, 4.0);

                let mut tracker = DragTracker::new();
                assert!(tracker.pointer_down(
                    &session.store(),
                    DragLayer::Trim,
                    0,
                    DragTarget::EndEdge,
                    4.0
                ));
                tracker.pointer_move(6.0);
                assert_eq!(session.trims(), vec![TimeRange::new(2.0, 4.0)]);

                let gesture = tracker.pointer_up().unwrap();
                assert!(session.commit_drag(gesture));
                assert_eq!(session.trims(), vec![TimeRange::new(2.0, 6.0)]);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn volume_and_mute_reach_handle() {
        LocalSet::new()
            .run_until(async {
                let session = EditSession::new(FRAME);
                let media = SimulatedMedia::loaded(10.0);
                session.load_source(media.clone());

                session.toggle_mute();
                assert!(media.is_muted());
                session.set_volume(0.5);
                assert!(!media.is_muted());
                assert_eq!(media.volume(), 0.5);
                assert_eq!(session.store().playback().volume, 0.5);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn paused_seek_to_gap_start_settles_past_gap() {
        LocalSet::new()
            .run_until(async {
                let session = EditSession::new(FRAME);
                let media = SimulatedMedia::loaded(10.0);
                session.load_source(media.clone());
                session.set_trim_range(2.0, 4.0);

                assert_eq!(session.seek(2.2), Some(2.0));
                assert_eq!(session.position(), 2.0);

                // The position notification from the seek is reconciled while paused.
                settle().await;
                assert!(!session.is_playing());
                assert_eq!(media.position(), 4.0 + EXIT_EPSILON);
                assert_eq!(session.position(), 4.0);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn session_without_source_is_inert() {
        LocalSet::new()
            .run_until(async {
                let session: EditSession<SimulatedMedia> = EditSession::new(FRAME);
                assert_eq!(session.seek(3.0), None);
                session.play();
                session.pause();
                session.set_trim_range(1.0, 2.0);
                assert_eq!(session.trims(), vec![TimeRange::new(1.0, 2.0)]);
                assert!(!session.is_ticking());
            })
            .await;
    }
}
