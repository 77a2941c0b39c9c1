//! Drive an [`EditSession`] against the simulated media backend.
//!
//! The simulated clock emits a native position notification every
//! `notify_interval` and advances by the same amount of media time scaled by
//! the current rate. The session's frame ticker runs alongside, so the
//! samples show both triggers at work.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use trimline_common::{SpeedRange, TimeRange};
use trimline_engine::handle::sim::SimulatedMedia;
use trimline_engine::{EditSession, MediaHandle};

/// What to play and how fast to sample it.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub duration: f64,
    pub trims: Vec<TimeRange>,
    pub speeds: Vec<SpeedRange>,
    /// Seek here before playing.
    pub from: f64,
    pub frame_period: Duration,
    pub notify_interval: Duration,
}

/// State observed after one native notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub physical: f64,
    pub display: f64,
    pub rate: f64,
}

/// Play the timeline to its end, or until `cancel` fires.
///
/// Must run inside a [`tokio::task::LocalSet`]. Returns the final display
/// position.
pub async fn run_simulation<F>(
    options: &SimulationOptions,
    cancel: CancellationToken,
    mut on_sample: F,
) -> f64
where
    F: FnMut(Sample),
{
    let session = EditSession::new(options.frame_period);
    let media = SimulatedMedia::loaded(options.duration);
    session.load_source(media.clone());
    session.set_trim_ranges(&options.trims);
    session.set_speed_ranges(&options.speeds);
    if options.from > 0.0 {
        session.seek(options.from);
    }
    session.play();

    let step = options.notify_interval.as_secs_f64();
    let mut interval = tokio::time::interval(options.notify_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Simulation cancelled");
                session.pause();
                break;
            }
            _ = interval.tick() => {
                media.advance(step);
                // Let the event pump deliver the notification.
                tokio::task::yield_now().await;
                on_sample(Sample {
                    physical: media.position(),
                    display: session.position(),
                    rate: media.rate(),
                });
                if !media.is_playing() {
                    break;
                }
            }
        }
    }

    tokio::task::yield_now().await;
    let display = session.position();
    session.unload();
    display
}
