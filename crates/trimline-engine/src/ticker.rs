//! Cancellable per-frame callback chain.
//!
//! One [`FrameTicker`] exists per "is playing" session. It runs on the
//! current thread's [`tokio::task::LocalSet`] and stops as soon as its
//! cancellation token fires, either explicitly or when the ticker is dropped.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// A scheduled callback firing once per frame until cancelled.
#[derive(Debug)]
pub struct FrameTicker {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl FrameTicker {
    /// Spawn the chain on the current `LocalSet`.
    ///
    /// # Panics
    /// Panics when called outside a `LocalSet`.
    pub fn spawn<F>(period: Duration, mut on_frame: F) -> Self
    where
        F: FnMut() + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::task::spawn_local(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => on_frame(),
                }
            }
            tracing::trace!("Frame ticker stopped");
        });

        Self { cancel, task }
    }

    /// Fire at `hz` frames per second.
    pub fn spawn_at_rate<F>(hz: u32, on_frame: F) -> Self
    where
        F: FnMut() + 'static,
    {
        Self::spawn(frame_period(hz), on_frame)
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A handle on this chain's cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// True once the underlying task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Period between frames at `hz` frames per second; `0` is treated as `1`.
pub fn frame_period(hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(hz.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tokio::task::LocalSet;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn fires_until_cancelled() {
        LocalSet::new()
            .run_until(async {
                let count = Rc::new(Cell::new(0u32));
                let counter = count.clone();
                let ticker = FrameTicker::spawn(Duration::from_millis(10), move || {
                    counter.set(counter.get() + 1)
                });

                tokio::time::sleep(Duration::from_millis(55)).await;
                let seen = count.get();
                assert!(seen >= 5, "saw {seen} frames");

                ticker.cancel();
                assert!(ticker.is_cancelled());
                tokio::time::sleep(Duration::from_millis(100)).await;
                assert_eq!(count.get(), seen);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn drop_cancels_chain() {
        LocalSet::new()
            .run_until(async {
                let count = Rc::new(Cell::new(0u32));
                let counter = count.clone();
                let ticker = FrameTicker::spawn(Duration::from_millis(10), move || {
                    counter.set(counter.get() + 1)
                });
                tokio::time::sleep(Duration::from_millis(25)).await;
                drop(ticker);

                let seen = count.get();
                tokio::time::sleep(Duration::from_millis(100)).await;
                assert_eq!(count.get(), seen);
            })
            .await;
    }

    #[test]
    fn frame_period_from_rate() {
        assert_eq!(frame_period(50), Duration::from_millis(20));
        assert_eq!(frame_period(0), Duration::from_secs(1));
    }
}
