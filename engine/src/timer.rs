//! Transition timer realisation.
//!
//! The controller emits `ScheduleTransition` and `CancelTransition`.
//! This trait abstracts the runtime side:
//! - [`TokioTimer`]: spawns a tokio sleep and reports back over a channel
//! - [`ManualTimer`]: advanced explicitly by the host (deterministic clock)
//!
//! Neither implementation blocks the caller. Cancellation disarms the timer
//! but cannot retract a fire that has already been queued; the controller's
//! generation check discards those.

use std::collections::VecDeque;
use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::mpsc;
use tokio::time::sleep;

use splash_types::Generation;

const TIMER_CHANNEL_CAPACITY: usize = 8;

pub trait TimerScheduler {
    /// Arm the single timer slot, replacing whatever was armed.
    fn schedule(&mut self, generation: Generation, delay: Duration);
    /// Disarm the slot if it still holds `generation`.
    fn cancel(&mut self, generation: Generation);
    /// Next elapsed timer, if any. Called from the owning loop only.
    fn poll_fired(&mut self) -> Option<Generation>;
}

/// Timer backed by `tokio::time::sleep` in a spawned, abortable task.
///
/// Requires a tokio runtime when scheduling.
#[derive(Debug)]
pub struct TokioTimer {
    tx: mpsc::Sender<Generation>,
    rx: mpsc::Receiver<Generation>,
    armed: Option<(Generation, AbortHandle)>,
}

impl TokioTimer {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(TIMER_CHANNEL_CAPACITY);
        Self {
            tx,
            rx,
            armed: None,
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

impl Default for TokioTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerScheduler for TokioTimer {
    fn schedule(&mut self, generation: Generation, delay: Duration) {
        if let Some((_, previous)) = self.armed.take() {
            previous.abort();
        }

        let (abort_handle, abort_registration) = AbortHandle::new_pair();
        let tx = self.tx.clone();
        let task = async move {
            sleep(delay).await;
            let _ = tx.send(generation).await;
        };
        tokio::spawn(async move {
            let _ = Abortable::new(task, abort_registration).await;
        });

        self.armed = Some((generation, abort_handle));
    }

    fn cancel(&mut self, generation: Generation) {
        if matches!(&self.armed, Some((armed, _)) if *armed == generation)
            && let Some((_, handle)) = self.armed.take()
        {
            handle.abort();
        }
    }

    fn poll_fired(&mut self) -> Option<Generation> {
        let generation = self.rx.try_recv().ok()?;
        if matches!(self.armed, Some((armed, _)) if armed == generation) {
            self.armed = None;
        }
        Some(generation)
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.armed.take() {
            handle.abort();
        }
    }
}

/// Timer driven by an explicit clock.
///
/// Time only moves through [`ManualTimer::advance`]. Useful for hosts that
/// own their frame clock and for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now: Duration,
    armed: Option<(Generation, Duration)>,
    fired: VecDeque<Generation>,
}

impl ManualTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Deadline of the armed timer on this clock.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.armed.map(|(_, deadline)| deadline)
    }

    /// Move the clock forward, queueing the armed timer if it elapses.
    pub fn advance(&mut self, by: Duration) {
        self.now = self.now.saturating_add(by);
        if let Some((generation, deadline)) = self.armed
            && deadline <= self.now
        {
            self.armed = None;
            self.fired.push_back(generation);
        }
    }
}

impl TimerScheduler for ManualTimer {
    fn schedule(&mut self, generation: Generation, delay: Duration) {
        self.armed = Some((generation, self.now.saturating_add(delay)));
    }

    fn cancel(&mut self, generation: Generation) {
        if matches!(self.armed, Some((armed, _)) if armed == generation) {
            self.armed = None;
        }
    }

    fn poll_fired(&mut self) -> Option<Generation> {
        self.fired.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::{ManualTimer, TimerScheduler, TokioTimer};
    use splash_types::Generation;
    use std::time::Duration;
    use tokio::task::yield_now;
    use tokio::time::advance;

    async fn settle() {
        for _ in 0..8 {
            yield_now().await;
        }
    }

    #[test]
    fn manual_timer_fires_at_deadline() {
        let mut timer = ManualTimer::new();
        timer.schedule(Generation::new(1), Duration::from_millis(100));
        timer.advance(Duration::from_millis(99));
        assert_eq!(timer.poll_fired(), None);
        timer.advance(Duration::from_millis(1));
        assert_eq!(timer.poll_fired(), Some(Generation::new(1)));
        assert_eq!(timer.poll_fired(), None);
    }

    #[test]
    fn manual_timer_cancel_disarms() {
        let mut timer = ManualTimer::new();
        timer.schedule(Generation::new(1), Duration::from_millis(100));
        timer.cancel(Generation::new(1));
        timer.advance(Duration::from_secs(1));
        assert_eq!(timer.poll_fired(), None);
        assert_eq!(timer.next_deadline(), None);
    }

    #[test]
    fn manual_timer_cancel_ignores_other_generation() {
        let mut timer = ManualTimer::new();
        timer.schedule(Generation::new(2), Duration::from_millis(100));
        timer.cancel(Generation::new(1));
        assert_eq!(timer.next_deadline(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn manual_timer_cancel_does_not_retract_queued_fire() {
        let mut timer = ManualTimer::new();
        timer.schedule(Generation::new(1), Duration::from_millis(100));
        timer.advance(Duration::from_millis(100));
        timer.cancel(Generation::new(1));
        assert_eq!(timer.poll_fired(), Some(Generation::new(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_fires_after_delay() {
        let mut timer = TokioTimer::new();
        timer.schedule(Generation::new(1), Duration::from_millis(2500));
        settle().await;

        advance(Duration::from_millis(2499)).await;
        settle().await;
        assert_eq!(timer.poll_fired(), None);

        advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(timer.poll_fired(), Some(Generation::new(1)));
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_cancel_prevents_fire() {
        let mut timer = TokioTimer::new();
        timer.schedule(Generation::new(1), Duration::from_millis(100));
        settle().await;
        timer.cancel(Generation::new(1));

        advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(timer.poll_fired(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_reschedule_replaces_slot() {
        let mut timer = TokioTimer::new();
        timer.schedule(Generation::new(1), Duration::from_millis(100));
        timer.schedule(Generation::new(2), Duration::from_millis(300));
        settle().await;

        advance(Duration::from_millis(300)).await;
        settle().await;
        assert_eq!(timer.poll_fired(), Some(Generation::new(2)));
        assert_eq!(timer.poll_fired(), None);
    }
}
