//! Timed transition state machine.
//!
//! The controller is:
//! - **Synchronous**: No async, no .await
//! - **Deterministic**: Same state + event = same actions
//! - **Pure-ish**: Mutates self, but performs no I/O
//!
//! The owning [`SplashSession`](crate::SplashSession) executes the returned
//! [`Action`]s: arming and disarming the timer, starting and cancelling the
//! fetch, and navigating.

use std::time::Duration;

use splash_types::{Generation, LifecycleEvent, LifecyclePhase};

/// Side effects requested by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start the background fetch. Emitted once, on creation.
    StartFetch,
    /// Arm the transition timer. Any previously armed timer is replaced.
    ScheduleTransition {
        generation: Generation,
        delay: Duration,
    },
    /// Disarm the timer armed under `generation`.
    CancelTransition { generation: Generation },
    /// Cancel the background fetch if it is still running.
    CancelFetch,
    /// Leave the splash for the main screen. Emitted at most once.
    NavigateToMain,
}

#[derive(Debug, Clone)]
pub struct TransitionController {
    delay: Duration,
    phase: LifecyclePhase,
    /// Single pending-transition slot.
    pending: Option<Generation>,
    generation: Generation,
    fetch_requested: bool,
    terminated: bool,
}

impl TransitionController {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            phase: LifecyclePhase::Created,
            pending: None,
            generation: Generation::default(),
            fetch_requested: false,
            terminated: false,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    #[must_use]
    pub fn pending(&self) -> Option<Generation> {
        self.pending
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// True once the transition has fired or the splash was dismissed.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Process a host lifecycle event.
    ///
    /// Events that are invalid for the current phase are dropped.
    pub fn handle(&mut self, event: LifecycleEvent) -> Vec<Action> {
        let next = match self.phase.apply(event) {
            Ok(next) => next,
            Err(err) => {
                tracing::debug!(%err, "Ignoring lifecycle event");
                return Vec::new();
            }
        };
        self.phase = next;

        match event {
            LifecycleEvent::Created => self.on_created(),
            LifecycleEvent::ForegroundEnter => self.on_foreground_enter(),
            LifecycleEvent::ForegroundExit => self.on_foreground_exit(),
            LifecycleEvent::Destroyed => self.on_destroyed(),
        }
    }

    /// Called when the timer armed under `generation` elapses.
    ///
    /// Stale generations and fires outside the foreground are ignored.
    pub fn on_timer_fired(&mut self, generation: Generation) -> Vec<Action> {
        if self.pending != Some(generation) || !self.phase.is_foreground() {
            tracing::debug!(
                %generation,
                current = %self.generation,
                phase = %self.phase,
                "Discarding stale transition timer"
            );
            return Vec::new();
        }
        self.pending = None;
        self.terminate()
    }

    /// Manual dismiss: the same terminal path as the timer, taken early.
    pub fn dismiss(&mut self) -> Vec<Action> {
        if self.terminated || !self.phase.is_foreground() {
            return Vec::new();
        }
        let mut actions = self.cancel_pending();
        actions.extend(self.terminate());
        actions
    }

    fn on_created(&mut self) -> Vec<Action> {
        if self.fetch_requested {
            return Vec::new();
        }
        self.fetch_requested = true;
        vec![Action::StartFetch]
    }

    fn on_foreground_enter(&mut self) -> Vec<Action> {
        if self.terminated || self.pending.is_some() {
            return Vec::new();
        }
        self.generation = self.generation.next();
        self.pending = Some(self.generation);
        vec![Action::ScheduleTransition {
            generation: self.generation,
            delay: self.delay,
        }]
    }

    fn on_foreground_exit(&mut self) -> Vec<Action> {
        self.cancel_pending()
    }

    fn on_destroyed(&mut self) -> Vec<Action> {
        let mut actions = self.cancel_pending();
        actions.push(Action::CancelFetch);
        actions
    }

    // Advancing the generation here invalidates a fire that already elapsed
    // but has not been delivered yet.
    fn cancel_pending(&mut self) -> Vec<Action> {
        let Some(generation) = self.pending.take() else {
            return Vec::new();
        };
        self.generation = self.generation.next();
        vec![Action::CancelTransition { generation }]
    }

    fn terminate(&mut self) -> Vec<Action> {
        self.terminated = true;
        vec![Action::CancelFetch, Action::NavigateToMain]
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, TransitionController};
    use splash_types::{Generation, LifecycleEvent as E, LifecyclePhase};
    use std::time::Duration;

    const DELAY: Duration = Duration::from_millis(2500);

    fn foregrounded() -> (TransitionController, Generation) {
        let mut c = TransitionController::new(DELAY);
        c.handle(E::Created);
        let actions = c.handle(E::ForegroundEnter);
        let Some(Action::ScheduleTransition { generation, .. }) = actions.first().copied() else {
            panic!("expected schedule, got {actions:?}");
        };
        (c, generation)
    }

    fn navigations(actions: &[Action]) -> usize {
        actions
            .iter()
            .filter(|a| matches!(a, Action::NavigateToMain))
            .count()
    }

    #[test]
    fn created_requests_fetch_once() {
        let mut c = TransitionController::new(DELAY);
        assert_eq!(c.handle(E::Created), vec![Action::StartFetch]);
        assert!(c.handle(E::Created).is_empty());
    }

    #[test]
    fn foreground_enter_schedules_with_configured_delay() {
        let mut c = TransitionController::new(DELAY);
        c.handle(E::Created);
        let actions = c.handle(E::ForegroundEnter);
        assert_eq!(
            actions,
            vec![Action::ScheduleTransition {
                generation: Generation::new(1),
                delay: DELAY,
            }]
        );
        assert_eq!(c.pending(), Some(Generation::new(1)));
    }

    #[test]
    fn repeated_enter_keeps_single_pending_transition() {
        let (mut c, generation) = foregrounded();
        assert!(c.handle(E::ForegroundEnter).is_empty());
        assert_eq!(c.pending(), Some(generation));
    }

    #[test]
    fn exit_cancels_and_reenter_rearms_with_new_generation() {
        let (mut c, first) = foregrounded();
        assert_eq!(
            c.handle(E::ForegroundExit),
            vec![Action::CancelTransition { generation: first }]
        );
        assert_eq!(c.pending(), None);

        let actions = c.handle(E::ForegroundEnter);
        let Some(Action::ScheduleTransition { generation, delay }) = actions.first().copied() else {
            panic!("expected schedule, got {actions:?}");
        };
        assert_ne!(generation, first);
        assert_eq!(delay, DELAY);
    }

    #[test]
    fn timer_fire_navigates_once() {
        let (mut c, generation) = foregrounded();
        let actions = c.on_timer_fired(generation);
        assert_eq!(actions, vec![Action::CancelFetch, Action::NavigateToMain]);
        assert!(c.is_terminated());
        assert!(c.on_timer_fired(generation).is_empty());
    }

    #[test]
    fn stale_fire_after_exit_is_discarded() {
        let (mut c, generation) = foregrounded();
        c.handle(E::ForegroundExit);
        assert!(c.on_timer_fired(generation).is_empty());
        assert!(!c.is_terminated());
    }

    #[test]
    fn fire_from_previous_arming_is_discarded_after_reenter() {
        let (mut c, first) = foregrounded();
        c.handle(E::ForegroundExit);
        c.handle(E::ForegroundEnter);
        assert!(c.on_timer_fired(first).is_empty());
        let current = c.pending().expect("re-armed");
        assert_eq!(navigations(&c.on_timer_fired(current)), 1);
    }

    #[test]
    fn stale_fire_is_discarded_across_generation_wrap() {
        let mut c = TransitionController::new(DELAY);
        c.generation = Generation::new(u64::MAX - 1);
        c.handle(E::Created);
        c.handle(E::ForegroundEnter);
        let first = c.pending().expect("armed");
        assert_eq!(first, Generation::new(u64::MAX));

        c.handle(E::ForegroundExit);
        c.handle(E::ForegroundEnter);
        assert!(c.on_timer_fired(first).is_empty());
        let current = c.pending().expect("re-armed");
        assert_ne!(current, first);
        assert_eq!(navigations(&c.on_timer_fired(current)), 1);
    }

    #[test]
    fn dismiss_cancels_pending_then_navigates() {
        let (mut c, generation) = foregrounded();
        assert_eq!(
            c.dismiss(),
            vec![
                Action::CancelTransition { generation },
                Action::CancelFetch,
                Action::NavigateToMain,
            ]
        );
        assert!(c.on_timer_fired(generation).is_empty());
        assert!(c.dismiss().is_empty());
    }

    #[test]
    fn dismiss_while_backgrounded_is_ignored() {
        let (mut c, _) = foregrounded();
        c.handle(E::ForegroundExit);
        assert!(c.dismiss().is_empty());
        assert!(!c.is_terminated());
    }

    #[test]
    fn no_rearm_after_termination() {
        let (mut c, generation) = foregrounded();
        c.on_timer_fired(generation);
        c.handle(E::ForegroundExit);
        assert!(c.handle(E::ForegroundEnter).is_empty());
    }

    #[test]
    fn destroy_cancels_timer_and_fetch() {
        let (mut c, generation) = foregrounded();
        assert_eq!(
            c.handle(E::Destroyed),
            vec![
                Action::CancelTransition { generation },
                Action::CancelFetch,
            ]
        );
        assert_eq!(c.phase(), LifecyclePhase::Destroyed);
        assert!(c.handle(E::ForegroundEnter).is_empty());
        assert!(c.on_timer_fired(generation).is_empty());
    }

    #[test]
    fn invalid_events_are_no_ops() {
        let mut c = TransitionController::new(DELAY);
        c.handle(E::Created);
        assert!(c.handle(E::ForegroundExit).is_empty());
        assert_eq!(c.phase(), LifecyclePhase::Created);
        assert!(c.dismiss().is_empty());
    }
}
