//! One lifetime of the splash screen.
//!
//! ```text
//! host lifecycle ─► SplashSession::handle_event ─► TransitionController ─► Actions
//!                                                                           │
//!        TimerScheduler / BackgroundFetch / Navigator ◄──── apply ◄─────────┘
//!
//! frame loop ─► SplashSession::process_events ─► timer fires, fetch results
//! ```
//!
//! Every method runs on the loop that owns the session. Timer fires and fetch
//! results only take effect inside [`SplashSession::process_events`].

use std::sync::Arc;
use std::time::Duration;

use splash_fetch::AssetFetcher;
use splash_types::{FetchStatus, FetchedAsset, LifecycleEvent, LifecyclePhase, NotSuccessful};

use crate::fetch::{BackgroundFetch, FetchOutcome};
use crate::navigation::Navigator;
use crate::timer::{TimerScheduler, TokioTimer};
use crate::transition::{Action, TransitionController};

/// What happened as a result of a session call, for the host to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The main screen was shown; the splash is finished.
    Navigated,
    FetchCompleted(FetchedAsset),
    FetchNotSuccessful(NotSuccessful),
}

struct FetchSource {
    fetcher: Arc<dyn AssetFetcher>,
    url: String,
}

pub struct SplashSession<N, T = TokioTimer> {
    controller: TransitionController,
    timer: T,
    navigator: N,
    source: Option<FetchSource>,
    fetch: Option<BackgroundFetch>,
}

impl<N: Navigator> SplashSession<N, TokioTimer> {
    /// Session using the tokio-backed timer.
    pub fn new(delay: Duration, navigator: N) -> Self {
        Self::with_timer(delay, navigator, TokioTimer::new())
    }
}

impl<N: Navigator, T: TimerScheduler> SplashSession<N, T> {
    pub fn with_timer(delay: Duration, navigator: N, timer: T) -> Self {
        Self {
            controller: TransitionController::new(delay),
            timer,
            navigator,
            source: None,
            fetch: None,
        }
    }

    /// Download `url` in the background once the session is created.
    pub fn with_fetch(mut self, fetcher: Arc<dyn AssetFetcher>, url: impl Into<String>) -> Self {
        self.source = Some(FetchSource {
            fetcher,
            url: url.into(),
        });
        self
    }

    pub fn handle_event(&mut self, event: LifecycleEvent) -> Vec<SessionEvent> {
        tracing::debug!(%event, phase = %self.controller.phase(), "Lifecycle event");
        let actions = self.controller.handle(event);
        self.apply(actions)
    }

    pub fn on_created(&mut self) -> Vec<SessionEvent> {
        self.handle_event(LifecycleEvent::Created)
    }

    pub fn on_foreground_enter(&mut self) -> Vec<SessionEvent> {
        self.handle_event(LifecycleEvent::ForegroundEnter)
    }

    pub fn on_foreground_exit(&mut self) -> Vec<SessionEvent> {
        self.handle_event(LifecycleEvent::ForegroundExit)
    }

    pub fn on_destroyed(&mut self) -> Vec<SessionEvent> {
        self.handle_event(LifecycleEvent::Destroyed)
    }

    /// Leave the splash now, e.g. on a tap.
    pub fn dismiss(&mut self) -> Vec<SessionEvent> {
        let actions = self.controller.dismiss();
        if actions.is_empty() {
            tracing::debug!(phase = %self.controller.phase(), "Ignoring dismiss");
        }
        self.apply(actions)
    }

    /// Deliver pending fetch results and elapsed timers.
    ///
    /// The fetch is drained first so a download that finished in the same
    /// frame as the timer is reported as completed rather than cancelled.
    pub fn process_events(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if let Some(fetch) = self.fetch.as_mut()
            && let Some(outcome) = fetch.poll()
        {
            events.push(match outcome {
                FetchOutcome::Completed(asset) => SessionEvent::FetchCompleted(asset),
                FetchOutcome::NotSuccessful(reason) => SessionEvent::FetchNotSuccessful(reason),
            });
        }

        while let Some(generation) = self.timer.poll_fired() {
            let actions = self.controller.on_timer_fired(generation);
            events.extend(self.apply(actions));
        }

        events
    }

    /// Host-side teardown after navigation: leave the foreground, destroy
    /// the session, and hand the navigator back.
    pub fn finish(mut self) -> N {
        if self.controller.phase().is_foreground() {
            self.on_foreground_exit();
        }
        self.on_destroyed();
        self.navigator
    }

    fn apply(&mut self, actions: Vec<Action>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for action in actions {
            match action {
                Action::StartFetch => self.start_fetch(),
                Action::ScheduleTransition { generation, delay } => {
                    tracing::debug!(%generation, delay_ms = delay.as_millis() as u64, "Transition scheduled");
                    self.timer.schedule(generation, delay);
                }
                Action::CancelTransition { generation } => {
                    tracing::debug!(%generation, "Transition cancelled");
                    self.timer.cancel(generation);
                }
                Action::CancelFetch => {
                    if let Some(fetch) = self.fetch.as_mut()
                        && fetch.cancel()
                    {
                        events.push(SessionEvent::FetchNotSuccessful(NotSuccessful::Cancelled));
                    }
                }
                Action::NavigateToMain => {
                    tracing::info!("Navigating to main screen");
                    self.navigator.navigate_to_main();
                    events.push(SessionEvent::Navigated);
                }
            }
        }
        events
    }

    fn start_fetch(&mut self) {
        if self.fetch.is_some() {
            return;
        }
        if let Some(source) = &self.source {
            self.fetch = Some(BackgroundFetch::start(
                Arc::clone(&source.fetcher),
                source.url.clone(),
            ));
        }
    }

    #[must_use]
    pub fn phase(&self) -> LifecyclePhase {
        self.controller.phase()
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.controller.delay()
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.controller.is_terminated()
    }

    #[must_use]
    pub fn has_pending_transition(&self) -> bool {
        self.controller.pending().is_some()
    }

    /// `None` when no fetch was configured or the session is not created yet.
    #[must_use]
    pub fn fetch_status(&self) -> Option<FetchStatus> {
        self.fetch.as_ref().map(BackgroundFetch::status)
    }

    #[must_use]
    pub fn fetch_failure(&self) -> Option<&NotSuccessful> {
        self.fetch.as_ref().and_then(BackgroundFetch::failure)
    }

    #[must_use]
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}
