//! Timed splash transition and background fetch orchestration.
//!
//! # Architecture
//!
//! ```text
//! LifecycleEvent → SplashSession → TransitionController::handle() → Actions
//!                        │
//!                        ├─ TimerScheduler   (single pending-transition slot)
//!                        ├─ BackgroundFetch  (abortable tokio task)
//!                        └─ Navigator        (host: show main screen)
//! ```
//!
//! The controller is a synchronous state machine. The session executes its
//! actions and, once per frame, drains elapsed timers and fetch results via
//! [`SplashSession::process_events`]. All session state is owned by that one
//! loop, so nothing here needs a lock.
//!
//! # Guarantees
//!
//! - At most one transition is pending; re-entering the foreground restarts
//!   the full delay.
//! - Navigation happens at most once, and never while backgrounded: a timer
//!   that elapsed but was not yet delivered is discarded by generation.
//! - The fetch never delays or shortens the splash. It is cancelled when the
//!   transition fires or the session is destroyed, and a late result is
//!   dropped.

mod fetch;
mod navigation;
mod session;
mod timer;
mod transition;

pub use fetch::{BackgroundFetch, FetchOutcome};
pub use navigation::Navigator;
pub use session::{SessionEvent, SplashSession};
pub use timer::{ManualTimer, TimerScheduler, TokioTimer};
pub use transition::{Action, TransitionController};

pub use splash_types::{
    FetchStatus, FetchedAsset, Generation, LifecycleEvent, LifecyclePhase, NotSuccessful,
};
