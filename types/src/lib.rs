//! Core domain types for the splash controller.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod asset;
mod ids;
mod lifecycle;

pub use asset::{AssetFormat, FetchStatus, FetchedAsset, NotSuccessful};
pub use ids::Generation;
pub use lifecycle::{InvalidTransition, LifecycleEvent, LifecyclePhase};

use std::time::Duration;

/// How long the splash stays up once the screen is in the foreground.
pub const DEFAULT_SPLASH_DURATION: Duration = Duration::from_millis(2500);

/// Shortest delay accepted for the transition timer.
pub const MIN_SPLASH_DURATION: Duration = Duration::from_millis(1);
