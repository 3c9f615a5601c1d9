//! Host lifecycle as an explicit finite-state machine.
//!
//! ```text
//! Created --ForegroundEnter--> Foreground <--ForegroundEnter-- Background
//!                                  |                              ^
//!                                  +-------ForegroundExit---------+
//!
//! (any live phase) --Destroyed--> Destroyed
//! ```
//!
//! Repeating the event that led into the current phase is accepted and leaves
//! the phase unchanged. Everything else is rejected with [`InvalidTransition`].

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    Created,
    Foreground,
    Background,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Created,
    ForegroundEnter,
    ForegroundExit,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("lifecycle event {event} is not valid in phase {from}")]
pub struct InvalidTransition {
    pub from: LifecyclePhase,
    pub event: LifecycleEvent,
}

impl LifecyclePhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Foreground => "foreground",
            Self::Background => "background",
            Self::Destroyed => "destroyed",
        }
    }

    #[must_use]
    pub const fn is_foreground(self) -> bool {
        matches!(self, Self::Foreground)
    }

    #[must_use]
    pub const fn is_destroyed(self) -> bool {
        matches!(self, Self::Destroyed)
    }

    /// Compute the phase reached by applying `event`.
    pub fn apply(self, event: LifecycleEvent) -> Result<Self, InvalidTransition> {
        use LifecycleEvent as E;

        let next = match (self, event) {
            (Self::Created, E::Created) => Self::Created,
            (Self::Created | Self::Foreground | Self::Background, E::ForegroundEnter) => {
                Self::Foreground
            }
            (Self::Foreground | Self::Background, E::ForegroundExit) => Self::Background,
            (Self::Created | Self::Foreground | Self::Background, E::Destroyed) => Self::Destroyed,
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        Ok(next)
    }
}

impl LifecycleEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::ForegroundEnter => "foreground_enter",
            Self::ForegroundExit => "foreground_exit",
            Self::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
