/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Connection lifecycle states.
//!
//! The engine moves through these states at runtime from its reconnect
//! loop, so they are a plain enum guarded by [`StateCell`] rather than
//! compile-time typestates.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Lifecycle state of the client engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EngineState {
    /// Not started.
    #[default]
    Disconnected,
    /// Opening the TLS/TCP connection.
    Connecting,
    /// Connected, send and receive loops running.
    Active,
    /// Connection lost, waiting to reconnect.
    Reconnecting,
    /// Stopped on request. Terminal.
    Stopped,
}

impl EngineState {
    /// Returns true if moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Disconnected, Self::Connecting)
                | (Self::Connecting, Self::Active)
                | (Self::Connecting, Self::Reconnecting)
                | (Self::Active, Self::Reconnecting)
                | (Self::Reconnecting, Self::Connecting)
                | (Self::Disconnected, Self::Stopped)
                | (Self::Connecting, Self::Stopped)
                | (Self::Active, Self::Stopped)
                | (Self::Reconnecting, Self::Stopped)
        )
    }

    /// Returns true for the terminal state.
    #[must_use]
    pub const fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "DISCONNECTED"),
            Self::Connecting => write!(f, "CONNECTING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Reconnecting => write!(f, "RECONNECTING"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Shared holder of the current [`EngineState`].
#[derive(Debug, Default)]
pub struct StateCell {
    state: RwLock<EngineState>,
}

impl StateCell {
    /// Creates a cell in the `Disconnected` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub fn get(&self) -> EngineState {
        *self.state.read()
    }

    /// Moves to `next` if the transition is legal.
    ///
    /// Returns false and leaves the state alone otherwise; in particular
    /// nothing leaves `Stopped`.
    pub fn transition(&self, next: EngineState) -> bool {
        let mut state = self.state.write();
        if *state == next {
            return true;
        }
        if !state.can_transition_to(next) {
            trace!(from = %*state, to = %next, "ignored state transition");
            return false;
        }
        trace!(from = %*state, to = %next, "state transition");
        *state = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), EngineState::Disconnected);
        assert!(cell.transition(EngineState::Connecting));
        assert!(cell.transition(EngineState::Active));
        assert!(cell.transition(EngineState::Reconnecting));
        assert!(cell.transition(EngineState::Connecting));
        assert!(cell.transition(EngineState::Stopped));
        assert!(cell.get().is_stopped());
    }

    #[test]
    fn test_stopped_is_terminal() {
        let cell = StateCell::new();
        assert!(cell.transition(EngineState::Stopped));
        assert!(!cell.transition(EngineState::Connecting));
        assert_eq!(cell.get(), EngineState::Stopped);
    }

    #[test]
    fn test_illegal_transition() {
        assert!(!EngineState::Disconnected.can_transition_to(EngineState::Active));
        assert!(!EngineState::Active.can_transition_to(EngineState::Connecting));
    }

    #[test]
    fn test_display() {
        assert_eq!(EngineState::Reconnecting.to_string(), "RECONNECTING");
    }
}
