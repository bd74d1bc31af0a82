//! The single active-session slot
//!
//! Sessions are identified by a generation number. Starting a session bumps
//! the generation, so every message still in flight for an older session
//! compares unequal and is ignored. The registry does not own sessions.

use log::debug;
use std::fmt;

/// Non-owning reference to a reading session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    pub(crate) generation: u64,
}

impl SessionHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session {}", self.generation)
    }
}

/// Tracks which session, if any, is currently reading
#[derive(Debug, Default)]
pub struct SessionRegistry {
    last_generation: u64,
    active: Option<SessionHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session, superseding any active one
    pub fn start(&mut self) -> SessionHandle {
        self.last_generation += 1;
        let handle = SessionHandle {
            generation: self.last_generation,
        };
        if let Some(previous) = self.active.replace(handle) {
            debug!("{} superseded by {}", previous, handle);
        }
        handle
    }

    /// The active session, if any
    pub fn active(&self) -> Option<SessionHandle> {
        self.active
    }

    pub fn is_current(&self, handle: SessionHandle) -> bool {
        self.active == Some(handle)
    }

    /// Clear the slot, returning what was there
    pub fn stop(&mut self) -> Option<SessionHandle> {
        self.active.take()
    }
}
