//! Messages delivered back into the reader
//!
//! Scheduled continuations and markers embedded in speech are plain data,
//! not closures: each carries the handle of the session that produced it,
//! and the reader drops any whose session is no longer the active one.

use super::SessionHandle;
use crate::content::{Bookmark, ObjectId};
use crate::speech::CarriedState;

/// Sequence number of a unit within its session, starting at 1
pub type UnitId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderMessage {
    /// Read the next unit (scheduled after a unit was absorbed without a pause)
    Continue(SessionHandle),

    /// Playback has started speaking a unit
    UnitReached {
        session: SessionHandle,
        unit: UnitId,
        object: ObjectId,
        bookmark: Bookmark,
        state: CarriedState,
    },

    /// Everything the session queued has been spoken
    Finished(SessionHandle),
}

impl ReaderMessage {
    /// Session this message belongs to
    pub fn session(&self) -> SessionHandle {
        match self {
            ReaderMessage::Continue(session) | ReaderMessage::Finished(session) => *session,
            ReaderMessage::UnitReached { session, .. } => *session,
        }
    }
}
