//! Continuous reading ("say all")
//!
//! - `cursor`: where a session is and how each mode moves
//! - `session`: the per-unit read loop and buffering
//! - `registry`: the single active-session slot
//! - `reader`: the entry point hosts drive

pub mod cursor;
pub mod message;
pub mod reader;
pub mod registry;
pub mod scheduler;
pub mod session;

pub use cursor::{CursorMode, ModeCapabilities, NextCellFn, ReadRequest, SyncTarget, UnitCursor};
pub use message::{ReaderMessage, UnitId};
pub use reader::ContinuousReader;
pub use registry::{SessionHandle, SessionRegistry};
pub use scheduler::{DeferredQueue, Scheduler};
pub use session::{EndReason, ReadingSession};
