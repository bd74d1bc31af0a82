//! Navigable content contract
//!
//! The reader never walks text itself. It asks the host's content for the
//! unit at a position, the text of a range, and whether the object behind a
//! range is still usable, and it hands positions back when a unit starts
//! playing so the caret or review cursor can follow along.

pub mod document;

pub use document::TextDocument;

use crate::speech::CarriedState;
use std::fmt;
use thiserror::Error;

/// Identity of the object that owns a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A collapsed position inside an object's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub object: ObjectId,
    pub offset: usize,
}

impl TextPosition {
    pub fn new(object: ObjectId, offset: usize) -> Self {
        Self { object, offset }
    }
}

/// A half-open range `[start, end)` inside an object's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub object: ObjectId,
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(object: ObjectId, start: usize, end: usize) -> Self {
        Self { object, start, end }
    }

    /// Zero-length range at `pos`
    pub fn collapsed(pos: TextPosition) -> Self {
        Self::new(pos.object, pos.offset, pos.offset)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start >= self.end
    }

    pub fn start_position(&self) -> TextPosition {
        TextPosition::new(self.object, self.start)
    }

    pub fn end_position(&self) -> TextPosition {
        TextPosition::new(self.object, self.end)
    }
}

/// Opaque marker for where a unit began
///
/// Captured when a unit is queued and handed back to the content once the
/// unit starts playing, so the caret lands on the line being heard rather
/// than the line being prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark(TextPosition);

impl Bookmark {
    pub fn of(range: &TextRange) -> Self {
        Bookmark(range.start_position())
    }

    pub fn position(&self) -> TextPosition {
        self.0
    }
}

/// Granularity of a unit requested from content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextUnit {
    /// A line or similar chunk read in one breath
    ReadingChunk,
    /// One cell of a table walk
    Cell,
}

/// Why content is being spoken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutputReason {
    SayAll,
}

/// Outcome of a failed navigation step
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Expected end of content
    #[error("no more units")]
    Exhausted,

    /// The object died or can no longer be read
    #[error("object {0} is unavailable")]
    Unavailable(ObjectId),

    /// Anything else the content could not do
    #[error("{0}")]
    Fault(String),
}

/// Host content the reader navigates
pub trait Content {
    /// Whether the object still exists
    fn is_alive(&self, object: ObjectId) -> bool;

    /// Whether the object holds sensitive text while the display is locked
    fn is_restricted(&self, object: ObjectId) -> bool;

    /// Current caret position
    fn caret(&self) -> Result<TextPosition, NavigationError>;

    /// Current review cursor position
    fn review(&self) -> Result<TextPosition, NavigationError>;

    /// Unit that contains (or starts at) `at`
    ///
    /// Returns `NavigationError::Exhausted` when `at` is at or past the end.
    fn unit_at(&self, at: TextPosition, unit: TextUnit) -> Result<TextRange, NavigationError>;

    /// Text covered by `range`
    fn text(&self, range: &TextRange) -> Result<String, NavigationError>;

    /// Move the caret
    fn set_caret(&mut self, at: TextPosition);

    /// Move the review cursor
    fn set_review(&mut self, at: TextPosition);

    /// Keep the synthesis state of the unit that just started playing
    ///
    /// Lets later speech for the same object (e.g. after the user moves the
    /// caret) avoid repeating announcements already made.
    fn remember_state(&mut self, _object: ObjectId, _state: &CarriedState) {}
}
