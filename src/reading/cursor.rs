//! Unit cursors: where a session is in the content
//!
//! Three modes share one cursor type. What differs between them is a small
//! table of capabilities plus how `advance` finds the next unit.

use crate::content::{Bookmark, Content, NavigationError, ObjectId, TextRange, TextUnit};
use std::fmt;

/// Caller-supplied step to the next table cell
///
/// Must return `NavigationError::Exhausted` when there are no more cells.
pub type NextCellFn = Box<dyn FnMut(&TextRange) -> Result<TextRange, NavigationError>>;

/// Reading strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Read from the caret, moving the caret along
    Caret,
    /// Read from the review cursor, leaving the caret alone
    Review,
    /// Walk table cells with a caller-supplied step
    Table,
}

/// Per-mode behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeCapabilities {
    /// First step reads the starting range as-is instead of advancing
    pub reads_initial_position: bool,
    /// Cursor collapses to the end of each unit once it is queued
    pub collapses: bool,
    /// Unit asked of the builder
    pub unit: TextUnit,
}

impl CursorMode {
    pub fn capabilities(self) -> ModeCapabilities {
        match self {
            CursorMode::Caret | CursorMode::Review => ModeCapabilities {
                reads_initial_position: false,
                collapses: true,
                unit: TextUnit::ReadingChunk,
            },
            CursorMode::Table => ModeCapabilities {
                reads_initial_position: true,
                collapses: false,
                unit: TextUnit::Cell,
            },
        }
    }
}

/// Which host cursor follows the reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    Caret { review_follows: bool },
    Review,
    /// Nothing moves
    Passive,
}

/// What to read and from where
pub enum ReadRequest {
    Caret,
    Review,
    Table {
        /// Starting cell; the caret's cell when `None`
        start: Option<TextRange>,
        next_cell: NextCellFn,
        /// Whether the caret follows the cells being read
        update_caret: bool,
    },
}

impl ReadRequest {
    pub fn mode(&self) -> CursorMode {
        match self {
            ReadRequest::Caret => CursorMode::Caret,
            ReadRequest::Review => CursorMode::Review,
            ReadRequest::Table { .. } => CursorMode::Table,
        }
    }

    pub fn sync_target(&self, review_follows_caret: bool) -> SyncTarget {
        match self {
            ReadRequest::Caret => SyncTarget::Caret {
                review_follows: review_follows_caret,
            },
            ReadRequest::Review => SyncTarget::Review,
            ReadRequest::Table { update_caret: true, .. } => SyncTarget::Caret {
                review_follows: review_follows_caret,
            },
            ReadRequest::Table { .. } => SyncTarget::Passive,
        }
    }
}

impl fmt::Debug for ReadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadRequest::Caret => f.write_str("Caret"),
            ReadRequest::Review => f.write_str("Review"),
            ReadRequest::Table {
                start,
                update_caret,
                ..
            } => f
                .debug_struct("Table")
                .field("start", start)
                .field("update_caret", update_caret)
                .finish_non_exhaustive(),
        }
    }
}

/// Outcome of collapsing after a unit was queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collapse {
    Continue,
    Stop,
}

/// Current position of a reading session
pub struct UnitCursor {
    mode: CursorMode,
    range: TextRange,
    next_cell: Option<NextCellFn>,
}

impl UnitCursor {
    /// Build the starting cursor for `request`
    pub fn open<C: Content + ?Sized>(
        request: ReadRequest,
        content: &C,
    ) -> Result<Self, NavigationError> {
        let mode = request.mode();
        let (range, next_cell) = match request {
            ReadRequest::Caret => (TextRange::collapsed(content.caret()?), None),
            ReadRequest::Review => (TextRange::collapsed(content.review()?), None),
            ReadRequest::Table {
                start, next_cell, ..
            } => {
                let start = match start {
                    Some(cell) => cell,
                    None => content.unit_at(content.caret()?, TextUnit::Cell)?,
                };
                (start, Some(next_cell))
            }
        };

        Ok(Self {
            mode,
            range,
            next_cell,
        })
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    pub fn range(&self) -> &TextRange {
        &self.range
    }

    pub fn object(&self) -> ObjectId {
        self.range.object
    }

    pub fn bookmark(&self) -> Bookmark {
        Bookmark::of(&self.range)
    }

    /// Move to the following unit
    pub fn advance<C: Content + ?Sized>(&mut self, content: &C) -> Result<(), NavigationError> {
        let next = match self.mode {
            CursorMode::Caret | CursorMode::Review => {
                let mut next =
                    content.unit_at(self.range.end_position(), TextUnit::ReadingChunk)?;
                if next.end <= self.range.end {
                    return Err(NavigationError::Fault(format!(
                        "unit {}..{} does not move past {}",
                        next.start, next.end, self.range.end
                    )));
                }
                // Read on from the cursor, not from the start of its chunk
                next.start = next.start.max(self.range.end);
                next
            }
            CursorMode::Table => {
                let next_cell = self.next_cell.as_mut().ok_or_else(|| {
                    NavigationError::Fault("table cursor has no next-cell step".to_string())
                })?;
                next_cell(&self.range)?
            }
        };
        self.range = next;
        Ok(())
    }

    /// Collapse to the end of the unit just queued
    ///
    /// An empty unit cannot be collapsed past, so reading stops there.
    pub fn collapse(&mut self) -> Collapse {
        if !self.mode.capabilities().collapses {
            return Collapse::Continue;
        }
        if self.range.is_collapsed() {
            return Collapse::Stop;
        }
        self.range = TextRange::collapsed(self.range.end_position());
        Collapse::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{TextDocument, TextPosition};

    const DOC: ObjectId = ObjectId(3);

    #[test]
    fn test_capability_table() {
        let caret = CursorMode::Caret.capabilities();
        assert!(!caret.reads_initial_position);
        assert!(caret.collapses);
        assert_eq!(CursorMode::Review.capabilities(), caret);

        let table = CursorMode::Table.capabilities();
        assert!(table.reads_initial_position);
        assert!(!table.collapses);
        assert_eq!(table.unit, TextUnit::Cell);
    }

    #[test]
    fn test_sync_targets() {
        assert_eq!(
            ReadRequest::Caret.sync_target(true),
            SyncTarget::Caret { review_follows: true }
        );
        assert_eq!(ReadRequest::Review.sync_target(true), SyncTarget::Review);

        let passive = ReadRequest::Table {
            start: None,
            next_cell: Box::new(|_: &TextRange| Err(NavigationError::Exhausted)),
            update_caret: false,
        };
        assert_eq!(passive.sync_target(true), SyncTarget::Passive);
    }

    #[test]
    fn test_caret_cursor_reads_from_caret() {
        let mut doc = TextDocument::new(DOC, "one\ntwo\nthree\n");
        doc.set_caret(TextPosition::new(DOC, 5));

        let mut cursor = UnitCursor::open(ReadRequest::Caret, &doc).unwrap();
        assert!(cursor.range().is_collapsed());

        cursor.advance(&doc).unwrap();
        assert_eq!(doc.text(cursor.range()).unwrap(), "wo\n");
        assert_eq!(cursor.bookmark().position(), TextPosition::new(DOC, 5));

        assert_eq!(cursor.collapse(), Collapse::Continue);
        cursor.advance(&doc).unwrap();
        assert_eq!(doc.text(cursor.range()).unwrap(), "three\n");

        cursor.collapse();
        assert_eq!(cursor.advance(&doc), Err(NavigationError::Exhausted));
    }

    #[test]
    fn test_review_cursor_starts_at_review() {
        let mut doc = TextDocument::new(DOC, "one\ntwo\n");
        doc.set_review(TextPosition::new(DOC, 4));

        let mut cursor = UnitCursor::open(ReadRequest::Review, &doc).unwrap();
        cursor.advance(&doc).unwrap();
        assert_eq!(doc.text(cursor.range()).unwrap(), "two\n");
    }

    #[test]
    fn test_open_fails_without_caret() {
        let mut doc = TextDocument::new(DOC, "one");
        doc.close();
        assert!(UnitCursor::open(ReadRequest::Caret, &doc).is_err());
    }

    #[test]
    fn test_empty_unit_stops_collapse() {
        let doc = TextDocument::new(DOC, "");
        let mut cursor = UnitCursor::open(ReadRequest::Caret, &doc).unwrap();
        assert_eq!(cursor.collapse(), Collapse::Stop);
    }

    #[test]
    fn test_table_cursor_uses_next_cell() {
        let doc = TextDocument::new(DOC, "a\tb\nc\td\n");
        let (start, next_cell) = doc.column_walker(1);
        let request = ReadRequest::Table {
            start,
            next_cell,
            update_caret: false,
        };

        let mut cursor = UnitCursor::open(request, &doc).unwrap();
        assert_eq!(doc.text(cursor.range()).unwrap(), "b");
        assert_eq!(cursor.collapse(), Collapse::Continue);
        assert_eq!(doc.text(cursor.range()).unwrap(), "b");

        cursor.advance(&doc).unwrap();
        assert_eq!(doc.text(cursor.range()).unwrap(), "d");
        assert_eq!(cursor.advance(&doc), Err(NavigationError::Exhausted));
    }

    #[test]
    fn test_table_cursor_defaults_to_caret_cell() {
        let mut doc = TextDocument::new(DOC, "a\tb\nc\td\n");
        doc.set_caret(TextPosition::new(DOC, 6));
        let request = ReadRequest::Table {
            start: None,
            next_cell: Box::new(|_: &TextRange| Err(NavigationError::Exhausted)),
            update_caret: true,
        };

        let cursor = UnitCursor::open(request, &doc).unwrap();
        assert_eq!(doc.text(cursor.range()).unwrap(), "d");
    }
}
