//! In-memory text document
//!
//! A plain text buffer that implements `Content`: every line is a reading
//! chunk, and tab-separated fields on a line are table cells. Used by the
//! command line reader and handy for exercising the engine.

use super::{Content, NavigationError, ObjectId, TextPosition, TextRange, TextUnit};
use crate::reading::NextCellFn;
use crate::speech::CarriedState;
use log::debug;
use std::path::Path;

/// Text buffer with a caret and an independent review cursor
pub struct TextDocument {
    object: ObjectId,
    text: String,

    /// Cleared when the document is closed underneath a reader
    alive: bool,

    /// Document holds secrets (passwords, one-time codes)
    sensitive: bool,

    /// Display is locked; sensitive text must not be read
    locked: bool,

    /// Caret byte offset
    caret: usize,

    /// Review cursor byte offset
    review: usize,

    /// Synthesis state of the last unit that started playing
    last_state: Option<CarriedState>,
}

impl TextDocument {
    pub fn new(object: ObjectId, text: impl Into<String>) -> Self {
        Self {
            object,
            text: text.into(),
            alive: true,
            sensitive: false,
            locked: false,
            caret: 0,
            review: 0,
            last_state: None,
        }
    }

    /// Load a document from disk
    pub fn from_file(object: ObjectId, path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        debug!("Loaded {} bytes from {:?}", text.len(), path);
        Ok(Self::new(object, text))
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn text_content(&self) -> &str {
        &self.text
    }

    /// Mark the document as closed
    pub fn close(&mut self) {
        self.alive = false;
    }

    pub fn set_sensitive(&mut self, sensitive: bool) {
        self.sensitive = sensitive;
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn caret_offset(&self) -> usize {
        self.caret
    }

    pub fn review_offset(&self) -> usize {
        self.review
    }

    pub fn last_state(&self) -> Option<&CarriedState> {
        self.last_state.as_ref()
    }

    /// Number of lines (a trailing newline does not start a new line)
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }

    /// 1-based line number containing `offset`
    pub fn line_number(&self, offset: usize) -> usize {
        let offset = offset.min(self.text.len());
        self.text.as_bytes()[..offset]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1
    }

    /// Byte offset where 1-based line `line` starts, clamped to the end
    pub fn line_start(&self, line: usize) -> usize {
        if line <= 1 {
            return 0;
        }
        self.text
            .match_indices('\n')
            .nth(line - 2)
            .map(|(i, _)| i + 1)
            .unwrap_or(self.text.len())
    }

    /// Put both the caret and review cursor at the start of `line`
    pub fn move_to_line(&mut self, line: usize) {
        let offset = self.line_start(line);
        self.caret = offset;
        self.review = offset;
    }

    fn line_bounds(&self, offset: usize) -> (usize, usize) {
        let start = self.text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let end = self.text[offset..]
            .find('\n')
            .map_or(self.text.len(), |i| offset + i + 1);
        (start, end)
    }

    fn check_offset(&self, offset: usize) -> Result<(), NavigationError> {
        if !self.text.is_char_boundary(offset) {
            return Err(NavigationError::Fault(format!(
                "offset {} is not on a character boundary",
                offset
            )));
        }
        Ok(())
    }

    /// Every cell in tab-separated `column`, top to bottom
    ///
    /// Rows with fewer fields are skipped.
    pub fn column_cells(&self, column: usize) -> Vec<TextRange> {
        let mut cells = Vec::new();
        let mut line_start = 0;
        for line in self.text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            let mut cell_start = line_start;
            for (idx, field) in content.split('\t').enumerate() {
                if idx == column {
                    cells.push(TextRange::new(
                        self.object,
                        cell_start,
                        cell_start + field.len(),
                    ));
                    break;
                }
                cell_start += field.len() + 1;
            }
            line_start += line.len();
        }
        cells
    }

    /// Starting cell and next-cell function for reading down `column`
    ///
    /// Reading starts at the row holding the caret, or the first row with
    /// that column after it.
    pub fn column_walker(&self, column: usize) -> (Option<TextRange>, NextCellFn) {
        let cells = self.column_cells(column);
        let caret_line = self.line_start(self.line_number(self.caret));
        let start = cells.iter().find(|c| c.end >= caret_line).copied();

        let next_cell: NextCellFn = Box::new(move |current: &TextRange| {
            let idx = cells
                .iter()
                .position(|c| c.start == current.start)
                .ok_or_else(|| {
                    NavigationError::Fault(format!("cell at {} is not in this column", current.start))
                })?;
            cells
                .get(idx + 1)
                .copied()
                .ok_or(NavigationError::Exhausted)
        });

        (start, next_cell)
    }
}

impl Content for TextDocument {
    fn is_alive(&self, object: ObjectId) -> bool {
        self.alive && object == self.object
    }

    fn is_restricted(&self, object: ObjectId) -> bool {
        object == self.object && self.sensitive && self.locked
    }

    fn caret(&self) -> Result<TextPosition, NavigationError> {
        if !self.alive {
            return Err(NavigationError::Unavailable(self.object));
        }
        Ok(TextPosition::new(self.object, self.caret))
    }

    fn review(&self) -> Result<TextPosition, NavigationError> {
        if !self.alive {
            return Err(NavigationError::Unavailable(self.object));
        }
        Ok(TextPosition::new(self.object, self.review))
    }

    fn unit_at(&self, at: TextPosition, unit: TextUnit) -> Result<TextRange, NavigationError> {
        if !self.is_alive(at.object) {
            return Err(NavigationError::Unavailable(at.object));
        }
        if at.offset >= self.text.len() {
            return Err(NavigationError::Exhausted);
        }
        self.check_offset(at.offset)?;

        let (line_start, line_end) = self.line_bounds(at.offset);
        let range = match unit {
            TextUnit::ReadingChunk => TextRange::new(self.object, line_start, line_end),
            TextUnit::Cell => {
                let content_end = line_start
                    + self.text[line_start..line_end]
                        .trim_end_matches(['\n', '\r'])
                        .len();
                let pos = at.offset.min(content_end);
                let start = self.text[line_start..pos]
                    .rfind('\t')
                    .map_or(line_start, |i| line_start + i + 1);
                let end = self.text[pos..content_end]
                    .find('\t')
                    .map_or(content_end, |i| pos + i);
                TextRange::new(self.object, start, end)
            }
        };
        Ok(range)
    }

    fn text(&self, range: &TextRange) -> Result<String, NavigationError> {
        if !self.is_alive(range.object) {
            return Err(NavigationError::Unavailable(range.object));
        }
        self.text
            .get(range.start..range.end)
            .map(str::to_string)
            .ok_or_else(|| {
                NavigationError::Fault(format!(
                    "range {}..{} is outside the document",
                    range.start, range.end
                ))
            })
    }

    fn set_caret(&mut self, at: TextPosition) {
        if at.object == self.object {
            self.caret = at.offset.min(self.text.len());
        }
    }

    fn set_review(&mut self, at: TextPosition) {
        if at.object == self.object {
            self.review = at.offset.min(self.text.len());
        }
    }

    fn remember_state(&mut self, object: ObjectId, state: &CarriedState) {
        if object == self.object {
            self.last_state = Some(state.clone());
        }
    }
}
