//! Shared fixtures for the integration tests

#![allow(dead_code)]

use sayall::config::ReadingConfig;
use sayall::content::{
    Content, NavigationError, ObjectId, TextDocument, TextPosition, TextRange, TextUnit,
};
use sayall::reading::{ContinuousReader, DeferredQueue, ReaderMessage};
use sayall::speech::{
    CarriedState, PlaybackQueue, SequenceBuilder, SpeechItem, SpeechSequence, TextSequenceBuilder,
};
use sayall::{Result, SayAllError};
use std::cell::Cell;
use std::collections::VecDeque;

pub const DOC: ObjectId = ObjectId(1);

/// `n` numbered lines without sentence punctuation
pub fn numbered_lines(n: usize) -> String {
    (1..=n).map(|i| format!("line {}\n", i)).collect()
}

/// Playback queue with scripted pause results
///
/// Markers wait in `pending` until a pause, a flush or an utterance end
/// releases them to `playable`, mirroring a real coalescing queue.
#[derive(Default)]
pub struct ScriptedQueue {
    /// Pause results handed out in order
    pub script: VecDeque<bool>,
    /// Result once the script runs out
    pub default_pause: bool,
    /// Fail every submit
    pub fail: bool,
    pub submissions: Vec<SpeechSequence>,
    pub flushes: usize,
    pub discards: usize,
    pending: Vec<ReaderMessage>,
    playable: VecDeque<ReaderMessage>,
    /// Most unit markers ever held back at once
    pub max_pending_units: usize,
}

impl ScriptedQueue {
    pub fn always(pause: bool) -> Self {
        Self {
            default_pause: pause,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Next marker playback would reach
    pub fn play_next(&mut self) -> Option<ReaderMessage> {
        self.playable.pop_front()
    }

    /// Submissions that carried a unit (as opposed to the end marker)
    pub fn unit_submissions(&self) -> Vec<&SpeechSequence> {
        self.submissions
            .iter()
            .filter(|seq| {
                seq.iter().any(|item| {
                    matches!(item, SpeechItem::Callback(ReaderMessage::UnitReached { .. }))
                })
            })
            .collect()
    }

    /// Spoken text of every unit submission, in order
    pub fn unit_texts(&self) -> Vec<String> {
        self.unit_submissions()
            .into_iter()
            .map(|seq| sayall::speech::spoken_text(seq))
            .collect()
    }

    fn release(&mut self) {
        self.playable.extend(self.pending.drain(..));
    }

    fn pending_units(&self) -> usize {
        self.pending
            .iter()
            .filter(|m| matches!(m, ReaderMessage::UnitReached { .. }))
            .count()
    }
}

impl PlaybackQueue for ScriptedQueue {
    fn submit(&mut self, seq: SpeechSequence) -> Result<bool> {
        if self.fail {
            return Err(SayAllError::Playback("scripted failure".to_string()));
        }
        self.submissions.push(seq.clone());

        let ends_utterance = seq.contains(&SpeechItem::EndUtterance);
        for item in seq {
            if let SpeechItem::Callback(message) = item {
                self.pending.push(message);
            }
        }
        self.max_pending_units = self.max_pending_units.max(self.pending_units());

        if ends_utterance {
            self.release();
            return Ok(true);
        }
        let pause = self.script.pop_front().unwrap_or(self.default_pause);
        if pause {
            self.release();
        }
        Ok(pause)
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        self.release();
        Ok(())
    }

    fn discard_pending(&mut self) {
        self.discards += 1;
        self.pending.clear();
    }
}

pub type TestReader = ContinuousReader<TextSequenceBuilder, ScriptedQueue, DeferredQueue>;

pub fn reader(queue: ScriptedQueue, buffer_cap: usize) -> TestReader {
    let config = ReadingConfig {
        buffer_cap,
        ..ReadingConfig::default()
    };
    ContinuousReader::new(TextSequenceBuilder::new(), queue, DeferredQueue::new(), config)
}

/// Run deferred continuations and play markers until nothing is left
///
/// Checks after every step that the reader never buffers past its cap.
pub fn pump<B: SequenceBuilder, C: Content + ?Sized>(
    reader: &mut ContinuousReader<B, ScriptedQueue, DeferredQueue>,
    content: &mut C,
) {
    let cap = reader.config().buffer_cap;
    for _ in 0..10_000 {
        reader.run_deferred(content);
        assert!(reader.buffered_units() <= cap);

        match reader.queue_mut().play_next() {
            Some(message) => {
                reader.dispatch(message, content);
                assert!(reader.buffered_units() <= cap);
            }
            None if reader.scheduler().is_empty() => return,
            None => {}
        }
    }
    panic!("reader did not settle");
}

/// Wraps a `TextDocument` with injectable failures and a record of moves
pub struct FlakyContent {
    pub doc: TextDocument,
    /// Object dies after this many liveness checks
    pub alive_checks: Option<usize>,
    checks: Cell<usize>,
    /// Reading-chunk lookups fault after this many succeed
    pub fault_after: Option<usize>,
    lookups: Cell<usize>,
    /// Returned from `caret()` instead of the real caret
    pub caret_error: Option<NavigationError>,
    pub caret_moves: Vec<usize>,
    pub review_moves: Vec<usize>,
    pub remembered: Vec<(ObjectId, CarriedState)>,
}

impl FlakyContent {
    pub fn new(text: &str) -> Self {
        Self {
            doc: TextDocument::new(DOC, text),
            alive_checks: None,
            checks: Cell::new(0),
            fault_after: None,
            lookups: Cell::new(0),
            caret_error: None,
            caret_moves: Vec::new(),
            review_moves: Vec::new(),
            remembered: Vec::new(),
        }
    }
}

impl Content for FlakyContent {
    fn is_alive(&self, object: ObjectId) -> bool {
        let checks = self.checks.get() + 1;
        self.checks.set(checks);
        if self.alive_checks.is_some_and(|limit| checks > limit) {
            return false;
        }
        self.doc.is_alive(object)
    }

    fn is_restricted(&self, object: ObjectId) -> bool {
        self.doc.is_restricted(object)
    }

    fn caret(&self) -> std::result::Result<TextPosition, NavigationError> {
        match &self.caret_error {
            Some(e) => Err(e.clone()),
            None => self.doc.caret(),
        }
    }

    fn review(&self) -> std::result::Result<TextPosition, NavigationError> {
        self.doc.review()
    }

    fn unit_at(
        &self,
        at: TextPosition,
        unit: TextUnit,
    ) -> std::result::Result<TextRange, NavigationError> {
        let lookups = self.lookups.get() + 1;
        self.lookups.set(lookups);
        if self.fault_after.is_some_and(|limit| lookups > limit) {
            return Err(NavigationError::Fault("lookup failed".to_string()));
        }
        self.doc.unit_at(at, unit)
    }

    fn text(&self, range: &TextRange) -> std::result::Result<String, NavigationError> {
        self.doc.text(range)
    }

    fn set_caret(&mut self, at: TextPosition) {
        self.caret_moves.push(at.offset);
        self.doc.set_caret(at);
    }

    fn set_review(&mut self, at: TextPosition) {
        self.review_moves.push(at.offset);
        self.doc.set_review(at);
    }

    fn remember_state(&mut self, object: ObjectId, state: &CarriedState) {
        self.remembered.push((object, state.clone()));
        self.doc.remember_state(object, state);
    }
}
