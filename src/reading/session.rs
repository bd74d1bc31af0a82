//! One continuous read
//!
//! A session queues one unit per step. Each unit's speech starts with a
//! `UnitReached` marker, so the caret only moves when the unit is actually
//! heard. Units that the playback queue absorbs without a pause are counted;
//! the session keeps reading ahead through the scheduler until the count
//! hits the buffering cap, then forces playback and waits for markers.

use super::cursor::{Collapse, SyncTarget, UnitCursor};
use super::{ReaderMessage, Scheduler, SessionHandle, UnitId};
use crate::config::ReadingConfig;
use crate::content::{Bookmark, Content, NavigationError, ObjectId, OutputReason};
use crate::speech::{CarriedState, PlaybackQueue, SequenceBuilder, SpeechItem};
use log::{debug, error, info, warn};

/// Why a session stopped reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Reached the end of the content
    Exhausted,
    /// The object died, or its text may not be read on a locked display
    Unavailable,
    /// Navigation failed unexpectedly
    NavigationFault,
    /// Speech could not be queued
    PlaybackFault,
    /// `stop()` was called
    Stopped,
}

/// Collaborators a session works with during one step
pub(crate) struct Step<'a, C: Content + ?Sized> {
    pub builder: &'a dyn SequenceBuilder,
    pub queue: &'a mut dyn PlaybackQueue,
    pub scheduler: &'a mut dyn Scheduler,
    pub content: &'a mut C,
    pub config: &'a ReadingConfig,
}

pub struct ReadingSession {
    handle: SessionHandle,
    /// `None` once the session has finished reading
    cursor: Option<UnitCursor>,
    sync: SyncTarget,
    carried: CarriedState,
    /// Units queued without a pause whose markers have not fired yet
    buffered: usize,
    initial: bool,
    last_unit: UnitId,
    last_reached: UnitId,
    end_reason: Option<EndReason>,
    /// Could not queue the end-of-session marker; drop right away
    closed: bool,
}

impl ReadingSession {
    pub(crate) fn new(handle: SessionHandle, cursor: UnitCursor, sync: SyncTarget) -> Self {
        Self {
            handle,
            cursor: Some(cursor),
            sync,
            carried: CarriedState::default(),
            buffered: 0,
            initial: true,
            last_unit: 0,
            last_reached: 0,
            end_reason: None,
            closed: false,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// Still reading (not waiting for the last queued speech to play)
    pub fn is_reading(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Queue the next unit
    pub(crate) fn next_unit<C: Content + ?Sized>(&mut self, step: &mut Step<'_, C>) {
        let Some(cursor) = self.cursor.as_mut() else {
            debug!("{} has stopped reading", self.handle);
            return;
        };

        let object = cursor.object();
        if !step.content.is_alive(object) {
            debug!("Object {} is gone, ending {}", object, self.handle);
            return self.finish(step, EndReason::Unavailable);
        }
        // Nothing more may be spoken from sensitive content on a locked display
        if step.content.is_restricted(object) {
            warn!("Object {} is restricted, ending {}", object, self.handle);
            return self.finish(step, EndReason::Unavailable);
        }

        let caps = cursor.mode().capabilities();
        if !self.initial || !caps.reads_initial_position {
            if let Err(e) = cursor.advance(&*step.content) {
                return self.finish_navigation(step, e);
            }
        }
        self.initial = false;

        let range = *cursor.range();
        let bookmark = cursor.bookmark();
        let text = match step.content.text(&range) {
            Ok(text) => text,
            Err(e) => return self.finish_navigation(step, e),
        };

        let mut state = self.carried.clone();
        let mut seq = step
            .builder
            .build(&text, &range, caps.unit, OutputReason::SayAll, &mut state);

        self.last_unit += 1;
        let unit = self.last_unit;
        // First item, so it fires as this unit starts rather than when it ends
        seq.insert(
            0,
            SpeechItem::Callback(ReaderMessage::UnitReached {
                session: self.handle,
                unit,
                object,
                bookmark,
                state: state.clone(),
            }),
        );
        seq.push(SpeechItem::Break(step.config.unit_break_ms));

        let spoke = match step.queue.submit(seq) {
            Ok(spoke) => spoke,
            Err(e) => {
                error!("Failed to queue unit {} of {}: {}", unit, self.handle, e);
                return self.finish(step, EndReason::PlaybackFault);
            }
        };
        debug!(
            "{} queued unit {} at {}..{} (pause: {})",
            self.handle, unit, range.start, range.end, spoke
        );
        self.carried = state;

        if caps.collapses && cursor.collapse() == Collapse::Stop {
            return self.finish(step, EndReason::Exhausted);
        }

        if spoke {
            return;
        }

        self.buffered += 1;
        if self.buffered < step.config.buffer_cap {
            step.scheduler.schedule(ReaderMessage::Continue(self.handle));
        } else {
            debug!("{} buffered {} units, forcing playback", self.handle, self.buffered);
            if let Err(e) = step.queue.flush() {
                error!("Failed to flush speech for {}: {}", self.handle, e);
                return self.finish(step, EndReason::PlaybackFault);
            }
            // The oldest buffered unit is now playing; its marker resumes us
            self.buffered -= 1;
        }
    }

    /// Playback has started speaking `unit`
    pub(crate) fn unit_reached<C: Content + ?Sized>(
        &mut self,
        step: &mut Step<'_, C>,
        unit: UnitId,
        object: ObjectId,
        bookmark: Bookmark,
        state: &CarriedState,
    ) {
        if unit <= self.last_reached {
            warn!(
                "{} got unit {} after unit {}, ignoring",
                self.handle, unit, self.last_reached
            );
            return;
        }
        self.last_reached = unit;
        debug!("{} reached unit {}", self.handle, unit);

        let position = bookmark.position();
        match self.sync {
            SyncTarget::Caret { review_follows } => {
                step.content.set_caret(position);
                if review_follows {
                    step.content.set_review(position);
                }
            }
            SyncTarget::Review => step.content.set_review(position),
            SyncTarget::Passive => {}
        }
        step.content.remember_state(object, state);

        if self.buffered == 0 {
            // This was the last unit queued, so read on
            self.next_unit(step);
        } else {
            self.buffered -= 1;
        }
    }

    fn finish_navigation<C: Content + ?Sized>(
        &mut self,
        step: &mut Step<'_, C>,
        err: NavigationError,
    ) {
        let reason = match err {
            NavigationError::Exhausted => EndReason::Exhausted,
            NavigationError::Unavailable(_) => EndReason::Unavailable,
            NavigationError::Fault(msg) => {
                error!("Navigation fault in {}: {}", self.handle, msg);
                EndReason::NavigationFault
            }
        };
        self.finish(step, reason);
    }

    /// Stop reading, deregistering once the queued speech has played
    ///
    /// The end marker goes out in its own utterance so everything still
    /// buffered is spoken, and synced, before the session goes away.
    pub(crate) fn finish<C: Content + ?Sized>(&mut self, step: &mut Step<'_, C>, reason: EndReason) {
        if self.cursor.take().is_none() {
            return;
        }
        info!("{} finished reading: {:?}", self.handle, reason);
        self.end_reason = Some(reason);

        let seq = vec![
            SpeechItem::Callback(ReaderMessage::Finished(self.handle)),
            SpeechItem::EndUtterance,
        ];
        if let Err(e) = step.queue.submit(seq) {
            error!("Failed to queue end of {}: {}", self.handle, e);
            self.closed = true;
        }
    }
}
