//! The continuous reader
//!
//! Owns the collaborators and the single session slot. Hosts call
//! `start_read` to begin, feed every scheduled continuation and every played
//! marker back through `dispatch`, and call `stop` when the user interrupts.

use super::cursor::{ReadRequest, UnitCursor};
use super::session::{EndReason, ReadingSession, Step};
use super::{DeferredQueue, ReaderMessage, Scheduler, SessionHandle, SessionRegistry};
use crate::config::ReadingConfig;
use crate::content::Content;
use crate::speech::{PlaybackQueue, SequenceBuilder};
use crate::{Result, SayAllError};
use log::{debug, info, warn};

pub struct ContinuousReader<B, Q, S> {
    builder: B,
    queue: Q,
    scheduler: S,
    config: ReadingConfig,
    registry: SessionRegistry,
    session: Option<ReadingSession>,
    last_end: Option<EndReason>,
}

impl<B, Q, S> ContinuousReader<B, Q, S>
where
    B: SequenceBuilder,
    Q: PlaybackQueue,
    S: Scheduler,
{
    pub fn new(builder: B, queue: Q, scheduler: S, config: ReadingConfig) -> Self {
        Self {
            builder,
            queue,
            scheduler,
            config,
            registry: SessionRegistry::new(),
            session: None,
            last_end: None,
        }
    }

    /// Begin reading, superseding any session in progress
    ///
    /// Fails only if no starting cursor can be built; the previous session
    /// is left alone in that case.
    pub fn start_read<C: Content + ?Sized>(
        &mut self,
        request: ReadRequest,
        content: &mut C,
    ) -> Result<SessionHandle> {
        let mode = request.mode();
        let sync = request.sync_target(self.config.review_follows_caret);
        let cursor = UnitCursor::open(request, &*content).map_err(|e| {
            warn!("Unable to start {:?} reading: {}", mode, e);
            SayAllError::Construction(e)
        })?;

        if let Some(previous) = self.session.take() {
            info!("{} superseded", previous.handle());
            self.queue.discard_pending();
        }

        let handle = self.registry.start();
        info!("Starting {:?} reading as {}", mode, handle);
        self.session = Some(ReadingSession::new(handle, cursor, sync));
        self.last_end = None;

        self.with_session(content, |session, step| session.next_unit(step));
        Ok(handle)
    }

    /// The session currently reading, if any
    pub fn active_session(&self) -> Option<SessionHandle> {
        self.registry.active()
    }

    pub fn is_reading(&self) -> bool {
        self.registry.active().is_some()
    }

    /// End the active session without reading the rest
    ///
    /// Speech already queued is not cancelled, but its markers no longer
    /// have any effect.
    pub fn stop(&mut self) {
        if let Some(handle) = self.registry.stop() {
            info!("{} stopped", handle);
            if let Some(session) = self.session.take() {
                self.last_end = Some(session.end_reason().unwrap_or(EndReason::Stopped));
            }
        }
    }

    /// Deliver a scheduled continuation or a played marker
    pub fn dispatch<C: Content + ?Sized>(&mut self, message: ReaderMessage, content: &mut C) {
        let handle = message.session();
        if !self.registry.is_current(handle) {
            debug!("Dropping message for stale {}", handle);
            return;
        }

        match message {
            ReaderMessage::Continue(_) => {
                self.with_session(content, |session, step| session.next_unit(step));
            }
            ReaderMessage::UnitReached {
                unit,
                object,
                bookmark,
                state,
                ..
            } => {
                self.with_session(content, |session, step| {
                    session.unit_reached(step, unit, object, bookmark, &state)
                });
            }
            ReaderMessage::Finished(_) => {
                debug!("{} has spoken everything it queued", handle);
                self.close();
            }
        }
    }

    /// Units queued without a pause and not yet reached
    pub fn buffered_units(&self) -> usize {
        self.session.as_ref().map_or(0, ReadingSession::buffered)
    }

    /// Why the most recent session stopped reading, once it has
    pub fn last_end_reason(&self) -> Option<EndReason> {
        self.session
            .as_ref()
            .and_then(ReadingSession::end_reason)
            .or(self.last_end)
    }

    pub fn config(&self) -> &ReadingConfig {
        &self.config
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    fn with_session<C, F>(&mut self, content: &mut C, f: F)
    where
        C: Content + ?Sized,
        F: FnOnce(&mut ReadingSession, &mut Step<'_, C>),
    {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let mut step = Step {
            builder: &self.builder,
            queue: &mut self.queue,
            scheduler: &mut self.scheduler,
            content,
            config: &self.config,
        };
        f(session, &mut step);

        if session.is_closed() {
            self.close();
        }
    }

    fn close(&mut self) {
        if let Some(session) = self.session.take() {
            self.last_end = session.end_reason();
            self.registry.stop();
            info!("{} closed", session.handle());
        }
    }
}

impl<B, Q> ContinuousReader<B, Q, DeferredQueue>
where
    B: SequenceBuilder,
    Q: PlaybackQueue,
{
    /// Dispatch every queued continuation, returning how many ran
    pub fn run_deferred<C: Content + ?Sized>(&mut self, content: &mut C) -> usize {
        let mut ran = 0;
        while let Some(message) = self.scheduler.pop() {
            self.dispatch(message, content);
            ran += 1;
        }
        ran
    }
}
