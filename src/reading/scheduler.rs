//! Deferred continuations
//!
//! The reader never reads the next unit from inside the current step; it
//! asks the host to hand a `Continue` message back later, which gives a
//! stop request the chance to land between units.

use super::ReaderMessage;
use std::collections::VecDeque;

/// Runs a reader message later on the reader's thread
pub trait Scheduler {
    fn schedule(&mut self, message: ReaderMessage);
}

/// FIFO of messages waiting to be dispatched
#[derive(Debug, Default)]
pub struct DeferredQueue {
    queue: VecDeque<ReaderMessage>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&mut self) -> Option<ReaderMessage> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Scheduler for DeferredQueue {
    fn schedule(&mut self, message: ReaderMessage) {
        self.queue.push_back(message);
    }
}
