//! Playback queue with pause coalescing
//!
//! Short lines read one after another sound choppy when each is sent to the
//! synthesizer on its own. The coalescer holds text back until it ends in a
//! natural pause (end of a sentence), then releases everything up to that
//! pause as one utterance. `submit` reports whether anything was released,
//! which is what the reader uses to decide how far it may read ahead.

use super::{SpeechItem, SpeechSequence};
use crate::Result;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Splits text at its last sentence pause: group 1 up to and including the
/// pause, group 2 the remainder
static LAST_PAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)^(.*[^\s.!?][.!?]["'”’)]?(?:\s+|$))(.*)$"#).expect("valid pause pattern")
});

/// Where the reader sends speech
pub trait PlaybackQueue {
    /// Queue a sequence; returns true if this caused audible output
    fn submit(&mut self, seq: SpeechSequence) -> Result<bool>;

    /// Play everything held back, pause or not
    fn flush(&mut self) -> Result<()>;

    /// Drop anything held back without playing it
    fn discard_pending(&mut self) {}
}

/// Something that actually plays sequences
pub trait SpeechSink {
    fn speak(&mut self, seq: SpeechSequence) -> Result<()>;
}

/// `PlaybackQueue` that only speaks at pause boundaries
pub struct PauseCoalescer<S: SpeechSink> {
    sink: S,
    pending: SpeechSequence,
}

impl<S: SpeechSink> PauseCoalescer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            pending: Vec::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Number of items held back waiting for a pause
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn speak(&mut self, seq: SpeechSequence) -> Result<bool> {
        if seq.is_empty() {
            return Ok(false);
        }
        debug!("Releasing {} speech items", seq.len());
        self.sink.speak(seq)?;
        Ok(true)
    }

    /// Coalesce a sequence that contains no utterance boundary
    fn coalesce(&mut self, mut seq: SpeechSequence) -> Result<bool> {
        let split = seq.iter().enumerate().rev().find_map(|(idx, item)| {
            let caps = LAST_PAUSE.captures(item.text()?)?;
            Some((idx, caps[1].to_string(), caps[2].to_string()))
        });

        let Some((idx, before, after)) = split else {
            self.pending.append(&mut seq);
            return Ok(false);
        };

        let rest = seq.split_off(idx + 1);
        seq.pop();

        let mut out = std::mem::take(&mut self.pending);
        out.append(&mut seq);
        out.push(SpeechItem::Text(before));

        if !after.trim().is_empty() {
            self.pending.push(SpeechItem::Text(after));
        }
        self.pending.extend(rest);

        self.speak(out)
    }
}

impl<S: SpeechSink> PlaybackQueue for PauseCoalescer<S> {
    fn submit(&mut self, seq: SpeechSequence) -> Result<bool> {
        let mut spoke = false;
        let mut chunk = Vec::new();

        for item in seq {
            if item == SpeechItem::EndUtterance {
                let mut out = std::mem::take(&mut self.pending);
                out.append(&mut chunk);
                out.push(SpeechItem::EndUtterance);
                spoke |= self.speak(out)?;
            } else {
                chunk.push(item);
            }
        }

        if !chunk.is_empty() {
            spoke |= self.coalesce(chunk)?;
        }
        Ok(spoke)
    }

    fn flush(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        self.speak(pending)?;
        Ok(())
    }

    fn discard_pending(&mut self) {
        if !self.pending.is_empty() {
            debug!("Discarding {} pending speech items", self.pending.len());
            self.pending.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::spoken_text;

    #[derive(Default)]
    struct RecordingSink {
        spoken: Vec<SpeechSequence>,
    }

    impl SpeechSink for RecordingSink {
        fn speak(&mut self, seq: SpeechSequence) -> Result<()> {
            self.spoken.push(seq);
            Ok(())
        }
    }

    fn text(s: &str) -> SpeechItem {
        SpeechItem::Text(s.to_string())
    }

    #[test]
    fn test_holds_text_without_pause() {
        let mut queue = PauseCoalescer::new(RecordingSink::default());
        assert!(!queue.submit(vec![text("the quick brown"), SpeechItem::Break(300)]).unwrap());
        assert!(!queue.submit(vec![text("fox jumps")]).unwrap());
        assert!(queue.sink().spoken.is_empty());
        assert_eq!(queue.pending_len(), 3);
    }

    #[test]
    fn test_releases_up_to_last_pause() {
        let mut queue = PauseCoalescer::new(RecordingSink::default());
        queue.submit(vec![text("the quick brown")]).unwrap();
        assert!(queue.submit(vec![text("fox jumps. Over the")]).unwrap());

        let spoken = &queue.sink().spoken;
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken_text(&spoken[0]), "the quick brown fox jumps. ");
        assert_eq!(queue.pending_len(), 1);
    }

    #[test]
    fn test_trailing_items_stay_pending() {
        let mut queue = PauseCoalescer::new(RecordingSink::default());
        assert!(queue.submit(vec![text("Done."), SpeechItem::Break(300)]).unwrap());
        assert_eq!(queue.sink().spoken[0], vec![text("Done.")]);
        assert_eq!(queue.pending_len(), 1);
    }

    #[test]
    fn test_ellipsis_only_is_not_a_pause() {
        let mut queue = PauseCoalescer::new(RecordingSink::default());
        assert!(!queue.submit(vec![text("...")]).unwrap());
    }

    #[test]
    fn test_end_utterance_forces_output() {
        let mut queue = PauseCoalescer::new(RecordingSink::default());
        queue.submit(vec![text("no pause here")]).unwrap();
        assert!(queue.submit(vec![SpeechItem::EndUtterance]).unwrap());

        let spoken = &queue.sink().spoken;
        assert_eq!(spoken[0], vec![text("no pause here"), SpeechItem::EndUtterance]);
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_flush_and_discard() {
        let mut queue = PauseCoalescer::new(RecordingSink::default());
        queue.flush().unwrap();
        assert!(queue.sink().spoken.is_empty());

        queue.submit(vec![text("one")]).unwrap();
        queue.flush().unwrap();
        assert_eq!(queue.sink().spoken.len(), 1);

        queue.submit(vec![text("two")]).unwrap();
        queue.discard_pending();
        queue.flush().unwrap();
        assert_eq!(queue.sink().spoken.len(), 1);
    }
}
