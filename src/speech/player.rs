//! Playback worker
//!
//! Plays released speech on a background thread so the reader's thread
//! never waits on audio. When playback reaches a `Callback` item the message
//! is sent back over a channel and the main loop is woken, so every reader
//! message is still handled on the reader's own thread.

use super::{SpeechItem, SpeechSequence, SpeechSink, Synth};
use crate::reading::ReaderMessage;
use crate::{Result, SayAllError};
use log::{debug, error, warn};
use mio::Waker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Granularity of waits, and so the worst-case cancel latency
const POLL_INTERVAL: Duration = Duration::from_millis(20);

enum PlayerCommand {
    Play(SpeechSequence),
    /// Marks the end of a cancel; queued sequences before it are dropped
    Cancel,
    Shutdown,
}

/// Handle to the playback thread
pub struct Player {
    tx: Sender<PlayerCommand>,
    cancelling: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Player {
    /// Start the playback thread
    ///
    /// Reached callbacks are sent on `events`; `waker` (if any) is woken
    /// after each one. `words_per_minute` paces text when the synthesizer
    /// cannot report whether it is still speaking.
    pub fn spawn(
        synth: Box<dyn Synth>,
        events: Sender<ReaderMessage>,
        waker: Option<Arc<Waker>>,
        words_per_minute: u32,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let cancelling = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            synth,
            rx,
            events,
            waker,
            cancelling: Arc::clone(&cancelling),
            words_per_minute: words_per_minute.max(1),
        };

        let handle = thread::Builder::new()
            .name("sayall-playback".to_string())
            .spawn(move || worker.run())?;

        Ok(Self {
            tx,
            cancelling,
            worker: Some(handle),
        })
    }

    /// Stop speaking and drop everything queued so far
    pub fn cancel(&self) {
        debug!("Cancelling playback");
        self.cancelling.store(true, Ordering::SeqCst);
        if self.tx.send(PlayerCommand::Cancel).is_err() {
            warn!("Playback thread is gone");
        }
    }
}

impl SpeechSink for Player {
    fn speak(&mut self, seq: SpeechSequence) -> Result<()> {
        self.tx
            .send(PlayerCommand::Play(seq))
            .map_err(|_| SayAllError::Playback("playback thread has exited".to_string()))
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.cancelling.store(true, Ordering::SeqCst);
        let _ = self.tx.send(PlayerCommand::Shutdown);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("Playback thread panicked");
            }
        }
    }
}

struct Worker {
    synth: Box<dyn Synth>,
    rx: Receiver<PlayerCommand>,
    events: Sender<ReaderMessage>,
    waker: Option<Arc<Waker>>,
    cancelling: Arc<AtomicBool>,
    words_per_minute: u32,
}

impl Worker {
    fn run(mut self) {
        debug!("Playback thread started");
        while let Ok(cmd) = self.rx.recv() {
            match cmd {
                PlayerCommand::Play(seq) => {
                    if !self.cancelled() {
                        self.play(seq);
                    }
                }
                PlayerCommand::Cancel => {
                    if let Err(e) = self.synth.cancel() {
                        warn!("Cancel failed: {}", e);
                    }
                    self.cancelling.store(false, Ordering::SeqCst);
                }
                PlayerCommand::Shutdown => break,
            }
        }
        debug!("Playback thread exiting");
    }

    fn cancelled(&self) -> bool {
        self.cancelling.load(Ordering::SeqCst)
    }

    fn play(&mut self, seq: SpeechSequence) {
        for item in seq {
            if self.cancelled() {
                return;
            }
            match item {
                SpeechItem::Callback(message) => self.notify(message),
                SpeechItem::Text(text) => {
                    if let Err(e) = self.synth.speak(&text) {
                        error!("Playback failed: {}", e);
                        continue;
                    }
                    self.wait_for_speech(&text);
                }
                SpeechItem::Break(ms) => self.sleep(Duration::from_millis(u64::from(ms))),
                SpeechItem::EndUtterance => {}
            }
        }
    }

    fn notify(&self, message: ReaderMessage) {
        if self.events.send(message).is_err() {
            debug!("Reader is gone, dropping playback event");
            return;
        }
        if let Some(waker) = &self.waker {
            if let Err(e) = waker.wake() {
                warn!("Failed to wake reader: {}", e);
            }
        }
    }

    /// Block until the synthesizer finishes `text`, or cancel
    fn wait_for_speech(&mut self, text: &str) {
        match self.synth.is_speaking() {
            Ok(Some(_)) => loop {
                thread::sleep(POLL_INTERVAL);
                if self.cancelled() {
                    return;
                }
                match self.synth.is_speaking() {
                    Ok(Some(true)) => continue,
                    _ => return,
                }
            },
            _ => self.sleep(estimated_duration(text, self.words_per_minute)),
        }
    }

    /// Sleep that wakes early on cancel
    fn sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.cancelled() {
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

/// Rough speaking time for `text` at `words_per_minute`
pub fn estimated_duration(text: &str, words_per_minute: u32) -> Duration {
    let words = text.split_whitespace().count() as u64;
    Duration::from_millis(words * 60_000 / u64::from(words_per_minute.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::SessionHandle;
    use std::sync::Mutex;

    /// Synth that records text and never reports speaking
    struct LogSynth {
        spoken: Arc<Mutex<Vec<String>>>,
    }

    impl Synth for LogSynth {
        fn set_rate(&mut self, _rate: u8) -> Result<()> {
            Ok(())
        }
        fn set_volume(&mut self, _volume: u8) -> Result<()> {
            Ok(())
        }
        fn set_voice_idx(&mut self, _idx: usize) -> Result<()> {
            Ok(())
        }
        fn speak(&mut self, text: &str) -> Result<()> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }
        fn cancel(&mut self) -> Result<()> {
            Ok(())
        }
        fn is_speaking(&mut self) -> Result<Option<bool>> {
            Ok(Some(false))
        }
    }

    #[test]
    fn test_estimated_duration() {
        assert_eq!(estimated_duration("one two three", 180), Duration::from_millis(1000));
        assert_eq!(estimated_duration("", 180), Duration::ZERO);
        assert_eq!(estimated_duration("word", 0), Duration::from_millis(60_000));
    }

    #[test]
    fn test_plays_in_order_and_reports_callbacks() {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let synth = LogSynth {
            spoken: Arc::clone(&spoken),
        };
        let (events_tx, events_rx) = mpsc::channel();
        let mut player = Player::spawn(Box::new(synth), events_tx, None, 180).unwrap();

        let handle = SessionHandle { generation: 7 };
        player
            .speak(vec![
                SpeechItem::Text("first".to_string()),
                SpeechItem::Callback(ReaderMessage::Finished(handle)),
                SpeechItem::Text("second".to_string()),
            ])
            .unwrap();

        let message = events_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(message, ReaderMessage::Finished(handle));

        drop(player);
        let spoken = spoken.lock().unwrap();
        assert_eq!(spoken.first().map(String::as_str), Some("first"));
    }
}
