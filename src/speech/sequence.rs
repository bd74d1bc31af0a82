//! Speech sequences
//!
//! A sequence is what the reader hands to playback for one unit: text to
//! speak interleaved with control items. Control items never produce sound;
//! `Callback` items are handed back to the reader when playback reaches them.

use crate::reading::ReaderMessage;

/// One element of a speech sequence
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechItem {
    /// Text to speak
    Text(String),
    /// Silence of the given length in milliseconds
    Break(u32),
    /// Hard utterance boundary; everything before it must be spoken now
    EndUtterance,
    /// Deliver this message to the reader when playback gets here
    Callback(ReaderMessage),
}

impl SpeechItem {
    pub fn text(&self) -> Option<&str> {
        match self {
            SpeechItem::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Ordered list of speech items
pub type SpeechSequence = Vec<SpeechItem>;

/// Concatenate the spoken text of a sequence, for logging and tests
pub fn spoken_text(seq: &[SpeechItem]) -> String {
    seq.iter()
        .filter_map(SpeechItem::text)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_text_skips_control_items() {
        let seq = vec![
            SpeechItem::Break(10),
            SpeechItem::Text("hello".to_string()),
            SpeechItem::EndUtterance,
            SpeechItem::Text("world".to_string()),
        ];
        assert_eq!(spoken_text(&seq), "hello world");
    }
}
