//! Speech side of reading: building sequences, queueing them, playing them

pub mod backends;
pub mod builder;
pub mod player;
pub mod queue;
pub mod sequence;
pub mod synth;

pub use builder::{CarriedState, SequenceBuilder, TextSequenceBuilder};
pub use player::Player;
pub use queue::{PauseCoalescer, PlaybackQueue, SpeechSink};
pub use sequence::{spoken_text, SpeechItem, SpeechSequence};
pub use synth::{create_synth, Synth};
