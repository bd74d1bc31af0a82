//! Speech synthesizer abstraction
//!
//! The playback worker drives one of these to turn queued text into audio.

use crate::config::Config;
use crate::{Result, SayAllError};
use log::info;

/// Speech synthesizer trait
pub trait Synth: Send {
    /// Set speech rate (0-100, where 50 is normal)
    fn set_rate(&mut self, rate: u8) -> Result<()>;

    /// Set speech volume (0-100)
    fn set_volume(&mut self, volume: u8) -> Result<()>;

    /// Set voice by index (platform-specific)
    fn set_voice_idx(&mut self, idx: usize) -> Result<()>;

    /// Queue text for speaking without interrupting current speech
    fn speak(&mut self, text: &str) -> Result<()>;

    /// Silence current and queued speech
    fn cancel(&mut self) -> Result<()>;

    /// Whether audio is still playing, or `None` if the backend cannot tell
    fn is_speaking(&mut self) -> Result<Option<bool>>;
}

/// Create the native synthesizer and apply configured voice settings
pub fn create_synth(config: &Config) -> Result<Box<dyn Synth>> {
    use super::backends::native::NativeSynth;

    info!(
        "Creating native speech synthesizer for platform: {}",
        std::env::consts::OS
    );
    let mut synth = NativeSynth::new().map_err(|e| {
        SayAllError::Speech(format!(
            "No speech backend available on '{}' (on Linux install speech-dispatcher): {}",
            std::env::consts::OS,
            e
        ))
    })?;

    if let Some(rate) = config.rate() {
        synth.set_rate(rate)?;
        info!("Speech rate set to {}", rate);
    }
    if let Some(volume) = config.volume() {
        synth.set_volume(volume)?;
        info!("Speech volume set to {}", volume);
    }
    if let Some(voice_idx) = config.voice_idx() {
        synth.set_voice_idx(voice_idx)?;
        info!("Speech voice index set to {}", voice_idx);
    }

    Ok(Box::new(synth))
}
