//! Configuration management

use crate::{Result, SayAllError};
use ini::Ini;
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Settings that shape the read loop itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingConfig {
    /// Units that may be queued ahead of audible playback
    pub buffer_cap: usize,
    /// Move the review cursor along with the caret
    pub review_follows_caret: bool,
    /// Silence appended after every unit, in milliseconds
    pub unit_break_ms: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            buffer_cap: 4,
            review_follows_caret: true,
            unit_break_ms: 300,
        }
    }
}

/// Application configuration
///
/// Backed by an INI file; typed getters fall back to defaults for missing
/// or unparsable values.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.sayall.cfg)
    path: PathBuf,

    /// Symbols dictionary (char code -> name) for pronunciation
    /// e.g., 33 -> "bang" so '!' is spoken as "bang"
    pub symbols: HashMap<u32, String>,

    /// Alternation of every named symbol, for symbol replacement
    symbols_regex: Option<String>,
}

impl Config {
    /// Load configuration from ~/.sayall.cfg, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, creating it with defaults if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(path)
                .map_err(|e| SayAllError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(path)
                .map_err(|e| SayAllError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self::from_ini(ini, path.to_path_buf()))
    }

    fn from_ini(ini: Ini, path: PathBuf) -> Self {
        let mut config = Self {
            ini,
            path,
            symbols: HashMap::new(),
            symbols_regex: None,
        };
        config.parse_symbols();
        config.build_symbols_regex();
        config
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| SayAllError::Config(format!("Failed to save config: {}", e)))
    }

    /// Default config file path (~/.sayall.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sayall.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("reading"))
            .set("buffer_cap", "4")
            .set("review_follows_caret", "true")
            .set("unit_break_ms", "300");

        ini.with_section(Some("speech"))
            .set("process_symbols", "false")
            .set("repeated_symbols", "false")
            .set("repeated_symbols_values", "-=!#")
            .set("report_indentation", "false")
            .set("words_per_minute", "180");

        ini.with_section(Some("symbols"))
            .set("33", "bang")
            .set("34", "quote")
            .set("35", "number")
            .set("36", "dollar")
            .set("37", "percent")
            .set("38", "and")
            .set("39", "tick")
            .set("40", "left paren")
            .set("41", "right paren")
            .set("42", "star")
            .set("43", "plus")
            .set("44", "comma")
            .set("45", "dash")
            .set("46", "dot")
            .set("47", "slash")
            .set("58", "colon")
            .set("59", "semi")
            .set("60", "less")
            .set("61", "equals")
            .set("62", "greater")
            .set("63", "question")
            .set("64", "at")
            .set("91", "left bracket")
            .set("92", "backslash")
            .set("93", "right bracket")
            .set("94", "caret")
            .set("95", "line")
            .set("96", "grav")
            .set("123", "left brace")
            .set("124", "bar")
            .set("125", "right brace")
            .set("126", "tilda");

        ini
    }

    /// Parse symbols from config
    fn parse_symbols(&mut self) {
        if let Some(section) = self.ini.section(Some("symbols")) {
            for (key, value) in section.iter() {
                if let Ok(code) = key.parse::<u32>() {
                    self.symbols.insert(code, value.to_string());
                }
            }
        }
        debug!("Loaded {} symbols", self.symbols.len());
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i32) -> i32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Build regex pattern for symbol replacement
    fn build_symbols_regex(&mut self) {
        let pattern: String = self
            .symbols
            .keys()
            .filter(|&&code| code != 32) // Skip space
            .filter_map(|&code| char::from_u32(code).map(|ch| regex::escape(&ch.to_string())))
            .collect::<Vec<_>>()
            .join("|");

        if !pattern.is_empty() {
            self.symbols_regex = Some(pattern);
        }
    }

    /// Get symbols regex pattern for replacement
    pub fn symbols_regex(&self) -> Option<&str> {
        self.symbols_regex.as_deref()
    }

    // Reading settings

    /// Read loop settings, with defaults for anything missing
    pub fn reading(&self) -> ReadingConfig {
        let defaults = ReadingConfig::default();
        ReadingConfig {
            buffer_cap: self
                .get_int("reading", "buffer_cap", defaults.buffer_cap as i32)
                .max(1) as usize,
            review_follows_caret: self.get_bool(
                "reading",
                "review_follows_caret",
                defaults.review_follows_caret,
            ),
            unit_break_ms: self
                .get_int("reading", "unit_break_ms", defaults.unit_break_ms as i32)
                .max(0) as u32,
        }
    }

    // Speech settings

    /// Speak symbol names ("!" becomes "bang")
    pub fn process_symbols(&self) -> bool {
        self.get_bool("speech", "process_symbols", false)
    }

    /// Condense runs of repeated symbols ("====" becomes "4 equals")
    pub fn repeated_symbols(&self) -> bool {
        self.get_bool("speech", "repeated_symbols", false)
    }

    /// Which symbols should be condensed when repeated?
    pub fn repeated_symbols_values(&self) -> String {
        self.get_string("speech", "repeated_symbols_values", "-=!#")
    }

    /// Announce indentation when it changes between lines
    pub fn report_indentation(&self) -> bool {
        self.get_bool("speech", "report_indentation", false)
    }

    /// Pacing used when the synthesizer cannot say when it is done
    pub fn words_per_minute(&self) -> u32 {
        self.get_int("speech", "words_per_minute", 180).max(1) as u32
    }

    /// Speech rate (0-100)
    pub fn rate(&self) -> Option<u8> {
        self.get_int("speech", "rate", -1)
            .try_into()
            .ok()
            .filter(|&r| r <= 100)
    }

    /// Speech volume (0-100)
    pub fn volume(&self) -> Option<u8> {
        self.get_int("speech", "volume", -1)
            .try_into()
            .ok()
            .filter(|&v| v <= 100)
    }

    /// Voice index for TTS engine
    pub fn voice_idx(&self) -> Option<usize> {
        self.get_int("speech", "voice_idx", -1).try_into().ok()
    }
}

impl Default for Config {
    /// Built-in defaults, not backed by any file on disk
    fn default() -> Self {
        Self::from_ini(Self::default_config(), Self::config_path())
    }
}
