//! Turning units of text into speech sequences

use super::{SpeechItem, SpeechSequence};
use crate::config::Config;
use crate::content::{OutputReason, TextRange, TextUnit};
use crate::symbols::{condense_repeated_chars, describe_indentation};
use log::{trace, warn};
use regex::Regex;
use std::collections::HashMap;

/// Synthesis context that survives from one unit to the next
///
/// Each unit is built against a copy of this; the copy the builder
/// returns becomes the starting point for the following unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarriedState {
    /// Leading whitespace of the last non-blank unit
    pub indentation: Option<String>,
    /// Units built so far in this session
    pub units_spoken: usize,
}

/// Builds the speech for one unit
pub trait SequenceBuilder {
    /// Produce the sequence for `text`, advancing `state`
    fn build(
        &self,
        text: &str,
        range: &TextRange,
        unit: TextUnit,
        reason: OutputReason,
        state: &mut CarriedState,
    ) -> SpeechSequence;
}

/// Default builder for plain text
///
/// Condenses runs of repeated symbols, speaks symbol names, and announces
/// indentation whenever it changes between units.
pub struct TextSequenceBuilder {
    symbols: HashMap<u32, String>,
    symbols_regex: Option<Regex>,
    process_symbols: bool,
    repeated_symbols: Option<String>,
    report_indentation: bool,
}

impl TextSequenceBuilder {
    /// Builder that speaks text as-is
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            symbols_regex: None,
            process_symbols: false,
            repeated_symbols: None,
            report_indentation: false,
        }
    }

    /// Builder using the speech settings from `config`
    pub fn from_config(config: &Config) -> Self {
        let symbols_regex = config.symbols_regex().and_then(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Ignoring invalid symbols pattern: {}", e);
                None
            }
        });

        Self {
            symbols: config.symbols.clone(),
            symbols_regex,
            process_symbols: config.process_symbols(),
            repeated_symbols: config
                .repeated_symbols()
                .then(|| config.repeated_symbols_values()),
            report_indentation: config.report_indentation(),
        }
    }

    pub fn with_indentation_reporting(mut self, enabled: bool) -> Self {
        self.report_indentation = enabled;
        self
    }

    /// Apply symbol condensing and naming to one line of text
    fn process_text(&self, text: &str) -> String {
        let text = match &self.repeated_symbols {
            Some(chars) => condense_repeated_chars(text, chars, &self.symbols),
            None => text.to_string(),
        };

        if !self.process_symbols {
            return text;
        }

        match &self.symbols_regex {
            Some(re) => re
                .replace_all(&text, |caps: &regex::Captures| {
                    let matched = &caps[0];
                    matched
                        .chars()
                        .next()
                        .and_then(|ch| self.symbols.get(&(ch as u32)))
                        .map(|name| format!(" {} ", name))
                        .unwrap_or_else(|| matched.to_string())
                })
                .to_string(),
            None => text,
        }
    }
}

impl Default for TextSequenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceBuilder for TextSequenceBuilder {
    fn build(
        &self,
        text: &str,
        _range: &TextRange,
        unit: TextUnit,
        _reason: OutputReason,
        state: &mut CarriedState,
    ) -> SpeechSequence {
        let line = text.trim_end_matches(['\n', '\r']);
        let body = line.trim();
        let mut seq = Vec::new();

        // Blank lines keep the previous indentation
        if self.report_indentation && unit == TextUnit::ReadingChunk && !body.is_empty() {
            let indent: String = line
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();
            if state.indentation.as_deref() != Some(indent.as_str()) {
                if state.indentation.is_some() || !indent.is_empty() {
                    seq.push(SpeechItem::Text(describe_indentation(&indent)));
                }
                state.indentation = Some(indent);
            }
        }

        if !body.is_empty() {
            seq.push(SpeechItem::Text(self.process_text(body)));
        }

        state.units_spoken += 1;
        trace!("Built unit {}: {:?}", state.units_spoken, seq);
        seq
    }
}
