//! Text shaping helpers used when building speech
//!
//! - `condense_repeated_chars`: "====" becomes "4 equals"
//! - `describe_indentation`: leading whitespace becomes "1 tab 4 space"

use std::collections::{HashMap, HashSet};

/// Replace runs of repeated characters with count + name
///
/// Only characters listed in `chars_to_condense` are affected. The name
/// comes from `symbols` when present, otherwise the character itself.
pub fn condense_repeated_chars(
    text: &str,
    chars_to_condense: &str,
    symbols: &HashMap<u32, String>,
) -> String {
    if chars_to_condense.is_empty() || text.is_empty() {
        return text.to_string();
    }

    // The regex crate has no backreferences, so runs are counted by hand
    let condense_set: HashSet<char> = chars_to_condense.chars().collect();

    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if !condense_set.contains(&ch) {
            result.push(ch);
            continue;
        }

        let mut count = 1;
        while chars.peek() == Some(&ch) {
            chars.next();
            count += 1;
        }

        if count == 1 {
            result.push(ch);
            continue;
        }

        match symbols.get(&(ch as u32)) {
            Some(name) if !name.is_empty() => result.push_str(&format!("{} {}", count, name)),
            _ => result.push_str(&format!("{} {}", count, ch)),
        }
    }

    result
}

/// Spoken form of a run of leading whitespace
pub fn describe_indentation(indent: &str) -> String {
    if indent.is_empty() {
        return "no indent".to_string();
    }

    let mut parts = Vec::new();
    let mut chars = indent.chars().peekable();
    while let Some(ch) = chars.next() {
        let mut count = 1;
        while chars.peek() == Some(&ch) {
            chars.next();
            count += 1;
        }
        let name = if ch == '\t' { "tab" } else { "space" };
        parts.push(format!("{} {}", count, name));
    }
    parts.join(" ")
}
