//! Configuration loading tests
//!
//! Configs are loaded from temporary files so the user's own
//! ~/.sayall.cfg is never touched.

use sayall::config::{Config, ReadingConfig};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_config_is_created_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sayall.cfg");

    let config = Config::load_from(&path).expect("Failed to load config");
    assert!(path.exists());
    assert_eq!(config.path(), &path);

    assert_eq!(config.reading(), ReadingConfig::default());
    assert!(config.symbols.contains_key(&33)); // ! -> bang
    assert!(config.symbols.contains_key(&64)); // @ -> at
    assert!(!config.process_symbols());
    assert_eq!(config.words_per_minute(), 180);
}

#[test]
fn test_reading_section_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sayall.cfg");
    fs::write(
        &path,
        "[reading]\nbuffer_cap = 8\nreview_follows_caret = false\nunit_break_ms = 0\n\
         [speech]\nrate = 40\nvoice_idx = 2\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let reading = config.reading();
    assert_eq!(reading.buffer_cap, 8);
    assert!(!reading.review_follows_caret);
    assert_eq!(reading.unit_break_ms, 0);

    assert_eq!(config.rate(), Some(40));
    assert_eq!(config.volume(), None);
    assert_eq!(config.voice_idx(), Some(2));
    // No [symbols] section, so nothing to replace
    assert!(config.symbols.is_empty());
    assert!(config.symbols_regex().is_none());
}

#[test]
fn test_unparsable_values_fall_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sayall.cfg");
    fs::write(&path, "[reading]\nbuffer_cap = lots\nreview_follows_caret = maybe\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.reading(), ReadingConfig::default());
}

#[test]
fn test_save_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sayall.cfg");

    let mut config = Config::load_from(&path).unwrap();
    config.set("reading", "buffer_cap", "2");
    config.set("speech", "report_indentation", "true");
    config.save().unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.reading().buffer_cap, 2);
    assert!(reloaded.report_indentation());
}
