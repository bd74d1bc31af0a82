//! sayall - continuous reading for screen readers
//!
//! Reads a text object unit by unit through a speech queue, moving the
//! caret (or review cursor) as each unit is actually spoken, and keeping a
//! bounded number of units buffered ahead of playback.

pub mod config;
pub mod content;
pub mod error;
pub mod reading;
pub mod speech;
pub mod symbols;
pub mod terminal;

pub use error::{Result, SayAllError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "sayall";
