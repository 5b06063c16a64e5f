//! Foundational low-level utilities shared across Bellhop crates.
//!
//! Provides the atomic file-write helper used by session persistence and the
//! unix-time helpers used for temp-file naming and log annotations.

pub mod atomic_io;
pub mod time_utils;

pub use atomic_io::write_text_atomic;
pub use time_utils::{current_unix_timestamp, current_unix_timestamp_ms};
