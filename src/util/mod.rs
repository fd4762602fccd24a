//! Utility functions.

pub mod env;
pub mod format;

pub use format::{format_count, format_interval, format_percent};
