//! Common test utilities and fixtures for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: config files and mock provider responses
//! - `logger`: structured test logging
//! - `log_capture`: tracing layer for asserting on emitted logs

pub mod fixtures;
pub mod log_capture;
pub mod logger;
