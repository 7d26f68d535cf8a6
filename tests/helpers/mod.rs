//! Test helper utilities
//!
//! Shared infrastructure for the integration tests.

pub mod log_capture;

pub use log_capture::init_test_logging;
