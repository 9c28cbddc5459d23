//! Utility functions and helpers
//!
//! This module contains timestamp formatting and atomic file writes.

pub mod atomic;
pub mod time;

pub use atomic::{atomic_write, remove_stale_temp};
pub use time::{format_timestamp, Precision};
